use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};

use crate::{errors::AppResult, storage::KeyValueStore};

pub const AUTH_TOKEN_KEY: &str = "auth_token";

/// Persisted bearer token of the logged-in user.
#[derive(Clone)]
pub struct TokenStore {
    store: Arc<dyn KeyValueStore>,
}

impl TokenStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn token(&self) -> AppResult<Option<SecretString>> {
        Ok(self
            .store
            .get(AUTH_TOKEN_KEY)?
            .filter(|t| !t.is_empty())
            .map(SecretString::from))
    }

    pub fn save(&self, token: &SecretString) -> AppResult<()> {
        self.store.set(AUTH_TOKEN_KEY, token.expose_secret())
    }

    pub fn clear(&self) -> AppResult<()> {
        self.store.remove(AUTH_TOKEN_KEY)
    }
}
