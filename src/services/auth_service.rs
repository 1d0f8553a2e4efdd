use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use validator::Validate;

use crate::{
    api::UserApi,
    auth::{Claims, TokenDecoder, TokenStore},
    clock::Clock,
    errors::AppResult,
    models::dto::{
        request::{LoginRequest, RegisterRequest},
        response::AuthResponse,
    },
};

pub struct AuthService {
    users: Arc<dyn UserApi>,
    tokens: TokenStore,
    decoder: TokenDecoder,
    clock: Clock,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserApi>, tokens: TokenStore, clock: Clock) -> Self {
        Self {
            users,
            tokens,
            decoder: TokenDecoder::new(),
            clock,
        }
    }

    pub async fn login(&self, username: &str, password: &SecretString) -> AppResult<Claims> {
        let request = LoginRequest {
            username: username.trim().to_string(),
            password: password.expose_secret().to_string(),
        };
        request.validate()?;

        let response = self.users.login(&request).await?;
        log::info!("Logged in as {}", request.username);
        self.remember(response)
    }

    pub async fn register(&self, request: RegisterRequest) -> AppResult<Claims> {
        request.validate()?;

        let response = self.users.register(&request).await?;
        log::info!("Registered user {}", request.username);
        self.remember(response)
    }

    pub fn logout(&self) -> AppResult<()> {
        self.tokens.clear()?;
        log::info!("Logged out");
        Ok(())
    }

    /// Claims of the stored token, or `None` when logged out.
    ///
    /// Undecodable or expired tokens are removed from storage.
    pub fn current_user(&self) -> AppResult<Option<Claims>> {
        Ok(self.valid_session()?.map(|(_, claims)| claims))
    }

    /// Stored token if it still decodes and has not expired.
    pub fn session_token(&self) -> AppResult<Option<SecretString>> {
        Ok(self.valid_session()?.map(|(token, _)| token))
    }

    fn valid_session(&self) -> AppResult<Option<(SecretString, Claims)>> {
        let Some(token) = self.tokens.token()? else {
            return Ok(None);
        };

        match self.decoder.decode(token.expose_secret()) {
            Ok(claims) if claims.is_expired_at(self.clock.now()) => {
                log::info!("Stored token has expired, logging out");
                self.tokens.clear()?;
                Ok(None)
            }
            Ok(claims) => Ok(Some((token, claims))),
            Err(e) => {
                log::warn!("Discarding unreadable token: {}", e);
                self.tokens.clear()?;
                Ok(None)
            }
        }
    }

    fn remember(&self, response: AuthResponse) -> AppResult<Claims> {
        let claims = self.decoder.decode(&response.token)?;
        self.tokens.save(&SecretString::from(response.token))?;
        Ok(claims)
    }
}
