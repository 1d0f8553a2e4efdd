use std::sync::Arc;

use crate::{errors::AppResult, storage::kv::KeyValueStore};

fn access_key_slot(quiz_id: i64) -> String {
    format!("quiz_access_{}", quiz_id)
}

/// Access keys the user has successfully entered for private quizzes.
#[derive(Clone)]
pub struct AccessKeyStore {
    store: Arc<dyn KeyValueStore>,
}

impl AccessKeyStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn get(&self, quiz_id: i64) -> AppResult<Option<String>> {
        self.store.get(&access_key_slot(quiz_id))
    }

    pub fn grant(&self, quiz_id: i64, access_key: &str) -> AppResult<()> {
        self.store.set(&access_key_slot(quiz_id), access_key)
    }

    pub fn revoke(&self, quiz_id: i64) -> AppResult<()> {
        self.store.remove(&access_key_slot(quiz_id))
    }
}
