use std::sync::Arc;

use crate::{
    errors::AppResult,
    models::domain::AttemptSession,
    session::answers::AnswerLedger,
    storage::KeyValueStore,
};

pub const CURRENT_ATTEMPT_KEY: &str = "current_quiz_attempt";
pub const ANSWERS_KEY: &str = "quiz_attempt_answers";
pub const CURRENT_QUESTION_KEY: &str = "quiz_current_question";

/// Typed view over the three slots that let an attempt survive a restart.
///
/// Unreadable slot contents are logged and treated as absent.
#[derive(Clone)]
pub struct AttemptStore {
    store: Arc<dyn KeyValueStore>,
}

impl AttemptStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn load_session(&self) -> AppResult<Option<AttemptSession>> {
        let Some(raw) = self.store.get(CURRENT_ATTEMPT_KEY)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                log::warn!("Ignoring unreadable {}: {}", CURRENT_ATTEMPT_KEY, e);
                Ok(None)
            }
        }
    }

    pub fn save_session(&self, session: &AttemptSession) -> AppResult<()> {
        self.store
            .set(CURRENT_ATTEMPT_KEY, &serde_json::to_string(session)?)
    }

    pub fn clear_session(&self) -> AppResult<()> {
        self.store.remove(CURRENT_ATTEMPT_KEY)
    }

    pub fn load_answers(&self) -> AppResult<AnswerLedger> {
        let Some(raw) = self.store.get(ANSWERS_KEY)? else {
            return Ok(AnswerLedger::default());
        };
        match serde_json::from_str(&raw) {
            Ok(ledger) => Ok(ledger),
            Err(e) => {
                log::warn!("Ignoring unreadable {}: {}", ANSWERS_KEY, e);
                Ok(AnswerLedger::default())
            }
        }
    }

    pub fn save_answers(&self, answers: &AnswerLedger) -> AppResult<()> {
        self.store.set(ANSWERS_KEY, &serde_json::to_string(answers)?)
    }

    pub fn load_current_index(&self) -> AppResult<Option<usize>> {
        let Some(raw) = self.store.get(CURRENT_QUESTION_KEY)? else {
            return Ok(None);
        };
        match raw.trim().parse() {
            Ok(index) => Ok(Some(index)),
            Err(e) => {
                log::warn!("Ignoring unreadable {}: {}", CURRENT_QUESTION_KEY, e);
                Ok(None)
            }
        }
    }

    pub fn save_current_index(&self, index: usize) -> AppResult<()> {
        self.store.set(CURRENT_QUESTION_KEY, &index.to_string())
    }

    pub fn clear_all(&self) -> AppResult<()> {
        self.store.remove(CURRENT_ATTEMPT_KEY)?;
        self.store.remove(ANSWERS_KEY)?;
        self.store.remove(CURRENT_QUESTION_KEY)
    }
}
