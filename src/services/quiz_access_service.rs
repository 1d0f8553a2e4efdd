use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};

use crate::{
    api::QuizApi,
    auth::{normalize_access_key, TokenDecoder},
    errors::{AppError, AppResult},
    models::{domain::Quiz, dto::response::QuizAccess},
    storage::AccessKeyStore,
};

/// Decides whether the detail page of a quiz may be shown, and manages the
/// access keys that unlock private quizzes.
pub struct QuizAccessService {
    quizzes: Arc<dyn QuizApi>,
    grants: AccessKeyStore,
    decoder: TokenDecoder,
}

impl QuizAccessService {
    pub fn new(quizzes: Arc<dyn QuizApi>, grants: AccessKeyStore) -> Self {
        Self {
            quizzes,
            grants,
            decoder: TokenDecoder::new(),
        }
    }

    /// Open for public quizzes, for their author, and while a stored key still
    /// works. A stored key the backend now rejects is revoked.
    pub async fn open(&self, quiz_id: i64, token: Option<&SecretString>) -> AppResult<QuizAccess> {
        let token = token.map(|t| t.expose_secret());
        let quiz = self.quizzes.get_quiz(quiz_id, token, None).await?;

        if quiz.is_public || self.is_author(&quiz, token) {
            return Ok(QuizAccess::Open(quiz));
        }

        let Some(key) = self.grants.get(quiz_id)? else {
            return Ok(Self::locked(quiz));
        };
        match self.verify(quiz_id, &key).await {
            Ok(()) => Ok(QuizAccess::Open(quiz)),
            Err(e) if e.is_access_denied() => {
                log::info!("Stored access key for quiz {} no longer valid", quiz_id);
                self.grants.revoke(quiz_id)?;
                Ok(Self::locked(quiz))
            }
            Err(e) => Err(e),
        }
    }

    /// Checks `raw_key` with the backend and remembers it on success.
    pub async fn unlock(&self, quiz_id: i64, raw_key: &str) -> AppResult<Quiz> {
        let key = normalize_access_key(raw_key)?;
        let quiz = self.quizzes.get_quiz(quiz_id, None, Some(key.as_str())).await?;

        match self.verify(quiz_id, &key).await {
            Ok(()) => {
                self.grants.grant(quiz_id, &key)?;
                log::info!("Unlocked quiz {}", quiz_id);
                Ok(quiz)
            }
            Err(e) if e.is_access_denied() => {
                self.grants.revoke(quiz_id)?;
                Err(AppError::Forbidden(format!(
                    "Access key rejected for quiz {}",
                    quiz_id
                )))
            }
            Err(e) => Err(e),
        }
    }

    /// Stored key for `quiz_id`, passed along when starting an attempt.
    pub fn access_key(&self, quiz_id: i64) -> AppResult<Option<String>> {
        self.grants.get(quiz_id)
    }

    async fn verify(&self, quiz_id: i64, key: &str) -> AppResult<()> {
        self.quizzes.get_questions(quiz_id, Some(key)).await?;
        Ok(())
    }

    fn is_author(&self, quiz: &Quiz, token: Option<&str>) -> bool {
        token
            .and_then(|t| self.decoder.decode(t).ok())
            .and_then(|claims| claims.user_id())
            .map(|user_id| quiz.is_authored_by(user_id))
            .unwrap_or(false)
    }

    fn locked(quiz: Quiz) -> QuizAccess {
        QuizAccess::Locked {
            quiz_id: quiz.id,
            title: quiz.title,
        }
    }
}
