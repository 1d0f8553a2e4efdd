use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use validator::Validate;

use crate::{
    api::{AttemptApi, UserApi},
    errors::{AppError, AppResult},
    models::{
        domain::{AttemptResult, UserProfile},
        dto::request::{ChangePasswordRequest, UpdateProfileRequest},
    },
};

pub struct ProfileService {
    users: Arc<dyn UserApi>,
    attempts: Arc<dyn AttemptApi>,
}

impl ProfileService {
    pub fn new(users: Arc<dyn UserApi>, attempts: Arc<dyn AttemptApi>) -> Self {
        Self { users, attempts }
    }

    pub async fn profile(&self, token: &SecretString) -> AppResult<UserProfile> {
        self.users.get_profile(token.expose_secret()).await
    }

    pub async fn update_profile(
        &self,
        token: &SecretString,
        request: UpdateProfileRequest,
    ) -> AppResult<UserProfile> {
        if request.is_empty() {
            return Err(AppError::ValidationError("Nothing to update".to_string()));
        }
        request.validate()?;

        let profile = self
            .users
            .update_profile(token.expose_secret(), &request)
            .await?;
        log::info!("Updated profile of {}", profile.username);
        Ok(profile)
    }

    pub async fn change_password(
        &self,
        token: &SecretString,
        current: &SecretString,
        new: &SecretString,
    ) -> AppResult<()> {
        if current.expose_secret() == new.expose_secret() {
            return Err(AppError::ValidationError(
                "New password must differ from the current one".to_string(),
            ));
        }
        let request = ChangePasswordRequest {
            current_password: current.expose_secret().to_string(),
            new_password: new.expose_secret().to_string(),
        };
        request.validate()?;

        self.users
            .change_password(token.expose_secret(), &request)
            .await?;
        log::info!("Password changed");
        Ok(())
    }

    /// Past attempt results, most recent first.
    pub async fn history(&self, token: &SecretString) -> AppResult<Vec<AttemptResult>> {
        let mut results = self.attempts.list_my_attempts(token.expose_secret()).await?;
        // None sorts before Some, so reversing puts undated results last.
        results.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
        Ok(results)
    }
}
