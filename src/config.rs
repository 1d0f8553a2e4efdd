use std::{env, path::PathBuf, time::Duration};

use crate::errors::{AppError, AppResult};

#[derive(Clone, Debug)]
pub struct Config {
    pub api_base_url: String,
    pub store_path: PathBuf,
    pub http_timeout_secs: u64,
    pub guest_session_ttl_hours: i64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            api_base_url: env::var("QUIZ_API_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8080/api".to_string()),
            store_path: env::var("QUIZ_STORE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".quizhub/store.json")),
            http_timeout_secs: env::var("QUIZ_HTTP_TIMEOUT_SECS")
                .ok()
                .and_then(|t| t.parse().ok())
                .unwrap_or(10),
            guest_session_ttl_hours: env::var("GUEST_SESSION_TTL_HOURS")
                .ok()
                .and_then(|h| h.parse().ok())
                .unwrap_or(24),
        }
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Base URL without a trailing slash, so paths can be appended as `/quizzes`.
    pub fn normalized_base_url(&self) -> &str {
        self.api_base_url.trim_end_matches('/')
    }

    pub fn validate(&self) -> AppResult<()> {
        let base = self.normalized_base_url();
        if base.is_empty() {
            return Err(AppError::ValidationError(
                "QUIZ_API_BASE_URL must not be empty".to_string(),
            ));
        }
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(AppError::ValidationError(format!(
                "QUIZ_API_BASE_URL must be an http(s) URL, got '{}'",
                base
            )));
        }
        if self.http_timeout_secs == 0 {
            return Err(AppError::ValidationError(
                "QUIZ_HTTP_TIMEOUT_SECS must be greater than zero".to_string(),
            ));
        }
        if self.guest_session_ttl_hours <= 0 {
            return Err(AppError::ValidationError(
                "GUEST_SESSION_TTL_HOURS must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    #[cfg(test)]
    pub fn test_config() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:9999/api/".to_string(),
            store_path: PathBuf::from("target/test-store.json"),
            http_timeout_secs: 2,
            guest_session_ttl_hours: 24,
        }
    }
}
