use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum AppError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Remote error ({status}): {message}")]
    Remote { status: u16, message: String },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl AppError {
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Network(_) => "NETWORK_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::Conflict(_) => "CONFLICT",
            AppError::Remote { .. } => "REMOTE_ERROR",
            AppError::Storage(_) => "STORAGE_ERROR",
            AppError::Serialization(_) => "SERIALIZATION_ERROR",
            AppError::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Maps a non-success HTTP status and its body to a failure kind.
    ///
    /// The backend answers errors as `{"message": "..."}` or `{"error": "..."}`;
    /// anything else is used verbatim.
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let message = ErrorBody::extract(body)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown error").to_string());

        match status {
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                AppError::ValidationError(message)
            }
            StatusCode::UNAUTHORIZED => AppError::Unauthorized(message),
            StatusCode::FORBIDDEN => AppError::Forbidden(message),
            StatusCode::NOT_FOUND => AppError::NotFound(message),
            StatusCode::CONFLICT => AppError::Conflict(message),
            _ => AppError::Remote {
                status: status.as_u16(),
                message,
            },
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::NotFound(_))
    }

    pub fn is_access_denied(&self) -> bool {
        matches!(self, AppError::Forbidden(_) | AppError::Unauthorized(_))
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

impl ErrorBody {
    fn extract(body: &str) -> Option<String> {
        let trimmed = body.trim();
        if trimmed.is_empty() {
            return None;
        }
        match serde_json::from_str::<ErrorBody>(trimmed) {
            Ok(parsed) => parsed.message.or(parsed.error),
            Err(_) => Some(trimmed.to_string()),
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => AppError::from_status(status, &err.to_string()),
            None if err.is_decode() => AppError::Serialization(err.to_string()),
            None => AppError::Network(err.to_string()),
        }
    }
}
impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}
impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}
impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::ValidationError(err.to_string())
    }
}
impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        AppError::Unauthorized(format!("Invalid token: {}", err))
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            AppError::from_status(StatusCode::NOT_FOUND, ""),
            AppError::NotFound(_)
        ));
        assert!(matches!(
            AppError::from_status(StatusCode::FORBIDDEN, ""),
            AppError::Forbidden(_)
        ));
        assert!(matches!(
            AppError::from_status(StatusCode::UNAUTHORIZED, ""),
            AppError::Unauthorized(_)
        ));
        assert!(matches!(
            AppError::from_status(StatusCode::UNPROCESSABLE_ENTITY, ""),
            AppError::ValidationError(_)
        ));
        assert!(matches!(
            AppError::from_status(StatusCode::CONFLICT, ""),
            AppError::Conflict(_)
        ));
        assert!(matches!(
            AppError::from_status(StatusCode::BAD_GATEWAY, ""),
            AppError::Remote { status: 502, .. }
        ));
    }

    #[test]
    fn test_status_mapping_uses_message_from_body() {
        let err = AppError::from_status(StatusCode::FORBIDDEN, r#"{"message":"Invalid access key"}"#);
        assert_eq!(err.to_string(), "Forbidden: Invalid access key");

        let err = AppError::from_status(StatusCode::NOT_FOUND, r#"{"error":"Quiz not found"}"#);
        assert_eq!(err.to_string(), "Not found: Quiz not found");

        let err = AppError::from_status(StatusCode::CONFLICT, "username taken");
        assert_eq!(err.to_string(), "Conflict: username taken");
    }

    #[test]
    fn test_status_mapping_falls_back_to_reason() {
        let err = AppError::from_status(StatusCode::NOT_FOUND, "   ");
        assert_eq!(err.to_string(), "Not found: Not Found");
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(AppError::Network("x".into()).error_code(), "NETWORK_ERROR");
        assert_eq!(
            AppError::Remote {
                status: 500,
                message: "boom".into()
            }
            .error_code(),
            "REMOTE_ERROR"
        );
        assert!(AppError::Forbidden("x".into()).is_access_denied());
        assert!(AppError::NotFound("x".into()).is_not_found());
    }
}
