use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::{AppError, AppResult};

static ACCESS_KEY_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Z0-9]{5}$").expect("ACCESS_KEY_REGEX is a valid regex pattern")
});

/// Trims and upper-cases user input, then checks it is a 5-character access key.
pub fn normalize_access_key(raw: &str) -> AppResult<String> {
    let key = raw.trim().to_ascii_uppercase();
    if !ACCESS_KEY_REGEX.is_match(&key) {
        return Err(AppError::ValidationError(
            "Access key must be exactly 5 letters or digits".to_string(),
        ));
    }
    Ok(key)
}
