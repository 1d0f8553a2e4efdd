use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Subject (user id)
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub exp: Option<i64>, // Expiration time (as UTC timestamp)
    #[serde(default)]
    pub iat: Option<i64>, // Issued at (as UTC timestamp)
}

impl Claims {
    pub fn user_id(&self) -> Option<i64> {
        self.sub.parse().ok()
    }

    /// Tokens without an `exp` claim never expire client-side.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.exp.map(|exp| exp <= now.timestamp()).unwrap_or(false)
    }

    pub fn is_admin(&self) -> bool {
        self.role
            .as_deref()
            .map(|r| r.eq_ignore_ascii_case("admin"))
            .unwrap_or(false)
    }
}
