use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::{clock::Clock, errors::AppResult, storage::kv::KeyValueStore};

pub const GUEST_SESSION_COOKIE: &str = "cookie:guestSessionId";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredCookie {
    value: String,
    expires_at: DateTime<Utc>,
}

/// Holds the guest correlation id handed out by the backend to anonymous users.
#[derive(Clone)]
pub struct GuestCookieJar {
    store: Arc<dyn KeyValueStore>,
    clock: Clock,
    ttl: Duration,
}

impl GuestCookieJar {
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Clock, ttl_hours: i64) -> Self {
        Self {
            store,
            clock,
            ttl: Duration::hours(ttl_hours),
        }
    }

    pub fn set(&self, guest_session_id: &str) -> AppResult<()> {
        let cookie = StoredCookie {
            value: guest_session_id.to_string(),
            expires_at: self.clock.now() + self.ttl,
        };
        self.store
            .set(GUEST_SESSION_COOKIE, &serde_json::to_string(&cookie)?)
    }

    /// Current guest id; expired or unreadable cookies are dropped and read as absent.
    pub fn get(&self) -> AppResult<Option<String>> {
        let Some(raw) = self.store.get(GUEST_SESSION_COOKIE)? else {
            return Ok(None);
        };

        match serde_json::from_str::<StoredCookie>(&raw) {
            Ok(cookie) if cookie.expires_at > self.clock.now() => Ok(Some(cookie.value)),
            Ok(_) => {
                log::debug!("Guest session cookie expired");
                self.clear()?;
                Ok(None)
            }
            Err(e) => {
                log::warn!("Discarding unreadable guest session cookie: {}", e);
                self.clear()?;
                Ok(None)
            }
        }
    }

    pub fn clear(&self) -> AppResult<()> {
        self.store.remove(GUEST_SESSION_COOKIE)
    }
}
