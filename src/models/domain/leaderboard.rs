use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Best score of one participant for a quiz.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    #[serde(default)]
    pub rank: Option<i64>,
    #[serde(default)]
    pub user_id: Option<i64>,
    pub username: String,
    pub best_score: f64,
    #[serde(default)]
    pub guest_session_id: Option<String>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl LeaderboardEntry {
    pub fn belongs_to(&self, user_id: Option<i64>, guest_session_id: Option<&str>) -> bool {
        match (user_id, guest_session_id) {
            (Some(uid), _) => self.user_id == Some(uid),
            (None, Some(guest)) => self.guest_session_id.as_deref() == Some(guest),
            (None, None) => false,
        }
    }
}

/// Position (1-based) of the caller's row, falling back to list order when the
/// server did not send explicit ranks.
pub fn find_own_rank(
    entries: &[LeaderboardEntry],
    user_id: Option<i64>,
    guest_session_id: Option<&str>,
) -> Option<i64> {
    entries
        .iter()
        .enumerate()
        .find(|(_, e)| e.belongs_to(user_id, guest_session_id))
        .map(|(i, e)| e.rank.unwrap_or(i as i64 + 1))
}
