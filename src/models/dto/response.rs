use serde::{Deserialize, Serialize};

use crate::models::domain::{LeaderboardEntry, Quiz, UserProfile};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthResponse {
    pub token: String,
    #[serde(default)]
    pub user: Option<UserProfile>,
}

/// Catalog row: a quiz together with the best score on its leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuizCard {
    pub quiz: Quiz,
    pub top_score: Option<f64>,
}

/// What the quiz-detail page may show for a quiz.
#[derive(Debug, Clone, PartialEq)]
pub enum QuizAccess {
    Open(Quiz),
    Locked { quiz_id: i64, title: String },
}

impl QuizAccess {
    pub fn is_open(&self) -> bool {
        matches!(self, QuizAccess::Open(_))
    }
}

/// Leaderboard rows plus the caller's own position, if they appear in it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardView {
    pub quiz_id: i64,
    pub entries: Vec<LeaderboardEntry>,
    pub own_rank: Option<i64>,
}
