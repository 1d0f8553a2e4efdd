use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Attempt descriptor as returned by the backend.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Attempt {
    pub id: i64,
    pub quiz_id: i64,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    // Anchor for the time limit, not the actual completion time.
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub guest_session_id: Option<String>,
}

/// Locally persisted descriptor of the attempt in progress.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptSession {
    pub id: i64,
    pub quiz_id: i64,
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub guest_session_id: Option<String>,
}

impl AttemptSession {
    /// `started_at` is the local wall-clock capture, independent of server time.
    pub fn from_attempt(attempt: &Attempt, started_at: DateTime<Utc>) -> Self {
        Self {
            id: attempt.id,
            quiz_id: attempt.quiz_id,
            started_at,
            completed_at: attempt.completed_at,
            guest_session_id: attempt.guest_session_id.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerSubmission {
    pub question_id: i64,
    pub selected_option_ids: Vec<i64>,
}

/// Result summary returned when an attempt is finished, and by attempt history.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptResult {
    #[serde(alias = "id")]
    pub attempt_id: i64,
    pub quiz_id: i64,
    #[serde(default)]
    pub quiz_title: Option<String>,
    pub score: f64,
    #[serde(default)]
    pub correct_answers: i64,
    #[serde(default)]
    pub total_questions: i64,
    #[serde(default)]
    pub passed: Option<bool>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub answers: Vec<QuestionResult>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionResult {
    pub question_id: i64,
    #[serde(default)]
    pub selected_option_ids: Vec<i64>,
    pub is_correct: bool,
}

impl AttemptResult {
    pub fn percentage(&self) -> f64 {
        if self.total_questions > 0 {
            100.0 * self.correct_answers as f64 / self.total_questions as f64
        } else {
            0.0
        }
    }
}
