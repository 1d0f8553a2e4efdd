use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::domain::quiz_question::Question;

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category_id: Option<i64>,
    #[serde(default)]
    pub author_id: Option<i64>,
    #[serde(default = "default_public")]
    pub is_public: bool,
    #[serde(default)]
    pub time_limit: Option<String>, // "HH:MM:SS"
    #[serde(default)]
    pub question_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

fn default_public() -> bool {
    true
}

impl Quiz {
    pub fn time_limit_seconds(&self) -> Option<u64> {
        self.time_limit.as_deref().and_then(parse_time_limit)
    }

    pub fn is_authored_by(&self, user_id: i64) -> bool {
        self.author_id == Some(user_id)
    }
}

/// Parses an `HH:MM:SS` duration into seconds.
///
/// Anything that is not exactly three all-digit components yields `None`.
pub fn parse_time_limit(raw: &str) -> Option<u64> {
    let parts: Vec<&str> = raw.trim().split(':').collect();
    if parts.len() != 3 {
        return None;
    }

    let mut seconds: u64 = 0;
    for (part, unit) in parts.iter().zip([3600u64, 60, 1]) {
        if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let value: u64 = part.parse().ok()?;
        seconds = seconds.checked_add(value.checked_mul(unit)?)?;
    }
    Some(seconds)
}

/// Quiz metadata plus its ordered question list, fetched once per attempt.
#[derive(Clone, Debug, PartialEq)]
pub struct QuizContent {
    pub quiz: Quiz,
    pub questions: Vec<Question>,
}

impl QuizContent {
    pub fn new(quiz: Quiz, questions: Vec<Question>) -> Self {
        Self { quiz, questions }
    }

    pub fn time_limit_seconds(&self) -> Option<u64> {
        self.quiz.time_limit_seconds()
    }

    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    pub fn question_at(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }
}
