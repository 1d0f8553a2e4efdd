use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::domain::{AnswerSubmission, Question};

/// One selected option as captured from the UI or a persisted answer map.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SelectedOption {
    Id(i64),
    Raw(String),
    Other(serde_json::Value),
}

impl SelectedOption {
    /// Integer id, if this selection is or parses as one.
    pub fn as_id(&self) -> Option<i64> {
        match self {
            SelectedOption::Id(id) => Some(*id),
            SelectedOption::Raw(raw) => raw.trim().parse().ok(),
            SelectedOption::Other(_) => None,
        }
    }
}

impl From<i64> for SelectedOption {
    fn from(id: i64) -> Self {
        SelectedOption::Id(id)
    }
}

impl From<&str> for SelectedOption {
    fn from(raw: &str) -> Self {
        SelectedOption::Raw(raw.to_string())
    }
}

impl From<String> for SelectedOption {
    fn from(raw: String) -> Self {
        SelectedOption::Raw(raw)
    }
}

/// Selected options per question id. Last write wins; selections are never merged.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerLedger {
    answers: BTreeMap<i64, Vec<SelectedOption>>,
}

impl AnswerLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn save(&mut self, question_id: i64, selected: Vec<SelectedOption>) {
        self.answers.insert(question_id, selected);
    }

    pub fn get(&self, question_id: i64) -> Option<&[SelectedOption]> {
        self.answers.get(&question_id).map(|s| s.as_slice())
    }

    /// Questions with at least one save, explicit empty selections included.
    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    /// Flattens the ledger into one submission per question, in question order.
    /// Unanswered questions submit an empty selection; non-numeric ids are dropped.
    pub fn to_submission(&self, questions: &[Question]) -> Vec<AnswerSubmission> {
        questions
            .iter()
            .map(|q| AnswerSubmission {
                question_id: q.id,
                selected_option_ids: self
                    .answers
                    .get(&q.id)
                    .map(|selected| selected.iter().filter_map(SelectedOption::as_id).collect())
                    .unwrap_or_default(),
            })
            .collect()
    }
}
