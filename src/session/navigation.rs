use std::collections::BTreeSet;

use serde::Serialize;

use crate::models::domain::Question;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Progress {
    pub current: usize,
    pub total: usize,
    pub percentage: f64,
}

/// Current question index and the set of questions the user has moved away from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationState {
    current_index: usize,
    visited: BTreeSet<i64>,
}

impl NavigationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at(index: usize) -> Self {
        Self {
            current_index: index,
            visited: BTreeSet::new(),
        }
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn visited(&self) -> &BTreeSet<i64> {
        &self.visited
    }

    pub fn is_visited(&self, question_id: i64) -> bool {
        self.visited.contains(&question_id)
    }

    fn mark_current_visited(&mut self, questions: &[Question]) {
        if let Some(question) = questions.get(self.current_index) {
            self.visited.insert(question.id);
        }
    }

    /// Returns whether the index moved.
    pub fn go_to_next(&mut self, questions: &[Question]) -> bool {
        if self.current_index + 1 >= questions.len() {
            return false;
        }
        self.mark_current_visited(questions);
        self.current_index += 1;
        true
    }

    pub fn go_to_previous(&mut self, questions: &[Question]) -> bool {
        if self.current_index == 0 || questions.is_empty() {
            return false;
        }
        self.mark_current_visited(questions);
        self.current_index -= 1;
        true
    }

    /// The question being left is marked visited even when `index` is out of range.
    pub fn go_to_question(&mut self, index: i64, questions: &[Question]) -> bool {
        self.mark_current_visited(questions);
        match usize::try_from(index) {
            Ok(i) if i < questions.len() => {
                self.current_index = i;
                true
            }
            _ => false,
        }
    }

    pub fn progress(&self, total: usize) -> Progress {
        let current = self.current_index + 1;
        let percentage = if total > 0 {
            100.0 * current as f64 / total as f64
        } else {
            0.0
        };
        Progress {
            current,
            total,
            percentage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::fixtures::sample_questions;

    #[test]
    fn next_marks_the_question_being_left() {
        let questions = sample_questions(3);
        let mut nav = NavigationState::new();

        assert!(nav.go_to_next(&questions));
        assert_eq!(nav.current_index(), 1);
        assert!(nav.is_visited(questions[0].id));
        assert!(!nav.is_visited(questions[1].id));
    }

    #[test]
    fn next_stops_at_last_question() {
        let questions = sample_questions(2);
        let mut nav = NavigationState::at(1);

        assert!(!nav.go_to_next(&questions));
        assert_eq!(nav.current_index(), 1);
        assert!(nav.visited().is_empty());
    }

    #[test]
    fn previous_marks_current_and_stops_at_zero() {
        let questions = sample_questions(3);
        let mut nav = NavigationState::at(2);

        assert!(nav.go_to_previous(&questions));
        assert_eq!(nav.current_index(), 1);
        assert!(nav.is_visited(questions[2].id));

        let mut first = NavigationState::new();
        assert!(!first.go_to_previous(&questions));
        assert_eq!(first.current_index(), 0);
    }

    #[test]
    fn go_to_question_rejects_out_of_range_indices() {
        let questions = sample_questions(3);
        let mut nav = NavigationState::at(1);

        assert!(!nav.go_to_question(3, &questions));
        assert!(!nav.go_to_question(-1, &questions));
        assert_eq!(nav.current_index(), 1);
        assert!(nav.is_visited(questions[1].id));

        assert!(nav.go_to_question(0, &questions));
        assert_eq!(nav.current_index(), 0);
    }

    #[test]
    fn progress_reports_one_based_position() {
        let nav = NavigationState::at(1);
        let progress = nav.progress(4);

        assert_eq!(progress.current, 2);
        assert_eq!(progress.total, 4);
        assert_eq!(progress.percentage, 50.0);

        assert_eq!(NavigationState::new().progress(0).percentage, 0.0);
    }
}
