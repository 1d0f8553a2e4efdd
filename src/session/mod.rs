//! Timed quiz-attempt session: local state, persistence and the lifecycle
//! controller that reconciles it with the backend.

pub mod answers;
pub mod navigation;
pub mod persistence;
pub mod timer;
pub mod tracker;

pub use answers::{AnswerLedger, SelectedOption};
pub use navigation::{NavigationState, Progress};
pub use persistence::AttemptStore;
pub use timer::CountdownTimer;
pub use tracker::QuizSession;
