pub mod category;
pub mod leaderboard;
pub mod quiz;
pub mod quiz_attempt;
pub mod quiz_question;
pub mod user;
pub use category::Category;
pub use leaderboard::LeaderboardEntry;
pub use quiz::{Quiz, QuizContent};
pub use quiz_attempt::{AnswerSubmission, Attempt, AttemptResult, AttemptSession};
pub use quiz_question::{Question, QuestionOption};
pub use user::UserProfile;
