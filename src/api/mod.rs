pub mod attempt_api;
pub mod http;
pub mod quiz_api;
pub mod user_api;

pub use attempt_api::{AttemptApi, HttpAttemptApi};
pub use http::HttpClient;
pub use quiz_api::{HttpQuizApi, QuizApi};
pub use user_api::{HttpUserApi, UserApi};
