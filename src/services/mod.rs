pub mod auth_service;
pub mod catalog_service;
pub mod leaderboard_service;
pub mod profile_service;
pub mod quiz_access_service;

pub use auth_service::AuthService;
pub use catalog_service::CatalogService;
pub use leaderboard_service::LeaderboardService;
pub use profile_service::ProfileService;
pub use quiz_access_service::QuizAccessService;
