use std::sync::Arc;

use crate::{
    api::{AttemptApi, HttpAttemptApi, HttpClient, HttpQuizApi, HttpUserApi, QuizApi, UserApi},
    auth::TokenStore,
    clock::Clock,
    config::Config,
    errors::AppResult,
    services::{AuthService, CatalogService, LeaderboardService, ProfileService, QuizAccessService},
    session::QuizSession,
    storage::{AccessKeyStore, FileStore, GuestCookieJar, KeyValueStore},
};

#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub catalog_service: Arc<CatalogService>,
    pub access_service: Arc<QuizAccessService>,
    pub leaderboard_service: Arc<LeaderboardService>,
    pub profile_service: Arc<ProfileService>,
    pub quiz_api: Arc<dyn QuizApi>,
    pub attempt_api: Arc<dyn AttemptApi>,
    pub store: Arc<dyn KeyValueStore>,
    pub clock: Clock,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config) -> AppResult<Self> {
        config.validate()?;
        let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::open(&config.store_path)?);
        let http = HttpClient::new(&config)?;

        Ok(Self::with_backends(
            config,
            store,
            Arc::new(HttpQuizApi::new(http.clone())),
            Arc::new(HttpAttemptApi::new(http.clone())),
            Arc::new(HttpUserApi::new(http)),
            Clock::System,
        ))
    }

    /// Wires services over arbitrary API and storage implementations.
    pub fn with_backends(
        config: Config,
        store: Arc<dyn KeyValueStore>,
        quiz_api: Arc<dyn QuizApi>,
        attempt_api: Arc<dyn AttemptApi>,
        user_api: Arc<dyn UserApi>,
        clock: Clock,
    ) -> Self {
        let cookies = GuestCookieJar::new(store.clone(), clock, config.guest_session_ttl_hours);

        let auth_service = Arc::new(AuthService::new(
            user_api.clone(),
            TokenStore::new(store.clone()),
            clock,
        ));
        let catalog_service = Arc::new(CatalogService::new(quiz_api.clone()));
        let access_service = Arc::new(QuizAccessService::new(
            quiz_api.clone(),
            AccessKeyStore::new(store.clone()),
        ));
        let leaderboard_service = Arc::new(LeaderboardService::new(quiz_api.clone(), cookies));
        let profile_service = Arc::new(ProfileService::new(user_api, attempt_api.clone()));

        Self {
            auth_service,
            catalog_service,
            access_service,
            leaderboard_service,
            profile_service,
            quiz_api,
            attempt_api,
            store,
            clock,
            config: Arc::new(config),
        }
    }

    /// Fresh tracker sharing this state's backends and storage.
    pub fn quiz_session(&self) -> QuizSession {
        QuizSession::new(
            self.attempt_api.clone(),
            self.quiz_api.clone(),
            self.store.clone(),
            self.clock,
            self.config.guest_session_ttl_hours,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        storage::MemoryStore,
        test_utils::fixtures::{fixed_clock, FakeBackend},
    };

    #[test]
    fn test_app_state_is_cloneable() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<AppState>();
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let mut config = Config::test_config();
        config.api_base_url = "ftp://example.com".to_string();

        assert!(AppState::new(config).is_err());
    }

    #[tokio::test]
    async fn test_sessions_share_storage() {
        let backend = Arc::new(FakeBackend::with_quiz(1, 2, None));
        let state = AppState::with_backends(
            Config::test_config(),
            Arc::new(MemoryStore::new()),
            backend.clone(),
            backend.clone(),
            backend,
            fixed_clock(),
        );

        let mut first = state.quiz_session();
        first.start(None, 1, None).await.unwrap();
        first.go_to_next();

        let mut second = state.quiz_session();
        assert!(second.restore(None, 1, None).await);
        assert_eq!(second.current_index(), 1);
    }
}
