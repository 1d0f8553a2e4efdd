use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};

use crate::{
    api::QuizApi,
    auth::TokenDecoder,
    errors::AppResult,
    models::{domain::leaderboard::find_own_rank, dto::response::LeaderboardView},
    storage::GuestCookieJar,
};

pub struct LeaderboardService {
    quizzes: Arc<dyn QuizApi>,
    cookies: GuestCookieJar,
    decoder: TokenDecoder,
}

impl LeaderboardService {
    pub fn new(quizzes: Arc<dyn QuizApi>, cookies: GuestCookieJar) -> Self {
        Self {
            quizzes,
            cookies,
            decoder: TokenDecoder::new(),
        }
    }

    /// Logged-in callers are identified by their token, guests by the guest
    /// session cookie.
    pub async fn for_quiz(&self, quiz_id: i64, token: Option<&SecretString>) -> AppResult<LeaderboardView> {
        let token = token.map(|t| t.expose_secret());
        let guest = match token {
            Some(_) => None,
            None => self.cookies.get()?,
        };

        let entries = self
            .quizzes
            .get_leaderboard(quiz_id, token, guest.as_deref())
            .await?;

        let user_id = token
            .and_then(|t| self.decoder.decode(t).ok())
            .and_then(|claims| claims.user_id());
        let own_rank = find_own_rank(&entries, user_id, guest.as_deref());

        Ok(LeaderboardView {
            quiz_id,
            entries,
            own_rank,
        })
    }
}
