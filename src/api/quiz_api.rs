use async_trait::async_trait;

use crate::{
    api::http::{query_params, HttpClient},
    errors::AppResult,
    models::domain::{Category, LeaderboardEntry, Question, Quiz},
};

#[async_trait]
pub trait QuizApi: Send + Sync {
    async fn list_categories(&self) -> AppResult<Vec<Category>>;
    async fn list_quizzes(
        &self,
        category_id: Option<i64>,
        search: Option<&str>,
    ) -> AppResult<Vec<Quiz>>;
    async fn get_quiz(
        &self,
        quiz_id: i64,
        token: Option<&str>,
        access_key: Option<&str>,
    ) -> AppResult<Quiz>;
    async fn get_questions(&self, quiz_id: i64, access_key: Option<&str>)
        -> AppResult<Vec<Question>>;
    async fn get_leaderboard(
        &self,
        quiz_id: i64,
        token: Option<&str>,
        guest_session_id: Option<&str>,
    ) -> AppResult<Vec<LeaderboardEntry>>;
}

pub struct HttpQuizApi {
    http: HttpClient,
}

impl HttpQuizApi {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }
}

#[async_trait]
impl QuizApi for HttpQuizApi {
    async fn list_categories(&self) -> AppResult<Vec<Category>> {
        self.http.get_json("/categories", &[], None).await
    }

    async fn list_quizzes(
        &self,
        category_id: Option<i64>,
        search: Option<&str>,
    ) -> AppResult<Vec<Quiz>> {
        let query = query_params(&[
            ("categoryId", category_id.map(|id| id.to_string())),
            ("search", search.map(|s| s.to_string())),
        ]);
        self.http.get_json("/quizzes", &query, None).await
    }

    async fn get_quiz(
        &self,
        quiz_id: i64,
        token: Option<&str>,
        access_key: Option<&str>,
    ) -> AppResult<Quiz> {
        let query = query_params(&[("accessKey", access_key.map(|k| k.to_string()))]);
        self.http
            .get_json(&format!("/quizzes/{}", quiz_id), &query, token)
            .await
    }

    async fn get_questions(
        &self,
        quiz_id: i64,
        access_key: Option<&str>,
    ) -> AppResult<Vec<Question>> {
        let query = query_params(&[("accessKey", access_key.map(|k| k.to_string()))]);
        self.http
            .get_json(&format!("/quizzes/{}/questions", quiz_id), &query, None)
            .await
    }

    async fn get_leaderboard(
        &self,
        quiz_id: i64,
        token: Option<&str>,
        guest_session_id: Option<&str>,
    ) -> AppResult<Vec<LeaderboardEntry>> {
        let query = query_params(&[("guestSessionId", guest_session_id.map(|g| g.to_string()))]);
        self.http
            .get_json(&format!("/quizzes/{}/leaderboard", quiz_id), &query, token)
            .await
    }
}
