use async_trait::async_trait;
use reqwest::Method;

use crate::{
    api::http::HttpClient,
    errors::AppResult,
    models::{
        domain::{AnswerSubmission, Attempt, AttemptResult},
        dto::request::{CreateAttemptRequest, FinishAttemptRequest},
    },
};

#[async_trait]
pub trait AttemptApi: Send + Sync {
    async fn create_attempt(
        &self,
        token: Option<&str>,
        quiz_id: i64,
        access_key: Option<&str>,
    ) -> AppResult<Attempt>;
    async fn get_attempt(&self, attempt_id: i64, token: Option<&str>) -> AppResult<Attempt>;
    async fn finish_attempt(
        &self,
        token: Option<&str>,
        attempt_id: i64,
        answers: &[AnswerSubmission],
    ) -> AppResult<AttemptResult>;
    async fn list_my_attempts(&self, token: &str) -> AppResult<Vec<AttemptResult>>;
}

pub struct HttpAttemptApi {
    http: HttpClient,
}

impl HttpAttemptApi {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }
}

#[async_trait]
impl AttemptApi for HttpAttemptApi {
    async fn create_attempt(
        &self,
        token: Option<&str>,
        quiz_id: i64,
        access_key: Option<&str>,
    ) -> AppResult<Attempt> {
        let body = CreateAttemptRequest {
            quiz_id,
            access_key: access_key.map(|k| k.to_string()),
        };
        self.http
            .send_json(Method::POST, "/attempts", &body, token)
            .await
    }

    async fn get_attempt(&self, attempt_id: i64, token: Option<&str>) -> AppResult<Attempt> {
        self.http
            .get_json(&format!("/attempts/{}", attempt_id), &[], token)
            .await
    }

    async fn finish_attempt(
        &self,
        token: Option<&str>,
        attempt_id: i64,
        answers: &[AnswerSubmission],
    ) -> AppResult<AttemptResult> {
        let body = FinishAttemptRequest {
            answers: answers.to_vec(),
        };
        self.http
            .send_json(
                Method::POST,
                &format!("/attempts/{}/finish", attempt_id),
                &body,
                token,
            )
            .await
    }

    async fn list_my_attempts(&self, token: &str) -> AppResult<Vec<AttemptResult>> {
        self.http
            .get_json("/users/me/attempts", &[], Some(token))
            .await
    }
}
