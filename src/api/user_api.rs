use async_trait::async_trait;
use reqwest::Method;

use crate::{
    api::http::HttpClient,
    errors::AppResult,
    models::{
        domain::UserProfile,
        dto::{
            request::{ChangePasswordRequest, LoginRequest, RegisterRequest, UpdateProfileRequest},
            response::AuthResponse,
        },
    },
};

#[async_trait]
pub trait UserApi: Send + Sync {
    async fn login(&self, request: &LoginRequest) -> AppResult<AuthResponse>;
    async fn register(&self, request: &RegisterRequest) -> AppResult<AuthResponse>;
    async fn get_profile(&self, token: &str) -> AppResult<UserProfile>;
    async fn update_profile(
        &self,
        token: &str,
        request: &UpdateProfileRequest,
    ) -> AppResult<UserProfile>;
    async fn change_password(&self, token: &str, request: &ChangePasswordRequest)
        -> AppResult<()>;
}

pub struct HttpUserApi {
    http: HttpClient,
}

impl HttpUserApi {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }
}

#[async_trait]
impl UserApi for HttpUserApi {
    async fn login(&self, request: &LoginRequest) -> AppResult<AuthResponse> {
        self.http
            .send_json(Method::POST, "/auth/login", request, None)
            .await
    }

    async fn register(&self, request: &RegisterRequest) -> AppResult<AuthResponse> {
        self.http
            .send_json(Method::POST, "/auth/register", request, None)
            .await
    }

    async fn get_profile(&self, token: &str) -> AppResult<UserProfile> {
        self.http.get_json("/users/me", &[], Some(token)).await
    }

    async fn update_profile(
        &self,
        token: &str,
        request: &UpdateProfileRequest,
    ) -> AppResult<UserProfile> {
        self.http
            .send_json(Method::PUT, "/users/me", request, Some(token))
            .await
    }

    async fn change_password(
        &self,
        token: &str,
        request: &ChangePasswordRequest,
    ) -> AppResult<()> {
        self.http
            .send_no_content(Method::PUT, "/users/me/password", request, Some(token))
            .await
    }
}
