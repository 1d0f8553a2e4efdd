use reqwest::{Method, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Serialize};
use uuid::Uuid;

use crate::{
    config::Config,
    errors::{AppError, AppResult},
};

pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// Shared transport for all resource APIs: base URL, timeout, bearer auth and
/// status-to-error mapping.
#[derive(Clone, Debug)]
pub struct HttpClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpClient {
    pub fn new(config: &Config) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout())
            .build()
            .map_err(|e| AppError::InternalError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.normalized_base_url().to_string(),
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str, token: Option<&str>) -> (RequestBuilder, String) {
        let request_id = Uuid::new_v4().to_string();
        log::debug!("[{}] {} {}", request_id, method, path);

        let mut builder = self
            .client
            .request(method, self.url(path))
            .header(REQUEST_ID_HEADER, request_id.as_str())
            .header("accept", "application/json");
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }
        (builder, request_id)
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        token: Option<&str>,
    ) -> AppResult<T> {
        let (builder, request_id) = self.request(Method::GET, path, token);
        let response = Self::send(builder.query(query), &request_id).await?;
        Self::read_json(response, &request_id).await
    }

    pub async fn send_json<B, T>(
        &self,
        method: Method,
        path: &str,
        body: &B,
        token: Option<&str>,
    ) -> AppResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let (builder, request_id) = self.request(method, path, token);
        let response = Self::send(builder.json(body), &request_id).await?;
        Self::read_json(response, &request_id).await
    }

    /// Like `send_json` for endpoints that answer without a body.
    pub async fn send_no_content<B>(
        &self,
        method: Method,
        path: &str,
        body: &B,
        token: Option<&str>,
    ) -> AppResult<()>
    where
        B: Serialize + ?Sized,
    {
        let (builder, request_id) = self.request(method, path, token);
        Self::send(builder.json(body), &request_id).await?;
        Ok(())
    }

    async fn send(builder: RequestBuilder, request_id: &str) -> AppResult<Response> {
        let response = builder.send().await.map_err(|e| {
            log::warn!("[{}] request failed: {}", request_id, e);
            AppError::from(e)
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let err = AppError::from_status(status, &body);
        if status.is_server_error() {
            log::error!("[{}] backend returned {}: {}", request_id, status, err);
        } else {
            log::warn!("[{}] backend returned {}: {}", request_id, status, err);
        }
        Err(err)
    }

    async fn read_json<T: DeserializeOwned>(response: Response, request_id: &str) -> AppResult<T> {
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            log::error!("[{}] unexpected response body: {}", request_id, e);
            AppError::Serialization(format!("Unexpected response body: {}", e))
        })
    }
}

/// Builds a query string list, leaving out parameters that are not set.
pub fn query_params<'a>(params: &[(&'a str, Option<String>)]) -> Vec<(&'a str, String)> {
    params
        .iter()
        .filter_map(|(name, value)| value.clone().map(|v| (*name, v)))
        .collect()
}
