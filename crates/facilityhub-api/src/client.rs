//! Shared HTTP client wrapper.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use facilityhub_core::config::api::ApiConfig;
use facilityhub_core::types::ApiEnvelope;
use facilityhub_core::{AppError, AppResult};

/// Thin wrapper around [`reqwest::Client`] holding the base URL and the
/// bearer token, decoding the standard response envelope.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    access_token: Option<String>,
    /// Page size for drained paged endpoints.
    pub page_size: u32,
}

impl ApiClient {
    /// Build a client from configuration.
    pub fn new(config: &ApiConfig) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| AppError::internal(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            access_token: config.access_token.clone(),
            page_size: config.page_size,
        })
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut builder = self.http.request(method, url);
        if let Some(token) = &self.access_token {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    /// GET a path and decode the envelope payload.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> AppResult<T> {
        debug!(path = %path, "GET");
        let envelope: ApiEnvelope<T> = self
            .request(reqwest::Method::GET, path)
            .send()
            .await?
            .json()
            .await?;
        envelope.into_result()
    }

    /// POST a JSON body and decode the envelope payload.
    pub async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> AppResult<T> {
        debug!(path = %path, "POST");
        let envelope: ApiEnvelope<T> = self
            .request(reqwest::Method::POST, path)
            .json(body)
            .send()
            .await?
            .json()
            .await?;
        envelope.into_result()
    }

    /// POST without a body, for ack-style endpoints whose success payload
    /// may be null.
    pub async fn post_ack(&self, path: &str) -> AppResult<()> {
        debug!(path = %path, "POST");
        let envelope: ApiEnvelope<serde_json::Value> = self
            .request(reqwest::Method::POST, path)
            .send()
            .await?
            .json()
            .await?;
        envelope.into_ack()
    }

    /// DELETE a path, for ack-style endpoints.
    pub async fn delete_ack(&self, path: &str) -> AppResult<()> {
        debug!(path = %path, "DELETE");
        let envelope: ApiEnvelope<serde_json::Value> = self
            .request(reqwest::Method::DELETE, path)
            .send()
            .await?
            .json()
            .await?;
        envelope.into_ack()
    }
}
