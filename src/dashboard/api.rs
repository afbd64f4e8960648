use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue, COOKIE},
    Client, StatusCode,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::models::{HeatmapData, ScrollData, SuggestionsResponse};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{path} returned {status}")]
    Status { path: &'static str, status: StatusCode },
}

/// Read-only analytics resources the dashboard renders.
#[async_trait]
pub trait AnalyticsApi: Send + Sync {
    async fn heatmap_data(&self) -> Result<HeatmapData, ApiError>;
    async fn scroll_data(&self) -> Result<ScrollData, ApiError>;
    async fn suggestions(&self) -> Result<SuggestionsResponse, ApiError>;
    async fn export_data(&self) -> Result<Value, ApiError>;
}

#[derive(Debug, Clone)]
pub struct HttpAnalyticsApi {
    client: Client,
    base_url: String,
    /// Sent as-is on every upstream call; the analytics server answers 401
    /// without an authenticated session.
    cookie: Option<HeaderValue>,
}

impl HttpAnalyticsApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client,
            base_url,
            cookie: None,
        }
    }

    pub fn with_cookie(mut self, cookie: HeaderValue) -> Self {
        self.cookie = Some(cookie);
        self
    }

    /// Copy that speaks for the browser behind `headers`: its `Cookie`
    /// header replaces the configured one when present.
    pub fn for_request(&self, headers: &HeaderMap) -> Self {
        match headers.get(COOKIE) {
            Some(cookie) => self.clone().with_cookie(cookie.clone()),
            None => self.clone(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &'static str) -> Result<T, ApiError> {
        let mut request = self.client.get(format!("{}{path}", self.base_url));
        if let Some(cookie) = &self.cookie {
            request = request.header(COOKIE, cookie.clone());
        }
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status { path, status });
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl AnalyticsApi for HttpAnalyticsApi {
    async fn heatmap_data(&self) -> Result<HeatmapData, ApiError> {
        self.get_json("/api/heatmap-data").await
    }

    async fn scroll_data(&self) -> Result<ScrollData, ApiError> {
        self.get_json("/api/scroll-data").await
    }

    async fn suggestions(&self) -> Result<SuggestionsResponse, ApiError> {
        self.get_json("/api/suggestions").await
    }

    async fn export_data(&self) -> Result<Value, ApiError> {
        self.get_json("/api/export-data").await
    }
}
