use crate::config::DashboardConfig;
use crate::dashboard::HttpAnalyticsApi;
use reqwest::header::HeaderValue;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<DashboardConfig>,
    pub api: HttpAnalyticsApi,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        let mut api = HttpAnalyticsApi::new(config.api_base_url.clone());
        if let Some(cookie) = config
            .api_cookie
            .as_deref()
            .and_then(|cookie| HeaderValue::from_str(cookie).ok())
        {
            api = api.with_cookie(cookie);
        }
        Self {
            config: Arc::new(config),
            api,
        }
    }
}
