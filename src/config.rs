use std::{env, time::Duration};

use reqwest::header::HeaderValue;
use thiserror::Error;

use crate::dashboard::REFRESH_INTERVAL;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:5000";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub port: u16,
    /// Server exposing `/api/heatmap-data`, `/api/scroll-data`,
    /// `/api/suggestions` and `/api/export-data`.
    pub api_base_url: String,
    pub refresh_interval: Duration,
    /// Fallback `Cookie` for upstream calls when the browser sends none.
    pub api_cookie: Option<String>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            refresh_interval: REFRESH_INTERVAL,
            api_cookie: None,
        }
    }
}

impl DashboardConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = match lookup("PORT") {
            Some(value) => parse("PORT", value)?,
            None => defaults.port,
        };
        let api_base_url = lookup("UX_API_BASE_URL")
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or(defaults.api_base_url);
        let refresh_interval = match lookup("UX_REFRESH_SECS") {
            Some(value) => Duration::from_secs(parse("UX_REFRESH_SECS", value)?),
            None => defaults.refresh_interval,
        };

        let api_cookie = match lookup("UX_API_COOKIE").filter(|value| !value.trim().is_empty()) {
            Some(value) if HeaderValue::from_str(value.trim()).is_err() => {
                return Err(ConfigError::Invalid {
                    name: "UX_API_COOKIE",
                    value,
                });
            }
            value => value.map(|value| value.trim().to_string()),
        };

        Ok(Self {
            port,
            api_base_url,
            refresh_interval,
            api_cookie,
        })
    }
}

fn parse<T: std::str::FromStr>(name: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid { name, value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = DashboardConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.api_base_url, "http://127.0.0.1:5000");
        assert_eq!(config.refresh_interval, Duration::from_secs(30));
        assert_eq!(config.api_cookie, None);
    }

    #[test]
    fn api_cookie_is_read_and_validated() {
        let config =
            DashboardConfig::from_lookup(lookup(&[("UX_API_COOKIE", " session=abc ")])).unwrap();
        assert_eq!(config.api_cookie.as_deref(), Some("session=abc"));

        let err = DashboardConfig::from_lookup(lookup(&[("UX_API_COOKIE", "a\nb")])).unwrap_err();
        assert!(err.to_string().starts_with("invalid UX_API_COOKIE"));
    }

    #[test]
    fn overrides_are_read() {
        let config = DashboardConfig::from_lookup(lookup(&[
            ("PORT", "9000"),
            ("UX_API_BASE_URL", "http://analytics.internal"),
            ("UX_REFRESH_SECS", "5"),
        ]))
        .unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.api_base_url, "http://analytics.internal");
        assert_eq!(config.refresh_interval, Duration::from_secs(5));
    }

    #[test]
    fn bad_port_is_rejected() {
        let err = DashboardConfig::from_lookup(lookup(&[("PORT", "eighty")])).unwrap_err();
        assert_eq!(err.to_string(), r#"invalid PORT: "eighty""#);
    }
}
