//! Client configuration: base URL, endpoint paths, cache TTL, timeout.
//!
//! Every field has a default matching the hosted Perps API, so an empty TOML
//! file (or no file at all) yields a working configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "API_KEY";

pub const DEFAULT_BASE_URL: &str = "https://perps-node-d942af6814fa.herokuapp.com";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid config file {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
}

/// Endpoint paths, relative to the base URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub latest_data: String,
    pub daily_data: String,
    pub symbol_aliases: String,
    pub symbol_registry: String,
    pub health: String,
    pub db_check: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            latest_data: "/v1/marketcompare/latest_data".into(),
            daily_data: "/v1/marketcompare/daily_data".into(),
            symbol_aliases: "/v1/marketcompare/symbol_aliases".into(),
            symbol_registry: "/v1/marketcompare/symbol_registry".into(),
            health: "/v1/health".into(),
            db_check: "/v1/dbcheck".into(),
        }
    }
}

/// Configuration for [`ApiClient`](super::ApiClient).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    /// Explicit key. When absent the client falls back to `API_KEY`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub cache_ttl_secs: u64,
    pub timeout_secs: u64,
    pub endpoints: Endpoints,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            api_key: None,
            cache_ttl_secs: 600,
            timeout_secs: 30,
            endpoints: Endpoints::default(),
        }
    }
}

impl ApiConfig {
    /// Load a configuration from a TOML file. Missing fields take defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Full URL for an endpoint path. Tolerates a trailing slash on the base.
    pub fn url(&self, endpoint: &str) -> String {
        format!("{}{endpoint}", self.base_url.trim_end_matches('/'))
    }
}

/// Resolve the API key: explicit value first, then the `API_KEY` environment
/// variable. Empty strings count as absent.
pub fn resolve_api_key(explicit: Option<String>) -> Option<String> {
    pick_api_key(explicit, std::env::var(API_KEY_ENV).ok())
}

fn pick_api_key(explicit: Option<String>, from_env: Option<String>) -> Option<String> {
    explicit
        .filter(|k| !k.trim().is_empty())
        .or_else(|| from_env.filter(|k| !k.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_hosted_api() {
        let config = ApiConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.cache_ttl(), Duration::from_secs(600));
        assert_eq!(config.endpoints.daily_data, "/v1/marketcompare/daily_data");
        assert_eq!(config.api_key, None);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = ApiConfig::from_toml(
            r#"
base_url = "http://localhost:9000/"
cache_ttl_secs = 5

[endpoints]
latest_data = "/v2/latest"
"#,
        )
        .unwrap();

        assert_eq!(config.cache_ttl_secs, 5);
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.endpoints.latest_data, "/v2/latest");
        assert_eq!(config.endpoints.symbol_registry, "/v1/marketcompare/symbol_registry");
        assert_eq!(config.url("/v2/latest"), "http://localhost:9000/v2/latest");
    }

    #[test]
    fn empty_toml_is_default() {
        assert_eq!(ApiConfig::from_toml("").unwrap(), ApiConfig::default());
    }

    #[test]
    fn from_file_reports_missing_file() {
        let err = ApiConfig::from_file(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn api_key_precedence() {
        assert_eq!(
            pick_api_key(Some("cli".into()), Some("env".into())),
            Some("cli".into())
        );
        assert_eq!(pick_api_key(None, Some("env".into())), Some("env".into()));
        assert_eq!(
            pick_api_key(Some("  ".into()), Some("env".into())),
            Some("env".into())
        );
        assert_eq!(pick_api_key(None, Some(String::new())), None);
        assert_eq!(pick_api_key(None, None), None);
    }
}
