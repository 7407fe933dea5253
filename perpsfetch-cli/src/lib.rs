//! Shared pieces of the `api-fetcher` and `orchestrate-api` binaries:
//! argument parsing, logging setup, and config resolution.

use anyhow::{Context, Result};
use clap::Parser;
use perpsfetch_core::api::ApiConfig;
use perpsfetch_core::fetch::{self, FetchOptions, FetchStatus, LogProgress, DEFAULT_OUTPUT_DIR};
use std::path::{Path, PathBuf};
use tracing::error;

#[derive(Debug, Parser)]
pub struct FetchArgs {
    /// API key for authentication. Falls back to the API_KEY environment variable.
    #[arg(long)]
    pub api_key: Option<String>,

    /// Output directory for API data.
    #[arg(long, default_value = DEFAULT_OUTPUT_DIR)]
    pub output_dir: PathBuf,

    /// Override the API base URL.
    #[arg(long)]
    pub base_url: Option<String>,

    /// TOML file with client settings (base URL, endpoints, TTL, timeout).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl FetchArgs {
    /// Client config: defaults, then the config file, then `--base-url`.
    pub fn api_config(&self) -> Result<ApiConfig> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => ApiConfig::default(),
        };
        if let Some(base_url) = &self.base_url {
            config.base_url = base_url.clone();
        }
        Ok(config)
    }

    pub fn fetch_options(&self) -> FetchOptions {
        FetchOptions::new(&self.output_dir)
    }

    /// Resolve config and run the fetch. Setup errors are logged and
    /// reported as failure like any other.
    pub fn run(&self) -> FetchStatus {
        let config = match self.api_config() {
            Ok(config) => config,
            Err(e) => {
                error!("{e:#}");
                return FetchStatus::Failure;
            }
        };

        fetch::run(
            self.api_key.clone(),
            &config,
            &self.fetch_options(),
            &LogProgress,
        )
    }
}

fn load_config(path: &Path) -> Result<ApiConfig> {
    ApiConfig::from_file(path)
        .with_context(|| format!("failed to load client config from {}", path.display()))
}

/// Install the global tracing subscriber. `RUST_LOG` overrides the default
/// `info` level.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|_err| eprintln!("Unable to set global default subscriber"));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> FetchArgs {
        FetchArgs::parse_from(std::iter::once("api-fetcher").chain(args.iter().copied()))
    }

    #[test]
    fn defaults() {
        let args = parse(&[]);
        assert_eq!(args.api_key, None);
        assert_eq!(args.output_dir, PathBuf::from("data/api"));
        assert_eq!(args.api_config().unwrap(), ApiConfig::default());
    }

    #[test]
    fn explicit_flags() {
        let args = parse(&[
            "--api-key",
            "k",
            "--output-dir",
            "/tmp/out",
            "--base-url",
            "http://localhost:8080",
        ]);
        assert_eq!(args.api_key.as_deref(), Some("k"));
        assert_eq!(args.fetch_options().output_dir, PathBuf::from("/tmp/out"));
        assert_eq!(args.api_config().unwrap().base_url, "http://localhost:8080");
    }

    #[test]
    fn base_url_flag_overrides_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("client.toml");
        std::fs::write(
            &path,
            "base_url = \"http://from-file\"\ncache_ttl_secs = 60\n",
        )
        .unwrap();

        let args = parse(&["--config", path.to_str().unwrap()]);
        let config = args.api_config().unwrap();
        assert_eq!(config.base_url, "http://from-file");
        assert_eq!(config.cache_ttl_secs, 60);

        let args = parse(&[
            "--config",
            path.to_str().unwrap(),
            "--base-url",
            "http://from-flag",
        ]);
        assert_eq!(args.api_config().unwrap().base_url, "http://from-flag");
    }

    #[test]
    fn bad_config_file_fails_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("client.toml");
        std::fs::write(&path, "cache_ttl_secs = \"soon\"").unwrap();

        let args = parse(&[
            "--api-key",
            "k",
            "--config",
            path.to_str().unwrap(),
            "--output-dir",
            dir.path().join("out").to_str().unwrap(),
        ]);
        assert!(args.api_config().is_err());
        assert_eq!(args.run(), FetchStatus::Failure);
        assert!(!dir.path().join("out").exists());
    }
}
