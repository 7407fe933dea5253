//! Fetch orchestrator: pulls the four datasets and writes each to a JSON file.
//!
//! Sequence: alias preload → latest → historical → aliases → registry. Each
//! dataset is written as soon as it arrives, so a failure part-way through
//! leaves the earlier files on disk while the run as a whole reports failure.

pub mod progress;

pub use progress::{FetchProgress, LogProgress, NoProgress};

use crate::api::{
    resolve_api_key, ApiClient, ApiConfig, ApiError, HttpTransport, SymbolFilter, Transport,
};
use crate::symbols::SharedResolver;
use serde_json::Value;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use thiserror::Error;
use tracing::{error, info};

/// Default output directory, relative to the working directory.
pub const DEFAULT_OUTPUT_DIR: &str = "data/api";

/// The four datasets written by a fetch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dataset {
    Latest,
    Historical,
    Aliases,
    Registry,
}

impl Dataset {
    /// All datasets, in fetch order.
    pub const ALL: [Dataset; 4] = [
        Dataset::Latest,
        Dataset::Historical,
        Dataset::Aliases,
        Dataset::Registry,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            Dataset::Latest => "latest_data.json",
            Dataset::Historical => "historical_data.json",
            Dataset::Aliases => "symbol_aliases.json",
            Dataset::Registry => "symbol_registry.json",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Dataset::Latest => "latest",
            Dataset::Historical => "historical",
            Dataset::Aliases => "symbol alias",
            Dataset::Registry => "symbol registry",
        }
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error(transparent)]
    Client(#[from] ApiError),

    #[error("{dataset} fetch failed: {source}")]
    Api {
        dataset: Dataset,
        #[source]
        source: ApiError,
    },

    #[error("failed to create output directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to encode {}: {source}", path.display())]
    Encode {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Outcome of a run, as seen by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStatus {
    Success,
    Failure,
}

impl FetchStatus {
    pub fn is_success(self) -> bool {
        self == FetchStatus::Success
    }

    pub fn code(self) -> u8 {
        match self {
            FetchStatus::Success => 0,
            FetchStatus::Failure => 1,
        }
    }
}

impl From<FetchStatus> for ExitCode {
    fn from(status: FetchStatus) -> Self {
        ExitCode::from(status.code())
    }
}

/// Where to write and how much to ask for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOptions {
    pub output_dir: PathBuf,
    pub latest_limit: usize,
    pub historical_limit: usize,
    pub alias_limit: usize,
    pub registry_limit: usize,
    /// Applied to every dataset request.
    pub filter: SymbolFilter,
}

impl FetchOptions {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            ..Self::default()
        }
    }
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            latest_limit: 1000,
            historical_limit: 10_000,
            alias_limit: 1000,
            registry_limit: 1000,
            filter: SymbolFilter::none(),
        }
    }
}

/// Summary of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchSummary {
    pub output_dir: PathBuf,
    /// Records written per dataset, in fetch order.
    pub written: Vec<(Dataset, usize)>,
    pub historical_paginated: bool,
    pub alias_count: usize,
}

impl FetchSummary {
    pub fn records(&self, dataset: Dataset) -> Option<usize> {
        self.written
            .iter()
            .find(|(d, _)| *d == dataset)
            .map(|(_, n)| *n)
    }
}

/// Fetch all four datasets into `opts.output_dir`.
///
/// The alias table is loaded into `resolver` first (failure there is not
/// fatal). Errors from any dataset fetch or write abort the run.
pub fn fetch_all(
    client: &ApiClient,
    resolver: &SharedResolver,
    opts: &FetchOptions,
    progress: &dyn FetchProgress,
) -> Result<FetchSummary, FetchError> {
    let dir = &opts.output_dir;
    fs::create_dir_all(dir).map_err(|source| FetchError::CreateDir {
        path: dir.clone(),
        source,
    })?;

    let alias_count = resolver.get_or_load(Some(client)).alias_count();

    let mut written = Vec::with_capacity(Dataset::ALL.len());
    let mut historical_paginated = false;

    for dataset in Dataset::ALL {
        progress.on_fetch(dataset);

        let api = |source: ApiError| FetchError::Api { dataset, source };
        let records = match dataset {
            Dataset::Latest => client
                .latest_data(opts.latest_limit, &opts.filter)
                .map_err(api)?
                .data,
            Dataset::Historical => {
                let hist = client
                    .all_daily_data(opts.historical_limit, &opts.filter)
                    .map_err(api)?;
                historical_paginated = hist.is_paginated();
                hist.response.data
            }
            Dataset::Aliases => client
                .symbol_aliases(opts.alias_limit, &opts.filter)
                .map_err(api)?
                .data,
            Dataset::Registry => client
                .symbol_registry(opts.registry_limit, &opts.filter)
                .map_err(api)?
                .data,
        };

        write_records(&dir.join(dataset.file_name()), &records)?;
        progress.on_saved(dataset, records.len());
        written.push((dataset, records.len()));
    }

    Ok(FetchSummary {
        output_dir: dir.clone(),
        written,
        historical_paginated,
        alias_count,
    })
}

/// Write records as a pretty-printed JSON array.
pub fn write_records(path: &Path, records: &[Value]) -> Result<(), FetchError> {
    let json = serde_json::to_string_pretty(records).map_err(|source| FetchError::Encode {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, json).map_err(|source| FetchError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Run a full fetch over HTTP.
///
/// The key is taken from `api_key`, then `config.api_key`, then `API_KEY`.
/// Never panics or returns an error: every failure is logged once and
/// reported as [`FetchStatus::Failure`].
pub fn run(
    api_key: Option<String>,
    config: &ApiConfig,
    opts: &FetchOptions,
    progress: &dyn FetchProgress,
) -> FetchStatus {
    let api_key = resolve_api_key(explicit_api_key(api_key, config));
    run_with_transport(
        api_key,
        config,
        || HttpTransport::new(config.timeout()),
        opts,
        progress,
    )
}

/// First non-blank of the argument and `config.api_key`.
fn explicit_api_key(api_key: Option<String>, config: &ApiConfig) -> Option<String> {
    let present = |k: &String| !k.trim().is_empty();
    api_key
        .filter(present)
        .or_else(|| config.api_key.clone().filter(present))
}

/// Run a full fetch on a caller-supplied transport.
///
/// `api_key` is used as given (no environment lookup). The transport is only
/// built once the key has been checked, so a missing key never reaches the
/// network.
pub fn run_with_transport<T, F>(
    api_key: Option<String>,
    config: &ApiConfig,
    make_transport: F,
    opts: &FetchOptions,
    progress: &dyn FetchProgress,
) -> FetchStatus
where
    T: Transport + 'static,
    F: FnOnce() -> Result<T, ApiError>,
{
    match try_run(api_key, config, make_transport, opts, progress) {
        Ok(summary) => {
            info!(
                dir = %summary.output_dir.display(),
                paginated = summary.historical_paginated,
                aliases = summary.alias_count,
                "fetched all data from API"
            );
            FetchStatus::Success
        }
        Err(e) => {
            error!("failed to fetch data from API: {e}");
            FetchStatus::Failure
        }
    }
}

fn try_run<T, F>(
    api_key: Option<String>,
    config: &ApiConfig,
    make_transport: F,
    opts: &FetchOptions,
    progress: &dyn FetchProgress,
) -> Result<FetchSummary, FetchError>
where
    T: Transport + 'static,
    F: FnOnce() -> Result<T, ApiError>,
{
    let api_key = api_key
        .filter(|k| !k.trim().is_empty())
        .ok_or(ApiError::CredentialMissing)?;
    let transport = make_transport()?;

    // Dropped at the end of this scope on every path, closing the session.
    let client = ApiClient::with_transport(config.clone(), api_key, Box::new(transport));
    let resolver = SharedResolver::new();

    fetch_all(&client, &resolver, opts, progress)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names_are_stable() {
        let names: Vec<&str> = Dataset::ALL.iter().map(|d| d.file_name()).collect();
        assert_eq!(
            names,
            vec![
                "latest_data.json",
                "historical_data.json",
                "symbol_aliases.json",
                "symbol_registry.json",
            ]
        );
    }

    #[test]
    fn default_options() {
        let opts = FetchOptions::default();
        assert_eq!(opts.output_dir, PathBuf::from("data/api"));
        assert_eq!(opts.latest_limit, 1000);
        assert_eq!(opts.historical_limit, 10_000);
        assert_eq!(opts.alias_limit, 1000);
        assert_eq!(opts.registry_limit, 1000);
    }

    #[test]
    fn status_codes() {
        assert_eq!(FetchStatus::Success.code(), 0);
        assert_eq!(FetchStatus::Failure.code(), 1);
        assert!(!FetchStatus::Failure.is_success());
    }

    #[test]
    fn blank_key_argument_falls_back_to_config() {
        let config = ApiConfig::default().with_api_key("from-config");
        assert_eq!(
            explicit_api_key(Some(String::new()), &config).as_deref(),
            Some("from-config")
        );
        assert_eq!(
            explicit_api_key(Some("  ".into()), &config).as_deref(),
            Some("from-config")
        );
        assert_eq!(
            explicit_api_key(Some("arg".into()), &config).as_deref(),
            Some("arg")
        );
        assert_eq!(explicit_api_key(Some(String::new()), &ApiConfig::default()), None);
    }

    #[test]
    fn api_error_names_the_dataset() {
        let err = FetchError::Api {
            dataset: Dataset::Registry,
            source: ApiError::RateLimited,
        };
        assert_eq!(
            err.to_string(),
            "symbol registry fetch failed: rate limit exceeded (HTTP 429)"
        );
    }
}
