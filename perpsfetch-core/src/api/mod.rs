//! Perps API access: configuration, errors, query building, caching, transport.

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod query;
pub mod transport;

pub use cache::ResponseCache;
pub use client::{ApiClient, HistoricalData, PaginationMeta, MAX_BATCH_SIZE};
pub use config::{resolve_api_key, ApiConfig, ConfigError, Endpoints, API_KEY_ENV};
pub use error::{ApiError, ApiResponse};
pub use query::{QueryParams, SymbolFilter};
pub use transport::{HttpTransport, Transport};
