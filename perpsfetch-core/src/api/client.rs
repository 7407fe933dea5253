//! Perps API client.
//!
//! Wraps authenticated GETs with a TTL response cache and exposes one typed
//! method per endpoint. The bulk daily-data method checks whether a single
//! request returned the complete set and falls back to batched pagination
//! when it did not.

use super::cache::ResponseCache;
use super::config::{resolve_api_key, ApiConfig};
use super::error::{ApiError, ApiResponse};
use super::query::{QueryParams, SymbolFilter};
use super::transport::{HttpTransport, Transport};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, info};

/// Largest page the daily-data endpoint serves per request.
pub const MAX_BATCH_SIZE: usize = 1000;

/// Metadata attached to a historical result assembled from several pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationMeta {
    /// Requested record cap.
    pub limit: usize,
    /// Offset the pagination started from (always 0).
    pub offset: usize,
    /// Records retrieved before truncation to `limit`.
    pub total_fetched: usize,
    pub paginated: bool,
}

/// Result of a bulk daily-data fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoricalData {
    pub response: ApiResponse,
    /// `Some` only when the paginated path was used.
    pub pagination: Option<PaginationMeta>,
}

impl HistoricalData {
    pub fn records(&self) -> &[Value] {
        &self.response.data
    }

    pub fn is_paginated(&self) -> bool {
        self.pagination.is_some()
    }
}

/// Client for the Perps API.
pub struct ApiClient {
    config: ApiConfig,
    api_key: String,
    transport: Box<dyn Transport>,
    cache: Mutex<ResponseCache>,
}

impl ApiClient {
    /// Build a client with an HTTP transport.
    ///
    /// The key comes from `config.api_key`, falling back to `API_KEY`, and
    /// is empty if neither is set (requests will then fail with 401).
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        let api_key = resolve_api_key(config.api_key.clone()).unwrap_or_default();
        let transport = HttpTransport::new(config.timeout())?;
        Ok(Self::with_transport(config, api_key, Box::new(transport)))
    }

    /// Build a client on an arbitrary transport.
    pub fn with_transport(
        config: ApiConfig,
        api_key: impl Into<String>,
        transport: Box<dyn Transport>,
    ) -> Self {
        let cache = ResponseCache::new(config.cache_ttl());
        Self {
            config,
            api_key: api_key.into(),
            transport,
            cache: Mutex::new(cache),
        }
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Number of responses held in the cache (fresh or stale).
    pub fn cached_entries(&self) -> usize {
        self.cache().len()
    }

    fn cache(&self) -> MutexGuard<'_, ResponseCache> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Cached GET. A fresh cache entry is returned without touching the network.
    pub fn get(&self, endpoint: &str, params: &QueryParams) -> Result<ApiResponse, ApiError> {
        let key = params.cache_key(endpoint);

        if let Some(hit) = self.cache().get(&key) {
            debug!(%key, "cache hit");
            return Ok(hit);
        }

        let url = self.config.url(endpoint);
        debug!(%url, ?params, "GET");
        let response = self.transport.get(&url, params, &self.api_key)?;

        self.cache().insert(key, response.clone());
        Ok(response)
    }

    /// Current market snapshot.
    pub fn latest_data(
        &self,
        limit: usize,
        filter: &SymbolFilter,
    ) -> Result<ApiResponse, ApiError> {
        let params = QueryParams::new().with("limit", limit).apply_filter(filter);
        self.get(&self.config.endpoints.latest_data, &params)
    }

    fn daily_data_page(
        &self,
        limit: usize,
        offset: Option<usize>,
        filter: &SymbolFilter,
    ) -> Result<ApiResponse, ApiError> {
        let mut params = QueryParams::new().with("all", 1).with("limit", limit);
        if let Some(offset) = offset {
            params.set("offset", offset);
        }
        let params = params.apply_filter(filter);
        self.get(&self.config.endpoints.daily_data, &params)
    }

    /// All daily history up to `limit` records.
    ///
    /// One request for `limit` records; if exactly `limit` come back, a
    /// one-record probe at `offset = limit` decides whether more exist. If so
    /// the set is re-read in pages of at most [`MAX_BATCH_SIZE`].
    pub fn all_daily_data(
        &self,
        limit: usize,
        filter: &SymbolFilter,
    ) -> Result<HistoricalData, ApiError> {
        if limit == 0 {
            return Ok(HistoricalData {
                response: ApiResponse::default(),
                pagination: None,
            });
        }

        let first = self.daily_data_page(limit, None, filter)?;
        if first.len() < limit {
            return Ok(HistoricalData {
                response: first,
                pagination: None,
            });
        }

        let probe = self.daily_data_page(1, Some(limit), filter)?;
        if probe.is_empty() {
            return Ok(HistoricalData {
                response: first,
                pagination: None,
            });
        }

        info!(limit, "daily data exceeds a single request, paginating");
        self.daily_data_paginated(limit, filter)
    }

    fn daily_data_paginated(
        &self,
        limit: usize,
        filter: &SymbolFilter,
    ) -> Result<HistoricalData, ApiError> {
        let mut records: Vec<Value> = Vec::new();
        let mut offset = 0;

        while records.len() < limit {
            let batch_size = MAX_BATCH_SIZE.min(limit - records.len());
            let batch = self.daily_data_page(batch_size, Some(offset), filter)?;
            let received = batch.len();

            records.extend(batch.data);
            offset += received;
            debug!(offset, received, "daily data page");

            // Short page: end of data
            if received < batch_size {
                break;
            }
        }

        let total_fetched = records.len();
        records.truncate(limit);

        Ok(HistoricalData {
            response: ApiResponse::from_records(records),
            pagination: Some(PaginationMeta {
                limit,
                offset: 0,
                total_fetched,
                paginated: true,
            }),
        })
    }

    /// Raw → canonical symbol mappings.
    pub fn symbol_aliases(
        &self,
        limit: usize,
        filter: &SymbolFilter,
    ) -> Result<ApiResponse, ApiError> {
        let params = QueryParams::new().with("limit", limit).apply_filter(filter);
        self.get(&self.config.endpoints.symbol_aliases, &params)
    }

    /// Known symbols per exchange.
    pub fn symbol_registry(
        &self,
        limit: usize,
        filter: &SymbolFilter,
    ) -> Result<ApiResponse, ApiError> {
        let params = QueryParams::new().with("limit", limit).apply_filter(filter);
        self.get(&self.config.endpoints.symbol_registry, &params)
    }

    pub fn health_check(&self) -> Result<ApiResponse, ApiError> {
        self.get(&self.config.endpoints.health, &QueryParams::new())
    }

    pub fn db_check(&self) -> Result<ApiResponse, ApiError> {
        self.get(&self.config.endpoints.db_check, &QueryParams::new())
    }
}
