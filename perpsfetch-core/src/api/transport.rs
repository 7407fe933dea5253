//! HTTP transport.
//!
//! The `Transport` trait is the seam between the client's caching and
//! pagination logic and the network, so tests can script responses without
//! a server. `HttpTransport` is the real implementation on a blocking
//! reqwest client; the underlying connection pool lives as long as the
//! transport and is released when it is dropped.

use super::error::{ApiError, ApiResponse};
use super::query::QueryParams;
use std::time::Duration;

/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Performs one authenticated GET and decodes the response envelope.
pub trait Transport: Send + Sync {
    fn get(&self, url: &str, params: &QueryParams, api_key: &str)
        -> Result<ApiResponse, ApiError>;
}

/// Blocking reqwest transport.
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, ApiError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("perpsfetch/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn get(
        &self,
        url: &str,
        params: &QueryParams,
        api_key: &str,
    ) -> Result<ApiResponse, ApiError> {
        let resp = self
            .client
            .get(url)
            .query(&params.pairs())
            .header(API_KEY_HEADER, api_key)
            .send()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        ApiError::check_status(resp.status().as_u16())?;

        let body = resp
            .text()
            .map_err(|e| ApiError::Network(format!("failed to read body: {e}")))?;
        let value: serde_json::Value =
            serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))?;

        ApiResponse::from_value(value)
    }
}
