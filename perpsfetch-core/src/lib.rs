//! perpsfetch core: Perps API client, symbol alias resolution, fetch pipeline.
//!
//! This crate contains everything the CLI needs:
//! - Authenticated GET client with a TTL response cache
//! - Completeness check and pagination for the bulk daily-data endpoint
//! - Symbol alias table (raw exchange ticker → canonical symbol)
//! - Sequential fetch of the four datasets into JSON files

pub mod api;
pub mod fetch;
pub mod symbols;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use api::{ApiClient, ApiConfig, ApiError, ApiResponse, SymbolFilter};
pub use fetch::{FetchOptions, FetchStatus};
pub use symbols::{SharedResolver, SymbolResolver};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: the client and resolver can be shared across threads.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<ApiClient>();
        require_sync::<ApiClient>();
        require_send::<ApiResponse>();
        require_sync::<ApiResponse>();
        require_send::<SymbolResolver>();
        require_sync::<SymbolResolver>();
        require_send::<SharedResolver>();
        require_sync::<SharedResolver>();
        require_send::<ApiError>();
        require_sync::<ApiError>();
    }
}
