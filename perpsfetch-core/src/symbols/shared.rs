//! Shared, lazily loaded resolver handle.
//!
//! Clones point at the same table. The first `get_or_load` fetches aliases;
//! every later call on any clone reuses that table without another request.

use super::resolver::SymbolResolver;
use crate::api::ApiClient;
use std::sync::{Arc, OnceLock};

#[derive(Debug, Clone, Default)]
pub struct SharedResolver {
    inner: Arc<OnceLock<SymbolResolver>>,
}

impl SharedResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an already-built resolver.
    pub fn from_resolver(resolver: SymbolResolver) -> Self {
        let shared = Self::new();
        let _ = shared.inner.set(resolver);
        shared
    }

    /// The shared resolver, loading aliases on first use.
    ///
    /// A failed first load still initializes the handle (with an empty
    /// table); it is not retried for the lifetime of the handle.
    pub fn get_or_load(&self, client: Option<&ApiClient>) -> &SymbolResolver {
        self.inner.get_or_init(|| {
            let mut resolver = SymbolResolver::new();
            resolver.load_aliases(client);
            resolver
        })
    }

    /// The resolver, if it has been initialized.
    pub fn get(&self) -> Option<&SymbolResolver> {
        self.inner.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiConfig, ApiError, ApiResponse};
    use crate::symbols::AliasEntry;
    use crate::testing::FakeApi;
    use serde_json::json;

    #[test]
    fn clones_share_one_load() {
        let api = FakeApi::new();
        api.respond(
            "/v1/marketcompare/symbol_aliases",
            ApiResponse::from_records(vec![
                json!({"symbol_raw": "XBT-USD", "symbol_canonical": "BTC-USD"}),
            ]),
        );
        let client = ApiClient::with_transport(ApiConfig::default(), "k", Box::new(api.clone()));

        let shared = SharedResolver::new();
        let other = shared.clone();
        assert!(other.get().is_none());

        assert_eq!(shared.get_or_load(Some(&client)).resolve_symbol("XBT-USD"), "BTC-USD");
        assert_eq!(other.get_or_load(Some(&client)).resolve_symbol("XBT-USD"), "BTC-USD");
        assert_eq!(api.call_count(), 1);
    }

    #[test]
    fn failed_first_load_is_kept() {
        let api = FakeApi::new();
        api.fail("/v1/marketcompare/symbol_aliases", ApiError::RateLimited);
        let client = ApiClient::with_transport(ApiConfig::default(), "k", Box::new(api.clone()));

        let shared = SharedResolver::new();
        assert_eq!(shared.get_or_load(Some(&client)).alias_count(), 0);
        let resolver = shared.get_or_load(Some(&client));

        assert_eq!(resolver.alias_count(), 0);
        assert!(!resolver.is_loaded());
        assert_eq!(resolver.resolve_symbol("XBT-USD"), "XBT-USD");
        assert_eq!(api.call_count(), 1);
    }

    #[test]
    fn prebuilt_resolver_skips_loading() {
        let shared = SharedResolver::from_resolver(SymbolResolver::from_entries([
            AliasEntry::new("XBT-USD", "BTC-USD"),
        ]));
        let api = FakeApi::new();
        let client = ApiClient::with_transport(ApiConfig::default(), "k", Box::new(api.clone()));

        assert_eq!(shared.get_or_load(Some(&client)).normalize_symbol("xbt"), "BTC-USD");
        assert_eq!(api.call_count(), 0);
    }
}
