//! Query parameters and filters for API requests.

use std::collections::BTreeMap;
use url::form_urlencoded;

/// Query parameters for a GET request.
///
/// Stored sorted by name so the same set of parameters always produces the
/// same cache key and the same query string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(BTreeMap<String, String>);

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a parameter, replacing any previous value.
    pub fn set(&mut self, name: &str, value: impl ToString) -> &mut Self {
        self.0.insert(name.to_string(), value.to_string());
        self
    }

    /// Builder-style `set`.
    pub fn with(mut self, name: &str, value: impl ToString) -> Self {
        self.set(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parameters as `(name, value)` pairs in name order.
    pub fn pairs(&self) -> Vec<(&str, &str)> {
        self.0
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect()
    }

    /// Apply an exchange/symbol filter. Empty filter values are ignored.
    pub fn apply_filter(mut self, filter: &SymbolFilter) -> Self {
        if let Some(exchange) = filter.exchange.as_deref().filter(|e| !e.is_empty()) {
            self.set("exchange", exchange);
        }
        if let Some(symbol) = filter.symbol.as_deref().filter(|s| !s.is_empty()) {
            self.set("symbol", symbol);
        }
        self
    }

    /// Cache key: `{endpoint}:{query}` with names sorted and each pair
    /// form-urlencoded, so separators inside values cannot collide.
    pub fn cache_key(&self, endpoint: &str) -> String {
        let query = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(&self.0)
            .finish();
        format!("{endpoint}:{query}")
    }
}

/// Optional exchange and/or symbol restriction for a query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolFilter {
    pub exchange: Option<String>,
    pub symbol: Option<String>,
}

impl SymbolFilter {
    /// No filtering.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn exchange(exchange: impl Into<String>) -> Self {
        Self {
            exchange: Some(exchange.into()),
            symbol: None,
        }
    }

    pub fn symbol(symbol: impl Into<String>) -> Self {
        Self {
            exchange: None,
            symbol: Some(symbol.into()),
        }
    }

    pub fn and_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_key_is_order_independent() {
        let a = QueryParams::new().with("limit", 10).with("all", 1);
        let b = QueryParams::new().with("all", 1).with("limit", 10);
        assert_eq!(a.cache_key("/x"), b.cache_key("/x"));
        assert_eq!(a.cache_key("/x"), "/x:all=1&limit=10");
    }

    #[test]
    fn cache_key_distinguishes_endpoint_and_values() {
        let p = QueryParams::new().with("limit", 10);
        assert_ne!(p.cache_key("/a"), p.cache_key("/b"));
        assert_ne!(
            p.cache_key("/a"),
            QueryParams::new().with("limit", 11).cache_key("/a")
        );
    }

    #[test]
    fn cache_key_escapes_separators_in_values() {
        let a = QueryParams::new()
            .with("limit", 5)
            .with("exchange", "a&limit=10&symbol=b");
        let b = QueryParams::new()
            .with("limit", 10)
            .with("exchange", "a")
            .with("symbol", "b&limit=5");
        assert_ne!(a.cache_key("/x"), b.cache_key("/x"));
        assert_eq!(
            a.cache_key("/x"),
            "/x:exchange=a%26limit%3D10%26symbol%3Db&limit=5"
        );
    }

    #[test]
    fn empty_params_key() {
        assert_eq!(QueryParams::new().cache_key("/v1/health"), "/v1/health:");
    }

    #[test]
    fn filter_skips_missing_and_empty_values() {
        let filter = SymbolFilter {
            exchange: Some(String::new()),
            symbol: Some("ETH-USD".into()),
        };
        let params = QueryParams::new().with("limit", 5).apply_filter(&filter);
        assert_eq!(params.get("exchange"), None);
        assert_eq!(params.get("symbol"), Some("ETH-USD"));

        let params = QueryParams::new().apply_filter(&SymbolFilter::none());
        assert!(params.is_empty());
    }

    #[test]
    fn filter_builders() {
        let f = SymbolFilter::exchange("hyperliquid").and_symbol("BTC-USD");
        assert_eq!(f.exchange.as_deref(), Some("hyperliquid"));
        assert_eq!(f.symbol.as_deref(), Some("BTC-USD"));
    }
}
