//! Alias table and symbol normalization.
//!
//! The table maps every raw symbol to exactly one canonical symbol, and keeps
//! the reverse direction (canonical → raw aliases in load order). Resolution
//! falls back to identity for anything not in the table, so an empty table
//! is always safe to use.

use crate::api::{ApiClient, ApiConfig, ApiError, ApiResponse, SymbolFilter};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use tracing::{info, warn};

/// Number of alias rows requested when loading the table.
pub const DEFAULT_ALIAS_LIMIT: usize = 1000;

/// Quote currency appended to bare symbols (`BTC` → `BTC-USD`).
pub const DEFAULT_QUOTE_SUFFIX: &str = "-USD";

/// One row of the alias endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasEntry {
    pub symbol_raw: String,
    pub symbol_canonical: String,
}

impl AliasEntry {
    pub fn new(raw: impl Into<String>, canonical: impl Into<String>) -> Self {
        Self {
            symbol_raw: raw.into(),
            symbol_canonical: canonical.into(),
        }
    }

    /// Read an entry from an opaque record. Missing, non-string, or empty
    /// fields yield `None`.
    pub fn from_record(record: &Value) -> Option<Self> {
        let field = |name: &str| {
            record
                .get(name)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
        };
        Some(Self::new(field("symbol_raw")?, field("symbol_canonical")?))
    }
}

#[derive(Debug, Clone, Default)]
pub struct SymbolResolver {
    aliases: HashMap<String, String>,
    reverse: HashMap<String, Vec<String>>,
    /// Canonical symbols in first-seen order.
    canonical_order: Vec<String>,
    loaded: bool,
}

impl SymbolResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a loaded resolver directly from entries.
    pub fn from_entries(entries: impl IntoIterator<Item = AliasEntry>) -> Self {
        let mut resolver = Self::new();
        resolver.rebuild(entries);
        resolver.loaded = true;
        resolver
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Load the alias table from the API.
    ///
    /// No-op once loaded. With `client = None` a default client is built from
    /// `ApiConfig::default()` and the `API_KEY` environment variable. A
    /// failure is logged and leaves an empty, unloaded table, so resolution
    /// degrades to identity and a later call may retry.
    pub fn load_aliases(&mut self, client: Option<&ApiClient>) {
        if self.loaded {
            return;
        }

        let response = match client {
            Some(client) => fetch_aliases(client),
            None => ApiClient::new(ApiConfig::default()).and_then(|c| fetch_aliases(&c)),
        };

        match response {
            Ok(response) => {
                self.rebuild(response.data.iter().filter_map(AliasEntry::from_record));
                self.loaded = true;
                info!(
                    aliases = self.alias_count(),
                    canonical = self.canonical_order.len(),
                    "loaded symbol aliases"
                );
            }
            Err(e) => {
                warn!(error = %e, "failed to load symbol aliases, resolving symbols as-is");
                self.rebuild(std::iter::empty());
            }
        }
    }

    fn rebuild(&mut self, entries: impl IntoIterator<Item = AliasEntry>) {
        self.aliases.clear();
        self.reverse.clear();
        self.canonical_order.clear();

        for entry in entries {
            let AliasEntry {
                symbol_raw,
                symbol_canonical,
            } = entry;

            // A raw symbol maps to one canonical symbol: the latest entry wins.
            if let Some(previous) = self
                .aliases
                .insert(symbol_raw.clone(), symbol_canonical.clone())
            {
                if let Some(raws) = self.reverse.get_mut(&previous) {
                    raws.retain(|r| r != &symbol_raw);
                }
            }

            let raws = self
                .reverse
                .entry(symbol_canonical.clone())
                .or_insert_with(|| {
                    self.canonical_order.push(symbol_canonical.clone());
                    Vec::new()
                });
            raws.push(symbol_raw);
        }

        // Canonical symbols left with no aliases after reassignment
        let reverse = &self.reverse;
        self.canonical_order
            .retain(|c| reverse.get(c).is_some_and(|raws| !raws.is_empty()));
        self.reverse.retain(|_, raws| !raws.is_empty());
    }

    /// Canonical symbol for a known raw alias; anything else unchanged.
    pub fn resolve_symbol(&self, symbol: &str) -> String {
        if symbol.is_empty() {
            return String::new();
        }
        self.aliases
            .get(symbol)
            .cloned()
            .unwrap_or_else(|| symbol.to_string())
    }

    /// Trim, uppercase, append `-USD` when there is no `-`, then resolve.
    pub fn normalize_symbol(&self, symbol: &str) -> String {
        if symbol.is_empty() {
            return String::new();
        }

        let mut s = symbol.trim().to_uppercase();
        if !s.is_empty() && !s.contains('-') {
            s.push_str(DEFAULT_QUOTE_SUFFIX);
        }
        self.resolve_symbol(&s)
    }

    /// Raw aliases recorded for `canonical`, or `[canonical]` if none.
    pub fn get_aliases_for_symbol(&self, canonical: &str) -> Vec<String> {
        self.reverse
            .get(canonical)
            .cloned()
            .unwrap_or_else(|| vec![canonical.to_string()])
    }

    /// Canonical symbols in the order they first appeared.
    pub fn canonical_symbols(&self) -> &[String] {
        &self.canonical_order
    }

    /// Number of raw aliases in the table.
    pub fn alias_count(&self) -> usize {
        self.aliases.len()
    }
}

fn fetch_aliases(client: &ApiClient) -> Result<ApiResponse, ApiError> {
    client.symbol_aliases(DEFAULT_ALIAS_LIMIT, &SymbolFilter::none())
}
