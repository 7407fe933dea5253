//! In-memory response cache with a fixed time-to-live.
//!
//! Entries are keyed by endpoint + sorted query parameters. An entry is
//! served while younger than the TTL; after that the next fetch overwrites
//! it. There is no other eviction, so the map only grows within one run.

use super::error::ApiResponse;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Default time-to-live: 10 minutes.
pub const DEFAULT_TTL: Duration = Duration::from_secs(600);

#[derive(Debug, Clone)]
struct CacheEntry {
    fetched_at: Instant,
    payload: ApiResponse,
}

/// TTL cache owned by a single client instance.
#[derive(Debug)]
pub struct ResponseCache {
    ttl: Duration,
    entries: HashMap<String, CacheEntry>,
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Return a clone of the cached payload if it is still fresh.
    pub fn get(&self, key: &str) -> Option<ApiResponse> {
        self.entries
            .get(key)
            .filter(|entry| entry.fetched_at.elapsed() < self.ttl)
            .map(|entry| entry.payload.clone())
    }

    /// Store (or overwrite) a payload, stamped with the current time.
    pub fn insert(&mut self, key: String, payload: ApiResponse) {
        self.entries.insert(
            key,
            CacheEntry {
                fetched_at: Instant::now(),
                payload,
            },
        );
    }

    /// Number of stored entries, fresh or stale.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}
