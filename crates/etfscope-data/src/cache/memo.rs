//! In-memory memoization of price fetches.

use crate::series::TickerDataMap;
use crate::window::Window;
use std::collections::HashMap;

/// Canonical cache key: upper-cased, sorted, de-duplicated tickers plus the window.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FetchKey {
    tickers: Vec<String>,
    window: Window,
}

impl FetchKey {
    /// Canonicalise a fetch request into a key.
    pub fn new<S: AsRef<str>>(tickers: &[S], window: Window) -> Self {
        let mut tickers: Vec<String> = tickers
            .iter()
            .map(|t| t.as_ref().trim().to_uppercase())
            .filter(|t| !t.is_empty())
            .collect();
        tickers.sort();
        tickers.dedup();
        Self { tickers, window }
    }

    /// Tickers of the key, sorted.
    pub fn tickers(&self) -> &[String] {
        &self.tickers
    }

    /// Window of the key.
    pub const fn window(&self) -> &Window {
        &self.window
    }
}

/// Cache statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of stored results.
    pub entries: usize,
    /// Lookups answered from the cache.
    pub hits: usize,
    /// Lookups that found nothing.
    pub misses: usize,
}

/// Process-lifetime cache of fetch results. No eviction, no expiry.
#[derive(Debug, Default)]
pub struct FetchCache {
    entries: HashMap<FetchKey, TickerDataMap>,
    hits: usize,
    misses: usize,
}

impl FetchCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a stored result.
    pub fn get(&mut self, key: &FetchKey) -> Option<&TickerDataMap> {
        match self.entries.get(key) {
            Some(data) => {
                self.hits += 1;
                Some(data)
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    /// Store a result, replacing any previous one for the same key.
    pub fn put(&mut self, key: FetchKey, data: TickerDataMap) {
        self.entries.insert(key, data);
    }

    /// Whether a result is stored for `key`. Does not count as a lookup.
    pub fn contains(&self, key: &FetchKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Current statistics.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            hits: self.hits,
            misses: self.misses,
        }
    }
}
