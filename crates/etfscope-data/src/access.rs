//! Memoized, per-ticker isolated price fetching.

use crate::cache::{CacheStats, FetchCache, FetchKey};
use crate::series::{TickerData, TickerDataMap};
use crate::source::QuoteSource;
use crate::window::Window;
use tracing::{debug, warn};

/// Fetches price history through a [`QuoteSource`], one ticker after another,
/// and remembers every result for the lifetime of the value.
#[derive(Debug)]
pub struct DataAccess<Q> {
    source: Q,
    cache: FetchCache,
}

impl<Q: QuoteSource> DataAccess<Q> {
    /// Wrap a quote source with an empty cache.
    pub fn new(source: Q) -> Self {
        Self {
            source,
            cache: FetchCache::new(),
        }
    }

    /// Fetch closes for every ticker over `window`.
    ///
    /// Tickers are normalised to upper case. A provider error for one ticker yields
    /// [`TickerData::Unavailable`] for that ticker only. Repeating a request with the
    /// same tickers (in any order) and window returns the stored result without
    /// touching the source.
    pub async fn fetch<S: AsRef<str>>(&mut self, tickers: &[S], window: &Window) -> TickerDataMap {
        let key = FetchKey::new(tickers, *window);

        if let Some(data) = self.cache.get(&key) {
            debug!(tickers = ?key.tickers(), %window, "price cache hit");
            return data.clone();
        }

        debug!(tickers = ?key.tickers(), %window, "price cache miss");

        let mut data = TickerDataMap::new();
        for symbol in key.tickers() {
            let outcome = match self.source.fetch_closes(symbol, window).await {
                Ok(series) => TickerData::Available(series),
                Err(e) => {
                    warn!(symbol = %symbol, error = %e, "failed to fetch price history");
                    TickerData::unavailable(e.to_string())
                }
            };
            data.insert(symbol.clone(), outcome);
        }

        self.cache.put(key, data.clone());
        data
    }

    /// Cache statistics.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// The wrapped source.
    pub const fn source(&self) -> &Q {
        &self.source
    }
}
