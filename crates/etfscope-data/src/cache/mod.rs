//! Caching layer for market data.

pub mod memo;

pub use memo::{CacheStats, FetchCache, FetchKey};
