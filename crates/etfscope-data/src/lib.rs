#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/etfscope/etfscope/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod access;
pub mod cache;
pub mod error;
pub mod frame;
pub mod sector;
pub mod series;
pub mod source;
pub mod window;
pub mod yahoo;

pub use access::DataAccess;
pub use cache::{CacheStats, FetchCache, FetchKey};
pub use error::{DataError, Result};
pub use frame::ClosePriceFrame;
pub use sector::{SectorAllocation, SectorWeight};
pub use series::{PricePoint, PriceSeries, TickerData, TickerDataMap};
pub use source::{QuoteSource, SectorSource};
pub use window::{DateRange, Period, Window};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
