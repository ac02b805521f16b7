//! Yahoo Finance data providers.

pub mod quotes;
pub mod sectors;

pub use quotes::YahooQuoteProvider;
pub use sectors::{YahooSectorProvider, parse_sector_weightings};
