//! ETF universe management.
//!
//! The dashboard only analyses tickers from a fixed allow-list.

pub mod etf;

pub use etf::{DEFAULT_SELECTION, ETF_TICKERS, EtfUniverse};

/// Trait for ticker universes.
pub trait Universe {
    /// Get all symbols in the universe.
    fn symbols(&self) -> Vec<String>;

    /// Check if a symbol is in the universe.
    fn contains(&self, symbol: &str) -> bool {
        self.symbols().contains(&symbol.to_string())
    }

    /// Get the number of constituents.
    fn size(&self) -> usize {
        self.symbols().len()
    }
}

impl Universe for EtfUniverse {
    fn symbols(&self) -> Vec<String> {
        self.symbols()
    }

    fn contains(&self, symbol: &str) -> bool {
        self.unknown(&[symbol]).is_empty()
    }
}
