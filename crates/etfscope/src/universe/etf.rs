//! Fixed allow-list of selectable ETFs.

/// Tickers a user may select, in display order.
pub const ETF_TICKERS: [&str; 31] = [
    "FXI", "EWT", "IWM", "EWZ", "EWU", "XLF", "BKF", "EWY", "AGG", "EEM", "EZU", "GLD", "QQQ",
    "AAXJ", "SHY", "ACWI", "SLV", "EWH", "SPY", "EWJ", "IBGL", "DIA", "EWQ", "XOP", "VWO",
    "EWA", "EWC", "ILF", "XLV", "EWG", "ITB",
];

/// Tickers selected when the user picks none.
pub const DEFAULT_SELECTION: [&str; 2] = ["FXI", "SPY"];

/// The selectable ETF universe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EtfUniverse {
    symbols: Vec<String>,
}

impl EtfUniverse {
    /// Create the universe with the built-in allow-list.
    pub fn new() -> Self {
        Self {
            symbols: ETF_TICKERS.iter().map(|s| (*s).to_string()).collect(),
        }
    }

    /// Create a universe from custom symbols. Symbols are upper-cased and de-duplicated.
    pub fn with_symbols<S: AsRef<str>>(symbols: &[S]) -> Self {
        let mut out: Vec<String> = Vec::with_capacity(symbols.len());
        for s in symbols {
            let s = s.as_ref().trim().to_uppercase();
            if !s.is_empty() && !out.contains(&s) {
                out.push(s);
            }
        }
        Self { symbols: out }
    }

    /// All symbols in display order.
    pub fn symbols(&self) -> Vec<String> {
        self.symbols.clone()
    }

    /// Default selection.
    pub fn default_selection(&self) -> Vec<String> {
        DEFAULT_SELECTION
            .iter()
            .filter(|s| self.symbols.iter().any(|t| t == *s))
            .map(|s| (*s).to_string())
            .collect()
    }

    /// Symbols of `selection` that are not in the universe, compared case-insensitively.
    pub fn unknown<S: AsRef<str>>(&self, selection: &[S]) -> Vec<String> {
        selection
            .iter()
            .map(|s| s.as_ref().trim().to_uppercase())
            .filter(|s| !self.symbols.contains(s))
            .collect()
    }
}

impl Default for EtfUniverse {
    fn default() -> Self {
        Self::new()
    }
}
