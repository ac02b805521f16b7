//! Sector weight breakdown of an ETF.

use serde::{Deserialize, Serialize};

/// Weight of one sector within an ETF.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorWeight {
    /// Sector display name.
    pub sector: String,
    /// Weight in percent (0 to 100).
    pub percent: f64,
}

/// Sector breakdown of a single ticker, in provider order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SectorAllocation {
    /// Ticker the breakdown belongs to.
    pub symbol: String,
    /// Sector weights.
    pub weights: Vec<SectorWeight>,
}

impl SectorAllocation {
    /// Create a sector allocation.
    pub const fn new(symbol: String, weights: Vec<SectorWeight>) -> Self {
        Self { symbol, weights }
    }

    /// Whether no sector weights are known.
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Sum of all weights in percent.
    pub fn total_percent(&self) -> f64 {
        self.weights.iter().map(|w| w.percent).sum()
    }

    /// Weight of a sector by name.
    pub fn weight(&self, sector: &str) -> Option<f64> {
        self.weights
            .iter()
            .find(|w| w.sector == sector)
            .map(|w| w.percent)
    }
}

/// Display name for a Yahoo Finance sector key such as `consumer_cyclical`.
pub fn sector_display_name(key: &str) -> String {
    match key {
        "realestate" => "Real Estate".to_string(),
        "consumer_cyclical" => "Consumer Cyclical".to_string(),
        "basic_materials" => "Basic Materials".to_string(),
        "consumer_defensive" => "Consumer Defensive".to_string(),
        "technology" => "Technology".to_string(),
        "communication_services" => "Communication Services".to_string(),
        "financial_services" => "Financial Services".to_string(),
        "utilities" => "Utilities".to_string(),
        "industrials" => "Industrials".to_string(),
        "energy" => "Energy".to_string(),
        "healthcare" => "Healthcare".to_string(),
        other => other
            .split('_')
            .filter(|part| !part.is_empty())
            .map(|part| {
                let mut chars = part.chars();
                chars.next().map_or_else(String::new, |first| {
                    first.to_uppercase().chain(chars).collect()
                })
            })
            .collect::<Vec<_>>()
            .join(" "),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_sector_names() {
        assert_eq!(sector_display_name("realestate"), "Real Estate");
        assert_eq!(sector_display_name("financial_services"), "Financial Services");
    }

    #[test]
    fn test_unknown_sector_name_title_cased() {
        assert_eq!(sector_display_name("space_mining"), "Space Mining");
    }

    #[test]
    fn test_allocation_lookup() {
        let allocation = SectorAllocation::new(
            "XLF".to_string(),
            vec![
                SectorWeight {
                    sector: "Financial Services".to_string(),
                    percent: 90.0,
                },
                SectorWeight {
                    sector: "Technology".to_string(),
                    percent: 10.0,
                },
            ],
        );

        assert_eq!(allocation.weight("Technology"), Some(10.0));
        assert_eq!(allocation.weight("Energy"), None);
        assert_eq!(allocation.total_percent(), 100.0);
        assert!(!allocation.is_empty());
    }
}
