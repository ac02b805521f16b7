//! Return and volatility metrics of a single price series.
//!
//! Metrics are computed over the raw fetched window: no annualization,
//! no smoothing and no outlier handling.

use etfscope_data::PriceSeries;
use serde::{Deserialize, Serialize};

/// Metrics of one ticker.
///
/// Every field is `None` when the series has fewer than two points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    /// Arithmetic mean of the period returns.
    pub average_return: Option<f64>,
    /// Population standard deviation (divisor N) of the period returns.
    pub volatility: Option<f64>,
    /// `last / first - 1`.
    pub cumulative_return: Option<f64>,
}

impl Metrics {
    /// Metrics that could not be computed.
    pub const fn absent() -> Self {
        Self {
            average_return: None,
            volatility: None,
            cumulative_return: None,
        }
    }

    /// Whether all three metrics are defined.
    pub const fn is_complete(&self) -> bool {
        self.average_return.is_some() && self.volatility.is_some() && self.cumulative_return.is_some()
    }
}

/// Period-over-period fractional changes: `p[i+1] / p[i] - 1`.
pub fn period_returns(closes: &[f64]) -> Vec<f64> {
    closes.windows(2).map(|w| w[1] / w[0] - 1.0).collect()
}

/// Arithmetic mean, `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population standard deviation (divisor N), `None` for an empty slice.
pub fn population_std(values: &[f64]) -> Option<f64> {
    let mu = mean(values)?;
    let variance = values.iter().map(|v| (v - mu).powi(2)).sum::<f64>() / values.len() as f64;
    Some(variance.sqrt())
}

/// Compute the metrics of a price series.
pub fn compute_metrics(series: &PriceSeries) -> Metrics {
    let closes = series.closes();
    if closes.len() < 2 {
        return Metrics::absent();
    }

    let returns = period_returns(&closes);

    Metrics {
        average_return: mean(&returns),
        volatility: population_std(&returns),
        cumulative_return: Some(closes[closes.len() - 1] / closes[0] - 1.0),
    }
}
