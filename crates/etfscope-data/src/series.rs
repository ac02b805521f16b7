//! Price series and per-ticker fetch outcomes.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Fetch outcomes keyed by ticker.
pub type TickerDataMap = BTreeMap<String, TickerData>;

/// A single daily close.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Trading date.
    pub date: NaiveDate,
    /// Closing price.
    pub close: f64,
}

impl PricePoint {
    /// Create a new price point.
    pub const fn new(date: NaiveDate, close: f64) -> Self {
        Self { date, close }
    }
}

/// Closing prices of one ticker, ascending by date with no duplicate dates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Build a series from raw points.
    ///
    /// Points are sorted by date. When a date appears more than once the last
    /// occurrence wins. Closes that are not finite or not strictly positive are dropped.
    pub fn new(points: impl IntoIterator<Item = PricePoint>) -> Self {
        let mut points: Vec<PricePoint> = points
            .into_iter()
            .filter(|p| p.close.is_finite() && p.close > 0.0)
            .collect();

        // Stable sort keeps input order among equal dates, so the last one is the latest quote.
        points.sort_by_key(|p| p.date);
        let mut deduped: Vec<PricePoint> = Vec::with_capacity(points.len());
        for point in points {
            match deduped.last_mut() {
                Some(last) if last.date == point.date => *last = point,
                _ => deduped.push(point),
            }
        }

        Self { points: deduped }
    }

    /// Build a series from `(date, close)` pairs.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (NaiveDate, f64)>) -> Self {
        Self::new(pairs.into_iter().map(|(date, close)| PricePoint::new(date, close)))
    }

    /// All points in date order.
    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    /// Closing prices in date order.
    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    /// Dates in ascending order.
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the series has no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// First point, if any.
    pub fn first(&self) -> Option<&PricePoint> {
        self.points.first()
    }

    /// Last point, if any.
    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }
}

/// Outcome of fetching one ticker.
///
/// A provider failure is isolated to its ticker and carried as `Unavailable`
/// so downstream code branches on the tag instead of on an empty series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TickerData {
    /// Price history was retrieved.
    Available(PriceSeries),
    /// The provider failed for this ticker.
    Unavailable {
        /// Human readable failure reason.
        reason: String,
    },
}

impl TickerData {
    /// Mark a ticker as unavailable.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    /// The series, when available.
    pub const fn series(&self) -> Option<&PriceSeries> {
        match self {
            Self::Available(series) => Some(series),
            Self::Unavailable { .. } => None,
        }
    }

    /// Whether data was retrieved.
    pub const fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }
}
