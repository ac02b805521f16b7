//! Query windows: named look-back periods or an explicit date range.

use crate::error::{DataError, Result};
use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Named look-back periods offered for selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Period {
    /// One year.
    OneYear,
    /// Three years.
    ThreeYears,
    /// Five years.
    FiveYears,
    /// Ten years.
    TenYears,
    /// From January 1st of the current year.
    YearToDate,
}

impl Period {
    /// Returns all named periods in display order.
    pub fn all() -> Vec<Self> {
        vec![
            Self::OneYear,
            Self::ThreeYears,
            Self::FiveYears,
            Self::TenYears,
            Self::YearToDate,
        ]
    }

    /// Short label, as accepted by [`Period::from_str`].
    pub const fn label(&self) -> &'static str {
        match self {
            Self::OneYear => "1y",
            Self::ThreeYears => "3y",
            Self::FiveYears => "5y",
            Self::TenYears => "10y",
            Self::YearToDate => "YTD",
        }
    }

    /// Number of whole years looked back, `None` for year-to-date.
    pub const fn years(&self) -> Option<u32> {
        match self {
            Self::OneYear => Some(1),
            Self::ThreeYears => Some(3),
            Self::FiveYears => Some(5),
            Self::TenYears => Some(10),
            Self::YearToDate => None,
        }
    }

    /// First date covered by this period when evaluated on `today`.
    pub fn start_from(&self, today: NaiveDate) -> NaiveDate {
        match self.years() {
            Some(years) => today
                .checked_sub_months(Months::new(12 * years))
                .unwrap_or(NaiveDate::MIN),
            None => NaiveDate::from_ymd_opt(today.year(), 1, 1).unwrap_or(today),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for Period {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "1y" => Ok(Self::OneYear),
            "3y" => Ok(Self::ThreeYears),
            "5y" => Ok(Self::FiveYears),
            "10y" => Ok(Self::TenYears),
            "ytd" => Ok(Self::YearToDate),
            _ => Err(DataError::UnknownPeriod(s.to_string())),
        }
    }
}

/// Inclusive date range with `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Create a date range.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::InvalidDateRange`] when `start` is after `end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(DataError::InvalidDateRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { start, end })
    }

    /// First date of the range.
    pub const fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last date of the range.
    pub const fn end(&self) -> NaiveDate {
        self.end
    }
}

/// The time window of a price query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Window {
    /// A named look-back period ending today.
    Named(Period),
    /// The "Custom Range" choice: explicit start and end dates.
    Custom(DateRange),
}

impl Window {
    /// Build a custom window.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::InvalidDateRange`] when `start` is after `end`.
    pub fn custom(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        Ok(Self::Custom(DateRange::new(start, end)?))
    }

    /// Concrete `(start, end)` dates of this window, evaluated on `today`.
    pub fn resolve(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        match self {
            Self::Named(period) => (period.start_from(today), today),
            Self::Custom(range) => (range.start(), range.end()),
        }
    }
}

impl Default for Window {
    fn default() -> Self {
        Self::Named(Period::OneYear)
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(period) => write!(f, "{}", period),
            Self::Custom(range) => write!(f, "{} to {}", range.start(), range.end()),
        }
    }
}

impl From<Period> for Window {
    fn from(period: Period) -> Self {
        Self::Named(period)
    }
}
