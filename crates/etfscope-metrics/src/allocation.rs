//! Investment allocation simulation.
//!
//! Given per-ticker allocation percentages and a total investment amount, projects
//! what each slice would be worth today from the ticker's cumulative return over
//! the fetched window:
//!
//! ```text
//! invested      = total * percent / 100
//! current_worth = invested * (1 + cumulative_return)
//! ```
//!
//! Percentages are never clamped. A plan summing to more than 100% is reported
//! through [`AllocationPlan::is_over_allocated`] and still simulated as entered.

use crate::metrics::Metrics;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised while building an allocation plan.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AllocationError {
    /// Percentage outside `[0, 100]`.
    #[error("Allocation for {ticker} must be between 0 and 100, got {percent}")]
    PercentOutOfRange {
        /// Ticker of the entry.
        ticker: String,
        /// Rejected percentage.
        percent: i64,
    },

    /// Entry not of the form `TICKER=PERCENT`.
    #[error("Malformed allocation entry '{0}' (expected TICKER=PERCENT)")]
    Malformed(String),
}

/// One `TICKER=PERCENT` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationEntry {
    /// Upper-cased ticker.
    pub ticker: String,
    /// Percentage in `[0, 100]`.
    pub percent: u8,
}

impl AllocationEntry {
    /// Create a validated entry.
    pub fn new(ticker: &str, percent: i64) -> Result<Self, AllocationError> {
        let ticker = ticker.trim().to_uppercase();
        if ticker.is_empty() {
            return Err(AllocationError::Malformed(format!("={percent}")));
        }
        let percent = u8::try_from(percent)
            .ok()
            .filter(|p| *p <= 100)
            .ok_or_else(|| AllocationError::PercentOutOfRange {
                ticker: ticker.clone(),
                percent,
            })?;
        Ok(Self { ticker, percent })
    }
}

impl FromStr for AllocationEntry {
    type Err = AllocationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (ticker, percent) = s
            .split_once('=')
            .ok_or_else(|| AllocationError::Malformed(s.to_string()))?;
        let percent = percent
            .trim()
            .trim_end_matches('%')
            .parse::<i64>()
            .map_err(|_| AllocationError::Malformed(s.to_string()))?;
        Self::new(ticker, percent)
    }
}

impl fmt::Display for AllocationEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.ticker, self.percent)
    }
}

/// Ordered ticker to percentage mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationPlan {
    entries: Vec<AllocationEntry>,
}

impl AllocationPlan {
    /// Create an empty plan.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a plan from entries. A later entry for the same ticker replaces the earlier one.
    pub fn from_entries(entries: impl IntoIterator<Item = AllocationEntry>) -> Self {
        let mut plan = Self::new();
        for entry in entries {
            plan.insert(entry);
        }
        plan
    }

    /// Set the allocation of one ticker.
    ///
    /// # Errors
    ///
    /// Returns an error when `percent` is outside `[0, 100]`.
    pub fn set(&mut self, ticker: &str, percent: i64) -> Result<(), AllocationError> {
        self.insert(AllocationEntry::new(ticker, percent)?);
        Ok(())
    }

    fn insert(&mut self, entry: AllocationEntry) {
        match self.entries.iter_mut().find(|e| e.ticker == entry.ticker) {
            Some(existing) => existing.percent = entry.percent,
            None => self.entries.push(entry),
        }
    }

    /// Percentage of a ticker, 0 when it has no entry.
    pub fn percent(&self, ticker: &str) -> u8 {
        self.entries
            .iter()
            .find(|e| e.ticker.eq_ignore_ascii_case(ticker))
            .map_or(0, |e| e.percent)
    }

    /// Entries in insertion order.
    pub fn entries(&self) -> &[AllocationEntry] {
        &self.entries
    }

    /// Sum of all percentages.
    pub fn total_percent(&self) -> u32 {
        self.entries.iter().map(|e| u32::from(e.percent)).sum()
    }

    /// Whether the percentages sum to more than 100.
    pub fn is_over_allocated(&self) -> bool {
        self.total_percent() > 100
    }

    /// A plan holding one entry per ticker of `tickers`, in that order, with the
    /// percentage this plan assigns (0 when absent). Tickers of this plan that are
    /// not listed are dropped.
    pub fn restricted_to<S: AsRef<str>>(&self, tickers: &[S]) -> Self {
        Self::from_entries(tickers.iter().map(|t| {
            let ticker = t.as_ref().trim().to_uppercase();
            let percent = self.percent(&ticker);
            AllocationEntry { ticker, percent }
        }))
    }
}

/// Simulated outcome of one ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Ticker.
    pub ticker: String,
    /// Allocation percentage used.
    pub allocation_percent: u8,
    /// Amount invested at the start of the window.
    pub invested_amount: f64,
    /// Projected worth at the end of the window.
    pub current_worth: f64,
}

impl Position {
    /// Gain or loss of the position.
    pub fn earned(&self) -> f64 {
        self.current_worth - self.invested_amount
    }
}

/// Result of simulating a plan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Simulation {
    /// Total investment amount the plan was applied to.
    pub total_investment: f64,
    /// One position per evaluated ticker, in plan order.
    pub positions: Vec<Position>,
    /// Tickers skipped because their cumulative return is undefined.
    pub excluded: Vec<String>,
    /// Sum of invested amounts.
    pub total_invested: f64,
    /// Sum of current worth.
    pub total_worth: f64,
}

impl Simulation {
    /// `total_worth - total_invested`.
    pub fn total_earned(&self) -> f64 {
        self.total_worth - self.total_invested
    }

    /// Position of a ticker.
    pub fn position(&self, ticker: &str) -> Option<&Position> {
        self.positions.iter().find(|p| p.ticker == ticker)
    }
}

/// Simulate `plan` on `total_investment` using each ticker's cumulative return.
///
/// Tickers without metrics or without a cumulative return are excluded and listed
/// in [`Simulation::excluded`]. A 0% ticker gets a zero position and adds nothing
/// to the totals.
pub fn simulate(
    plan: &AllocationPlan,
    total_investment: f64,
    metrics: &BTreeMap<String, Metrics>,
) -> Simulation {
    let mut simulation = Simulation {
        total_investment,
        ..Simulation::default()
    };

    for entry in plan.entries() {
        let Some(cumulative_return) = metrics
            .get(&entry.ticker)
            .and_then(|m| m.cumulative_return)
        else {
            simulation.excluded.push(entry.ticker.clone());
            continue;
        };

        let (invested_amount, current_worth) = if entry.percent > 0 {
            let invested = total_investment * (f64::from(entry.percent) / 100.0);
            (invested, invested * (1.0 + cumulative_return))
        } else {
            (0.0, 0.0)
        };

        simulation.total_invested += invested_amount;
        simulation.total_worth += current_worth;
        simulation.positions.push(Position {
            ticker: entry.ticker.clone(),
            allocation_percent: entry.percent,
            invested_amount,
            current_worth,
        });
    }

    simulation
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    fn metrics_with_cumulative(values: &[(&str, Option<f64>)]) -> BTreeMap<String, Metrics> {
        values
            .iter()
            .map(|(ticker, cumulative)| {
                (
                    (*ticker).to_string(),
                    Metrics {
                        average_return: cumulative.map(|_| 0.0),
                        volatility: cumulative.map(|_| 0.0),
                        cumulative_return: *cumulative,
                    },
                )
            })
            .collect()
    }

    fn plan(entries: &[(&str, i64)]) -> AllocationPlan {
        let mut plan = AllocationPlan::new();
        for (ticker, percent) in entries {
            plan.set(ticker, *percent).unwrap();
        }
        plan
    }

    #[test]
    fn test_two_ticker_split() {
        let metrics = metrics_with_cumulative(&[("A", Some(0.20)), ("B", Some(-0.10))]);
        let sim = simulate(&plan(&[("A", 50), ("B", 50)]), 10_000.0, &metrics);

        let a = sim.position("A").unwrap();
        assert_relative_eq!(a.invested_amount, 5_000.0, epsilon = 1e-9);
        assert_relative_eq!(a.current_worth, 6_000.0, epsilon = 1e-9);

        let b = sim.position("B").unwrap();
        assert_relative_eq!(b.invested_amount, 5_000.0, epsilon = 1e-9);
        assert_relative_eq!(b.current_worth, 4_500.0, epsilon = 1e-9);

        assert_relative_eq!(sim.total_invested, 10_000.0, epsilon = 1e-9);
        assert_relative_eq!(sim.total_worth, 10_500.0, epsilon = 1e-9);
        assert_relative_eq!(sim.total_earned(), 500.0, epsilon = 1e-9);
        assert!(sim.excluded.is_empty());
    }

    #[test]
    fn test_zero_allocation_contributes_nothing() {
        let metrics = metrics_with_cumulative(&[("A", Some(0.20)), ("B", Some(0.50))]);
        let sim = simulate(&plan(&[("A", 100), ("B", 0)]), 1_000.0, &metrics);

        let b = sim.position("B").unwrap();
        assert_eq!(b.invested_amount, 0.0);
        assert_eq!(b.current_worth, 0.0);
        assert_relative_eq!(sim.total_invested, 1_000.0, epsilon = 1e-9);
        assert_relative_eq!(sim.total_worth, 1_200.0, epsilon = 1e-9);
    }

    #[test]
    fn test_zero_allocation_after_funded_ticker_has_no_stale_amount() {
        let metrics = metrics_with_cumulative(&[("A", Some(0.10)), ("B", Some(0.10))]);
        let sim = simulate(&plan(&[("A", 60), ("B", 0)]), 10_000.0, &metrics);
        assert_eq!(sim.position("B").unwrap().invested_amount, 0.0);
    }

    #[test]
    fn test_over_allocation_is_not_clamped() {
        let metrics = metrics_with_cumulative(&[("A", Some(0.0)), ("B", Some(0.0))]);
        let plan = plan(&[("A", 70), ("B", 50)]);
        let sim = simulate(&plan, 10_000.0, &metrics);

        assert!(plan.is_over_allocated());
        assert_eq!(plan.total_percent(), 120);
        assert_relative_eq!(sim.position("A").unwrap().invested_amount, 7_000.0, epsilon = 1e-9);
        assert_relative_eq!(sim.position("B").unwrap().invested_amount, 5_000.0, epsilon = 1e-9);
        assert_relative_eq!(sim.total_invested, 12_000.0, epsilon = 1e-9);
    }

    #[test]
    fn test_undefined_metrics_are_excluded() {
        let metrics = metrics_with_cumulative(&[("A", Some(0.10)), ("B", None)]);
        let sim = simulate(&plan(&[("A", 40), ("B", 30), ("C", 30)]), 1_000.0, &metrics);

        assert_eq!(sim.positions.len(), 1);
        assert_eq!(sim.excluded, vec!["B".to_string(), "C".to_string()]);
        assert_relative_eq!(sim.total_invested, 400.0, epsilon = 1e-9);
        assert_relative_eq!(sim.total_worth, 440.0, epsilon = 1e-9);
    }

    #[test]
    fn test_totals_independent_of_order() {
        let metrics =
            metrics_with_cumulative(&[("A", Some(0.3)), ("B", Some(-0.2)), ("C", Some(0.05))]);
        let forward = simulate(&plan(&[("A", 20), ("B", 30), ("C", 50)]), 5_000.0, &metrics);
        let reverse = simulate(&plan(&[("C", 50), ("B", 30), ("A", 20)]), 5_000.0, &metrics);

        assert_relative_eq!(forward.total_worth, reverse.total_worth, epsilon = 1e-9);
        assert_relative_eq!(forward.total_invested, reverse.total_invested, epsilon = 1e-9);
    }

    #[rstest]
    #[case("SPY=50", "SPY", 50)]
    #[case("spy = 25%", "SPY", 25)]
    #[case("FXI=0", "FXI", 0)]
    #[case("QQQ=100", "QQQ", 100)]
    fn test_parse_entry(#[case] input: &str, #[case] ticker: &str, #[case] percent: u8) {
        let entry: AllocationEntry = input.parse().unwrap();
        assert_eq!(entry.ticker, ticker);
        assert_eq!(entry.percent, percent);
    }

    #[rstest]
    #[case("SPY")]
    #[case("SPY=abc")]
    #[case("=50")]
    fn test_parse_malformed(#[case] input: &str) {
        assert!(matches!(
            input.parse::<AllocationEntry>(),
            Err(AllocationError::Malformed(_))
        ));
    }

    #[rstest]
    #[case("SPY=101")]
    #[case("SPY=-5")]
    fn test_parse_out_of_range(#[case] input: &str) {
        assert!(matches!(
            input.parse::<AllocationEntry>(),
            Err(AllocationError::PercentOutOfRange { .. })
        ));
    }

    #[test]
    fn test_later_entry_replaces_earlier() {
        let plan = AllocationPlan::from_entries(["SPY=10", "FXI=20", "spy=30"].map(|s| {
            s.parse::<AllocationEntry>().unwrap()
        }));
        assert_eq!(plan.entries().len(), 2);
        assert_eq!(plan.percent("SPY"), 30);
        assert_eq!(plan.total_percent(), 50);
    }

    #[test]
    fn test_restricted_to() {
        let plan = plan(&[("SPY", 40), ("FXI", 30), ("EWZ", 30)]);
        let restricted = plan.restricted_to(&["EWZ", "SPY", "GLD"]);

        let tickers: Vec<&str> = restricted.entries().iter().map(|e| e.ticker.as_str()).collect();
        assert_eq!(tickers, vec!["EWZ", "SPY", "GLD"]);
        assert_eq!(restricted.percent("GLD"), 0);
        assert_eq!(restricted.total_percent(), 70);
    }
}
