//! End-to-end tests of the dashboard controller over in-memory sources.

use approx::assert_relative_eq;
use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use etfscope::data::{
    DataError, Period, PriceSeries, QuoteSource, Result, SectorAllocation, SectorSource,
    SectorWeight, Window,
};
use etfscope::metrics::AllocationPlan;
use etfscope::{
    Dashboard, DashboardError, DashboardRequest, DashboardWarning, TickerStatus, Universe,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Default)]
struct MockQuotes {
    closes: HashMap<String, Vec<f64>>,
    calls: AtomicUsize,
}

impl MockQuotes {
    fn with(mut self, symbol: &str, closes: &[f64]) -> Self {
        self.closes.insert(symbol.to_string(), closes.to_vec());
        self
    }
}

#[async_trait]
impl QuoteSource for MockQuotes {
    async fn fetch_closes(&self, symbol: &str, _window: &Window) -> Result<PriceSeries> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let closes = self
            .closes
            .get(symbol)
            .ok_or_else(|| DataError::YahooApi(format!("no quotes for {symbol}")))?;
        let start = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        Ok(PriceSeries::from_pairs(
            closes
                .iter()
                .enumerate()
                .map(|(i, c)| (start + Duration::days(i as i64), *c)),
        ))
    }
}

#[derive(Debug, Default)]
struct MockSectors {
    calls: AtomicUsize,
}

#[async_trait]
impl SectorSource for MockSectors {
    async fn fetch_sector_weights(&self, symbol: &str) -> Result<SectorAllocation> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if symbol == "GLD" {
            return Err(DataError::MissingData {
                symbol: symbol.to_string(),
                reason: "no sector weightings".to_string(),
            });
        }
        Ok(SectorAllocation::new(
            symbol.to_string(),
            vec![SectorWeight {
                sector: "Technology".to_string(),
                percent: 30.0,
            }],
        ))
    }
}

fn plan(entries: &[(&str, i64)]) -> AllocationPlan {
    let mut plan = AllocationPlan::new();
    for (ticker, percent) in entries {
        plan.set(ticker, *percent).unwrap();
    }
    plan
}

fn dashboard() -> Dashboard<MockQuotes, MockSectors> {
    let quotes = MockQuotes::default()
        .with("SPY", &[100.0, 110.0, 120.0])
        .with("FXI", &[50.0, 48.0, 45.0])
        .with("GLD", &[200.0, 210.0])
        .with("QQQ", &[400.0]);
    Dashboard::new(quotes, MockSectors::default())
}

#[tokio::test]
async fn test_two_ticker_allocation() {
    let mut dashboard = dashboard();
    let request = DashboardRequest::new(&["SPY", "FXI"], Window::Named(Period::OneYear))
        .with_investment(10_000.0)
        .with_allocation(plan(&[("SPY", 50), ("FXI", 50)]));

    let view = dashboard.run(&request).await.unwrap();

    assert!(view.warnings.is_empty());
    let spy = view.simulation.position("SPY").unwrap();
    assert_relative_eq!(spy.invested_amount, 5_000.0, epsilon = 1e-9);
    assert_relative_eq!(spy.current_worth, 6_000.0, epsilon = 1e-9);
    let fxi = view.simulation.position("FXI").unwrap();
    assert_relative_eq!(fxi.current_worth, 4_500.0, epsilon = 1e-9);
    assert_relative_eq!(view.simulation.total_earned(), 500.0, epsilon = 1e-9);

    assert!(view.correlation.is_some());
    assert_eq!(view.closes.tickers(), ["SPY".to_string(), "FXI".to_string()]);
    assert_eq!(view.metrics_table().rows.len(), 2);
}

#[tokio::test]
async fn test_failed_ticker_is_isolated() {
    let mut dashboard = dashboard();
    // EWZ is in the universe but the mock has no quotes for it.
    let request = DashboardRequest::new(&["SPY", "EWZ", "FXI"], Window::Named(Period::OneYear))
        .with_allocation(plan(&[("SPY", 40), ("EWZ", 30), ("FXI", 30)]));

    let view = dashboard.run(&request).await.unwrap();

    assert_eq!(view.tickers.len(), 3);
    assert!(view.ticker("SPY").unwrap().is_ready());
    assert!(view.ticker("FXI").unwrap().is_ready());
    assert!(matches!(
        view.ticker("EWZ").unwrap().status,
        TickerStatus::Failed { .. }
    ));

    assert!(view.warnings.iter().any(|w| matches!(
        w,
        DashboardWarning::MetricsUnavailable { ticker, .. } if ticker == "EWZ"
    )));

    assert!(view.simulation.position("EWZ").is_none());
    assert_relative_eq!(view.simulation.total_invested, 7_000.0, epsilon = 1e-9);
    assert_eq!(view.metrics_table().rows.len(), 2);
    assert!(!view.charts().iter().any(|c| c.file_name.starts_with("EWZ")));
}

#[tokio::test]
async fn test_single_point_series_has_no_metrics() {
    let mut dashboard = dashboard();
    let request = DashboardRequest::new(&["QQQ"], Window::Named(Period::YearToDate));

    let view = dashboard.run(&request).await.unwrap();

    let qqq = view.ticker("QQQ").unwrap();
    assert!(!qqq.is_ready());
    assert!(qqq.metrics.cumulative_return.is_none());
    assert!(qqq.series.is_some());
    assert!(view.correlation.is_none());
    assert_eq!(view.warnings.len(), 1);
}

#[tokio::test]
async fn test_over_allocation_warns_and_computes() {
    let mut dashboard = dashboard();
    let request = DashboardRequest::new(&["SPY", "FXI"], Window::Named(Period::FiveYears))
        .with_allocation(plan(&[("SPY", 70), ("FXI", 50)]));

    let view = dashboard.run(&request).await.unwrap();

    assert!(view.warnings.contains(&DashboardWarning::OverAllocated { total_percent: 120 }));
    assert_relative_eq!(view.simulation.total_invested, 12_000.0, epsilon = 1e-9);
}

#[tokio::test]
async fn test_zero_allocation_contributes_nothing() {
    let mut dashboard = dashboard();
    let request = DashboardRequest::new(&["SPY", "GLD"], Window::Named(Period::OneYear))
        .with_investment(1_000.0)
        .with_allocation(plan(&[("SPY", 100)]));

    let view = dashboard.run(&request).await.unwrap();

    let gld = view.simulation.position("GLD").unwrap();
    assert_eq!(gld.invested_amount, 0.0);
    assert_eq!(gld.current_worth, 0.0);
    assert_relative_eq!(view.simulation.total_worth, 1_200.0, epsilon = 1e-9);
}

#[tokio::test]
async fn test_identical_request_uses_cache() {
    let mut dashboard = dashboard();
    let request = DashboardRequest::new(&["SPY", "FXI"], Window::Named(Period::ThreeYears));

    let first = dashboard.run(&request).await.unwrap();
    let reordered = DashboardRequest::new(&["fxi", "SPY"], Window::Named(Period::ThreeYears));
    let second = dashboard.run(&reordered).await.unwrap();

    assert_eq!(
        dashboard.data_access().source().calls.load(Ordering::SeqCst),
        2
    );
    assert_eq!(dashboard.data_access().cache_stats().hits, 1);
    assert_eq!(
        first.ticker("SPY").unwrap().series,
        second.ticker("SPY").unwrap().series
    );
}

#[tokio::test]
async fn test_sector_failures_are_omitted() {
    let mut dashboard = dashboard();
    let request = DashboardRequest::new(&["SPY", "GLD"], Window::Named(Period::OneYear));

    let view = dashboard.run(&request).await.unwrap();

    assert!(view.ticker("SPY").unwrap().sectors.is_some());
    assert!(view.ticker("GLD").unwrap().sectors.is_none());
    assert!(view.warnings.is_empty());
    assert_eq!(dashboard.data_access().source().calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_sectors_disabled() {
    let mut dashboard = dashboard();
    let request =
        DashboardRequest::new(&["SPY"], Window::Named(Period::OneYear)).with_sectors(false);

    let view = dashboard.run(&request).await.unwrap();
    assert!(view.ticker("SPY").unwrap().sectors.is_none());
}

#[tokio::test]
async fn test_chart_set() {
    let mut dashboard = dashboard();
    let request = DashboardRequest::new(&["SPY", "GLD"], Window::Named(Period::OneYear))
        .with_allocation(plan(&[("SPY", 50), ("GLD", 50)]));

    let view = dashboard.run(&request).await.unwrap();
    let charts = view.charts();
    let names: Vec<&str> = charts.iter().map(|c| c.file_name.as_str()).collect();

    assert_eq!(
        names,
        vec![
            "SPY_price_history.svg",
            "SPY_sectors.svg",
            "GLD_price_history.svg",
            "comparative_performance.svg",
            "correlation_heatmap.svg",
            "investment_comparison.svg",
            "monetary_returns.svg",
        ]
    );

    let report = view.report().unwrap();
    assert_eq!(report.tickers, vec!["SPY", "GLD"]);
    assert_eq!(report.sectors.len(), 1);
}

#[tokio::test]
async fn test_request_validation() {
    let mut dashboard = dashboard();
    let window = Window::default();

    let empty: [&str; 0] = [];
    assert!(matches!(
        dashboard.run(&DashboardRequest::new(&empty, window)).await,
        Err(DashboardError::NoTickers)
    ));

    match dashboard
        .run(&DashboardRequest::new(&["SPY", "AAPL"], window))
        .await
    {
        Err(DashboardError::UnknownTickers(unknown)) => assert_eq!(unknown, vec!["AAPL"]),
        other => panic!("expected unknown tickers, got {other:?}"),
    }

    for amount in [-1.0, 100_000.01, f64::NAN] {
        let request = DashboardRequest::new(&["SPY"], window).with_investment(amount);
        assert!(matches!(
            dashboard.run(&request).await,
            Err(DashboardError::InvalidInvestment(_))
        ));
    }

    assert_eq!(dashboard.data_access().source().calls.load(Ordering::SeqCst), 0);
    assert!(dashboard.universe().contains("SPY"));
}
