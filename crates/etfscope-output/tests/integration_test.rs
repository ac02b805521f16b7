//! Integration tests from computed metrics to rendered output.

use chrono::NaiveDate;
use etfscope_data::{ClosePriceFrame, PriceSeries, TickerData, TickerDataMap};
use etfscope_metrics::{AllocationPlan, compute_metrics, correlation_matrix, simulate};
use etfscope_output::{
    ExportFormat, Exporter, InvestmentSummary, MetricsTable, ReportBuilder,
    comparative_performance_chart, correlation_heatmap, export_closes_csv,
    investment_comparison_chart, monetary_returns_pie, price_history_chart,
};
use std::collections::BTreeMap;

fn series(closes: &[f64]) -> PriceSeries {
    let start = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    PriceSeries::from_pairs(
        closes
            .iter()
            .enumerate()
            .map(|(i, c)| (start + chrono::Duration::days(i as i64), *c)),
    )
}

fn sample_data() -> TickerDataMap {
    let mut data = TickerDataMap::new();
    data.insert(
        "SPY".to_string(),
        TickerData::Available(series(&[470.0, 475.0, 468.0, 480.0, 486.0])),
    );
    data.insert(
        "FXI".to_string(),
        TickerData::Available(series(&[24.0, 23.5, 24.2, 24.1, 25.0])),
    );
    data
}

#[test]
fn test_full_presentation_workflow() {
    let data = sample_data();
    let tickers = ["SPY", "FXI"];

    let mut table = MetricsTable::default();
    let mut metrics = BTreeMap::new();
    for ticker in tickers {
        let m = compute_metrics(data[ticker].series().unwrap());
        table.push(ticker, m);
        metrics.insert(ticker.to_string(), m);
    }

    let mut plan = AllocationPlan::new();
    plan.set("SPY", 60).unwrap();
    plan.set("FXI", 40).unwrap();
    let simulation = simulate(&plan, 10_000.0, &metrics);

    // 486/470 and 25/24 applied to 6000 and 4000
    let expected_worth = 6_000.0 * 486.0 / 470.0 + 4_000.0 * 25.0 / 24.0;
    assert!((simulation.total_worth - expected_worth).abs() < 1e-6);

    let ascii = table.to_ascii_table();
    assert!(ascii.contains("SPY"));
    assert!(ascii.contains("FXI"));

    let summary = InvestmentSummary::new(simulation.clone());
    assert!(summary.to_markdown().contains("| SPY | 60% | $6,000.00 |"));

    let frame = ClosePriceFrame::from_data(&tickers, &data).unwrap();
    let csv = export_closes_csv(&frame).unwrap();
    assert_eq!(csv.lines().count(), 6);
    assert!(csv.starts_with("Date,SPY,FXI\n2024-01-02,470,24\n"));

    let correlation = correlation_matrix(&frame.columns().unwrap());
    let heatmap = correlation_heatmap(&correlation);
    assert!(!heatmap.is_empty_state());

    let spy = data["SPY"].series().unwrap();
    let fxi = data["FXI"].series().unwrap();
    for chart in [
        price_history_chart("SPY", spy),
        comparative_performance_chart(&[("SPY", spy), ("FXI", fxi)]),
        investment_comparison_chart(&simulation),
        monetary_returns_pie(&simulation),
    ] {
        assert!(chart.svg.starts_with("<svg"));
        assert!(!chart.is_empty_state(), "{} rendered empty", chart.title);
    }

    let report = ReportBuilder::new()
        .window("1y")
        .tickers(tickers.iter().map(|t| (*t).to_string()).collect())
        .metrics(table.clone())
        .investment(summary)
        .correlation(correlation)
        .build()
        .unwrap();
    let json = report.to_json().unwrap();
    assert!(json.contains("\"SPY\""));
    assert!(json.contains("\"total_worth\""));

    let metrics_json = table.export_to_string(ExportFormat::Json).unwrap();
    assert!(metrics_json.contains("\"cumulative_return\""));
}

#[test]
fn test_unavailable_ticker_keeps_empty_csv_column() {
    let mut data = sample_data();
    data.insert("EWZ".to_string(), TickerData::unavailable("HTTP 404"));

    let frame = ClosePriceFrame::from_data(&["SPY", "EWZ"], &data).unwrap();
    let csv = export_closes_csv(&frame).unwrap();

    assert!(csv.starts_with("Date,SPY,EWZ\n"));
    assert!(csv.lines().skip(1).all(|line| line.ends_with(',')));
}
