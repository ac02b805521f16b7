#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/etfscope/etfscope/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod charts;
pub mod export;
pub mod report;
pub mod summary;

pub use charts::{
    Chart, comparative_performance_chart, correlation_heatmap, investment_comparison_chart,
    monetary_returns_pie, price_history_chart, sector_allocation_chart,
};
pub use export::{
    ClosePriceExport, ClosePriceRow, DEFAULT_CSV_FILE_NAME, ExportError, ExportFormat, Exporter,
    export_closes_csv, write_closes_csv,
};
pub use report::{DashboardReport, ReportBuilder, ReportError};
pub use summary::{
    InvestmentSummary, MetricsRow, MetricsTable, NOT_AVAILABLE, format_currency, format_percent,
};
