#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/etfscope/etfscope/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod dashboard;
pub mod universe;

// Re-export main types from sub-crates
pub use etfscope_data as data;
pub use etfscope_metrics as metrics;
pub use etfscope_output as output;

pub use dashboard::{
    Dashboard, DashboardError, DashboardRequest, DashboardView, DashboardWarning, NamedChart,
    TickerStatus, TickerView,
};
pub use universe::{EtfUniverse, Universe};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
