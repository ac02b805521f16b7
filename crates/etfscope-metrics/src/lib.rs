#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/etfscope/etfscope/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod allocation;
pub mod correlation;
pub mod metrics;

// Re-export main types
pub use allocation::{
    AllocationEntry, AllocationError, AllocationPlan, Position, Simulation, simulate,
};
pub use correlation::{CorrelationMatrix, correlation_matrix};
pub use metrics::{Metrics, compute_metrics};
