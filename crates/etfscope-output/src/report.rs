//! Dashboard report generation.

use crate::summary::{InvestmentSummary, MetricsTable};
use chrono::{DateTime, Utc};
use etfscope_data::SectorAllocation;
use etfscope_metrics::CorrelationMatrix;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during report generation.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A required section was not provided.
    #[error("Missing report section: {0}")]
    MissingSection(&'static str),
}

/// Everything one dashboard run produced, in serializable form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardReport {
    /// Report generation timestamp.
    pub timestamp: DateTime<Utc>,

    /// Description of the time window, e.g. `1y` or `2024-01-01 to 2024-06-30`.
    pub window: String,

    /// Selected tickers in selection order.
    pub tickers: Vec<String>,

    /// Per-ticker metrics.
    pub metrics: MetricsTable,

    /// Investment allocation outcome.
    pub investment: Option<InvestmentSummary>,

    /// Sector breakdowns that could be fetched.
    pub sectors: Vec<SectorAllocation>,

    /// Return correlation across tickers.
    pub correlation: Option<CorrelationMatrix>,

    /// User-facing warnings.
    pub warnings: Vec<String>,
}

impl DashboardReport {
    /// Convert report to JSON string.
    pub fn to_json(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the JSON report to `path`.
    pub fn save(&self, path: &Path) -> Result<(), ReportError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

/// Builder for creating reports.
#[derive(Debug, Default)]
pub struct ReportBuilder {
    window: Option<String>,
    tickers: Vec<String>,
    metrics: Option<MetricsTable>,
    investment: Option<InvestmentSummary>,
    sectors: Vec<SectorAllocation>,
    correlation: Option<CorrelationMatrix>,
    warnings: Vec<String>,
}

impl ReportBuilder {
    /// Create a new report builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the time window description.
    pub fn window(mut self, window: impl Into<String>) -> Self {
        self.window = Some(window.into());
        self
    }

    /// Set the selected tickers.
    pub fn tickers(mut self, tickers: Vec<String>) -> Self {
        self.tickers = tickers;
        self
    }

    /// Set the metrics table.
    pub fn metrics(mut self, metrics: MetricsTable) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Set the investment summary.
    pub fn investment(mut self, investment: InvestmentSummary) -> Self {
        self.investment = Some(investment);
        self
    }

    /// Add a sector breakdown.
    pub fn sector(mut self, sector: SectorAllocation) -> Self {
        self.sectors.push(sector);
        self
    }

    /// Set the correlation matrix.
    pub fn correlation(mut self, correlation: CorrelationMatrix) -> Self {
        self.correlation = Some(correlation);
        self
    }

    /// Add a warning.
    pub fn warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    /// Build the report.
    ///
    /// # Errors
    ///
    /// Returns an error when no metrics table was set.
    pub fn build(self) -> Result<DashboardReport, ReportError> {
        Ok(DashboardReport {
            timestamp: Utc::now(),
            window: self.window.unwrap_or_else(|| "1y".to_string()),
            tickers: self.tickers,
            metrics: self.metrics.ok_or(ReportError::MissingSection("metrics"))?,
            investment: self.investment,
            sectors: self.sectors,
            correlation: self.correlation,
            warnings: self.warnings,
        })
    }
}
