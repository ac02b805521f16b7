//! Export functionality for dashboard data.
//!
//! Closing prices, metrics and investment positions can be written as CSV or JSON.
//! The closes CSV has a `Date` column followed by one column per ticker, with an
//! empty cell wherever a ticker has no close on that date.

use crate::summary::{InvestmentSummary, MetricsTable};
use etfscope_data::{ClosePriceFrame, DataError};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

/// File name used for the closes CSV when none is given.
pub const DEFAULT_CSV_FILE_NAME: &str = "etf_data.csv";

/// Errors that can occur during export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV serialization error.
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Reading the aligned price frame failed.
    #[error("Data error: {0}")]
    Data(#[from] DataError),

    /// Serialized output was not valid UTF-8.
    #[error("Encoding error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// Invalid format error.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

/// Export format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Comma-separated values format.
    Csv,

    /// Compact JSON format.
    Json,

    /// Pretty-printed JSON format.
    PrettyJson,
}

impl ExportFormat {
    /// Get the file extension for this format.
    pub const fn extension(&self) -> &str {
        match self {
            Self::Csv => "csv",
            Self::Json | Self::PrettyJson => "json",
        }
    }
}

/// Trait for exporting data in various formats.
pub trait Exporter {
    /// Export data to a string in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError>;

    /// Export data to a file in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or file writing fails.
    fn export_to_file(&self, path: &Path, format: ExportFormat) -> Result<(), ExportError> {
        let content = self.export_to_string(format)?;
        let mut file = File::create(path)?;
        file.write_all(content.as_bytes())?;
        Ok(())
    }
}

fn finish(wtr: csv::Writer<Vec<u8>>) -> Result<String, ExportError> {
    let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8(bytes)?)
}

fn to_json<T: Serialize>(value: &T, format: ExportFormat) -> Result<String, ExportError> {
    match format {
        ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(value)?),
        _ => Ok(serde_json::to_string(value)?),
    }
}

/// One date of aligned closes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosePriceRow {
    /// Date as `YYYY-MM-DD`.
    pub date: String,
    /// Close per ticker in column order, `None` where the ticker has no close.
    pub closes: Vec<Option<f64>>,
}

/// Closing prices of several tickers, one row per date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosePriceExport {
    /// Tickers in column order.
    pub tickers: Vec<String>,
    /// Rows in ascending date order.
    pub rows: Vec<ClosePriceRow>,
}

impl ClosePriceExport {
    /// Read every row of an aligned close frame.
    ///
    /// # Errors
    ///
    /// Returns an error if a column cannot be read from the frame.
    pub fn from_frame(frame: &ClosePriceFrame) -> Result<Self, ExportError> {
        let dates = frame.date_labels()?;
        let columns = frame.columns()?;

        let rows = dates
            .into_iter()
            .enumerate()
            .map(|(i, date)| ClosePriceRow {
                date,
                closes: columns
                    .iter()
                    .map(|(_, values)| values.get(i).copied().flatten())
                    .collect(),
            })
            .collect();

        Ok(Self {
            tickers: frame.tickers().to_vec(),
            rows,
        })
    }
}

impl Exporter for ClosePriceExport {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => {
                let mut wtr = csv::Writer::from_writer(vec![]);
                let mut header = Vec::with_capacity(self.tickers.len() + 1);
                header.push("Date");
                header.extend(self.tickers.iter().map(String::as_str));
                wtr.write_record(&header)?;

                for row in &self.rows {
                    let mut record = Vec::with_capacity(row.closes.len() + 1);
                    record.push(row.date.clone());
                    record.extend(
                        row.closes
                            .iter()
                            .map(|c| c.map(|v| v.to_string()).unwrap_or_default()),
                    );
                    wtr.write_record(&record)?;
                }
                finish(wtr)
            }
            ExportFormat::Json | ExportFormat::PrettyJson => to_json(self, format),
        }
    }
}

/// Closes CSV of an aligned frame.
///
/// # Errors
///
/// Returns an error if the frame cannot be read or serialized.
pub fn export_closes_csv(frame: &ClosePriceFrame) -> Result<String, ExportError> {
    ClosePriceExport::from_frame(frame)?.export_to_string(ExportFormat::Csv)
}

/// Write the closes CSV of an aligned frame to `path`.
///
/// # Errors
///
/// Returns an error if the frame cannot be read or the file cannot be written.
pub fn write_closes_csv(frame: &ClosePriceFrame, path: &Path) -> Result<(), ExportError> {
    ClosePriceExport::from_frame(frame)?.export_to_file(path, ExportFormat::Csv)
}

/// Flattened metrics row for CSV export.
#[derive(Debug, Serialize, Deserialize)]
struct MetricsFlat {
    ticker: String,
    average_return: Option<f64>,
    volatility: Option<f64>,
    cumulative_return: Option<f64>,
}

impl Exporter for MetricsTable {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => {
                let mut wtr = csv::Writer::from_writer(vec![]);
                for row in &self.rows {
                    wtr.serialize(MetricsFlat {
                        ticker: row.ticker.clone(),
                        average_return: row.metrics.average_return,
                        volatility: row.metrics.volatility,
                        cumulative_return: row.metrics.cumulative_return,
                    })?;
                }
                finish(wtr)
            }
            ExportFormat::Json | ExportFormat::PrettyJson => to_json(self, format),
        }
    }
}

impl Exporter for InvestmentSummary {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => {
                let mut wtr = csv::Writer::from_writer(vec![]);
                wtr.write_record(["ticker", "allocation_percent", "invested", "current_worth"])?;
                for p in &self.simulation.positions {
                    wtr.write_record([
                        p.ticker.clone(),
                        p.allocation_percent.to_string(),
                        format!("{:.2}", p.invested_amount),
                        format!("{:.2}", p.current_worth),
                    ])?;
                }
                finish(wtr)
            }
            ExportFormat::Json | ExportFormat::PrettyJson => to_json(self, format),
        }
    }
}
