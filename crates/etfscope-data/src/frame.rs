//! Closing prices of several tickers aligned on date.

use crate::error::{DataError, Result};
use crate::series::{TickerData, TickerDataMap};
use chrono::NaiveDate;
use polars::prelude::*;

/// Name of the date column.
pub const DATE_COLUMN: &str = "date";

/// A polars `DataFrame` with a `date` column followed by one close column per ticker.
///
/// Rows are the union of all tickers' dates in ascending order; a ticker without
/// a close on a given date holds a null there. Unavailable tickers are all-null
/// columns so every requested ticker keeps its column.
#[derive(Debug, Clone)]
pub struct ClosePriceFrame {
    tickers: Vec<String>,
    frame: DataFrame,
}

impl ClosePriceFrame {
    /// Align the closes of `tickers` (in that order) taken from `data`.
    ///
    /// Tickers missing from `data` are treated as unavailable. Duplicate tickers are
    /// kept once.
    pub fn from_data<S: AsRef<str>>(tickers: &[S], data: &TickerDataMap) -> Result<Self> {
        let mut ordered: Vec<String> = Vec::with_capacity(tickers.len());
        for ticker in tickers {
            let ticker = ticker.as_ref().trim().to_uppercase();
            if !ticker.is_empty() && !ordered.contains(&ticker) {
                ordered.push(ticker);
            }
        }

        if ordered.is_empty() {
            return Err(DataError::InvalidSymbol(
                "No tickers to align".to_string(),
            ));
        }

        let mut joined: Option<LazyFrame> = None;
        for ticker in &ordered {
            let (dates, closes): (Vec<NaiveDate>, Vec<f64>) =
                match data.get(ticker).and_then(TickerData::series) {
                    Some(series) => series.points().iter().map(|p| (p.date, p.close)).unzip(),
                    None => (Vec::new(), Vec::new()),
                };

            let df = DataFrame::new(vec![
                Series::new(DATE_COLUMN.into(), dates).into(),
                Series::new(ticker.as_str().into(), closes).into(),
            ])?;

            joined = Some(match joined {
                None => df.lazy(),
                Some(lf) => lf.join(
                    df.lazy(),
                    [col(DATE_COLUMN)],
                    [col(DATE_COLUMN)],
                    JoinArgs::new(JoinType::Full).with_coalesce(JoinCoalesce::CoalesceColumns),
                ),
            });
        }

        let frame = joined
            .ok_or_else(|| DataError::InvalidSymbol("No tickers to align".to_string()))?
            .sort([DATE_COLUMN], SortMultipleOptions::default())
            .collect()?;

        Ok(Self {
            tickers: ordered,
            frame,
        })
    }

    /// Tickers in column order.
    pub fn tickers(&self) -> &[String] {
        &self.tickers
    }

    /// Number of aligned dates.
    pub fn height(&self) -> usize {
        self.frame.height()
    }

    /// Whether no ticker has any close.
    pub fn is_empty(&self) -> bool {
        self.frame.height() == 0
    }

    /// The underlying frame.
    pub const fn frame(&self) -> &DataFrame {
        &self.frame
    }

    /// Dates formatted as `YYYY-MM-DD`, in row order.
    pub fn date_labels(&self) -> Result<Vec<String>> {
        let dates = self.frame.column(DATE_COLUMN)?.cast(&DataType::String)?;
        let dates = dates.str()?;
        (0..self.frame.height())
            .map(|i| {
                dates
                    .get(i)
                    .map(str::to_string)
                    .ok_or_else(|| DataError::Parse("Missing date".to_string()))
            })
            .collect()
    }

    /// Closes of one ticker in row order, `None` where it has no close.
    pub fn closes(&self, ticker: &str) -> Result<Vec<Option<f64>>> {
        let closes = self.frame.column(ticker)?.f64()?;
        Ok(closes.into_iter().collect())
    }

    /// All close columns paired with their ticker, in column order.
    pub fn columns(&self) -> Result<Vec<(String, Vec<Option<f64>>)>> {
        self.tickers
            .iter()
            .map(|t| Ok((t.clone(), self.closes(t)?)))
            .collect()
    }
}
