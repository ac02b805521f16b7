//! Price history fetching from Yahoo Finance.

use crate::error::{DataError, Result};
use crate::series::{PricePoint, PriceSeries};
use crate::source::QuoteSource;
use crate::window::Window;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;
use yahoo_finance_api as yahoo;

/// Yahoo Finance quote provider with rate limiting.
pub struct YahooQuoteProvider {
    provider: yahoo::YahooConnector,
    rate_limit_delay: Duration,
}

impl std::fmt::Debug for YahooQuoteProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YahooQuoteProvider")
            .field("rate_limit_delay", &self.rate_limit_delay)
            .finish_non_exhaustive()
    }
}

impl YahooQuoteProvider {
    /// Create a new provider waiting 250ms after each request.
    ///
    /// # Errors
    ///
    /// Returns an error if the Yahoo connector cannot be built.
    pub fn new() -> Result<Self> {
        Self::with_rate_limit(Duration::from_millis(250))
    }

    /// Create a new provider with custom rate limiting.
    ///
    /// # Errors
    ///
    /// Returns an error if the Yahoo connector cannot be built.
    pub fn with_rate_limit(rate_limit_delay: Duration) -> Result<Self> {
        Ok(Self {
            provider: yahoo::YahooConnector::new()?,
            rate_limit_delay,
        })
    }

    /// Fetch daily closes for a single symbol between two dates (both inclusive).
    pub async fn fetch_range(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries> {
        if start > end {
            return Err(DataError::InvalidDateRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }

        if symbol.is_empty() {
            return Err(DataError::InvalidSymbol("Empty symbol".to_string()));
        }

        // Yahoo treats the end timestamp as exclusive.
        let start_time = to_offset_datetime(start)?;
        let end_time = to_offset_datetime(end.succ_opt().unwrap_or(end))?;

        let response = self
            .provider
            .get_quote_history(symbol, start_time, end_time)
            .await?;

        let quotes = response
            .quotes()
            .map_err(|e| DataError::YahooApi(e.to_string()))?;

        let series = PriceSeries::new(quotes.iter().filter_map(|q| {
            let timestamp = i64::try_from(q.timestamp).ok()?;
            let date = DateTime::from_timestamp(timestamp, 0)?.date_naive();
            Some(PricePoint::new(date, q.close))
        }));

        if series.is_empty() {
            return Err(DataError::MissingData {
                symbol: symbol.to_string(),
                reason: "No data returned from Yahoo Finance".to_string(),
            });
        }

        debug!(symbol, points = series.len(), "fetched price history");

        // Apply rate limiting
        sleep(self.rate_limit_delay).await;

        Ok(series)
    }
}

#[async_trait]
impl QuoteSource for YahooQuoteProvider {
    async fn fetch_closes(&self, symbol: &str, window: &Window) -> Result<PriceSeries> {
        let (start, end) = window.resolve(Utc::now().date_naive());
        self.fetch_range(symbol, start, end).await
    }
}

/// Midnight UTC of `date` as a `time::OffsetDateTime`.
fn to_offset_datetime(date: NaiveDate) -> Result<time::OffsetDateTime> {
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| DataError::TimeConversion(format!("invalid date {date}")))?
        .and_utc();
    time::OffsetDateTime::from_unix_timestamp(midnight.timestamp())
        .map_err(|e| DataError::TimeConversion(e.to_string()))
}
