//! ETF sector weights from the Yahoo Finance `quoteSummary` endpoint.

use crate::error::{DataError, Result};
use crate::sector::{SectorAllocation, SectorWeight, sector_display_name};
use crate::source::SectorSource;
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tokio::time::sleep;

const QUOTE_SUMMARY_URL: &str = "https://query2.finance.yahoo.com/v10/finance/quoteSummary";

/// Yahoo Finance sector weights provider.
#[derive(Debug)]
pub struct YahooSectorProvider {
    client: reqwest::Client,
    rate_limit_delay: Duration,
}

impl YahooSectorProvider {
    /// Create a new provider waiting 250ms after each request.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new() -> Result<Self> {
        Self::with_rate_limit(Duration::from_millis(250))
    }

    /// Create a new provider with custom rate limiting.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_rate_limit(rate_limit_delay: Duration) -> Result<Self> {
        Ok(Self {
            client: reqwest::Client::builder()
                .user_agent("Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7)")
                .build()?,
            rate_limit_delay,
        })
    }
}

#[async_trait]
impl SectorSource for YahooSectorProvider {
    async fn fetch_sector_weights(&self, symbol: &str) -> Result<SectorAllocation> {
        if symbol.is_empty() {
            return Err(DataError::InvalidSymbol("Empty symbol".to_string()));
        }

        let url = format!("{QUOTE_SUMMARY_URL}/{symbol}");
        let response = self
            .client
            .get(&url)
            .query(&[("modules", "topHoldings")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DataError::Http(format!("{status} for {url}")));
        }

        let body: Value = response.json().await?;

        // Apply rate limiting
        sleep(self.rate_limit_delay).await;

        parse_sector_weightings(symbol, &body)
    }
}

/// Extract `topHoldings.sectorWeightings` from a `quoteSummary` response body.
///
/// Each weighting is a single-key object such as `{"technology": {"raw": 0.31}}`;
/// raw fractions are converted to percentages.
pub fn parse_sector_weightings(symbol: &str, body: &Value) -> Result<SectorAllocation> {
    let weightings = body
        .pointer("/quoteSummary/result/0/topHoldings/sectorWeightings")
        .and_then(Value::as_array)
        .ok_or_else(|| DataError::MissingData {
            symbol: symbol.to_string(),
            reason: "No sector weightings in response".to_string(),
        })?;

    let mut weights = Vec::with_capacity(weightings.len());
    for entry in weightings {
        let Some(object) = entry.as_object() else {
            return Err(DataError::Parse(format!(
                "Unexpected sector weighting entry for {symbol}: {entry}"
            )));
        };
        for (key, value) in object {
            let raw = value
                .get("raw")
                .and_then(Value::as_f64)
                .or_else(|| value.as_f64())
                .ok_or_else(|| {
                    DataError::Parse(format!("Missing raw weight for sector {key} of {symbol}"))
                })?;
            weights.push(SectorWeight {
                sector: sector_display_name(key),
                percent: raw * 100.0,
            });
        }
    }

    if weights.is_empty() {
        return Err(DataError::MissingData {
            symbol: symbol.to_string(),
            reason: "Empty sector weightings".to_string(),
        });
    }

    Ok(SectorAllocation::new(symbol.to_string(), weights))
}
