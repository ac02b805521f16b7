//! Market data source traits.
//!
//! [`DataAccess`](crate::DataAccess) is generic over these so the Yahoo providers
//! can be swapped for in-memory sources in tests.

use crate::error::Result;
use crate::sector::SectorAllocation;
use crate::series::PriceSeries;
use crate::window::Window;
use async_trait::async_trait;

/// Source of daily closing prices.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Fetch the closing prices of `symbol` over `window`.
    async fn fetch_closes(&self, symbol: &str, window: &Window) -> Result<PriceSeries>;
}

/// Source of ETF sector weight breakdowns.
#[async_trait]
pub trait SectorSource: Send + Sync {
    /// Fetch the sector weights of `symbol`.
    async fn fetch_sector_weights(&self, symbol: &str) -> Result<SectorAllocation>;
}

#[async_trait]
impl<T: QuoteSource + ?Sized> QuoteSource for Box<T> {
    async fn fetch_closes(&self, symbol: &str, window: &Window) -> Result<PriceSeries> {
        (**self).fetch_closes(symbol, window).await
    }
}

#[async_trait]
impl<T: SectorSource + ?Sized> SectorSource for Box<T> {
    async fn fetch_sector_weights(&self, symbol: &str) -> Result<SectorAllocation> {
        (**self).fetch_sector_weights(symbol).await
    }
}
