//! Market data providers

pub mod yahoo;

use crate::error::Result;
use crate::series::PriceSeries;
use async_trait::async_trait;

pub use yahoo::YahooFinanceClient;

/// Source of trailing daily closing prices
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// One trailing year of daily closes for `ticker`, oldest first
    ///
    /// Fails with `UnknownTicker` when the provider has no data for the
    /// symbol and `ProviderUnavailable` when it cannot be reached.
    async fn daily_closes(&self, ticker: &str) -> Result<PriceSeries>;
}
