//! Yahoo Finance market data client

use crate::api::MarketDataProvider;
use crate::error::{Result, StockError};
use crate::series::{PricePoint, PriceSeries};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use std::time::Duration;
use tracing::{debug, instrument};
use yahoo_finance_api as yahoo;

/// Trailing window requested from the chart endpoint
pub const HISTORY_RANGE: &str = "1y";
/// Bar size requested from the chart endpoint
pub const HISTORY_INTERVAL: &str = "1d";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Markers the provider uses when a symbol has no data
const UNKNOWN_SYMBOL_MARKERS: &[&str] = &[
    "not found",
    "404",
    "no data",
    "noquotes",
    "no quotes",
    "noresult",
    "no result",
    "emptydataset",
    "delisted",
];

/// Yahoo Finance API client
#[derive(Debug, Clone)]
pub struct YahooFinanceClient {
    timeout: Duration,
}

impl YahooFinanceClient {
    /// Create a new Yahoo Finance client
    pub fn new() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Bound each fetch by `timeout`
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn fetch(&self, symbol: &str) -> Result<PriceSeries> {
        let provider = yahoo::YahooConnector::new()
            .map_err(|e| StockError::ProviderUnavailable(e.to_string()))?;

        let response = provider
            .get_quote_range(symbol, HISTORY_INTERVAL, HISTORY_RANGE)
            .await
            .map_err(|e| classify_error(symbol, &format!("{e} {e:?}")))?;

        let quotes = response
            .quotes()
            .map_err(|e| classify_error(symbol, &format!("{e} {e:?}")))?;

        // bars are stamped at the exchange open; without metadata fall back to UTC
        let gmtoffset = response
            .metadata()
            .map(|meta| i64::from(meta.gmtoffset))
            .unwrap_or(0);

        let points: Vec<PricePoint> = quotes
            .iter()
            .filter(|q| q.close.is_finite())
            .filter_map(|q| {
                Some(PricePoint {
                    date: bar_date(q.timestamp as i64, gmtoffset)?,
                    close: q.close,
                })
            })
            .collect();

        debug!(symbol, points = points.len(), "Fetched daily closes");

        if points.is_empty() {
            return Err(StockError::UnknownTicker(symbol.to_string()));
        }
        PriceSeries::new(symbol, points)
    }
}

impl Default for YahooFinanceClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MarketDataProvider for YahooFinanceClient {
    #[instrument(skip(self), fields(range = HISTORY_RANGE, interval = HISTORY_INTERVAL))]
    async fn daily_closes(&self, ticker: &str) -> Result<PriceSeries> {
        match tokio::time::timeout(self.timeout, self.fetch(ticker)).await {
            Ok(result) => result,
            Err(_) => Err(StockError::ProviderUnavailable(format!(
                "request for {ticker} timed out after {}s",
                self.timeout.as_secs()
            ))),
        }
    }
}

/// Trading day of a bar in the exchange's own time zone
fn bar_date(timestamp: i64, gmtoffset: i64) -> Option<NaiveDate> {
    Some(DateTime::from_timestamp(timestamp.checked_add(gmtoffset)?, 0)?.date_naive())
}

/// Map a provider failure onto unknown-symbol vs. unavailable
fn classify_error(symbol: &str, detail: &str) -> StockError {
    let lowered = detail.to_lowercase();
    if UNKNOWN_SYMBOL_MARKERS.iter().any(|m| lowered.contains(m)) {
        StockError::UnknownTicker(symbol.to_string())
    } else {
        StockError::ProviderUnavailable(detail.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_unknown_symbol() {
        for detail in [
            "fetching the data from yahoo! finance failed FetchFailed(\"404 Not Found\")",
            "ApiError(YahooErrorResponse { code: \"Not Found\", description: \"No data found, symbol may be delisted\" })",
            "NoQuotes",
            "EmptyDataSet",
        ] {
            assert!(
                matches!(classify_error("ZZZZ", detail), StockError::UnknownTicker(s) if s == "ZZZZ"),
                "{detail}"
            );
        }
    }

    #[test]
    fn test_classify_unavailable() {
        let err = classify_error("AAPL", "ConnectionFailed(error sending request)");
        assert!(matches!(err, StockError::ProviderUnavailable(_)));
    }

    #[test]
    fn test_bar_date_uses_exchange_offset() {
        // Tokyo open on 2024-03-04 is 2024-03-03T15:00:00Z
        let open = 1_709_478_000;
        assert_eq!(bar_date(open, 32_400), NaiveDate::from_ymd_opt(2024, 3, 4));
        assert_eq!(bar_date(open, 0), NaiveDate::from_ymd_opt(2024, 3, 3));

        // New York open on 2024-03-04 is 14:30Z, same day either way
        let open = 1_709_562_600;
        assert_eq!(bar_date(open, -18_000), NaiveDate::from_ymd_opt(2024, 3, 4));
    }

    #[test]
    fn test_elapsed_timeout_is_unavailable() {
        let client = YahooFinanceClient::new().with_timeout(Duration::ZERO);
        let result = tokio_test::block_on(client.daily_closes("AAPL"));
        assert!(matches!(result, Err(StockError::ProviderUnavailable(_))));
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_daily_closes() {
        let client = YahooFinanceClient::new();
        let series = client.daily_closes("AAPL").await.unwrap();

        assert_eq!(series.ticker(), "AAPL");
        assert!(series.len() > 200);
        assert!(series.latest().unwrap().close > 0.0);
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_unknown_symbol() {
        let client = YahooFinanceClient::new();
        let result = client.daily_closes("INVALID_SYMBOL_12345").await;
        assert!(matches!(result, Err(StockError::UnknownTicker(_))));
    }
}
