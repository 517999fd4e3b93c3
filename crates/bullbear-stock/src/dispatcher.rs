//! Executes indicator requests against market data

use crate::api::MarketDataProvider;
use crate::error::Result;
use crate::indicators::{self, MacdPoint};
use crate::tools::{ChartImage, ChartOptions, IndicatorRequest, render_price_chart};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Outcome of one request
#[derive(Debug, Clone, PartialEq)]
pub enum IndicatorResult {
    /// Price, SMA, EMA or RSI
    Scalar(f64),
    Macd(MacdPoint),
    Chart(ChartImage),
}

impl IndicatorResult {
    /// Text fed back to the model; charts have none
    pub fn to_text(&self) -> Option<String> {
        match self {
            IndicatorResult::Scalar(value) => Some(value.to_string()),
            IndicatorResult::Macd(p) => Some(format!("{}, {}, {}", p.macd, p.signal, p.histogram)),
            IndicatorResult::Chart(_) => None,
        }
    }
}

/// Fetches a fresh series per request and runs the matching computation
#[derive(Clone)]
pub struct Dispatcher {
    market: Arc<dyn MarketDataProvider>,
    chart: ChartOptions,
}

impl Dispatcher {
    pub fn new(market: Arc<dyn MarketDataProvider>) -> Self {
        Self {
            market,
            chart: ChartOptions::default(),
        }
    }

    pub fn with_chart_options(mut self, chart: ChartOptions) -> Self {
        self.chart = chart;
        self
    }

    #[instrument(skip(self), fields(function = %request.function(), ticker = %request.ticker()))]
    pub async fn invoke(&self, request: &IndicatorRequest) -> Result<IndicatorResult> {
        let series = self.market.daily_closes(request.ticker().as_str()).await?;
        debug!(points = series.len(), "Series fetched");

        let result = match request {
            IndicatorRequest::GetPrice { .. } => {
                IndicatorResult::Scalar(indicators::latest_price(&series)?)
            }
            IndicatorRequest::Sma { window, .. } => {
                IndicatorResult::Scalar(indicators::sma(&series, *window)?)
            }
            IndicatorRequest::Ema { window, .. } => {
                IndicatorResult::Scalar(indicators::ema(&series, *window)?)
            }
            IndicatorRequest::Rsi { .. } => IndicatorResult::Scalar(indicators::rsi(&series)?),
            IndicatorRequest::Macd { .. } => IndicatorResult::Macd(indicators::macd(&series)?),
            IndicatorRequest::PlotPrice { .. } => {
                IndicatorResult::Chart(render_price_chart(&series, &self.chart)?)
            }
        };
        Ok(result)
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("chart", &self.chart)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::StockError;
    use crate::series::PriceSeries;
    use async_trait::async_trait;
    use mockall::mock;
    use serde_json::json;

    mock! {
        pub Market {}

        #[async_trait]
        impl MarketDataProvider for Market {
            async fn daily_closes(&self, ticker: &str) -> Result<PriceSeries>;
        }
    }

    fn dispatcher_with(closes: Vec<f64>) -> Dispatcher {
        let mut market = MockMarket::new();
        market
            .expect_daily_closes()
            .returning(move |ticker| PriceSeries::from_closes(ticker, &closes));
        Dispatcher::new(Arc::new(market))
    }

    fn request(name: &str, args: serde_json::Value) -> IndicatorRequest {
        IndicatorRequest::parse(name, &args).unwrap()
    }

    #[tokio::test]
    async fn test_scalar_results() {
        let dispatcher = dispatcher_with(vec![10.0, 11.0, 12.0, 13.0, 14.0]);

        let price = dispatcher
            .invoke(&request("get_stock_price", json!({"ticker": "AAPL"})))
            .await
            .unwrap();
        assert_eq!(price.to_text().as_deref(), Some("14"));

        let sma = dispatcher
            .invoke(&request("calculate_sma", json!({"ticker": "AAPL", "window": 3})))
            .await
            .unwrap();
        assert_eq!(sma, IndicatorResult::Scalar(13.0));
    }

    #[tokio::test]
    async fn test_macd_text_format() {
        let dispatcher = dispatcher_with(vec![5.0; 30]);
        let result = dispatcher
            .invoke(&request("calculate_macd", json!({"ticker": "AAPL"})))
            .await
            .unwrap();
        assert_eq!(result.to_text().as_deref(), Some("0, 0, 0"));
    }

    #[tokio::test]
    async fn test_chart_has_no_text() {
        let dispatcher = dispatcher_with((0..40).map(f64::from).collect());
        let result = dispatcher
            .invoke(&request("plot_stock_price", json!({"ticker": "AAPL"})))
            .await
            .unwrap();
        assert!(matches!(result, IndicatorResult::Chart(ref c) if c.ticker == "AAPL"));
        assert!(result.to_text().is_none());
    }

    #[tokio::test]
    async fn test_window_longer_than_history() {
        let dispatcher = dispatcher_with(vec![1.0; 10]);
        let result = dispatcher
            .invoke(&request("calculate_ema", json!({"ticker": "AAPL", "window": 50})))
            .await;
        assert!(matches!(
            result,
            Err(StockError::InsufficientData {
                required: 50,
                available: 10
            })
        ));
    }

    #[tokio::test]
    async fn test_provider_error_propagates() {
        let mut market = MockMarket::new();
        market
            .expect_daily_closes()
            .returning(|t| Err(StockError::UnknownTicker(t.to_string())));
        let dispatcher = Dispatcher::new(Arc::new(market));

        let result = dispatcher
            .invoke(&request("calculate_rsi", json!({"ticker": "zzzz"})))
            .await;
        assert!(matches!(result, Err(StockError::UnknownTicker(ref t)) if t == "ZZZZ"));
    }
}
