//! Function catalog offered to the chat model

pub mod chart;
pub mod request;

pub use chart::{ChartImage, ChartOptions, render_price_chart};
pub use request::{IndicatorRequest, Ticker};

use crate::error::{Result, StockError};
use bullbear_llm::ToolDefinition;
use bullbear_llm::tools::schema;
use serde_json::{Value, json};

const TICKER_DESCRIPTION: &str = "the stock ticker symbol for a given company";

/// The functions the model may call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StockFunction {
    GetStockPrice,
    CalculateSma,
    CalculateEma,
    CalculateRsi,
    CalculateMacd,
    PlotStockPrice,
}

impl StockFunction {
    /// Every function, in catalog order
    pub const ALL: [StockFunction; 6] = [
        StockFunction::GetStockPrice,
        StockFunction::CalculateSma,
        StockFunction::CalculateEma,
        StockFunction::CalculateRsi,
        StockFunction::CalculateMacd,
        StockFunction::PlotStockPrice,
    ];

    /// Resolve a model-emitted function name
    pub fn from_name(name: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|f| f.name() == name)
            .ok_or_else(|| StockError::UnknownFunction(name.to_string()))
    }

    /// Wire name
    pub fn name(self) -> &'static str {
        match self {
            StockFunction::GetStockPrice => "get_stock_price",
            StockFunction::CalculateSma => "calculate_sma",
            StockFunction::CalculateEma => "calculate_ema",
            StockFunction::CalculateRsi => "calculate_rsi",
            StockFunction::CalculateMacd => "calculate_macd",
            StockFunction::PlotStockPrice => "plot_stock_price",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            StockFunction::GetStockPrice => {
                "gets the latest stock price given the ticker symbol of a company."
            }
            StockFunction::CalculateSma => {
                "calculates the simple moving average for a given stock ticker and a window."
            }
            StockFunction::CalculateEma => {
                "calculates the exponential moving average for a given stock ticker and a window."
            }
            StockFunction::CalculateRsi => {
                "calculates the relative strength index for a given stock ticker."
            }
            StockFunction::CalculateMacd => {
                "calculates the moving average convergence divergence for a given stock ticker."
            }
            StockFunction::PlotStockPrice => {
                "plot the stock price for the last year given the ticker symbol of a company."
            }
        }
    }

    /// Whether the function takes a `window` argument
    pub fn requires_window(self) -> bool {
        matches!(self, StockFunction::CalculateSma | StockFunction::CalculateEma)
    }

    /// Whether the result is an image rather than text
    pub fn is_chart(self) -> bool {
        matches!(self, StockFunction::PlotStockPrice)
    }

    /// JSON schema for the arguments
    pub fn parameters(self) -> Value {
        let window = match self {
            StockFunction::CalculateSma => {
                "the timeframe to consider when calculating the simple moving average"
            }
            StockFunction::CalculateEma => {
                "the timeframe to consider when calculating the exponential moving average"
            }
            _ => {
                return schema::object(
                    json!({ "ticker": schema::string(TICKER_DESCRIPTION) }),
                    &["ticker"],
                );
            }
        };

        schema::object(
            json!({
                "ticker": schema::string(TICKER_DESCRIPTION),
                "window": schema::integer(window),
            }),
            &["ticker", "window"],
        )
    }

    pub fn definition(self) -> ToolDefinition {
        ToolDefinition::new(self.name(), self.description(), self.parameters())
    }
}

impl std::fmt::Display for StockFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Definitions for the whole catalog, sent on the first model call of a turn
pub fn catalog() -> Vec<ToolDefinition> {
    StockFunction::ALL.iter().map(|f| f.definition()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name_round_trip() {
        for function in StockFunction::ALL {
            assert_eq!(StockFunction::from_name(function.name()).unwrap(), function);
        }
    }

    #[test]
    fn test_unknown_function() {
        let err = StockFunction::from_name("frobnicate").unwrap_err();
        assert!(matches!(err, StockError::UnknownFunction(ref n) if n == "frobnicate"));
    }

    #[test]
    fn test_catalog_schemas() {
        let defs = catalog();
        assert_eq!(defs.len(), 6);

        let sma = defs.iter().find(|d| d.name == "calculate_sma").unwrap();
        assert_eq!(sma.parameters["required"], json!(["ticker", "window"]));
        assert_eq!(sma.parameters["properties"]["window"]["type"], "integer");

        let rsi = defs.iter().find(|d| d.name == "calculate_rsi").unwrap();
        assert_eq!(rsi.parameters["required"], json!(["ticker"]));
        assert!(rsi.parameters["properties"].get("window").is_none());
    }

    #[test]
    fn test_only_averages_take_window() {
        let windowed: Vec<_> = StockFunction::ALL
            .into_iter()
            .filter(|f| f.requires_window())
            .collect();
        assert_eq!(
            windowed,
            vec![StockFunction::CalculateSma, StockFunction::CalculateEma]
        );
    }
}
