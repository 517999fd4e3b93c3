//! Typed requests built from model-emitted function calls

use super::StockFunction;
use crate::error::{Result, StockError};
use serde_json::{Map, Value, json};
use std::fmt;

const TICKER_EXTRA_CHARS: &[char] = &['.', '-', '^', '='];
const MAX_TICKER_LEN: usize = 16;

/// A normalised ticker symbol
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ticker(String);

impl Ticker {
    /// Trim and upper-case a symbol, rejecting empty or malformed input
    pub fn parse(raw: &str) -> Result<Self> {
        let symbol = raw.trim().to_ascii_uppercase();
        if symbol.is_empty() {
            return Err(StockError::InvalidArguments(
                "ticker must not be empty".to_string(),
            ));
        }
        if symbol.len() > MAX_TICKER_LEN
            || !symbol.chars().any(|c| c.is_ascii_alphanumeric())
            || !symbol
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || TICKER_EXTRA_CHARS.contains(&c))
        {
            return Err(StockError::InvalidArguments(format!(
                "'{}' is not a valid ticker symbol",
                raw.trim()
            )));
        }
        Ok(Self(symbol))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One invocation of a catalog function with validated arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndicatorRequest {
    GetPrice { ticker: Ticker },
    Sma { ticker: Ticker, window: usize },
    Ema { ticker: Ticker, window: usize },
    Rsi { ticker: Ticker },
    Macd { ticker: Ticker },
    PlotPrice { ticker: Ticker },
}

impl IndicatorRequest {
    /// Build a request from a function name and its JSON arguments
    pub fn parse(name: &str, arguments: &Value) -> Result<Self> {
        let function = StockFunction::from_name(name)?;
        let args = arguments.as_object().ok_or_else(|| {
            StockError::InvalidArguments(format!("arguments for {name} must be a JSON object"))
        })?;

        let ticker = parse_ticker(args)?;
        let request = match function {
            StockFunction::GetStockPrice => IndicatorRequest::GetPrice { ticker },
            StockFunction::CalculateSma => IndicatorRequest::Sma {
                ticker,
                window: parse_window(args)?,
            },
            StockFunction::CalculateEma => IndicatorRequest::Ema {
                ticker,
                window: parse_window(args)?,
            },
            StockFunction::CalculateRsi => IndicatorRequest::Rsi { ticker },
            StockFunction::CalculateMacd => IndicatorRequest::Macd { ticker },
            StockFunction::PlotStockPrice => IndicatorRequest::PlotPrice { ticker },
        };
        Ok(request)
    }

    pub fn function(&self) -> StockFunction {
        match self {
            IndicatorRequest::GetPrice { .. } => StockFunction::GetStockPrice,
            IndicatorRequest::Sma { .. } => StockFunction::CalculateSma,
            IndicatorRequest::Ema { .. } => StockFunction::CalculateEma,
            IndicatorRequest::Rsi { .. } => StockFunction::CalculateRsi,
            IndicatorRequest::Macd { .. } => StockFunction::CalculateMacd,
            IndicatorRequest::PlotPrice { .. } => StockFunction::PlotStockPrice,
        }
    }

    pub fn ticker(&self) -> &Ticker {
        match self {
            IndicatorRequest::GetPrice { ticker }
            | IndicatorRequest::Sma { ticker, .. }
            | IndicatorRequest::Ema { ticker, .. }
            | IndicatorRequest::Rsi { ticker }
            | IndicatorRequest::Macd { ticker }
            | IndicatorRequest::PlotPrice { ticker } => ticker,
        }
    }

    pub fn window(&self) -> Option<usize> {
        match self {
            IndicatorRequest::Sma { window, .. } | IndicatorRequest::Ema { window, .. } => {
                Some(*window)
            }
            _ => None,
        }
    }

    /// Encode as the JSON arguments the model would send
    pub fn to_arguments(&self) -> Value {
        let mut args = Map::new();
        args.insert("ticker".to_string(), json!(self.ticker().as_str()));
        if let Some(window) = self.window() {
            args.insert("window".to_string(), json!(window));
        }
        Value::Object(args)
    }
}

fn parse_ticker(args: &Map<String, Value>) -> Result<Ticker> {
    match args.get("ticker") {
        Some(Value::String(raw)) => Ticker::parse(raw),
        Some(other) => Err(StockError::InvalidArguments(format!(
            "ticker must be a string, got {other}"
        ))),
        None => Err(StockError::InvalidArguments(
            "missing required argument 'ticker'".to_string(),
        )),
    }
}

/// Accept integers, integral floats and numeric strings
fn parse_window(args: &Map<String, Value>) -> Result<usize> {
    let value = args.get("window").ok_or_else(|| {
        StockError::InvalidArguments("missing required argument 'window'".to_string())
    })?;

    let invalid = || {
        StockError::InvalidArguments(format!("window must be a positive integer, got {value}"))
    };

    let window = match value {
        Value::Number(n) => match n.as_u64() {
            Some(w) => w,
            None => {
                let f = n.as_f64().ok_or_else(invalid)?;
                integral_float(f).ok_or_else(invalid)?
            }
        },
        Value::String(s) => {
            let s = s.trim();
            match s.parse::<u64>() {
                Ok(w) => w,
                Err(_) => {
                    let f = s.parse::<f64>().map_err(|_| invalid())?;
                    integral_float(f).ok_or_else(invalid)?
                }
            }
        }
        _ => return Err(invalid()),
    };

    if window == 0 {
        return Err(invalid());
    }
    usize::try_from(window).map_err(|_| invalid())
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn integral_float(f: f64) -> Option<u64> {
    (f.is_finite() && f > 0.0 && f.fract() == 0.0 && f <= u32::MAX as f64).then(|| f as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_windowed_request() {
        let req = IndicatorRequest::parse("calculate_sma", &json!({"ticker": "aapl", "window": 20}))
            .unwrap();
        assert_eq!(
            req,
            IndicatorRequest::Sma {
                ticker: Ticker::parse("AAPL").unwrap(),
                window: 20
            }
        );
        assert_eq!(req.function(), StockFunction::CalculateSma);
    }

    #[test]
    fn test_lenient_window_forms() {
        for window in [json!(50), json!(50.0), json!("50"), json!(" 50 ")] {
            let req =
                IndicatorRequest::parse("calculate_ema", &json!({"ticker": "MSFT", "window": window}))
                    .unwrap();
            assert_eq!(req.window(), Some(50));
        }
    }

    #[test]
    fn test_invalid_windows() {
        for window in [json!(0), json!(-5), json!(2.5), json!("ten"), json!(null), json!([3])] {
            let result =
                IndicatorRequest::parse("calculate_sma", &json!({"ticker": "MSFT", "window": window}));
            assert!(
                matches!(result, Err(StockError::InvalidArguments(_))),
                "{result:?}"
            );
        }
    }

    #[test]
    fn test_missing_window() {
        let result = IndicatorRequest::parse("calculate_ema", &json!({"ticker": "MSFT"}));
        assert!(matches!(result, Err(StockError::InvalidArguments(_))));
    }

    #[test]
    fn test_extra_window_ignored_for_ticker_only_functions() {
        let req =
            IndicatorRequest::parse("calculate_rsi", &json!({"ticker": "TSLA", "window": 5})).unwrap();
        assert_eq!(req.window(), None);
    }

    #[test]
    fn test_ticker_validation() {
        assert_eq!(Ticker::parse("  brk-b ").unwrap().as_str(), "BRK-B");
        assert_eq!(Ticker::parse("^gspc").unwrap().as_str(), "^GSPC");
        assert!(Ticker::parse("").is_err());
        assert!(Ticker::parse("   ").is_err());
        assert!(Ticker::parse("AA PL").is_err());
        assert!(Ticker::parse("$AAPL").is_err());
    }

    #[test]
    fn test_punctuation_only_ticker_rejected() {
        for raw in [".", "-", "^=", " .-. "] {
            assert!(
                matches!(Ticker::parse(raw), Err(StockError::InvalidArguments(_))),
                "{raw}"
            );
        }
        assert!(IndicatorRequest::parse("get_stock_price", &json!({"ticker": "."})).is_err());
    }

    #[test]
    fn test_unknown_function_name() {
        let result = IndicatorRequest::parse("frobnicate", &json!({"ticker": "AAPL"}));
        assert!(matches!(result, Err(StockError::UnknownFunction(_))));
    }

    #[test]
    fn test_arguments_must_be_object() {
        let result = IndicatorRequest::parse("get_stock_price", &json!("AAPL"));
        assert!(matches!(result, Err(StockError::InvalidArguments(_))));
    }

    #[test]
    fn test_arguments_round_trip() {
        let requests = [
            IndicatorRequest::parse("get_stock_price", &json!({"ticker": "AAPL"})).unwrap(),
            IndicatorRequest::parse("calculate_sma", &json!({"ticker": "GOOG", "window": 7}))
                .unwrap(),
            IndicatorRequest::parse("calculate_ema", &json!({"ticker": "NVDA", "window": "200"}))
                .unwrap(),
            IndicatorRequest::parse("calculate_macd", &json!({"ticker": "^DJI"})).unwrap(),
            IndicatorRequest::parse("plot_stock_price", &json!({"ticker": "btc-usd"})).unwrap(),
        ];

        for req in requests {
            let parsed =
                IndicatorRequest::parse(req.function().name(), &req.to_arguments()).unwrap();
            assert_eq!(parsed.ticker(), req.ticker());
            assert_eq!(parsed.window(), req.window());
        }
    }
}
