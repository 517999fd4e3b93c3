//! Technical indicators over a closing-price series
//!
//! Pure functions; each returns the latest value of its indicator. Smoothing
//! uses the non-adjusted exponential-weighted recursion found in common data
//! tools so values can be cross-checked against charting software:
//!
//! ```text
//! y[0] = x[0]
//! y[t] = ((1 - a) * y[t-1] + a * x[t]) / ((1 - a) + a)
//! ```
//!
//! with `a = 2 / (span + 1)` for span-based averages and `a = 1 / (1 + com)`
//! for center-of-mass smoothing.

use crate::error::{Result, StockError};
use crate::series::PriceSeries;
use serde::{Deserialize, Serialize};

/// RSI look-back period
pub const RSI_PERIOD: usize = 14;
/// MACD fast EMA span
pub const MACD_FAST: usize = 12;
/// MACD slow EMA span
pub const MACD_SLOW: usize = 26;
/// MACD signal-line span
pub const MACD_SIGNAL: usize = 9;

/// One MACD observation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacdPoint {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
}

impl MacdPoint {
    /// `(macd, signal, histogram)`
    pub fn as_tuple(&self) -> (f64, f64, f64) {
        (self.macd, self.signal, self.histogram)
    }
}

/// Smoothing factor for a span (`2 / (span + 1)`)
pub fn span_alpha(span: usize) -> f64 {
    2.0 / (span as f64 + 1.0)
}

/// Smoothing factor for a center of mass (`1 / (1 + com)`)
pub fn com_alpha(com: f64) -> f64 {
    1.0 / (1.0 + com)
}

/// Exponentially weighted running mean, seeded with the first value
pub fn ewm(values: &[f64], alpha: f64) -> Vec<f64> {
    let mut out = Vec::with_capacity(values.len());
    let Some((&first, rest)) = values.split_first() else {
        return out;
    };

    let old_wt = 1.0 - alpha;
    let new_wt = alpha;
    let mut weighted = first;
    out.push(weighted);

    for &cur in rest {
        if weighted != cur {
            weighted = (old_wt * weighted + new_wt * cur) / (old_wt + new_wt);
        }
        out.push(weighted);
    }
    out
}

fn check_window(window: usize, available: usize) -> Result<()> {
    if window == 0 {
        return Err(StockError::InvalidArguments(
            "window must be a positive integer".to_string(),
        ));
    }
    require(window, available)
}

fn require(required: usize, available: usize) -> Result<()> {
    if available < required {
        return Err(StockError::InsufficientData {
            required,
            available,
        });
    }
    Ok(())
}

/// Last closing price
pub fn latest_price(series: &PriceSeries) -> Result<f64> {
    series
        .latest()
        .map(|p| p.close)
        .ok_or(StockError::EmptySeries)
}

/// Mean of the last `window` closes
pub fn sma(series: &PriceSeries, window: usize) -> Result<f64> {
    let closes = series.closes();
    check_window(window, closes.len())?;

    let tail = &closes[closes.len() - window..];
    Ok(tail.iter().sum::<f64>() / window as f64)
}

/// Exponential moving average with span `window`, final value
pub fn ema(series: &PriceSeries, window: usize) -> Result<f64> {
    let closes = series.closes();
    check_window(window, closes.len())?;

    ewm(&closes, span_alpha(window))
        .last()
        .copied()
        .ok_or(StockError::EmptySeries)
}

/// 14-period relative strength index
///
/// A series without any down move reads 100.
pub fn rsi(series: &PriceSeries) -> Result<f64> {
    let closes = series.closes();
    require(2, closes.len())?;

    let (up, down): (Vec<f64>, Vec<f64>) = closes
        .windows(2)
        .map(|w| {
            let delta = w[1] - w[0];
            (delta.max(0.0), (-delta).max(0.0))
        })
        .unzip();

    let alpha = com_alpha((RSI_PERIOD - 1) as f64);
    let avg_up = ewm(&up, alpha).last().copied().unwrap_or(0.0);
    let avg_down = ewm(&down, alpha).last().copied().unwrap_or(0.0);

    if avg_down == 0.0 {
        return Ok(100.0);
    }
    let rs = avg_up / avg_down;
    Ok(100.0 - 100.0 / (1.0 + rs))
}

/// MACD line, signal line and histogram for every day of the series
pub fn macd_series(series: &PriceSeries) -> Result<Vec<MacdPoint>> {
    let closes = series.closes();
    require(MACD_SLOW, closes.len())?;

    let fast = ewm(&closes, span_alpha(MACD_FAST));
    let slow = ewm(&closes, span_alpha(MACD_SLOW));
    let line: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();
    let signal = ewm(&line, span_alpha(MACD_SIGNAL));

    Ok(line
        .into_iter()
        .zip(signal)
        .map(|(macd, signal)| MacdPoint {
            macd,
            signal,
            histogram: macd - signal,
        })
        .collect())
}

/// Latest MACD observation
pub fn macd(series: &PriceSeries) -> Result<MacdPoint> {
    macd_series(series)?
        .last()
        .copied()
        .ok_or(StockError::EmptySeries)
}
