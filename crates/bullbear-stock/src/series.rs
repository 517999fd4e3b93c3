//! Daily closing-price series

use crate::error::{Result, StockError};
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// One trading day's close
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

/// Closing prices for one ticker, oldest first
///
/// Never empty. Built once per request from a fresh fetch and dropped after
/// the computation that asked for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    ticker: String,
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Build a series, sorting points by date
    pub fn new(ticker: impl Into<String>, mut points: Vec<PricePoint>) -> Result<Self> {
        if points.is_empty() {
            return Err(StockError::EmptySeries);
        }
        points.sort_by_key(|p| p.date);

        Ok(Self {
            ticker: ticker.into(),
            points,
        })
    }

    /// Build a series from bare closes on consecutive calendar days
    /// starting 2024-01-01
    pub fn from_closes(ticker: impl Into<String>, closes: &[f64]) -> Result<Self> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default();
        let points = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PricePoint {
                date: start
                    .checked_add_days(Days::new(i as u64))
                    .unwrap_or(NaiveDate::MAX),
                close,
            })
            .collect();
        Self::new(ticker, points)
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    /// Closing prices in date order
    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Most recent point
    pub fn latest(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    /// First and last dates covered
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((self.points.first()?.date, self.points.last()?.date))
    }
}
