//! Price chart rendering
//!
//! Charts are drawn to an in-memory SVG document and handed back to the
//! caller; nothing is written to shared files here.

use crate::error::{Result, StockError};
use crate::series::PriceSeries;
use chrono::Days;
use plotters::prelude::*;
use serde::{Deserialize, Serialize};

/// MIME type of rendered charts
pub const CHART_MIME_TYPE: &str = "image/svg+xml";

/// Canvas size for rendered charts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartOptions {
    pub width: u32,
    pub height: u32,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 500,
        }
    }
}

/// A rendered chart
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartImage {
    /// Ticker the chart shows
    pub ticker: String,
    /// MIME type of `bytes`
    pub mime_type: &'static str,
    /// Encoded image
    pub bytes: Vec<u8>,
}

impl ChartImage {
    /// File extension matching the encoding
    pub fn extension(&self) -> &'static str {
        "svg"
    }
}

fn chart_error(err: impl std::fmt::Display) -> StockError {
    StockError::Chart(err.to_string())
}

/// Draw closing price against date with labeled axes and a grid
pub fn render_price_chart(series: &PriceSeries, options: &ChartOptions) -> Result<ChartImage> {
    let (start, mut end) = series.date_range().ok_or(StockError::EmptySeries)?;
    if start == end {
        end = end.checked_add_days(Days::new(1)).unwrap_or(end);
    }

    let closes = series.closes();
    let low = closes.iter().copied().fold(f64::INFINITY, f64::min);
    let high = closes.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let pad = ((high - low) * 0.05).max(high.abs() * 0.01).max(0.01);

    let title = format!("{} Stock Price Over Last Year", series.ticker());
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (options.width, options.height))
            .into_drawing_area();
        root.fill(&WHITE).map_err(chart_error)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(&title, ("sans-serif", 24))
            .margin(12)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(start..end, (low - pad)..(high + pad))
            .map_err(chart_error)?;

        chart
            .configure_mesh()
            .x_desc("Date")
            .y_desc("Stock Price ($)")
            .x_labels(8)
            .x_label_formatter(&|d| d.format("%Y-%m-%d").to_string())
            .y_label_formatter(&|v| format!("{v:.2}"))
            .draw()
            .map_err(chart_error)?;

        chart
            .draw_series(LineSeries::new(
                series.points().iter().map(|p| (p.date, p.close)),
                BLUE.stroke_width(2),
            ))
            .map_err(chart_error)?;

        root.present().map_err(chart_error)?;
    }

    Ok(ChartImage {
        ticker: series.ticker().to_string(),
        mime_type: CHART_MIME_TYPE,
        bytes: svg.into_bytes(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(closes: &[f64]) -> ChartImage {
        let series = PriceSeries::from_closes("AAPL", closes).unwrap();
        render_price_chart(&series, &ChartOptions::default()).unwrap()
    }

    #[test]
    fn test_render_produces_svg_with_labels() {
        let closes: Vec<f64> = (0..60).map(|i| 150.0 + f64::from(i % 7)).collect();
        let image = render(&closes);
        let svg = String::from_utf8(image.bytes).unwrap();

        assert_eq!(image.mime_type, "image/svg+xml");
        assert_eq!(image.ticker, "AAPL");
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("AAPL Stock Price Over Last Year"));
        assert!(svg.contains("Date"));
        assert!(svg.contains("Stock Price ($)"));
        assert!(svg.contains("polyline"));
    }

    #[test]
    fn test_render_single_point() {
        let image = render(&[42.0]);
        assert!(!image.bytes.is_empty());
    }

    #[test]
    fn test_render_flat_series() {
        let image = render(&[10.0; 5]);
        assert!(!image.bytes.is_empty());
    }
}
