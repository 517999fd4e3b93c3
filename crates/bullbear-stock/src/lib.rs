//! Chat-driven stock assistant
//!
//! A user asks about a stock in plain language; a chat model picks one of six
//! functions (latest price, SMA, EMA, RSI, MACD or a one-year price chart),
//! this crate runs it over a fresh year of daily closes, and the model turns
//! the number into an answer. Charts come back as images without a second
//! model call.
//!
//! # Architecture
//!
//! - [`indicators`]: pure SMA/EMA/RSI/MACD computations over a [`PriceSeries`]
//! - [`api`]: the [`MarketDataProvider`] seam and its Yahoo Finance client
//! - [`tools`]: the function catalog, typed [`IndicatorRequest`]s and the
//!   chart renderer
//! - [`dispatcher`]: runs a request and serializes the result
//! - [`session`]: conversation state and the per-turn state machine
//!
//! # Example
//!
//! ```rust,ignore
//! use bullbear_llm::providers::OpenAIProvider;
//! use bullbear_stock::{AssistantConfig, ChatSession, YahooFinanceClient};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let llm = Arc::new(OpenAIProvider::from_env()?);
//!     let market = Arc::new(YahooFinanceClient::new());
//!     let mut session = ChatSession::new(llm, market, AssistantConfig::from_env()?);
//!
//!     let reply = session.handle_turn("What is the RSI of Apple?").await;
//!     println!("{reply:?}");
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod indicators;
pub mod series;
pub mod session;
pub mod tools;

// Re-export main types for convenience
pub use api::{MarketDataProvider, YahooFinanceClient};
pub use config::AssistantConfig;
pub use dispatcher::{Dispatcher, IndicatorResult};
pub use error::{Result, StockError};
pub use indicators::MacdPoint;
pub use series::{PricePoint, PriceSeries};
pub use session::{ChatSession, ConversationState, TurnReply, TurnState};
pub use tools::{ChartImage, ChartOptions, IndicatorRequest, StockFunction, Ticker};
