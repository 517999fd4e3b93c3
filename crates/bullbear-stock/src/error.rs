//! Error types for the stock assistant

use bullbear_llm::LLMError;
use thiserror::Error;

/// Stock assistant errors
#[derive(Debug, Error)]
pub enum StockError {
    /// A price series with no entries
    #[error("Price series is empty")]
    EmptySeries,

    /// Not enough points for the requested computation
    #[error("Insufficient data: {required} points required, {available} available")]
    InsufficientData { required: usize, available: usize },

    /// The provider does not know the symbol or has no history for it
    #[error("Unknown ticker: {0}")]
    UnknownTicker(String),

    /// Market data could not be fetched
    #[error("Market data provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// The model asked for a function outside the catalog
    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    /// Function arguments failed validation
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// Chat model call failed
    #[error("Model provider error: {0}")]
    ModelProviderError(#[from] LLMError),

    /// Chart rendering failed
    #[error("Chart rendering failed: {0}")]
    Chart(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type alias for stock operations
pub type Result<T> = std::result::Result<T, StockError>;

impl StockError {
    /// Readable message shown to the user when a turn fails
    pub fn user_message(&self) -> String {
        match self {
            StockError::EmptySeries => "No price data came back for that request.".to_string(),
            StockError::InsufficientData {
                required,
                available,
            } => format!(
                "Not enough price history: that needs {required} trading days but only {available} are available."
            ),
            StockError::UnknownTicker(symbol) => {
                format!("I couldn't find any market data for '{symbol}'. Check the ticker symbol.")
            }
            StockError::ProviderUnavailable(_) => {
                "The market data service is unavailable right now. Please try again later."
                    .to_string()
            }
            StockError::UnknownFunction(name) => {
                format!("The assistant tried to use an unsupported function '{name}'.")
            }
            StockError::InvalidArguments(reason) => {
                format!("The request could not be understood: {reason}.")
            }
            StockError::ModelProviderError(_) => {
                "The language model could not be reached. Please try again.".to_string()
            }
            StockError::Chart(_) => "The price chart could not be drawn.".to_string(),
            StockError::ConfigError(reason) => format!("Configuration problem: {reason}."),
        }
    }
}

impl From<bullbear_utils::ConfigError> for StockError {
    fn from(err: bullbear_utils::ConfigError) -> Self {
        StockError::ConfigError(err.to_string())
    }
}
