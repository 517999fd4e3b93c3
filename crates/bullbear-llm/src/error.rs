//! Failures of a chat model round trip

use thiserror::Error;

pub type Result<T> = std::result::Result<T, LLMError>;

#[derive(Error, Debug)]
pub enum LLMError {
    /// The server answered with an unexpected status or could not be reached
    #[error("chat completion failed: {0}")]
    RequestFailed(String),

    #[error("the API key was rejected")]
    AuthenticationFailed,

    #[error("rate limited by the model provider: {0}")]
    RateLimitExceeded(String),

    /// The server refused the request body
    #[error("request rejected: {0}")]
    InvalidRequest(String),

    #[error("no such model: {0}")]
    ModelNotFound(String),

    #[error("JSON encoding failed: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[cfg(feature = "openai")]
    #[error("transport error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// The reply could not be turned into a message
    #[error("unexpected reply: {0}")]
    UnexpectedResponse(String),

    #[error("provider misconfigured: {0}")]
    ConfigurationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(
            LLMError::ModelNotFound("gpt-x".to_string()).to_string(),
            "no such model: gpt-x"
        );
        assert_eq!(
            LLMError::AuthenticationFailed.to_string(),
            "the API key was rejected"
        );
    }
}
