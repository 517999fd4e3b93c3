//! LLM provider trait definition

use crate::{CompletionRequest, CompletionResponse, Result};
use async_trait::async_trait;

/// Trait for chat-completion providers
///
/// A provider receives the whole conversation on every call and returns the
/// next assistant message, which is either plain text or a function call.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Generate the next assistant message
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;

    /// Provider name used in logs (e.g. "openai")
    fn name(&self) -> &str;
}
