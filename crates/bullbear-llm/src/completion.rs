//! One round trip to a chat model

use crate::{Message, ToolDefinition};
use serde::{Deserialize, Serialize};

/// Token limit used when a caller does not pick one
pub const DEFAULT_MAX_TOKENS: usize = 1024;

/// Everything the model sees for one reply
///
/// The whole conversation is resent on every call; providers keep no state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub model: String,

    /// Instructions placed ahead of the conversation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    pub messages: Vec<Message>,

    pub max_tokens: usize,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Function catalog; `None` forces a text reply
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ToolDefinition>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<ToolChoice>,
}

impl CompletionRequest {
    /// Request a reply to `messages` from `model`
    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            system: None,
            messages,
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: None,
            tools: None,
            tool_choice: None,
        }
    }

    pub fn with_system(mut self, system: Option<String>) -> Self {
        self.system = system;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    /// Offer a function catalog and let the model decide whether to use it
    pub fn with_functions(mut self, functions: Vec<ToolDefinition>) -> Self {
        self.tools = Some(functions);
        self.tool_choice = Some(ToolChoice::Auto);
        self
    }

    /// Whether the model may answer with a function call
    pub fn offers_functions(&self) -> bool {
        self.tools.as_ref().is_some_and(|t| !t.is_empty())
            && self.tool_choice != Some(ToolChoice::None)
    }
}

/// Function selection policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolChoice {
    /// The model decides between text and a function call
    Auto,
    /// The model must answer in text
    None,
}

/// The model's reply
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// Either text or a function call
    pub message: Message,
    pub stop_reason: StopReason,
    pub usage: TokenUsage,
}

/// Why the model stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    EndTurn,
    /// Cut off at `max_tokens`
    MaxTokens,
    FunctionCall,
}

/// Tokens billed for one call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: usize,
    pub completion_tokens: usize,
}

impl TokenUsage {
    pub fn total(&self) -> usize {
        self.prompt_tokens + self.completion_tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_defaults() {
        let request = CompletionRequest::new("gpt-3.5-turbo", vec![Message::user("Hello")]);

        assert_eq!(request.model, "gpt-3.5-turbo");
        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.max_tokens, DEFAULT_MAX_TOKENS);
        assert!(request.system.is_none());
        assert!(!request.offers_functions());
    }

    #[test]
    fn test_request_options() {
        let request = CompletionRequest::new("m", vec![])
            .with_system(Some("You are a stock assistant".to_string()))
            .with_max_tokens(256)
            .with_temperature(Some(0.2));

        assert_eq!(request.system.as_deref(), Some("You are a stock assistant"));
        assert_eq!(request.max_tokens, 256);
        assert_eq!(request.temperature, Some(0.2));
    }

    #[test]
    fn test_functions_imply_auto_choice() {
        let request = CompletionRequest::new("m", vec![])
            .with_functions(vec![ToolDefinition::new("f", "d", json!({}))]);

        assert_eq!(request.tool_choice, Some(ToolChoice::Auto));
        assert!(request.offers_functions());
    }

    #[test]
    fn test_serialized_request_omits_unset_fields() {
        let value = serde_json::to_value(CompletionRequest::new("m", vec![])).unwrap();
        assert!(value.get("tools").is_none());
        assert!(value.get("temperature").is_none());
    }

    #[test]
    fn test_token_usage_total() {
        let usage = TokenUsage {
            prompt_tokens: 120,
            completion_tokens: 30,
        };
        assert_eq!(usage.total(), 150);
    }
}
