//! Message types for chat-completion conversations
//!
//! A conversation is an ordered list of [`Message`]s. Besides plain user and
//! assistant text, the assistant may ask for a function to be called, and the
//! caller answers with a `function` role message carrying the result.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Who wrote a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The person chatting
    User,
    /// The model
    Assistant,
    /// Standing instructions
    System,
    /// Result of a function the assistant asked for
    Function,
}

/// A function invocation requested by the assistant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    /// Provider-assigned call id, echoed back with the result
    pub id: String,
    /// Function name from the catalog
    pub name: String,
    /// Decoded JSON arguments
    pub arguments: Value,
}

impl FunctionCall {
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }
}

/// One piece of a structured message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    /// Prose
    Text { text: String },

    /// Function call request from the assistant
    FunctionCall(FunctionCall),

    /// Function result sent back to the model
    FunctionResult {
        /// Id of the call this answers
        call_id: String,
        /// Serialized result
        content: String,
    },
}

/// Body of a message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    /// Plain text only
    Text(String),
    /// Text mixed with function calls or results
    Blocks(Vec<ContentBlock>),
}

/// One entry of a conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<MessageContent>,

    /// Function name, set on `function` role messages
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Message {
    fn with_text(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            content: Some(MessageContent::Text(text.into())),
            name: None,
        }
    }

    /// Text from the user
    pub fn user(text: impl Into<String>) -> Self {
        Self::with_text(Role::User, text)
    }

    /// Text from the model
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::with_text(Role::Assistant, text)
    }

    /// Create an assistant message that requests a single function call
    pub fn function_call(call: FunctionCall) -> Self {
        Self {
            role: Role::Assistant,
            content: Some(MessageContent::Blocks(vec![ContentBlock::FunctionCall(call)])),
            name: None,
        }
    }

    /// Create a function result message answering `call_id`
    pub fn function_result(
        call_id: impl Into<String>,
        name: impl Into<String>,
        result: impl Into<String>,
    ) -> Self {
        Self {
            role: Role::Function,
            content: Some(MessageContent::Blocks(vec![ContentBlock::FunctionResult {
                call_id: call_id.into(),
                content: result.into(),
            }])),
            name: Some(name.into()),
        }
    }

    /// Extract text content from the message
    ///
    /// For function result messages this is the serialized result.
    pub fn text(&self) -> Option<&str> {
        match &self.content {
            Some(MessageContent::Text(s)) => Some(s),
            Some(MessageContent::Blocks(blocks)) => blocks.iter().find_map(|b| match b {
                ContentBlock::Text { text } => Some(text.as_str()),
                ContentBlock::FunctionResult { content, .. } => Some(content.as_str()),
                ContentBlock::FunctionCall(_) => None,
            }),
            None => None,
        }
    }

    /// All function calls requested in this message
    pub fn function_calls(&self) -> Vec<&FunctionCall> {
        match &self.content {
            Some(MessageContent::Blocks(blocks)) => blocks
                .iter()
                .filter_map(|b| match b {
                    ContentBlock::FunctionCall(call) => Some(call),
                    _ => None,
                })
                .collect(),
            _ => vec![],
        }
    }

    /// The first requested function call, if any
    pub fn first_function_call(&self) -> Option<&FunctionCall> {
        self.function_calls().into_iter().next()
    }

    /// Check if this message requests a function call
    pub fn has_function_call(&self) -> bool {
        self.first_function_call().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_user_text() {
        let msg = Message::user("Hello");
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.text(), Some("Hello"));
        assert!(msg.name.is_none());
    }

    #[test]
    fn test_function_call_message() {
        let call = FunctionCall::new("call_1", "calculate_rsi", json!({"ticker": "AAPL"}));
        let msg = Message::function_call(call.clone());
        assert_eq!(msg.role, Role::Assistant);
        assert!(msg.has_function_call());
        assert_eq!(msg.first_function_call(), Some(&call));
        assert_eq!(msg.text(), None);
    }

    #[test]
    fn test_function_result_message() {
        let msg = Message::function_result("call_1", "calculate_rsi", "55.2");
        assert_eq!(msg.role, Role::Function);
        assert_eq!(msg.name.as_deref(), Some("calculate_rsi"));
        assert_eq!(msg.text(), Some("55.2"));
        assert!(!msg.has_function_call());
    }

    #[test]
    fn test_role_serialization() {
        assert_eq!(serde_json::to_value(Role::Function).unwrap(), json!("function"));
    }
}
