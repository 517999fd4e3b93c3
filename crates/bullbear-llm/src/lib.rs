//! Chat-completion provider layer for BullBear
//!
//! Provider-agnostic types for talking to a chat model that can call
//! functions:
//!
//! - Conversation messages, including function calls and function results
//! - Completion request/response types
//! - Function definitions with JSON-schema parameter specs
//! - The [`LLMProvider`] trait and an OpenAI-compatible implementation
//!   (behind the `openai` feature)

pub mod completion;
pub mod error;
pub mod messages;
pub mod provider;
pub mod tools;

// Re-export main types
pub use completion::{CompletionRequest, CompletionResponse, StopReason, TokenUsage, ToolChoice};
pub use error::{LLMError, Result};
pub use messages::{ContentBlock, FunctionCall, Message, MessageContent, Role};
pub use provider::LLMProvider;
pub use tools::ToolDefinition;

// Provider implementations (feature-gated)
#[cfg(feature = "openai")]
pub mod providers;
