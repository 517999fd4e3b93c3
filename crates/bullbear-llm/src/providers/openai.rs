//! OpenAI-compatible chat completions provider
//!
//! Speaks `/chat/completions` with function calling through the `tools`
//! array, so it also works against local servers that copy the protocol
//! (LM Studio, llama.cpp, vLLM).
//!
//! ```no_run
//! use bullbear_llm::{CompletionRequest, LLMProvider, Message};
//! use bullbear_llm::providers::{OpenAIConfig, OpenAIProvider};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = OpenAIProvider::with_config(OpenAIConfig::new("sk-...").with_timeout(60))?;
//!
//! let request = CompletionRequest::new("gpt-3.5-turbo", vec![Message::user("Hello!")]);
//! let response = provider.complete(request).await?;
//! println!("{}", response.message.text().unwrap_or_default());
//! # Ok(())
//! # }
//! ```

use crate::{
    CompletionRequest, CompletionResponse, ContentBlock, FunctionCall, LLMError, LLMProvider,
    Message, MessageContent, Result, Role, StopReason, TokenUsage, ToolChoice, ToolDefinition,
};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument, warn};

const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Connection settings
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    pub api_key: String,

    /// Base URL without the trailing `/chat/completions`
    pub api_base: String,

    /// Whole-request timeout in seconds
    pub timeout_secs: u64,
}

impl OpenAIConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    /// `OPENAI_API_KEY` (required) and `OPENAI_API_BASE` (optional)
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| {
            LLMError::ConfigurationError("OPENAI_API_KEY is not set".to_string())
        })?;

        let mut config = Self::new(api_key);
        if let Ok(base) = std::env::var("OPENAI_API_BASE") {
            config.api_base = base;
        }
        Ok(config)
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.api_base.trim_end_matches('/'))
    }
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base: DEFAULT_API_BASE.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Chat completions over HTTP
pub struct OpenAIProvider {
    client: Client,
    config: OpenAIConfig,
}

impl OpenAIProvider {
    pub fn with_config(config: OpenAIConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_config(OpenAIConfig::new(api_key))
    }

    pub fn from_env() -> Result<Self> {
        Self::with_config(OpenAIConfig::from_env()?)
    }

    pub fn config(&self) -> &OpenAIConfig {
        &self.config
    }
}

#[async_trait]
impl LLMProvider for OpenAIProvider {
    #[instrument(skip(self, request), fields(model = %request.model, api_base = %self.config.api_base))]
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let model = request.model.clone();
        let body = ChatRequest::from(request);
        debug!(
            messages = body.messages.len(),
            functions = body.tools.as_ref().map_or(0, Vec::len),
            "Sending chat completion request"
        );

        let response = self
            .client
            .post(self.config.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(status_error(status, detail, model));
        }

        let reply: ChatResponse = response
            .json()
            .await
            .map_err(|e| LLMError::UnexpectedResponse(format!("cannot decode reply: {e}")))?;
        let completion = reply.into_completion()?;

        debug!(
            stop_reason = ?completion.stop_reason,
            prompt_tokens = completion.usage.prompt_tokens,
            completion_tokens = completion.usage.completion_tokens,
            "Received chat completion"
        );
        Ok(completion)
    }

    fn name(&self) -> &str {
        "openai"
    }
}

fn status_error(status: StatusCode, detail: String, model: String) -> LLMError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => LLMError::AuthenticationFailed,
        StatusCode::TOO_MANY_REQUESTS => LLMError::RateLimitExceeded(detail),
        StatusCode::BAD_REQUEST => LLMError::InvalidRequest(detail),
        StatusCode::NOT_FOUND => LLMError::ModelNotFound(model),
        _ => LLMError::RequestFailed(format!("HTTP {status}: {detail}")),
    }
}

// Outgoing wire format

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<WireMessage>,
    max_tokens: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<WireTool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<&'static str>,
}

impl From<CompletionRequest> for ChatRequest {
    fn from(request: CompletionRequest) -> Self {
        let system = request.system.map(|text| WireMessage::plain("system", text));
        let messages = system
            .into_iter()
            .chain(request.messages.into_iter().flat_map(WireMessage::from_message))
            .collect();

        Self {
            model: request.model,
            messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            tools: request
                .tools
                .map(|defs| defs.iter().map(WireTool::from).collect()),
            tool_choice: request.tool_choice.map(|choice| match choice {
                ToolChoice::Auto => "auto",
                ToolChoice::None => "none",
            }),
        }
    }
}

#[derive(Debug, Default, Serialize)]
struct WireMessage {
    role: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<WireToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

impl WireMessage {
    fn plain(role: &'static str, content: String) -> Self {
        Self {
            role,
            content: Some(content),
            ..Self::default()
        }
    }

    /// One message may expand to several: an assistant turn carrying calls
    /// and one `tool` message per function result
    fn from_message(message: Message) -> Vec<Self> {
        let role = match message.role {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
            Role::Function => "tool",
        };

        let blocks = match message.content {
            Some(MessageContent::Text(text)) => return vec![Self::plain(role, text)],
            None => return vec![Self::plain(role, String::new())],
            Some(MessageContent::Blocks(blocks)) => blocks,
        };

        let mut text = Vec::new();
        let mut calls = Vec::new();
        let mut results = Vec::new();
        for block in blocks {
            match block {
                ContentBlock::Text { text: t } => text.push(t),
                ContentBlock::FunctionCall(call) => calls.push(WireToolCall::from(call)),
                ContentBlock::FunctionResult { call_id, content } => results.push(Self {
                    role: "tool",
                    content: Some(content),
                    tool_call_id: Some(call_id),
                    name: message.name.clone(),
                    ..Self::default()
                }),
            }
        }

        let head = (!text.is_empty() || !calls.is_empty()).then(|| Self {
            role,
            content: (!text.is_empty()).then(|| text.join("\n")),
            tool_calls: (!calls.is_empty()).then_some(calls),
            ..Self::default()
        });
        head.into_iter().chain(results).collect()
    }
}

#[derive(Debug, Serialize)]
struct WireTool {
    #[serde(rename = "type")]
    kind: &'static str,
    function: WireFunction,
}

impl From<&ToolDefinition> for WireTool {
    fn from(def: &ToolDefinition) -> Self {
        Self {
            kind: "function",
            function: WireFunction {
                name: def.name.clone(),
                description: def.description.clone(),
                parameters: def.parameters.clone(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct WireFunction {
    name: String,
    description: String,
    parameters: Value,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireToolCall {
    id: String,
    #[serde(rename = "type", default = "function_kind")]
    kind: String,
    function: WireFunctionCall,
}

fn function_kind() -> String {
    "function".to_string()
}

impl From<FunctionCall> for WireToolCall {
    fn from(call: FunctionCall) -> Self {
        Self {
            id: call.id,
            kind: function_kind(),
            function: WireFunctionCall {
                name: call.name,
                arguments: Some(call.arguments.to_string()),
            },
        }
    }
}

/// Arguments travel as a JSON-encoded string; some servers send `null`
#[derive(Debug, Serialize, Deserialize)]
struct WireFunctionCall {
    name: String,
    #[serde(default)]
    arguments: Option<String>,
}

// Incoming wire format

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<TokenUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ReplyMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: Option<String>,
    /// Local servers send `null` rather than omitting the key
    #[serde(default)]
    tool_calls: Option<Vec<WireToolCall>>,
}

impl ChatResponse {
    fn into_completion(self) -> Result<CompletionResponse> {
        let usage = self.usage.unwrap_or_default();
        let choice = self
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LLMError::UnexpectedResponse("reply has no choices".to_string()))?;

        let message = choice.message.into_message()?;
        let stop_reason = if message.has_function_call() {
            StopReason::FunctionCall
        } else {
            stop_reason(choice.finish_reason.as_deref())
        };

        Ok(CompletionResponse {
            message,
            stop_reason,
            usage,
        })
    }
}

impl ReplyMessage {
    fn into_message(self) -> Result<Message> {
        let mut blocks: Vec<ContentBlock> = self
            .content
            .filter(|c| !c.is_empty())
            .map(|text| ContentBlock::Text { text })
            .into_iter()
            .collect();

        for call in self.tool_calls.into_iter().flatten() {
            let arguments = decode_arguments(&call.function)?;
            blocks.push(ContentBlock::FunctionCall(FunctionCall::new(
                call.id,
                call.function.name,
                arguments,
            )));
        }

        if blocks.is_empty() {
            blocks.push(ContentBlock::Text {
                text: String::new(),
            });
        }

        Ok(Message {
            role: Role::Assistant,
            content: Some(MessageContent::Blocks(blocks)),
            name: None,
        })
    }
}

/// Blank or missing arguments decode to an empty object
fn decode_arguments(call: &WireFunctionCall) -> Result<Value> {
    let raw = call.arguments.as_deref().unwrap_or_default().trim();
    if raw.is_empty() {
        return Ok(Value::Object(serde_json::Map::new()));
    }
    serde_json::from_str(raw).map_err(|e| {
        LLMError::UnexpectedResponse(format!("arguments for {} are not JSON: {e}", call.name))
    })
}

fn stop_reason(finish_reason: Option<&str>) -> StopReason {
    match finish_reason {
        None | Some("stop") => StopReason::EndTurn,
        Some("length") => StopReason::MaxTokens,
        Some("tool_calls" | "function_call") => StopReason::FunctionCall,
        Some(other) => {
            warn!(finish_reason = other, "Unrecognised finish reason");
            StopReason::EndTurn
        }
    }
}
