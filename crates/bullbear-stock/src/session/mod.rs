//! Chat session
//!
//! A [`ChatSession`] owns one conversation and runs each user turn:
//!
//! 1. The model sees the history plus the new user message and the function
//!    catalog, and either answers in text or asks for one function.
//! 2. A requested function is parsed into an [`IndicatorRequest`] and run by
//!    the [`Dispatcher`].
//! 3. Chart results go straight back to the caller. Any other result is
//!    recorded as a function call/result pair and the model is asked again,
//!    without the catalog, to phrase the answer.
//!
//! A turn either completes and commits all of its messages, or fails and
//! commits none of them.
//!
//! # Example
//!
//! ```rust,ignore
//! use bullbear_stock::{AssistantConfig, ChatSession, TurnReply};
//!
//! let mut session = ChatSession::new(llm, market, AssistantConfig::default());
//! match session.handle_turn("What is the 50 day SMA of MSFT?").await {
//!     TurnReply::Text(text) => println!("{text}"),
//!     TurnReply::Chart(image) => save(image),
//!     TurnReply::Error(message) => eprintln!("{message}"),
//! }
//! ```

pub mod commands;
pub mod conversation;

pub use commands::Command;
pub use conversation::ConversationState;

use crate::api::MarketDataProvider;
use crate::config::AssistantConfig;
use crate::dispatcher::{Dispatcher, IndicatorResult};
use crate::error::{Result, StockError};
use crate::tools::{self, ChartImage, IndicatorRequest};
use bullbear_llm::{CompletionRequest, LLMError, LLMProvider, Message};
use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Where a session is within the current turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    AwaitingInput,
    ModelCallIssued,
    DirectTextReply,
    FunctionCallDetected,
    FunctionInvoked,
    SecondModelCallIssued,
    TextReply,
}

impl fmt::Display for TurnState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TurnState::AwaitingInput => "awaiting_input",
            TurnState::ModelCallIssued => "model_call_issued",
            TurnState::DirectTextReply => "direct_text_reply",
            TurnState::FunctionCallDetected => "function_call_detected",
            TurnState::FunctionInvoked => "function_invoked",
            TurnState::SecondModelCallIssued => "second_model_call_issued",
            TurnState::TextReply => "text_reply",
        };
        f.write_str(name)
    }
}

/// What the user sees at the end of a turn
#[derive(Debug, Clone, PartialEq)]
pub enum TurnReply {
    Text(String),
    Chart(ChartImage),
    /// The turn failed; history is unchanged
    Error(String),
}

/// One user's conversation with the assistant
pub struct ChatSession {
    id: Uuid,
    llm: Arc<dyn LLMProvider>,
    dispatcher: Dispatcher,
    config: AssistantConfig,
    conversation: ConversationState,
    state: TurnState,
    turns: u64,
    started_at: DateTime<Utc>,
}

impl ChatSession {
    /// Start a session with an empty conversation
    pub fn new(
        llm: Arc<dyn LLMProvider>,
        market: Arc<dyn MarketDataProvider>,
        config: AssistantConfig,
    ) -> Self {
        let dispatcher = Dispatcher::new(market).with_chart_options(config.chart);
        let id = Uuid::new_v4();
        info!(session = %id, model = %config.model, "Chat session started");

        Self {
            id,
            llm,
            dispatcher,
            config,
            conversation: ConversationState::new(),
            state: TurnState::AwaitingInput,
            turns: 0,
            started_at: Utc::now(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> TurnState {
        self.state
    }

    pub fn conversation(&self) -> &ConversationState {
        &self.conversation
    }

    pub fn config(&self) -> &AssistantConfig {
        &self.config
    }

    /// Turns started so far, including failed ones
    pub fn turn_count(&self) -> u64 {
        self.turns
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// One-line description used by `/history`
    pub fn summary(&self) -> String {
        format!(
            "Session {} on {}, started {} UTC, {} turns",
            self.id,
            self.config.model,
            self.started_at.format("%Y-%m-%d %H:%M:%S"),
            self.turns
        )
    }

    /// File name for a chart produced in the latest turn, unique per session
    /// and turn
    pub fn chart_file_name(&self, image: &ChartImage) -> String {
        format!(
            "{}-{}-{}.{}",
            image.ticker,
            self.id.simple(),
            self.turns,
            image.extension()
        )
    }

    /// Forget the conversation, keeping the session id
    pub fn clear(&mut self) {
        self.conversation.clear();
        self.state = TurnState::AwaitingInput;
        info!(session = %self.id, "Conversation cleared");
    }

    /// Close the session, handing back its history
    pub fn end(self) -> ConversationState {
        info!(
            session = %self.id,
            turns = self.turns,
            messages = self.conversation.len(),
            "Chat session ended"
        );
        self.conversation
    }

    /// Run one turn, turning any failure into a readable message
    pub async fn handle_turn(&mut self, input: &str) -> TurnReply {
        match self.try_turn(input).await {
            Ok(reply) => reply,
            Err(err) => {
                warn!(session = %self.id, turn = self.turns, error = %err, "Turn failed");
                self.state = TurnState::AwaitingInput;
                TurnReply::Error(err.user_message())
            }
        }
    }

    /// Run one turn, propagating failures
    ///
    /// History is only extended when the turn succeeds.
    #[instrument(skip(self, input), fields(session = %self.id, turn = self.turns + 1))]
    pub async fn try_turn(&mut self, input: &str) -> Result<TurnReply> {
        let input = input.trim();
        if input.is_empty() {
            return Err(StockError::InvalidArguments(
                "message must not be empty".to_string(),
            ));
        }

        self.turns += 1;
        let mut pending = vec![Message::user(input)];

        self.transition(TurnState::ModelCallIssued);
        let first = self.first_request(&pending);
        let response = self.llm.complete(first).await?;
        debug!(
            tokens = response.usage.total(),
            stop_reason = ?response.stop_reason,
            "First model reply"
        );

        let Some(call) = response.message.first_function_call().cloned() else {
            self.transition(TurnState::DirectTextReply);
            let text = reply_text(&response.message)?;
            pending.push(Message::assistant(text.clone()));
            return Ok(self.complete(pending, TurnReply::Text(text)));
        };

        self.transition(TurnState::FunctionCallDetected);
        if response.message.function_calls().len() > 1 {
            debug!(
                calls = response.message.function_calls().len(),
                "Only the first function call is used"
            );
        }

        let request = IndicatorRequest::parse(&call.name, &call.arguments)?;
        let result = self.dispatcher.invoke(&request).await?;
        self.transition(TurnState::FunctionInvoked);

        let text = match result {
            IndicatorResult::Chart(image) => {
                return Ok(self.complete(pending, TurnReply::Chart(image)));
            }
            other => other.to_text().unwrap_or_default(),
        };
        debug!(function = %call.name, result = %text, "Function result");

        pending.push(Message::function_call(call.clone()));
        pending.push(Message::function_result(call.id, call.name, text));

        self.transition(TurnState::SecondModelCallIssued);
        let second = self.second_request(&pending);
        let response = self.llm.complete(second).await?;
        let text = reply_text(&response.message)?;

        self.transition(TurnState::TextReply);
        pending.push(Message::assistant(text.clone()));
        Ok(self.complete(pending, TurnReply::Text(text)))
    }

    fn first_request(&self, pending: &[Message]) -> CompletionRequest {
        self.request(pending).with_functions(tools::catalog())
    }

    fn second_request(&self, pending: &[Message]) -> CompletionRequest {
        self.request(pending)
    }

    /// History plus this turn's uncommitted messages
    fn request(&self, pending: &[Message]) -> CompletionRequest {
        let messages = self
            .conversation
            .messages()
            .iter()
            .chain(pending)
            .cloned()
            .collect();

        CompletionRequest::new(&self.config.model, messages)
            .with_system(self.config.system_prompt.clone())
            .with_max_tokens(self.config.max_tokens)
            .with_temperature(self.config.temperature)
    }

    fn complete(&mut self, pending: Vec<Message>, reply: TurnReply) -> TurnReply {
        self.conversation.commit(pending);
        self.transition(TurnState::AwaitingInput);
        info!(messages = self.conversation.len(), "Turn completed");
        reply
    }

    fn transition(&mut self, next: TurnState) {
        debug!(from = %self.state, to = %next, "Turn state");
        self.state = next;
    }
}

impl fmt::Debug for ChatSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatSession")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("turns", &self.turns)
            .field("messages", &self.conversation.len())
            .finish_non_exhaustive()
    }
}

fn reply_text(message: &Message) -> Result<String> {
    message.text().map(str::to_string).ok_or_else(|| {
        StockError::ModelProviderError(LLMError::UnexpectedResponse(
            "model reply had neither text nor a function call".to_string(),
        ))
    })
}
