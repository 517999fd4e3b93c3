//! REPL command parsing
//!
//! Lines starting with `/` are commands; anything else is a question for the
//! assistant.

use crate::error::{Result, StockError};

/// Parsed line of user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Forget the conversation
    Clear,
    /// Summarise the conversation so far
    History,
    Help,
    Exit,
    /// Natural language question (not a command)
    Query { text: String },
}

impl Command {
    /// Parse a command from user input
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();

        if input.is_empty() {
            return Err(StockError::InvalidArguments("empty input".to_string()));
        }

        let Some(rest) = input.strip_prefix('/') else {
            return Ok(Command::Query {
                text: input.to_string(),
            });
        };

        let cmd = rest
            .split_whitespace()
            .next()
            .ok_or_else(|| StockError::InvalidArguments("empty command".to_string()))?
            .to_lowercase();

        match cmd.as_str() {
            "clear" | "cls" | "reset" => Ok(Command::Clear),
            "history" | "hist" => Ok(Command::History),
            "help" | "h" | "?" => Ok(Command::Help),
            "exit" | "quit" | "q" => Ok(Command::Exit),
            _ => Err(StockError::InvalidArguments(format!(
                "unknown command /{cmd}, type /help for the list"
            ))),
        }
    }

    /// Help text for the REPL
    pub fn help_text() -> &'static str {
        r#"
BullBear Commands
=================

  /clear      Forget the conversation (alias: /reset)
  /history    Show the conversation so far
  /help       Show this help
  /exit       Quit (alias: /q)

Anything else is sent to the assistant, for example:
  - "What is the latest price of AAPL?"
  - "Calculate the 50 day SMA for Microsoft"
  - "What's the RSI of Tesla?"
  - "Give me the MACD for NVDA"
  - "Plot the stock price of Amazon"
"#
    }
}
