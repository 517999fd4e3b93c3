//! Conversation history for a chat session
//!
//! Messages are only ever appended. A turn in progress works on a scratch
//! copy and commits it in one step, so a failed turn leaves no trace.

use bullbear_llm::{Message, Role};

/// Ordered messages exchanged in one session
#[derive(Debug, Clone, Default)]
pub struct ConversationState {
    messages: Vec<Message>,
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages in the order they were exchanged
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Append messages produced by a completed turn
    pub(crate) fn commit(&mut self, messages: impl IntoIterator<Item = Message>) {
        self.messages.extend(messages);
    }

    /// Drop all messages
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Count of messages per role: (user, assistant, function)
    pub fn role_counts(&self) -> (usize, usize, usize) {
        self.messages
            .iter()
            .fold((0, 0, 0), |(u, a, f), m| match m.role {
                Role::User => (u + 1, a, f),
                Role::Assistant => (u, a + 1, f),
                Role::Function => (u, a, f + 1),
                Role::System => (u, a, f),
            })
    }

    /// Short human-readable summary of the last `n` messages
    pub fn format_recent(&self, n: usize) -> String {
        let start = self.messages.len().saturating_sub(n);
        let mut out = String::new();

        for message in &self.messages[start..] {
            let label = match message.role {
                Role::User => "user".to_string(),
                Role::Assistant => match message.first_function_call() {
                    Some(call) => format!("assistant -> {}", call.name),
                    None => "assistant".to_string(),
                },
                Role::Function => {
                    format!("function {}", message.name.as_deref().unwrap_or("?"))
                }
                Role::System => "system".to_string(),
            };
            let text = message.text().unwrap_or("");
            let excerpt: String = text.chars().take(80).collect();
            let ellipsis = if text.chars().count() > 80 { "..." } else { "" };
            out.push_str(&format!("[{label}] {excerpt}{ellipsis}\n"));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bullbear_llm::FunctionCall;
    use serde_json::json;

    fn sample() -> ConversationState {
        let mut state = ConversationState::new();
        let call = FunctionCall::new("call_1", "calculate_rsi", json!({"ticker": "AAPL"}));
        state.commit([
            Message::user("What is the RSI of Apple?"),
            Message::function_call(call),
            Message::function_result("call_1", "calculate_rsi", "61.2"),
            Message::assistant("Apple's RSI is 61.2."),
        ]);
        state
    }

    #[test]
    fn test_commit_preserves_order() {
        let state = sample();
        let roles: Vec<Role> = state.messages().iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![Role::User, Role::Assistant, Role::Function, Role::Assistant]
        );
        assert_eq!(state.last().and_then(Message::text), Some("Apple's RSI is 61.2."));
    }

    #[test]
    fn test_role_counts() {
        assert_eq!(sample().role_counts(), (1, 2, 1));
    }

    #[test]
    fn test_format_recent() {
        let text = sample().format_recent(2);
        assert_eq!(text.lines().count(), 2);
        assert!(text.contains("[function calculate_rsi] 61.2"));
        assert!(!text.contains("What is the RSI"));
    }

    #[test]
    fn test_clear() {
        let mut state = sample();
        state.clear();
        assert!(state.is_empty());
    }
}
