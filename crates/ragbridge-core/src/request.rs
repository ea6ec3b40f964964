//! Outgoing LLM request as seen by the augmentation hook

use crate::llm::ChatMessage;
use serde::{Deserialize, Serialize};

/// A pending LLM call owned by the host framework.
///
/// The pipeline only ever borrows it mutably for the duration of one
/// hook invocation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutgoingRequest {
    /// The user's raw text
    #[serde(default)]
    pub original_query: String,

    /// System prompt sent with the request
    #[serde(default)]
    pub system_prompt: String,

    /// Prior conversation turns, oldest first
    #[serde(default)]
    pub conversation_history: Vec<ChatMessage>,

    /// Extra context strings appended downstream by the host
    #[serde(default)]
    pub contexts: Vec<String>,
}

impl OutgoingRequest {
    /// Create a request carrying only a user query
    pub fn new(original_query: impl Into<String>) -> Self {
        Self {
            original_query: original_query.into(),
            ..Default::default()
        }
    }

    /// Set the system prompt
    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = system_prompt.into();
        self
    }

    /// Append a turn to the conversation history
    pub fn with_message(mut self, message: ChatMessage) -> Self {
        self.conversation_history.push(message);
        self
    }

    /// Render the conversation history as `role: content` lines
    pub fn history_transcript(&self) -> String {
        self.conversation_history
            .iter()
            .map(|m| format!("{}: {}", m.role, m.content))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
