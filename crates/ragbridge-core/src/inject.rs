//! Context injection into outgoing requests

use crate::llm::ChatMessage;
use crate::request::OutgoingRequest;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Where retrieved content is merged into the request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InjectionMethod {
    /// Append to the system prompt
    #[default]
    #[serde(rename = "system_prompt")]
    SystemPrompt,

    /// Prefix the user's query
    #[serde(rename = "user_prompt")]
    UserPromptPrefix,

    /// Push a new system message onto the conversation history
    #[serde(rename = "insert_system_prompt")]
    InsertSystemMessage,
}

impl InjectionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SystemPrompt => "system_prompt",
            Self::UserPromptPrefix => "user_prompt",
            Self::InsertSystemMessage => "insert_system_prompt",
        }
    }
}

impl fmt::Display for InjectionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InjectionMethod {
    type Err = crate::error::RagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "system_prompt" => Ok(Self::SystemPrompt),
            "user_prompt" => Ok(Self::UserPromptPrefix),
            "insert_system_prompt" => Ok(Self::InsertSystemMessage),
            other => Err(crate::error::RagError::Config(format!(
                "unknown injection method '{}' (expected user_prompt, system_prompt or insert_system_prompt)",
                other
            ))),
        }
    }
}

/// Separators and optional framing for the injected block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InjectionFormat {
    /// Placed between chunk contents
    pub chunk_separator: String,
    /// Placed between the block and existing prompt text
    pub prompt_separator: String,
    pub header: Option<String>,
    pub footer: Option<String>,
}

impl Default for InjectionFormat {
    fn default() -> Self {
        Self {
            chunk_separator: "\n\n".to_string(),
            prompt_separator: "\n\n".to_string(),
            header: None,
            footer: None,
        }
    }
}

impl InjectionFormat {
    /// Join contents into one block. Blank contents are skipped; when
    /// nothing is left the block is empty, even with a header or footer.
    pub fn content_block(&self, contents: &[String]) -> String {
        let kept: Vec<&str> = contents
            .iter()
            .map(String::as_str)
            .filter(|c| !c.trim().is_empty())
            .collect();
        if kept.is_empty() {
            return String::new();
        }

        let body = kept.join(&self.chunk_separator);
        let mut parts: Vec<&str> = Vec::with_capacity(3);
        if let Some(ref header) = self.header {
            parts.push(header);
        }
        parts.push(&body);
        if let Some(ref footer) = self.footer {
            parts.push(footer);
        }
        parts.join("\n")
    }
}

/// Merge `content_block` into `request` using exactly one method.
///
/// An empty block leaves the request untouched.
pub fn inject(
    request: &mut OutgoingRequest,
    content_block: &str,
    method: InjectionMethod,
    format: &InjectionFormat,
) {
    if content_block.is_empty() {
        return;
    }

    match method {
        InjectionMethod::SystemPrompt => {
            if request.system_prompt.is_empty() {
                request.system_prompt = content_block.to_string();
            } else {
                request.system_prompt.push_str(&format.prompt_separator);
                request.system_prompt.push_str(content_block);
            }
            tracing::debug!("RAG content injected into system prompt");
        }
        InjectionMethod::UserPromptPrefix => {
            request.original_query = format!(
                "{}{}{}",
                content_block, format.prompt_separator, request.original_query
            );
            tracing::debug!("RAG content injected into user prompt");
        }
        InjectionMethod::InsertSystemMessage => {
            request
                .conversation_history
                .push(ChatMessage::system(content_block));
            tracing::debug!("RAG content inserted as a new system message");
        }
    }
}
