//! Core types for chat model interactions

use serde::{Deserialize, Serialize};

/// Content blocks inside an assistant message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Content {
    /// Text content
    Text { text: String },
    /// Tool call request
    ToolCall {
        id: String,
        name: String,
        arguments: serde_json::Value,
    },
}

impl Content {
    /// Create text content
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Create a tool call
    pub fn tool_call(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: serde_json::Value,
    ) -> Self {
        Self::ToolCall {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }

    /// Get text if this is text content
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text } => Some(text),
            _ => None,
        }
    }

    /// Check if this is a tool call
    pub fn is_tool_call(&self) -> bool {
        matches!(self, Self::ToolCall { .. })
    }
}

/// One conversation turn.
///
/// Ordering in a message list is significant: histories are append-only and
/// messages are never reordered or removed once added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Message {
    /// Instruction prepended for a single model call
    System { content: String },
    /// User message
    User {
        content: String,
        #[serde(default)]
        timestamp: i64,
    },
    /// Assistant response, possibly carrying tool calls
    Assistant {
        content: Vec<Content>,
        #[serde(default)]
        timestamp: i64,
    },
    /// Tool result, correlated to the call that produced it
    Tool {
        tool_call_id: String,
        content: String,
        #[serde(default)]
        timestamp: i64,
    },
}

impl Message {
    /// Create a system message
    pub fn system(content: impl Into<String>) -> Self {
        Self::System {
            content: content.into(),
        }
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self::User {
            content: content.into(),
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// Create an assistant message with plain text content
    pub fn assistant_text(text: impl Into<String>) -> Self {
        Self::assistant(vec![Content::text(text)])
    }

    /// Create an assistant message from content blocks
    pub fn assistant(content: Vec<Content>) -> Self {
        Self::Assistant {
            content,
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// Create a tool result message answering the given call id
    pub fn tool_result(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self::Tool {
            tool_call_id: tool_call_id.into(),
            content: content.into(),
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// Get the role as a string
    pub fn role(&self) -> &'static str {
        match self {
            Self::System { .. } => "system",
            Self::User { .. } => "user",
            Self::Assistant { .. } => "assistant",
            Self::Tool { .. } => "tool",
        }
    }

    /// Whether this message was authored by the assistant
    pub fn is_assistant(&self) -> bool {
        matches!(self, Self::Assistant { .. })
    }

    /// Whether this message was authored by the user
    pub fn is_user(&self) -> bool {
        matches!(self, Self::User { .. })
    }

    /// Combined text content. Tool calls contribute nothing.
    pub fn text(&self) -> String {
        match self {
            Self::System { content } => content.clone(),
            Self::User { content, .. } => content.clone(),
            Self::Tool { content, .. } => content.clone(),
            Self::Assistant { content, .. } => content
                .iter()
                .filter_map(|c| c.as_text())
                .collect::<Vec<_>>()
                .join(""),
        }
    }

    /// Extract all tool calls from an assistant message
    pub fn tool_calls(&self) -> Vec<(&str, &str, &serde_json::Value)> {
        match self {
            Self::Assistant { content, .. } => content
                .iter()
                .filter_map(|c| match c {
                    Content::ToolCall {
                        id,
                        name,
                        arguments,
                    } => Some((id.as_str(), name.as_str(), arguments)),
                    _ => None,
                })
                .collect(),
            _ => vec![],
        }
    }

    /// Whether this message carries at least one tool call
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls().is_empty()
    }
}

/// Tool definition handed to the model for function calling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSchema {
    /// Tool name (used in API calls and correlation)
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// JSON Schema for parameters
    pub parameters: serde_json::Value,
}

impl ToolSchema {
    /// Create a new tool definition
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: serde_json::Value,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }
}
