//! UI-agnostic application state types
//!
//! This module contains data structures that are shared between front ends
//! and don't depend on any specific UI framework.

use serde::{Deserialize, Serialize};

/// A chat message in the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
    /// Stands in for a reply that never arrived
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub failed: bool,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
            failed: false,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
            failed: false,
        }
    }

    /// Assistant slot filled with an error notice instead of a reply
    pub fn failure(content: impl Into<String>) -> Self {
        Self {
            failed: true,
            ..Self::assistant(content)
        }
    }
}

/// The role of a chat message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChatRole {
    #[serde(rename = "user")]
    User,
    #[serde(rename = "ai")]
    Assistant,
}

impl ChatRole {
    pub fn label(&self) -> &'static str {
        match self {
            ChatRole::User => "You:",
            ChatRole::Assistant => "AI:",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serializes_as_sender_name() {
        let json = serde_json::to_string(&ChatMessage::assistant("hi")).unwrap();
        assert_eq!(json, r#"{"role":"ai","content":"hi"}"#);

        let msg: ChatMessage = serde_json::from_str(r#"{"role":"user","content":"yo"}"#).unwrap();
        assert_eq!(msg, ChatMessage::user("yo"));
    }

    #[test]
    fn test_failure_is_marked_apart_from_its_text() {
        let failed = ChatMessage::failure("Error connecting to backend.");
        let echoed = ChatMessage::assistant("Error connecting to backend.");
        assert_eq!(failed.role, ChatRole::Assistant);
        assert!(failed.failed);
        assert_ne!(failed, echoed);

        let json = serde_json::to_string(&failed).unwrap();
        assert_eq!(json, r#"{"role":"ai","content":"Error connecting to backend.","failed":true}"#);
    }
}
