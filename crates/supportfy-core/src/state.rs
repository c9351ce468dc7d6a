//! UI-agnostic message types
//!
//! These are shared by every frontend (the terminal UI, the one-shot CLI and
//! the HTML transcript export) and don't depend on any UI framework.

use serde::{Deserialize, Serialize};

/// A single entry in the message list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub text: String,
    pub sender: Sender,
    pub is_error: bool,
}

impl Message {
    /// A message typed by the user, kept exactly as entered
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sender: Sender::User,
            is_error: false,
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sender: Sender::Assistant,
            is_error: false,
        }
    }

    /// An assistant-side message flagged so frontends can style it distinctly
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sender: Sender::Assistant,
            is_error: true,
        }
    }
}

/// Who authored a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Assistant,
}

impl Sender {
    pub fn display_name(&self) -> &'static str {
        match self {
            Sender::User => "You",
            Sender::Assistant => "Supportfy",
        }
    }

    pub fn avatar(&self) -> &'static str {
        match self {
            Sender::User => "U",
            Sender::Assistant => "S",
        }
    }

    /// CSS class of the avatar badge in the rendered card
    pub fn avatar_class(&self) -> &'static str {
        match self {
            Sender::User => "user-avatar",
            Sender::Assistant => "assistant-avatar",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_is_from_assistant() {
        let msg = Message::error("boom");
        assert_eq!(msg.sender, Sender::Assistant);
        assert!(msg.is_error);
    }

    #[test]
    fn test_sender_serializes_lowercase() {
        let json = serde_json::to_string(&Sender::Assistant).unwrap();
        assert_eq!(json, "\"assistant\"");
    }
}
