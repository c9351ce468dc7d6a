pub mod client;
pub mod config;
pub mod controller;
pub mod conversation;
pub mod format;
pub mod render;
pub mod state;

// Re-export main types for convenience
pub use client::{ChatBackend, ChatError, ChatReply, ChatRequest, HttpChatClient};
pub use config::Config;
pub use controller::{ChatController, ChatView, Mode};
pub use conversation::{MemorySessionStore, SessionStore};
pub use format::format_message_text;
pub use state::{Message, Sender};
