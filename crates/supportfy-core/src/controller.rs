//! Input/send controller
//!
//! [`ChatView`] is the whole visible state of the chat: the message list, the
//! input box and whether a reply is pending. [`ChatController`] owns it and
//! is the only thing that mutates it, so at most one request is ever in
//! flight.

use crate::client::{ChatBackend, ChatError, ChatReply, ChatRequest};
use crate::conversation::{conversation_id, SessionStore};
use crate::state::Message;

pub const FALLBACK_REPLY: &str = "I apologize, but I couldn't generate a response.";
pub const ERROR_REPLY: &str = "Sorry, I encountered an error. Please try again.";
pub const DEFAULT_MAX_INPUT_ROWS: u16 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Idle,
    AwaitingResponse,
}

#[derive(Debug, Clone)]
pub struct ChatView {
    messages: Vec<Message>,
    input: String,
    input_rows: u16,
    max_input_rows: u16,
    mode: Mode,
}

impl ChatView {
    pub fn new(max_input_rows: u16) -> Self {
        Self {
            messages: Vec::new(),
            input: String::new(),
            input_rows: 1,
            max_input_rows: max_input_rows.max(1),
            mode: Mode::Idle,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    /// Height of the input box: one row per line of text, capped
    pub fn input_rows(&self) -> u16 {
        self.input_rows
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_thinking(&self) -> bool {
        self.mode == Mode::AwaitingResponse
    }

    /// The send action is enabled only while idle with non-blank input
    pub fn can_send(&self) -> bool {
        self.mode == Mode::Idle && !self.input.trim().is_empty()
    }

    fn set_input(&mut self, text: String) {
        let lines = text.split('\n').count();
        self.input_rows = u16::try_from(lines)
            .unwrap_or(u16::MAX)
            .clamp(1, self.max_input_rows);
        self.input = text;
    }

    fn push(&mut self, message: Message) {
        self.messages.push(message);
    }
}

impl Default for ChatView {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_INPUT_ROWS)
    }
}

pub struct ChatController<S: SessionStore> {
    view: ChatView,
    session: S,
}

impl<S: SessionStore> ChatController<S> {
    pub fn new(session: S, max_input_rows: u16) -> Self {
        Self {
            view: ChatView::new(max_input_rows),
            session,
        }
    }

    pub fn view(&self) -> &ChatView {
        &self.view
    }

    /// Replace the input text, resizing the box and re-evaluating the send action.
    pub fn on_input(&mut self, text: impl Into<String>) {
        self.view.set_input(text.into());
    }

    /// First half of a send. Appends the user's message, clears the input and
    /// enters the awaiting state, then returns the request to issue.
    ///
    /// Returns `None` without touching anything when the input is blank or a
    /// request is already outstanding.
    pub fn begin_send(&mut self) -> Option<ChatRequest> {
        if !self.view.can_send() {
            return None;
        }

        let question = self.view.input.trim().to_string();
        self.view.push(Message::user(question.clone()));
        self.view.set_input(String::new());
        self.view.mode = Mode::AwaitingResponse;

        Some(ChatRequest {
            question,
            conversation_id: conversation_id(&mut self.session),
        })
    }

    /// Second half of a send. Appends the reply or the error message, then
    /// always leaves the awaiting state.
    pub fn complete_send(&mut self, outcome: Result<ChatReply, ChatError>) {
        let message = match outcome {
            Ok(reply) => match reply.text() {
                Some(text) => Message::assistant(text),
                None => {
                    log::warn!("Reply carried neither `answer` nor `response` text");
                    Message::assistant(FALLBACK_REPLY)
                }
            },
            Err(e) => {
                log::error!("Chat request failed: {}", e);
                Message::error(ERROR_REPLY)
            }
        };

        self.view.push(message);
        self.view.mode = Mode::Idle;
    }

    /// Send the current input and wait for the reply. Returns `false` when
    /// there was nothing to send.
    pub async fn send<B: ChatBackend + ?Sized>(&mut self, backend: &B) -> bool {
        let Some(request) = self.begin_send() else {
            return false;
        };

        let outcome = backend.ask(&request).await;
        self.complete_send(outcome);
        true
    }
}
