use std::sync::Arc;

use rand::seq::SliceRandom;
use supportfy_core::{
    ChatBackend, ChatController, ChatError, ChatReply, Config, MemorySessionStore,
};
use tokio::sync::mpsc::UnboundedSender;

use crate::tui::AppEvent;

/// Shown as the empty-chat placeholder
pub const EXAMPLE_QUESTIONS: [&str; 3] = [
    "What is machine learning?",
    "Explain quantum physics simply",
    "How do I start learning programming?",
];

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub struct App {
    pub should_quit: bool,
    pub chat: ChatController<MemorySessionStore>,
    backend: Arc<dyn ChatBackend>,
    events: UnboundedSender<AppEvent>,

    pub assistant_name: String,
    pub endpoint: String,
    pub suggestion: &'static str,

    // Input cursor, in characters
    pub cursor: usize,

    // Message list scrolling
    pub chat_scroll: u16,
    pub max_chat_scroll: u16,
    pub follow_bottom: bool,
    pub chat_height: u16,

    pub animation_frame: u8,
}

impl App {
    pub fn new(
        config: &Config,
        endpoint: String,
        backend: Arc<dyn ChatBackend>,
        events: UnboundedSender<AppEvent>,
    ) -> Self {
        let suggestion = EXAMPLE_QUESTIONS
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(EXAMPLE_QUESTIONS[0]);

        Self {
            should_quit: false,
            chat: ChatController::new(MemorySessionStore::new(), config.max_input_rows()),
            backend,
            events,
            assistant_name: config.assistant_name().to_string(),
            endpoint,
            suggestion,
            cursor: 0,
            chat_scroll: 0,
            max_chat_scroll: 0,
            follow_bottom: true,
            chat_height: 0,
            animation_frame: 0,
        }
    }

    /// Send the input if the send action is enabled. The request runs on its
    /// own task and reports back through [`AppEvent::Reply`].
    pub fn submit(&mut self) {
        let Some(request) = self.chat.begin_send() else {
            return;
        };

        self.cursor = 0;
        self.animation_frame = 0;
        self.scroll_to_bottom();

        let backend = Arc::clone(&self.backend);
        let events = self.events.clone();
        tokio::spawn(async move {
            let outcome = backend.ask(&request).await;
            if events.send(AppEvent::Reply(outcome)).is_err() {
                log::debug!("Reply arrived after the event loop closed");
            }
        });
    }

    pub fn on_reply(&mut self, outcome: Result<ChatReply, ChatError>) {
        self.chat.complete_send(outcome);
        self.scroll_to_bottom();
    }

    pub fn tick_animation(&mut self) {
        if self.chat.view().is_thinking() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    // Input editing. Every edit goes through the controller so the box
    // height and the send action stay in sync with the text.

    pub fn insert_char(&mut self, c: char) {
        let mut text = self.chat.view().input().to_string();
        let byte_pos = char_to_byte_index(&text, self.cursor);
        text.insert(byte_pos, c);
        self.cursor += 1;
        self.chat.on_input(text);
    }

    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        let mut text = self.chat.view().input().to_string();
        let byte_pos = char_to_byte_index(&text, self.cursor);
        text.remove(byte_pos);
        self.chat.on_input(text);
    }

    pub fn delete(&mut self) {
        let mut text = self.chat.view().input().to_string();
        if self.cursor < text.chars().count() {
            let byte_pos = char_to_byte_index(&text, self.cursor);
            text.remove(byte_pos);
            self.chat.on_input(text);
        }
    }

    pub fn cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        let char_count = self.chat.view().input().chars().count();
        self.cursor = (self.cursor + 1).min(char_count);
    }

    pub fn cursor_home(&mut self) {
        self.cursor = 0;
    }

    pub fn cursor_end(&mut self) {
        self.cursor = self.chat.view().input().chars().count();
    }

    /// Line and column of the cursor inside the input text
    pub fn cursor_position(&self) -> (usize, usize) {
        let before: String = self.chat.view().input().chars().take(self.cursor).collect();
        let line = before.matches('\n').count();
        let column = before
            .rsplit('\n')
            .next()
            .map(|s| s.chars().count())
            .unwrap_or(0);
        (line, column)
    }

    // Message list scrolling

    pub fn scroll_to_bottom(&mut self) {
        self.follow_bottom = true;
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.follow_bottom = false;
        self.chat_scroll = self.chat_scroll.saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_add(lines);
        if self.chat_scroll >= self.max_chat_scroll {
            self.chat_scroll = self.max_chat_scroll;
            self.follow_bottom = true;
        }
    }

    pub fn page(&self) -> u16 {
        (self.chat_height / 2).max(1)
    }
}
