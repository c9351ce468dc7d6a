use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use crate::app::App;
use crate::tui::AppEvent;

const WHEEL_LINES: u16 = 3;

pub fn handle_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize => {}
        AppEvent::Tick => app.tick_animation(),
        AppEvent::Reply(outcome) => app.on_reply(outcome),
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        KeyCode::Char('c') if ctrl => app.should_quit = true,
        KeyCode::Esc => app.should_quit = true,

        // Shift+Enter (or Alt+Enter on terminals that can't report Shift) adds a line
        KeyCode::Enter if key.modifiers.intersects(KeyModifiers::SHIFT | KeyModifiers::ALT) => {
            app.insert_char('\n');
        }
        KeyCode::Enter => {
            if app.chat.view().can_send() {
                app.submit();
            }
        }

        KeyCode::Backspace => app.backspace(),
        KeyCode::Delete => app.delete(),
        KeyCode::Left => app.cursor_left(),
        KeyCode::Right => app.cursor_right(),
        KeyCode::Home => app.cursor_home(),
        KeyCode::End => app.cursor_end(),

        KeyCode::Up => app.scroll_up(1),
        KeyCode::Down => app.scroll_down(1),
        KeyCode::PageUp => app.scroll_up(app.page()),
        KeyCode::PageDown => app.scroll_down(app.page()),

        KeyCode::Char(c) if !ctrl => app.insert_char(c),
        _ => {}
    }
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::ScrollUp => app.scroll_up(WHEEL_LINES),
        MouseEventKind::ScrollDown => app.scroll_down(WHEEL_LINES),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use supportfy_core::{Config, HttpChatClient};
    use tokio::sync::mpsc;

    fn app() -> App {
        let (tx, _rx) = mpsc::unbounded_channel();
        App::new(
            &Config::default(),
            "http://127.0.0.1:9/generate".to_string(),
            Arc::new(HttpChatClient::new("http://127.0.0.1:9/generate")),
            tx,
        )
    }

    fn press(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
        handle_event(app, AppEvent::Key(KeyEvent::new(code, modifiers)));
    }

    #[tokio::test]
    async fn test_enter_on_blank_input_does_nothing() {
        let mut app = app();
        press(&mut app, KeyCode::Char(' '), KeyModifiers::NONE);
        press(&mut app, KeyCode::Enter, KeyModifiers::NONE);
        assert!(app.chat.view().messages().is_empty());
        assert!(!app.chat.view().is_thinking());
    }

    #[tokio::test]
    async fn test_shift_enter_inserts_newline() {
        let mut app = app();
        press(&mut app, KeyCode::Char('a'), KeyModifiers::NONE);
        press(&mut app, KeyCode::Enter, KeyModifiers::SHIFT);
        press(&mut app, KeyCode::Char('b'), KeyModifiers::NONE);
        assert_eq!(app.chat.view().input(), "a\nb");
        assert!(app.chat.view().messages().is_empty());
    }

    #[tokio::test]
    async fn test_enter_sends_and_disables() {
        let mut app = app();
        press(&mut app, KeyCode::Char('a'), KeyModifiers::NONE);
        press(&mut app, KeyCode::Enter, KeyModifiers::NONE);
        assert_eq!(app.chat.view().messages().len(), 1);
        assert!(app.chat.view().is_thinking());

        // a second Enter while waiting is ignored
        press(&mut app, KeyCode::Char('b'), KeyModifiers::NONE);
        press(&mut app, KeyCode::Enter, KeyModifiers::NONE);
        assert_eq!(app.chat.view().messages().len(), 1);
        assert_eq!(app.chat.view().input(), "b");
    }

    #[tokio::test]
    async fn test_ctrl_c_quits_without_typing() {
        let mut app = app();
        press(&mut app, KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert!(app.should_quit);
        assert_eq!(app.chat.view().input(), "");
    }
}
