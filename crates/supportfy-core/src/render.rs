//! HTML cards for the message list

use crate::format::{escape_html, format_message_text};
use crate::state::{Message, Sender};

/// Markup of one message card. Assistant text is run through the formatter;
/// user text is escaped only. Assistant cards carry `assistant_name` and its
/// initial as the avatar.
pub fn message_html(message: &Message, assistant_name: &str) -> String {
    let sender = message.sender;
    let is_assistant = sender == Sender::Assistant;

    let (name, avatar) = if is_assistant {
        let initial = assistant_name
            .chars()
            .next()
            .map(|c| c.to_uppercase().collect::<String>())
            .unwrap_or_else(|| sender.avatar().to_string());
        (escape_html(assistant_name), escape_html(&initial))
    } else {
        (sender.display_name().to_string(), sender.avatar().to_string())
    };

    let body = if is_assistant {
        format_message_text(&message.text)
    } else {
        escape_html(&message.text)
    };
    let actions = if is_assistant {
        r#"<span class="message-actions"></span>"#
    } else {
        ""
    };
    let text_class = if message.is_error {
        "message-text error"
    } else {
        "message-text"
    };

    format!(
        concat!(
            r#"<div class="message">"#,
            r#"<div class="message-avatar {avatar_class}">{avatar}</div>"#,
            r#"<div class="message-content">"#,
            r#"<div class="message-header"><span class="message-sender">{name}</span>{actions}</div>"#,
            r#"<div class="{text_class}">{body}</div>"#,
            "</div></div>"
        ),
        avatar_class = sender.avatar_class(),
        avatar = avatar,
        name = name,
        actions = actions,
        text_class = text_class,
        body = body,
    )
}

/// All cards of a conversation, one per line
pub fn transcript_html(messages: &[Message], assistant_name: &str) -> String {
    let mut out = String::new();
    for message in messages {
        out.push_str(&message_html(message, assistant_name));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assistant_card_is_formatted() {
        let html = message_html(&Message::assistant("**yes**"), "Supportfy");
        assert!(html.contains(r#"<div class="message-text"><b>yes</b></div>"#));
        assert!(html.contains(r#"<div class="message-avatar assistant-avatar">S</div>"#));
        assert!(html.contains(r#"<span class="message-sender">Supportfy</span>"#));
        assert!(html.contains("message-actions"));
    }

    #[test]
    fn test_user_card_is_escaped_not_formatted() {
        let html = message_html(&Message::user("**<b>hi</b>**"), "Supportfy");
        assert!(html.contains("**&lt;b&gt;hi&lt;/b&gt;**"));
        assert!(html.contains(r#"<span class="message-sender">You</span>"#));
        assert!(!html.contains("message-actions"));
    }

    #[test]
    fn test_error_card_has_error_class() {
        let html = message_html(&Message::error("nope"), "Supportfy");
        assert!(html.contains(r#"<div class="message-text error">nope</div>"#));
    }

    #[test]
    fn test_assistant_card_uses_configured_name() {
        let html = message_html(&Message::error("nope"), "helpdesk");
        assert!(html.contains(r#"<span class="message-sender">helpdesk</span>"#));
        assert!(html.contains(r#"<div class="message-avatar assistant-avatar">H</div>"#));
        assert!(!html.contains("Supportfy"));

        let user = message_html(&Message::user("q"), "helpdesk");
        assert!(user.contains(r#"<span class="message-sender">You</span>"#));
    }

    #[test]
    fn test_transcript_has_one_card_per_message() {
        let messages = vec![Message::user("q"), Message::assistant("a")];
        let html = transcript_html(&messages, "Supportfy");
        assert_eq!(html.lines().count(), 2);
    }
}
