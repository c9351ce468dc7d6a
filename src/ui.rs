use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use supportfy_core::{format_message_text, Message, Sender};
use crate::app::App;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListMarker {
    Numbered(usize),
    Bullet,
}

/// Accumulates spans into lines while walking the markup
struct LineBuilder {
    lines: Vec<Line<'static>>,
    spans: Vec<Span<'static>>,
    text: String,
    style: Style,
}

impl LineBuilder {
    fn flush_text(&mut self) {
        if !self.text.is_empty() {
            self.spans.push(Span::styled(std::mem::take(&mut self.text), self.style));
        }
    }

    fn end_line(&mut self) {
        self.flush_text();
        self.lines.push(Line::from(std::mem::take(&mut self.spans)));
    }

    fn end_line_if_open(&mut self) {
        if !self.text.is_empty() || !self.spans.is_empty() {
            self.end_line();
        }
    }
}

/// Render the formatter's HTML subset as styled terminal lines: `<b>` and
/// `<i>` become modifiers, list items get a number or bullet, `<br>` starts
/// a new line and the three escaped entities are decoded.
fn html_to_lines(html: &str, base: Style) -> Vec<Line<'static>> {
    let mut out = LineBuilder {
        lines: Vec::new(),
        spans: Vec::new(),
        text: String::new(),
        style: base,
    };
    let mut list: Option<ListMarker> = None;
    let mut rest = html;

    while let Some(c) = rest.chars().next() {
        if c == '<' {
            if let Some(end) = rest.find('>') {
                let tag = &rest[1..end];
                rest = &rest[end + 1..];
                out.flush_text();
                match tag {
                    "b" => out.style = out.style.add_modifier(Modifier::BOLD),
                    "/b" => out.style = out.style.remove_modifier(Modifier::BOLD),
                    "i" => out.style = out.style.add_modifier(Modifier::ITALIC),
                    "/i" => out.style = out.style.remove_modifier(Modifier::ITALIC),
                    "br" => out.end_line(),
                    "ol" => {
                        out.end_line_if_open();
                        list = Some(ListMarker::Numbered(0));
                    }
                    "ul" => {
                        out.end_line_if_open();
                        list = Some(ListMarker::Bullet);
                    }
                    "li" => {
                        let marker = match list {
                            Some(ListMarker::Numbered(n)) => {
                                list = Some(ListMarker::Numbered(n + 1));
                                format!("  {}. ", n + 1)
                            }
                            _ => "  • ".to_string(),
                        };
                        out.spans.push(Span::styled(marker, base));
                    }
                    "/li" => out.end_line(),
                    "/ol" | "/ul" => list = None,
                    other => {
                        out.text.push('<');
                        out.text.push_str(other);
                        out.text.push('>');
                    }
                }
                continue;
            }
        } else if c == '&' {
            let entity = [("&amp;", '&'), ("&lt;", '<'), ("&gt;", '>')]
                .into_iter()
                .find(|(name, _)| rest.starts_with(name));
            if let Some((name, decoded)) = entity {
                out.text.push(decoded);
                rest = &rest[name.len()..];
                continue;
            }
        }

        out.text.push(c);
        rest = &rest[c.len_utf8()..];
    }

    out.end_line_if_open();
    out.lines
}

fn message_lines(msg: &Message, assistant_name: &str) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    match msg.sender {
        Sender::User => {
            lines.push(Line::from(Span::styled(
                format!("{}:", Sender::User.display_name()),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            )));
            // User text is shown exactly as typed
            for line in msg.text.split('\n') {
                lines.push(Line::from(line.to_string()));
            }
        }
        Sender::Assistant => {
            lines.push(Line::from(Span::styled(
                format!("{}:", assistant_name),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )));
            let base = if msg.is_error {
                Style::default().fg(Color::Red)
            } else {
                Style::default()
            };
            lines.extend(html_to_lines(&format_message_text(&msg.text), base));
        }
    }

    lines.push(Line::default());
    lines
}

/// Rows a line occupies once wrapped to `width`
fn wrapped_rows(line: &Line, width: u16) -> u16 {
    let width = usize::from(width.max(1));
    let rows = line.width().div_ceil(width).max(1);
    u16::try_from(rows).unwrap_or(u16::MAX)
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();
    let input_height = app.chat.view().input_rows() + 2;

    let [header_area, chat_area, input_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(input_height),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);
    render_chat(app, frame, chat_area);
    render_input(app, frame, input_area);
    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let header = Line::from(vec![
        Span::styled(
            format!(" {} ", app.assistant_name),
            Style::default().fg(Color::Black).bg(Color::Yellow).add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!(" {}", app.endpoint), Style::default().fg(Color::DarkGray)),
    ]);
    frame.render_widget(Paragraph::new(header), area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let help = if app.chat.view().is_thinking() {
        " Waiting for reply… | PgUp/PgDn: scroll | Esc: quit"
    } else {
        " Enter: send | Shift+Enter: new line | PgUp/PgDn: scroll | Esc: quit"
    };
    let footer = Paragraph::new(help).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, area);
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    let view = app.chat.view();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Chat ");

    let lines: Vec<Line> = if view.messages().is_empty() && !view.is_thinking() {
        vec![Line::from(Span::styled(
            format!("Try asking: {}", app.suggestion),
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        let mut lines: Vec<Line> = view
            .messages()
            .iter()
            .flat_map(|msg| message_lines(msg, &app.assistant_name))
            .collect();

        if view.is_thinking() {
            lines.push(Line::from(Span::styled(
                format!("{}:", app.assistant_name),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )));
            // Animated ellipsis: cycles through ".", "..", "..."
            let dots = ".".repeat(usize::from(app.animation_frame) + 1);
            lines.push(Line::from(Span::styled(
                format!("Thinking{}", dots),
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            )));
        }
        lines
    };

    // Inner size minus borders
    let inner_width = area.width.saturating_sub(2);
    let inner_height = area.height.saturating_sub(2);
    let total_rows = lines
        .iter()
        .fold(0u16, |acc, line| acc.saturating_add(wrapped_rows(line, inner_width)));

    app.chat_height = inner_height;
    app.max_chat_scroll = total_rows.saturating_sub(inner_height);
    if app.follow_bottom || app.chat_scroll > app.max_chat_scroll {
        app.chat_scroll = app.max_chat_scroll;
    }

    let chat = Paragraph::new(Text::from(lines))
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.chat_scroll, 0));

    frame.render_widget(chat, area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let view = app.chat.view();
    let (border_color, title) = if view.is_thinking() {
        (Color::DarkGray, " Ask (waiting for reply) ")
    } else if view.can_send() {
        (Color::Yellow, " Ask (Enter to send) ")
    } else {
        (Color::DarkGray, " Ask ")
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);

    // Keep the cursor visible when the text is taller or wider than the box
    let inner_width = usize::from(area.width.saturating_sub(2));
    let inner_height = usize::from(area.height.saturating_sub(2)).max(1);
    let (cursor_line, cursor_col) = app.cursor_position();
    let scroll_y = cursor_line.saturating_sub(inner_height - 1);
    let scroll_x = if inner_width == 0 {
        0
    } else {
        cursor_col.saturating_sub(inner_width - 1)
    };

    let input = Paragraph::new(view.input().to_string())
        .style(Style::default().fg(Color::Cyan))
        .block(block)
        .scroll((
            u16::try_from(scroll_y).unwrap_or(u16::MAX),
            u16::try_from(scroll_x).unwrap_or(u16::MAX),
        ));

    frame.render_widget(input, area);

    if !view.is_thinking() {
        let x = u16::try_from(cursor_col - scroll_x).unwrap_or(0);
        let y = u16::try_from(cursor_line - scroll_y).unwrap_or(0);
        frame.set_cursor_position((area.x + x + 1, area.y + y + 1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(lines: &[Line]) -> Vec<String> {
        lines
            .iter()
            .map(|line| line.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn test_breaks_and_entities() {
        let lines = html_to_lines("a &lt; b<br>c &amp; d", Style::default());
        assert_eq!(plain(&lines), vec!["a < b", "c & d"]);
    }

    #[test]
    fn test_bold_and_italic_spans() {
        let lines = html_to_lines("x <b>bold</b> <i>it</i>", Style::default());
        assert_eq!(lines.len(), 1);
        let bold = &lines[0].spans[1];
        assert_eq!(bold.content, "bold");
        assert!(bold.style.add_modifier.contains(Modifier::BOLD));
        let italic = &lines[0].spans[3];
        assert_eq!(italic.content, "it");
        assert!(italic.style.add_modifier.contains(Modifier::ITALIC));
        assert!(!italic.style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn test_lists() {
        let html = format_message_text("Steps:\n1. one\n2. two\n- a\n- b\nend");
        let lines = html_to_lines(&html, Style::default());
        assert_eq!(
            plain(&lines),
            vec!["Steps:", "  1. one", "  2. two", "", "  • a", "  • b", "end"]
        );
    }

    #[test]
    fn test_trailing_break_adds_no_line() {
        let lines = html_to_lines("a<br>", Style::default());
        assert_eq!(plain(&lines), vec!["a"]);
    }

    #[test]
    fn test_error_message_is_red() {
        let lines = message_lines(&Message::error("oops"), "Supportfy");
        assert_eq!(lines[1].spans[0].style.fg, Some(Color::Red));
    }

    #[test]
    fn test_user_text_is_verbatim() {
        let lines = message_lines(&Message::user("**hi** <b>"), "Supportfy");
        assert_eq!(plain(&lines[1..2]), vec!["**hi** <b>"]);
    }
}
