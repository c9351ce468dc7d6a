//! Assistant reply formatting
//!
//! Turns plain model output into the small HTML subset the message list
//! understands: `<b>`, `<i>`, `<ol>`/`<ul>` with `<li>` items, and `<br>`.
//!
//! The stages always run in this order:
//! 1. escape `&`, `<` and `>`
//! 2. per line, `**bold**` spans, then `*italic*` spans
//! 3. classify every line as plain text, an ordered item or an unordered item
//! 4. group consecutive items of the same kind into one list
//! 5. join what is left with `<br>`
//!
//! Lists are found before line breaks are emitted because the newline is the
//! only thing separating one list item from the next.

/// Format an assistant reply for display.
pub fn format_message_text(text: &str) -> String {
    let escaped = escape_html(text);
    let lines = escaped.split('\n').map(|raw| classify(emphasize(raw)));
    render_blocks(&group(lines))
}

/// Escape the characters that could otherwise open or break markup.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Bold has to run first, otherwise `**a**` would be read as two empty
/// italic spans.
fn emphasize(line: &str) -> String {
    let bold = wrap_delimited(line, "**", "b");
    wrap_delimited(&bold, "*", "i")
}

/// Wrap every `<delim>body<delim>` span in `<tag>`. Spans are matched
/// lazily, left to right, and the body holds at least one character.
fn wrap_delimited(line: &str, delim: &str, tag: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut rest = line;

    while let Some(start) = rest.find(delim) {
        let after_open = &rest[start + delim.len()..];
        let Some(first) = after_open.chars().next() else {
            break;
        };
        let first_len = first.len_utf8();

        match after_open[first_len..].find(delim) {
            Some(offset) => {
                let body_len = first_len + offset;
                out.push_str(&rest[..start]);
                out.push('<');
                out.push_str(tag);
                out.push('>');
                out.push_str(&after_open[..body_len]);
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
                rest = &after_open[body_len + delim.len()..];
            }
            None => {
                // Unclosed here; a later delimiter may still open a span
                let skip = start + rest[start..].chars().next().map_or(1, char::len_utf8);
                out.push_str(&rest[..skip]);
                rest = &rest[skip..];
            }
        }
    }

    out.push_str(rest);
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListKind {
    Ordered,
    Unordered,
}

impl ListKind {
    fn tags(&self) -> (&'static str, &'static str) {
        match self {
            ListKind::Ordered => ("<ol>", "</ol>"),
            ListKind::Unordered => ("<ul>", "</ul>"),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Line {
    Plain(String),
    Item(ListKind, String),
}

#[derive(Debug, PartialEq, Eq)]
enum Block {
    Text(String),
    List(ListKind, Vec<String>),
}

fn classify(line: String) -> Line {
    if let Some(item) = ordered_item(&line) {
        return Line::Item(ListKind::Ordered, item.to_string());
    }
    if let Some(item) = unordered_item(&line) {
        return Line::Item(ListKind::Unordered, item.to_string());
    }
    Line::Plain(line)
}

/// `<digits>.<whitespace><text>` yields `<text>`
fn ordered_item(line: &str) -> Option<&str> {
    let digits = line.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let rest = line[digits..].strip_prefix('.')?;
    item_after_space(rest)
}

/// `-<whitespace><text>` or `*<whitespace><text>` yields `<text>`; a bullet
/// followed by nothing but whitespace is not an item.
fn unordered_item(line: &str) -> Option<&str> {
    let rest = line.strip_prefix('-').or_else(|| line.strip_prefix('*'))?;
    item_after_space(rest).filter(|item| !item.trim().is_empty())
}

fn item_after_space(rest: &str) -> Option<&str> {
    let space = rest.chars().next().filter(|c| c.is_whitespace())?;
    let item = &rest[space.len_utf8()..];
    (!item.is_empty()).then_some(item)
}

fn group(lines: impl Iterator<Item = Line>) -> Vec<Block> {
    let mut blocks = Vec::new();

    for line in lines {
        match line {
            Line::Plain(text) => blocks.push(Block::Text(text)),
            Line::Item(kind, item) => match blocks.last_mut() {
                Some(Block::List(open, items)) if *open == kind => items.push(item),
                _ => blocks.push(Block::List(kind, vec![item])),
            },
        }
    }

    // A bullet run ends without trailing whitespace
    for block in &mut blocks {
        if let Block::List(ListKind::Unordered, items) = block {
            if let Some(last) = items.last_mut() {
                last.truncate(last.trim_end().len());
            }
        }
    }

    blocks
}

/// A line break separates neighbouring blocks, except that an unordered list
/// swallows the newline that follows it.
fn render_blocks(blocks: &[Block]) -> String {
    let mut out = String::new();

    for (idx, block) in blocks.iter().enumerate() {
        if idx > 0 && !matches!(blocks[idx - 1], Block::List(ListKind::Unordered, _)) {
            out.push_str("<br>");
        }

        match block {
            Block::Text(text) => out.push_str(text),
            Block::List(kind, items) => {
                let (open, close) = kind.tags();
                out.push_str(open);
                for item in items {
                    out.push_str("<li>");
                    out.push_str(item);
                    out.push_str("</li>");
                }
                out.push_str(close);
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escapes_markup() {
        let html = format_message_text("<script>alert('x')</script> & more");
        assert_eq!(html, "&lt;script&gt;alert('x')&lt;/script&gt; &amp; more");
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_bold_then_italic() {
        assert_eq!(format_message_text("**a** *b*"), "<b>a</b> <i>b</i>");
    }

    #[test]
    fn test_bold_span_may_contain_star() {
        assert_eq!(format_message_text("**a*b**"), "<b>a*b</b>");
    }

    #[test]
    fn test_unclosed_delimiters_stay_literal() {
        assert_eq!(format_message_text("2 * 3 = 6"), "2 * 3 = 6");
        assert_eq!(format_message_text("**open"), "**open");
        assert_eq!(format_message_text("****"), "<i>*</i>*");
    }

    #[test]
    fn test_emphasis_does_not_cross_lines() {
        assert_eq!(format_message_text("*a\nb*"), "*a<br>b*");
    }

    #[test]
    fn test_multibyte_emphasis() {
        assert_eq!(format_message_text("*é* **ñandú**"), "<i>é</i> <b>ñandú</b>");
    }

    #[test]
    fn test_ordered_list() {
        assert_eq!(
            format_message_text("1. foo\n2. bar"),
            "<ol><li>foo</li><li>bar</li></ol>"
        );
    }

    #[test]
    fn test_unordered_list() {
        assert_eq!(
            format_message_text("- foo\n- bar"),
            "<ul><li>foo</li><li>bar</li></ul>"
        );
        assert_eq!(
            format_message_text("* foo\n- bar"),
            "<ul><li>foo</li><li>bar</li></ul>"
        );
    }

    #[test]
    fn test_single_line_still_makes_a_list() {
        assert_eq!(format_message_text("- foo"), "<ul><li>foo</li></ul>");
        assert_eq!(format_message_text("7. foo"), "<ol><li>foo</li></ol>");
    }

    #[test]
    fn test_list_needs_text_after_marker() {
        assert_eq!(format_message_text("- "), "- ");
        assert_eq!(format_message_text("1."), "1.");
        assert_eq!(format_message_text("-foo"), "-foo");
    }

    #[test]
    fn test_lists_inside_prose() {
        let text = "Steps:\n1. Open **Settings**\n2. Save\nThen:\n- one\n- two\nDone";
        assert_eq!(
            format_message_text(text),
            "Steps:<br><ol><li>Open <b>Settings</b></li><li>Save</li></ol><br>Then:<br>\
             <ul><li>one</li><li>two</li></ul>Done"
        );
    }

    #[test]
    fn test_whitespace_only_bullet_is_plain_text() {
        assert_eq!(format_message_text("*  "), "*  ");
        assert_eq!(format_message_text("- \t"), "- \t");
    }

    #[test]
    fn test_bullet_run_trims_trailing_whitespace() {
        assert_eq!(format_message_text("- b  "), "<ul><li>b</li></ul>");
        assert_eq!(
            format_message_text("- a  \n- b \nnext"),
            "<ul><li>a  </li><li>b</li></ul>next"
        );
        // numbered items are left as written
        assert_eq!(format_message_text("1. a "), "<ol><li>a </li></ol>");
    }

    #[test]
    fn test_blank_line_splits_lists() {
        assert_eq!(
            format_message_text("- a\n\n- b"),
            "<ul><li>a</li></ul><br><ul><li>b</li></ul>"
        );
    }

    #[test]
    fn test_star_bullet_with_emphasis() {
        assert_eq!(format_message_text("* **x**"), "<ul><li><b>x</b></li></ul>");
        // a second star on the line pairs with the bullet marker
        assert_eq!(format_message_text("* a * b"), "<i> a </i> b");
    }

    #[test]
    fn test_line_breaks() {
        assert_eq!(format_message_text("a\nb\n"), "a<br>b<br>");
        assert_eq!(format_message_text(""), "");
    }

    #[test]
    fn test_escaped_text_in_list_items() {
        assert_eq!(
            format_message_text("- a < b"),
            "<ul><li>a &lt; b</li></ul>"
        );
    }
}
