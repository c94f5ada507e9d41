//! Rendering of engine [`Segment`]s to styled ratatui Lines.
//!
//! Every string goes through text/span APIs, never interpreted as markup.

use confab_engine::Segment;
use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
};
use unicode_width::UnicodeWidthStr;

use crate::theme::Theme;

/// Render parsed segments as wrapped, styled lines.
pub fn segment_lines(segments: &[Segment], width: usize, theme: &Theme) -> Vec<Line<'static>> {
    let width = width.max(8);
    let mut lines = Vec::new();

    for segment in segments {
        match segment {
            Segment::PlainText { text } => {
                let style = Style::default().fg(theme.text);
                for raw_line in text.lines() {
                    if raw_line.is_empty() {
                        lines.push(Line::from(""));
                        continue;
                    }
                    for wrapped in textwrap::wrap(raw_line, width) {
                        lines.push(Line::from(Span::styled(wrapped.into_owned(), style)));
                    }
                }
            }
            Segment::CodeBlock { language, code } => {
                if let Some(language) = language {
                    lines.push(Line::from(Span::styled(
                        format!("┌ {language}"),
                        Style::default().fg(theme.muted),
                    )));
                }
                let style = Style::default().fg(theme.code);
                for code_line in code.lines() {
                    lines.push(Line::from(Span::styled(
                        format!("  {code_line}"),
                        style,
                    )));
                }
            }
            Segment::BulletList { items } => {
                for item in items {
                    push_list_item(&mut lines, "• ", item, width, theme);
                }
            }
            Segment::NumberedList { items } => {
                for (index, item) in items.iter().enumerate() {
                    let marker = format!("{}. ", index + 1);
                    push_list_item(&mut lines, &marker, item, width, theme);
                }
            }
        }
    }

    lines
}

/// Render one list item with a styled marker and a hanging indent.
fn push_list_item(
    lines: &mut Vec<Line<'static>>,
    marker: &str,
    item: &str,
    width: usize,
    theme: &Theme,
) {
    let marker_width = marker.width();
    let body_width = width.saturating_sub(marker_width).max(4);
    let indent = " ".repeat(marker_width);

    let marker_style = Style::default()
        .fg(theme.primary)
        .add_modifier(Modifier::BOLD);
    let text_style = Style::default().fg(theme.text);

    for (index, wrapped) in textwrap::wrap(item, body_width).iter().enumerate() {
        let prefix = if index == 0 {
            Span::styled(marker.to_string(), marker_style)
        } else {
            Span::raw(indent.clone())
        };
        lines.push(Line::from(vec![
            prefix,
            Span::styled(wrapped.clone().into_owned(), text_style),
        ]));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use confab_engine::format_message;

    fn line_text(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_plain_text_lines() {
        let segments = format_message("hello\nworld");
        let lines = segment_lines(&segments, 80, &Theme::default());
        assert_eq!(lines.len(), 2);
        assert_eq!(line_text(&lines[0]), "hello");
        assert_eq!(line_text(&lines[1]), "world");
    }

    #[test]
    fn test_code_block_header_and_indent() {
        let segments = format_message("```rust\nfn main() {}\n```");
        let lines = segment_lines(&segments, 80, &Theme::default());
        assert!(line_text(&lines[0]).contains("rust"));
        assert_eq!(line_text(&lines[1]), "  fn main() {}");
    }

    #[test]
    fn test_bullet_markers() {
        let segments = format_message("- one\n- two");
        let lines = segment_lines(&segments, 80, &Theme::default());
        assert_eq!(line_text(&lines[0]), "• one");
        assert_eq!(line_text(&lines[1]), "• two");
    }

    #[test]
    fn test_numbered_markers_renumber() {
        let segments = format_message("7. first\n9. second");
        let lines = segment_lines(&segments, 80, &Theme::default());
        assert_eq!(line_text(&lines[0]), "1. first");
        assert_eq!(line_text(&lines[1]), "2. second");
    }

    #[test]
    fn test_long_list_item_wraps_with_hanging_indent() {
        let item = "a".repeat(30);
        let segments = format_message(&format!("- {item} {item}"));
        let lines = segment_lines(&segments, 40, &Theme::default());
        assert!(lines.len() >= 2);
        assert!(line_text(&lines[0]).starts_with("• "));
        assert!(line_text(&lines[1]).starts_with("  "));
    }

    #[test]
    fn test_blank_lines_preserved() {
        let segments = format_message("a\n\nb");
        let lines = segment_lines(&segments, 80, &Theme::default());
        assert_eq!(lines.len(), 3);
        assert_eq!(line_text(&lines[1]), "");
    }
}
