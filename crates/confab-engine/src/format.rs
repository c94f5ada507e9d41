//! Message content formatting.
//!
//! Answer text arrives as plain text that may embed triple-backtick code
//! fences and bullet/numbered list lines. [`format_message`] parses that
//! narrow subset into typed [`Segment`]s for the rendering layer, which must
//! treat every string as data rather than markup.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Triple-backtick fence marker.
const FENCE: &str = "```";

static BULLET_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*[-*]\s(.+)$").unwrap());
static NUMBERED_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d+\.)\s(.+)$").unwrap());

/// One typed unit of parsed message content, in source-text order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Segment {
    /// Literal text, newlines preserved.
    PlainText { text: String },
    /// Fenced code region with the fence markers stripped.
    CodeBlock {
        language: Option<String>,
        code: String,
    },
    /// A maximal run of consecutive `- item` / `* item` lines.
    BulletList { items: Vec<String> },
    /// A maximal run of consecutive `1. item` lines.
    NumberedList { items: Vec<String> },
}

/// Parse raw answer text into an ordered sequence of [`Segment`]s.
///
/// Total and deterministic: malformed markup degrades to [`Segment::PlainText`],
/// never an error. An opening fence with no matching closing fence is left as
/// literal text, so a dangling fence never swallows the rest of the message.
pub fn format_message(raw: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut rest = raw;

    while let Some(open) = rest.find(FENCE) {
        let after_open = &rest[open + FENCE.len()..];
        let Some(close) = after_open.find(FENCE) else {
            break;
        };
        push_plain_span(&rest[..open], &mut segments);
        segments.push(code_segment(&after_open[..close]));
        rest = &after_open[close + FENCE.len()..];
    }
    push_plain_span(rest, &mut segments);

    segments
}

/// Build a [`Segment::CodeBlock`] from the text between a fence pair.
///
/// A single non-whitespace token on the opening-marker line (e.g. `csharp`)
/// is the language tag; everything after it is the code, trimmed of
/// leading/trailing whitespace.
fn code_segment(inner: &str) -> Segment {
    if let Some((first_line, body)) = inner.split_once('\n') {
        let tag = first_line.trim();
        if !tag.is_empty() && !tag.contains(char::is_whitespace) {
            return Segment::CodeBlock {
                language: Some(tag.to_string()),
                code: body.trim().to_string(),
            };
        }
    }
    Segment::CodeBlock {
        language: None,
        code: inner.trim().to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListKind {
    Bullet,
    Numbered,
}

enum LineKind<'a> {
    Bullet(&'a str),
    Numbered(&'a str),
    Plain,
}

/// Classify one line of a plain span. Bullet matching takes precedence.
fn classify(line: &str) -> LineKind<'_> {
    if let Some(caps) = BULLET_LINE.captures(line) {
        if let Some(item) = caps.get(1) {
            return LineKind::Bullet(item.as_str());
        }
    }
    if let Some(caps) = NUMBERED_LINE.captures(line) {
        if let Some(item) = caps.get(2) {
            return LineKind::Numbered(item.as_str());
        }
    }
    LineKind::Plain
}

/// Emit segments for a span of text outside any code fence.
///
/// Consecutive same-kind list lines collapse into one list segment; runs of
/// non-matching lines are re-joined with their original newlines so a span
/// with no list lines comes back as a single verbatim [`Segment::PlainText`].
fn push_plain_span(span: &str, out: &mut Vec<Segment>) {
    if span.is_empty() {
        return;
    }

    let mut plain: Vec<&str> = Vec::new();
    let mut list: Option<ListKind> = None;
    let mut items: Vec<String> = Vec::new();

    for line in span.split('\n') {
        match classify(line) {
            LineKind::Bullet(item) => {
                flush_plain(&mut plain, out);
                if list != Some(ListKind::Bullet) {
                    flush_list(&mut list, &mut items, out);
                    list = Some(ListKind::Bullet);
                }
                items.push(item.to_string());
            }
            LineKind::Numbered(item) => {
                flush_plain(&mut plain, out);
                if list != Some(ListKind::Numbered) {
                    flush_list(&mut list, &mut items, out);
                    list = Some(ListKind::Numbered);
                }
                items.push(item.to_string());
            }
            LineKind::Plain => {
                flush_list(&mut list, &mut items, out);
                plain.push(line);
            }
        }
    }

    flush_list(&mut list, &mut items, out);
    flush_plain(&mut plain, out);
}

fn flush_plain(plain: &mut Vec<&str>, out: &mut Vec<Segment>) {
    if plain.is_empty() {
        return;
    }
    let text = plain.join("\n");
    plain.clear();
    // A lone empty line bordering a list carries no content.
    if !text.is_empty() {
        out.push(Segment::PlainText { text });
    }
}

fn flush_list(list: &mut Option<ListKind>, items: &mut Vec<String>, out: &mut Vec<Segment>) {
    let Some(kind) = list.take() else {
        return;
    };
    let items = std::mem::take(items);
    out.push(match kind {
        ListKind::Bullet => Segment::BulletList { items },
        ListKind::Numbered => Segment::NumberedList { items },
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(text: &str) -> Segment {
        Segment::PlainText {
            text: text.to_string(),
        }
    }

    #[test]
    fn test_empty_input() {
        assert!(format_message("").is_empty());
    }

    #[test]
    fn test_plain_text_passthrough() {
        let segments = format_message("just some text\nacross two lines");
        assert_eq!(segments, vec![plain("just some text\nacross two lines")]);
    }

    #[test]
    fn test_fence_round_trip() {
        let segments = format_message("before ```lang\ncode\n``` after");
        assert_eq!(
            segments,
            vec![
                plain("before "),
                Segment::CodeBlock {
                    language: Some("lang".into()),
                    code: "code".into(),
                },
                plain(" after"),
            ]
        );
    }

    #[test]
    fn test_fence_without_language() {
        let segments = format_message("```\nlet x = 1;\n```");
        assert_eq!(
            segments,
            vec![Segment::CodeBlock {
                language: None,
                code: "let x = 1;".into(),
            }]
        );
    }

    #[test]
    fn test_single_line_fence_has_no_language() {
        let segments = format_message("```x = 1```");
        assert_eq!(
            segments,
            vec![Segment::CodeBlock {
                language: None,
                code: "x = 1".into(),
            }]
        );
    }

    #[test]
    fn test_unmatched_fence_stays_literal() {
        let segments = format_message("a ``` b");
        assert_eq!(segments, vec![plain("a ``` b")]);
    }

    #[test]
    fn test_trailing_unmatched_fence_stays_literal() {
        let segments = format_message("x ```c\nbody\n``` y ``` z");
        assert_eq!(
            segments,
            vec![
                plain("x "),
                Segment::CodeBlock {
                    language: Some("c".into()),
                    code: "body".into(),
                },
                plain(" y ``` z"),
            ]
        );
    }

    #[test]
    fn test_no_fence_means_no_code_blocks() {
        let segments = format_message("- a\ntext\n1. b");
        assert!(segments
            .iter()
            .all(|s| !matches!(s, Segment::CodeBlock { .. })));
    }

    #[test]
    fn test_bullet_grouping() {
        let segments = format_message("- one\n- two\nplain");
        assert_eq!(
            segments,
            vec![
                Segment::BulletList {
                    items: vec!["one".into(), "two".into()],
                },
                plain("plain"),
            ]
        );
    }

    #[test]
    fn test_star_and_indented_bullets() {
        let segments = format_message("  * first\n- second");
        assert_eq!(
            segments,
            vec![Segment::BulletList {
                items: vec!["first".into(), "second".into()],
            }]
        );
    }

    #[test]
    fn test_numbered_list() {
        let segments = format_message("intro\n1. one\n2. two");
        assert_eq!(
            segments,
            vec![
                plain("intro"),
                Segment::NumberedList {
                    items: vec!["one".into(), "two".into()],
                },
            ]
        );
    }

    #[test]
    fn test_adjacent_lists_stay_separate() {
        let segments = format_message("- a\n1. b\n- c");
        assert_eq!(
            segments,
            vec![
                Segment::BulletList {
                    items: vec!["a".into()],
                },
                Segment::NumberedList {
                    items: vec!["b".into()],
                },
                Segment::BulletList {
                    items: vec!["c".into()],
                },
            ]
        );
    }

    #[test]
    fn test_blank_lines_preserved_in_plain_text() {
        let segments = format_message("a\n\nb");
        assert_eq!(segments, vec![plain("a\n\nb")]);
    }

    #[test]
    fn test_lists_inside_code_are_not_rewritten() {
        let segments = format_message("```\n- not a bullet\n```");
        assert_eq!(
            segments,
            vec![Segment::CodeBlock {
                language: None,
                code: "- not a bullet".into(),
            }]
        );
    }

    #[test]
    fn test_deterministic() {
        let input = "a\n- b\n```rs\nc\n```\n1. d";
        assert_eq!(format_message(input), format_message(input));
    }

    #[test]
    fn test_dash_without_space_is_plain() {
        let segments = format_message("-not a bullet\n1.also not");
        assert_eq!(segments, vec![plain("-not a bullet\n1.also not")]);
    }
}
