//! Single-line question input with history.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::theme::Theme;

/// Editable input state: content, cursor, and submission history.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    text: String,
    /// Cursor position as a character index.
    cursor: usize,
    history: Vec<String>,
    /// Index into `history` while browsing, newest first.
    history_pos: Option<usize>,
    /// Input stashed while browsing history.
    stash: String,
}

impl InputState {
    /// Create an empty input state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current content.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether the input is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Cursor position as a character index.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_index)
            .map_or(self.text.len(), |(byte, _)| byte)
    }

    fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    /// Insert a character at the cursor.
    pub fn insert(&mut self, ch: char) {
        let at = self.byte_index(self.cursor);
        self.text.insert(at, ch);
        self.cursor += 1;
    }

    /// Delete the character before the cursor.
    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let at = self.byte_index(self.cursor);
            self.text.remove(at);
        }
    }

    /// Delete the character at the cursor.
    pub fn delete(&mut self) {
        if self.cursor < self.char_count() {
            let at = self.byte_index(self.cursor);
            self.text.remove(at);
        }
    }

    /// Move cursor left.
    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    /// Move cursor right.
    pub fn move_right(&mut self) {
        if self.cursor < self.char_count() {
            self.cursor += 1;
        }
    }

    /// Move cursor to the start.
    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    /// Move cursor to the end.
    pub fn move_end(&mut self) {
        self.cursor = self.char_count();
    }

    /// Clear the input.
    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
        self.history_pos = None;
    }

    /// Take the content for submission, recording non-blank entries in
    /// history.
    pub fn take_submission(&mut self) -> String {
        let text = std::mem::take(&mut self.text);
        self.cursor = 0;
        self.history_pos = None;
        if !text.trim().is_empty() {
            self.history.push(text.clone());
        }
        text
    }

    /// Recall the previous history entry.
    pub fn history_prev(&mut self) {
        if self.history.is_empty() {
            return;
        }
        let next_pos = match self.history_pos {
            None => {
                self.stash = std::mem::take(&mut self.text);
                0
            }
            Some(pos) if pos + 1 < self.history.len() => pos + 1,
            Some(pos) => pos,
        };
        self.history_pos = Some(next_pos);
        self.text = self.history[self.history.len() - 1 - next_pos].clone();
        self.cursor = self.char_count();
    }

    /// Step back toward the stashed input.
    pub fn history_next(&mut self) {
        match self.history_pos {
            None => {}
            Some(0) => {
                self.history_pos = None;
                self.text = std::mem::take(&mut self.stash);
                self.cursor = self.char_count();
            }
            Some(pos) => {
                self.history_pos = Some(pos - 1);
                self.text = self.history[self.history.len() - pos].clone();
                self.cursor = self.char_count();
            }
        }
    }
}

/// Bordered input bar shown at the bottom of the screen.
pub struct InputBar<'a> {
    input: &'a InputState,
    theme: &'a Theme,
    waiting: bool,
}

impl<'a> InputBar<'a> {
    /// Create a new input bar widget.
    pub fn new(input: &'a InputState, theme: &'a Theme) -> Self {
        Self {
            input,
            theme,
            waiting: false,
        }
    }

    /// Show the waiting indicator instead of the input content.
    #[must_use]
    pub fn waiting(mut self, waiting: bool) -> Self {
        self.waiting = waiting;
        self
    }

    fn input_line(&self) -> Line<'static> {
        let prompt = Span::styled("> ".to_string(), Style::default().fg(self.theme.primary));
        let text_style = Style::default().fg(self.theme.text);

        if self.input.is_empty() {
            return Line::from(vec![
                prompt,
                Span::styled("█".to_string(), text_style),
                Span::styled(
                    "Ask a question".to_string(),
                    Style::default().fg(self.theme.muted),
                ),
            ]);
        }

        let chars: Vec<char> = self.input.text().chars().collect();
        let cursor = self.input.cursor();
        let before: String = chars[..cursor.min(chars.len())].iter().collect();
        let after: String = chars[cursor.min(chars.len())..].iter().collect();

        Line::from(vec![
            prompt,
            Span::styled(before, text_style),
            Span::styled("█".to_string(), text_style),
            Span::styled(after, text_style),
        ])
    }
}

impl Widget for InputBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_style = if self.waiting {
            Style::default().fg(self.theme.border)
        } else {
            Style::default().fg(self.theme.border_focused)
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style);

        let paragraph = if self.waiting {
            Paragraph::new("● Waiting for answer...")
                .block(block)
                .style(Style::default().fg(self.theme.muted))
        } else {
            Paragraph::new(self.input_line()).block(block)
        };

        paragraph.render(area, buf);
    }
}
