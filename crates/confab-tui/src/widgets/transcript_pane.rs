//! Scrollable transcript view.
//!
//! Each turn renders as a role header followed by its formatted body; answer
//! sources, when present, come after the body in the order the service
//! returned them.

use chrono::{DateTime, Utc};
use confab_engine::{format_message, Role, Transcript, Turn, TurnStatus};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::segments::segment_lines;
use crate::theme::Theme;

/// Transcript pane widget.
pub struct TranscriptPane<'a> {
    transcript: &'a Transcript,
    theme: &'a Theme,
    scroll: usize,
    follow: bool,
    waiting: bool,
}

impl<'a> TranscriptPane<'a> {
    /// Create a new transcript pane.
    pub fn new(transcript: &'a Transcript, theme: &'a Theme) -> Self {
        Self {
            transcript,
            theme,
            scroll: 0,
            follow: true,
            waiting: false,
        }
    }

    /// Set the manual scroll offset (ignored while following).
    #[must_use]
    pub fn scroll(mut self, scroll: usize) -> Self {
        self.scroll = scroll;
        self
    }

    /// Follow mode pins the view to the bottom of the transcript.
    #[must_use]
    pub fn follow(mut self, follow: bool) -> Self {
        self.follow = follow;
        self
    }

    /// Show a pending-answer placeholder after the last turn.
    #[must_use]
    pub fn waiting(mut self, waiting: bool) -> Self {
        self.waiting = waiting;
        self
    }

    fn header_line(&self, turn: &Turn) -> Line<'static> {
        let (label, accent) = match turn.role {
            Role::Question => ("Q", self.theme.question),
            Role::Answer => ("A", self.theme.answer),
        };
        let accent = if turn.status == TurnStatus::Failed {
            self.theme.error
        } else {
            accent
        };

        Line::from(vec![
            Span::styled(
                label.to_string(),
                Style::default().fg(accent).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!(" · {}", format_time(turn.timestamp)),
                Style::default().fg(self.theme.muted),
            ),
        ])
    }

    fn body_lines(&self, turn: &Turn, width: usize) -> Vec<Line<'static>> {
        if turn.status == TurnStatus::Failed {
            return textwrap::wrap(&turn.text, width)
                .into_iter()
                .map(|wrapped| {
                    Line::from(Span::styled(
                        wrapped.into_owned(),
                        Style::default().fg(self.theme.error),
                    ))
                })
                .collect();
        }

        let segments = format_message(&turn.text);
        segment_lines(&segments, width, self.theme)
    }

    fn sources_lines(&self, turn: &Turn, width: usize) -> Vec<Line<'static>> {
        if turn.sources.is_empty() {
            return Vec::new();
        }

        let mut lines = vec![Line::from(Span::styled(
            "Sources:".to_string(),
            Style::default()
                .fg(self.theme.subtext)
                .add_modifier(Modifier::BOLD),
        ))];
        for source in &turn.sources {
            for (index, wrapped) in textwrap::wrap(source, width.saturating_sub(2).max(4))
                .iter()
                .enumerate()
            {
                let prefix = if index == 0 { "- " } else { "  " };
                lines.push(Line::from(Span::styled(
                    format!("{prefix}{wrapped}"),
                    Style::default().fg(self.theme.muted),
                )));
            }
        }
        lines
    }

    /// Build every display line for the current width.
    fn build_lines(&self, width: usize) -> Vec<Line<'static>> {
        let mut lines = Vec::new();

        if self.transcript.is_empty() && !self.waiting {
            lines.push(Line::from(Span::styled(
                "Ask a question to get started.".to_string(),
                Style::default().fg(self.theme.muted),
            )));
            return lines;
        }

        for turn in self.transcript.turns() {
            lines.push(self.header_line(turn));
            lines.extend(self.body_lines(turn, width));
            lines.extend(self.sources_lines(turn, width));
            lines.push(Line::from(""));
        }

        if self.waiting {
            lines.push(Line::from(Span::styled(
                "● thinking...".to_string(),
                Style::default().fg(self.theme.muted),
            )));
        }

        lines
    }
}

#[allow(clippy::cast_possible_truncation)]
impl Widget for TranscriptPane<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.border))
            .title(" confab ");

        let inner_width = area.width.saturating_sub(2) as usize;
        let inner_height = area.height.saturating_sub(2) as usize;

        let lines = self.build_lines(inner_width.max(8));
        let max_scroll = lines.len().saturating_sub(inner_height);
        let offset = if self.follow {
            max_scroll
        } else {
            self.scroll.min(max_scroll)
        };

        Paragraph::new(lines)
            .block(block)
            .scroll((offset as u16, 0))
            .render(area, buf);
    }
}

fn format_time(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%H:%M").to_string()
}
