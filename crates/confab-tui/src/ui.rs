//! Screen layout and drawing.

use ratatui::{
    layout::{Constraint, Layout},
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app::App;
use crate::theme::Theme;
use crate::widgets::{InputBar, TranscriptPane};

/// Draw the whole screen: transcript, optional banner, input bar, hints.
pub fn draw(frame: &mut Frame<'_>, app: &App, theme: &Theme) {
    let banner = app.controller().banner();
    let banner_height = u16::from(banner.is_some());

    let [transcript_area, banner_area, input_area, hints_area] = Layout::vertical([
        Constraint::Min(3),
        Constraint::Length(banner_height),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    let waiting = app.controller().is_in_flight();

    frame.render_widget(
        TranscriptPane::new(app.controller().transcript(), theme)
            .scroll(app.scroll)
            .follow(app.follow)
            .waiting(waiting),
        transcript_area,
    );

    if let Some(message) = banner {
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                format!(" {message}"),
                Style::default().fg(theme.error),
            ))),
            banner_area,
        );
    }

    frame.render_widget(InputBar::new(&app.input, theme).waiting(waiting), input_area);

    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            " Enter send · ↑/↓ history · PgUp/PgDn scroll · Ctrl+F follow · Esc dismiss · Ctrl+C quit",
            Style::default().fg(theme.muted),
        ))),
        hints_area,
    );
}
