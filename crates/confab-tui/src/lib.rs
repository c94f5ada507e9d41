//! confab-tui: Terminal UI for the confab answering-service client
//!
//! This crate provides the rendering layer on top of `confab-engine`:
//! - Transcript view that renders engine segments as styled text
//! - Question input bar with history
//! - Error banner and waiting indicator

mod app;
mod event;
mod segments;
mod theme;
mod ui;
mod widgets;

pub use app::App;
pub use confab_engine;
pub use event::{Event, EventHandler};
pub use segments::segment_lines;
pub use theme::Theme;

use confab_engine::Config;
use crossterm::{
    cursor::Show as ShowCursor,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::stdout;
use std::path::Path;

/// RAII guard for terminal state restoration.
struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(stdout(), LeaveAlternateScreen, ShowCursor);
    }
}

/// Run the TUI application.
///
/// Sets up the terminal, runs the event loop until quit, then saves the
/// session (if any turns were exchanged) and restores the terminal.
pub async fn run_tui(config: &Config, data_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    enable_raw_mode()?;
    let _guard = TerminalGuard;

    let mut out = stdout();
    execute!(out, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(out);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config, data_dir.to_path_buf())?;
    let theme = Theme::default();

    // 4 Hz tick rate drives answer polling and redraws.
    let mut events = EventHandler::new(250);

    while !app.should_quit {
        terminal.draw(|frame| ui::draw(frame, &app, &theme))?;

        let Some(event) = events.next().await else {
            break;
        };
        match event {
            Event::Key(key) => app.handle_key(key),
            Event::Tick => app.on_tick(),
            Event::Resize(_, _) => {}
        }
    }

    app.save_session()?;
    terminal.show_cursor()?;
    Ok(())
}
