//! Application state and update logic for the confab TUI.

use std::path::PathBuf;

use confab_engine::{Answer, AskError, Config, Controller, Session, TranscriptError};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tokio::sync::oneshot;

use crate::widgets::InputState;

/// Lines moved per page-scroll keypress.
const SCROLL_STEP: usize = 10;

/// Application state.
#[derive(Debug)]
pub struct App {
    /// Whether the app should quit.
    pub should_quit: bool,

    /// Question input state.
    pub input: InputState,

    /// Manual transcript scroll offset (lines from the top).
    pub scroll: usize,

    /// Whether the transcript view follows the newest turn.
    pub follow: bool,

    controller: Controller,
    session: Session,
    data_dir: PathBuf,

    /// Receiver for the outcome of the in-flight request, if any.
    answer_rx: Option<oneshot::Receiver<Result<Answer, AskError>>>,
}

impl App {
    /// Create a new app instance for the configured endpoint.
    pub fn new(config: &Config, data_dir: PathBuf) -> Result<Self, AskError> {
        Ok(Self {
            should_quit: false,
            input: InputState::new(),
            scroll: 0,
            follow: true,
            controller: Controller::new(config)?,
            session: Session::new(),
            data_dir,
            answer_rx: None,
        })
    }

    /// The conversation controller (read access for rendering).
    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    /// Handle a key event.
    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('c' | 'd') => self.should_quit = true,
                KeyCode::Char('f') => self.follow = !self.follow,
                KeyCode::Char('u') => self.input.clear(),
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Enter => self.submit_input(),
            KeyCode::Esc => self.controller.clear_banner(),
            KeyCode::Char(ch) => self.input.insert(ch),
            KeyCode::Backspace => self.input.backspace(),
            KeyCode::Delete => self.input.delete(),
            KeyCode::Left => self.input.move_left(),
            KeyCode::Right => self.input.move_right(),
            KeyCode::Home => self.input.move_home(),
            KeyCode::End => self.input.move_end(),
            KeyCode::Up => self.input.history_prev(),
            KeyCode::Down => self.input.history_next(),
            KeyCode::PageUp => {
                self.follow = false;
                self.scroll = self.scroll.saturating_sub(SCROLL_STEP);
            }
            KeyCode::PageDown => {
                if !self.follow {
                    self.scroll += SCROLL_STEP;
                }
            }
            _ => {}
        }
    }

    /// Poll for a settled answer. Called on every tick.
    pub fn on_tick(&mut self) {
        let Some(rx) = &mut self.answer_rx else {
            return;
        };
        match rx.try_recv() {
            Ok(outcome) => {
                self.answer_rx = None;
                self.controller.complete(outcome);
            }
            Err(oneshot::error::TryRecvError::Empty) => {}
            Err(oneshot::error::TryRecvError::Closed) => {
                self.answer_rx = None;
                self.controller
                    .complete(Err(AskError::Transport("request task was dropped".into())));
            }
        }
    }

    /// Submit the current input, dispatching the request on a background
    /// task. Rejected submissions leave the input in place for correction.
    fn submit_input(&mut self) {
        let text = self.input.text().to_string();
        let Ok(question) = self.controller.begin_submit(&text) else {
            return;
        };

        let _ = self.input.take_submission();
        self.follow = true;

        let client = self.controller.client().clone();
        let (tx, rx) = oneshot::channel();
        tokio::spawn(async move {
            let _ = tx.send(client.ask(&question).await);
        });
        self.answer_rx = Some(rx);
    }

    /// Persist the session if any turns were exchanged.
    pub fn save_session(&mut self) -> Result<(), TranscriptError> {
        if self.controller.transcript().is_empty() {
            return Ok(());
        }
        self.session
            .save(self.controller.transcript(), &self.data_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(ch: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(ch), KeyModifiers::CONTROL)
    }

    fn app() -> App {
        App::new(&Config::default(), PathBuf::from(".confab")).unwrap()
    }

    #[test]
    fn test_typing_updates_input() {
        let mut app = app();
        app.handle_key(key(KeyCode::Char('h')));
        app.handle_key(key(KeyCode::Char('i')));
        assert_eq!(app.input.text(), "hi");
    }

    #[test]
    fn test_empty_submit_raises_banner_and_keeps_state() {
        let mut app = app();
        app.handle_key(key(KeyCode::Enter));

        assert!(app.controller().banner().is_some());
        assert!(app.controller().transcript().is_empty());
        assert!(!app.controller().is_in_flight());
    }

    #[test]
    fn test_whitespace_submit_keeps_input_for_correction() {
        let mut app = app();
        app.handle_key(key(KeyCode::Char(' ')));
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.input.text(), " ");
    }

    #[test]
    fn test_esc_clears_banner() {
        let mut app = app();
        app.handle_key(key(KeyCode::Enter));
        assert!(app.controller().banner().is_some());

        app.handle_key(key(KeyCode::Esc));
        assert!(app.controller().banner().is_none());
    }

    #[test]
    fn test_ctrl_c_quits() {
        let mut app = app();
        app.handle_key(ctrl('c'));
        assert!(app.should_quit);
    }

    #[test]
    fn test_page_up_disables_follow() {
        let mut app = app();
        assert!(app.follow);
        app.handle_key(key(KeyCode::PageUp));
        assert!(!app.follow);

        app.handle_key(ctrl('f'));
        assert!(app.follow);
    }
}
