//! Shared widgets for the confab TUI.

mod input_bar;
mod transcript_pane;

pub use input_bar::{InputBar, InputState};
pub use transcript_pane::TranscriptPane;
