//! confab-engine: Headless core for the confab answering-service client
//!
//! This crate provides the terminal-independent logic for confab, including:
//! - Message content formatting into typed segments
//! - Transcript and session persistence
//! - The turn-based request lifecycle controller
//! - The HTTP client for the answering service
//! - Configuration loading and saving

pub mod client;
pub mod config;
pub mod controller;
pub mod format;
pub mod transcript;

// Re-export commonly used types
pub use client::{Answer, AnswerClient, AskError};
pub use config::{Config, ConfigError};
pub use controller::{Controller, RequestState, SubmitError};
pub use format::{format_message, Segment};
pub use transcript::{Role, Session, Transcript, TranscriptError, Turn, TurnStatus};

/// Returns the engine version.
pub fn engine_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
