//! Conversation transcript types and session persistence.
//!
//! A [`Transcript`] is the append-only, ordered history of [`Turn`]s for one
//! conversation. [`Session`] wraps a transcript with identity and timestamps
//! and persists it as a JSONL file (metadata line followed by one line per
//! turn).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;
use uuid::Uuid;

/// Role of a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// A question typed by the user.
    Question,
    /// A response (or synthesized error) from the answering service.
    Answer,
}

/// Lifecycle status of a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnStatus {
    /// Placeholder for a response that has not arrived yet.
    Pending,
    /// Settled successfully.
    Complete,
    /// Settled with a failure; `text` holds the error message.
    Failed,
}

/// One exchange unit: a question or an answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    /// Role of this entry.
    pub role: Role,
    /// Raw text as typed or as returned; formatted only at render time.
    pub text: String,
    /// Citation sources, in the order the service returned them.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<String>,
    /// Lifecycle status.
    pub status: TurnStatus,
    /// When this turn was appended.
    pub timestamp: DateTime<Utc>,
}

impl Turn {
    /// Create a question turn. Questions are complete as soon as they are
    /// submitted.
    pub fn question(text: impl Into<String>) -> Self {
        Self {
            role: Role::Question,
            text: text.into(),
            sources: Vec::new(),
            status: TurnStatus::Complete,
            timestamp: Utc::now(),
        }
    }

    /// Create a successful answer turn.
    pub fn answer(text: impl Into<String>, sources: Vec<String>) -> Self {
        Self {
            role: Role::Answer,
            text: text.into(),
            sources,
            status: TurnStatus::Complete,
            timestamp: Utc::now(),
        }
    }

    /// Create a failed answer turn carrying a synthesized error message.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            role: Role::Answer,
            text: message.into(),
            sources: Vec::new(),
            status: TurnStatus::Failed,
            timestamp: Utc::now(),
        }
    }
}

/// Append-only ordered history of turns.
///
/// Insertion order is chronological order is display order. There is no API
/// for removing or reordering turns.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    /// Create an empty transcript.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a turn.
    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// All turns, oldest first.
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Number of turns.
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Whether the transcript has no turns.
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// The most recent turn, if any.
    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// Text of the first question, used to derive session titles.
    fn first_question(&self) -> Option<&str> {
        self.turns
            .iter()
            .find(|t| t.role == Role::Question)
            .map(|t| t.text.as_str())
    }
}

/// Maximum length of a derived session title.
const TITLE_MAX: usize = 50;

/// Identity and timestamps for a persisted conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Unique session ID.
    pub id: String,
    /// Title derived from the first question.
    pub title: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last saved timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// Create a new session with a fresh ID.
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            title: "New conversation".into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Save the session and its transcript as JSONL under `dir/sessions/`.
    ///
    /// The title is (re)derived from the transcript's first question and the
    /// updated timestamp is refreshed.
    pub fn save(&mut self, transcript: &Transcript, dir: &Path) -> Result<(), TranscriptError> {
        use std::io::Write;

        if let Some(question) = transcript.first_question() {
            self.title = derive_title(question);
        }
        self.updated_at = Utc::now();

        let sessions_dir = dir.join("sessions");
        std::fs::create_dir_all(&sessions_dir).map_err(TranscriptError::Io)?;

        let path = sessions_dir.join(format!("{}.jsonl", self.id));
        let mut file = std::fs::File::create(&path).map_err(TranscriptError::Io)?;

        let meta_json = serde_json::to_string(self).map_err(TranscriptError::Serialize)?;
        writeln!(file, "{meta_json}").map_err(TranscriptError::Io)?;

        for turn in transcript.turns() {
            let json = serde_json::to_string(turn).map_err(TranscriptError::Serialize)?;
            writeln!(file, "{json}").map_err(TranscriptError::Io)?;
        }

        Ok(())
    }

    /// Load a session and its transcript from `dir/sessions/<id>.jsonl`.
    pub fn load(dir: &Path, id: &str) -> Result<(Self, Transcript), TranscriptError> {
        let path = dir.join("sessions").join(format!("{id}.jsonl"));
        let content = std::fs::read_to_string(&path).map_err(TranscriptError::Io)?;

        let mut lines = content.lines();
        let meta_line = lines.next().ok_or(TranscriptError::EmptySession)?;
        let session: Session = serde_json::from_str(meta_line).map_err(TranscriptError::Parse)?;

        let mut transcript = Transcript::new();
        for line in lines {
            if line.trim().is_empty() {
                continue;
            }
            let turn: Turn = serde_json::from_str(line).map_err(TranscriptError::Parse)?;
            transcript.push(turn);
        }

        Ok((session, transcript))
    }

    /// List persisted sessions under `dir/sessions/`, metadata only.
    ///
    /// Files that fail to parse are skipped with a warning rather than
    /// aborting the listing.
    pub fn list(dir: &Path) -> Result<Vec<Session>, TranscriptError> {
        let sessions_dir = dir.join("sessions");
        if !sessions_dir.exists() {
            return Ok(Vec::new());
        }

        let mut sessions = Vec::new();
        for entry in std::fs::read_dir(&sessions_dir).map_err(TranscriptError::Io)? {
            let entry = entry.map_err(TranscriptError::Io)?;
            let path = entry.path();
            if !path.extension().is_some_and(|ext| ext == "jsonl") {
                continue;
            }
            let Some(stem) = path.file_stem() else {
                continue;
            };
            let id = stem.to_string_lossy();
            match Session::load(dir, &id) {
                Ok((session, _)) => sessions.push(session),
                Err(e) => warn!(session_id = %id, error = %e, "Skipping unreadable session"),
            }
        }

        sessions.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(sessions)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

fn derive_title(question: &str) -> String {
    let mut title: String = question.trim().chars().take(TITLE_MAX).collect();
    if question.trim().chars().count() > TITLE_MAX {
        title.push_str("...");
    }
    if title.is_empty() {
        title = "New conversation".into();
    }
    title
}

/// Errors that can occur persisting or loading sessions.
#[derive(Debug, thiserror::Error)]
pub enum TranscriptError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("Serialization error: {0}")]
    Serialize(#[source] serde_json::Error),

    /// JSON parse error.
    #[error("Parse error: {0}")]
    Parse(#[source] serde_json::Error),

    /// Session file has no metadata line.
    #[error("Session file is empty")]
    EmptySession,
}
