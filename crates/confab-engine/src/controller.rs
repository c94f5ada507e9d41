//! Turn-based request lifecycle controller.
//!
//! The controller owns the [`Transcript`] and the request state, and is the
//! only thing that mutates either. A submission runs in two halves:
//! [`Controller::begin_submit`] validates, appends the question turn, and
//! moves to [`RequestState::InFlight`]; [`Controller::complete`] translates
//! the settled outcome into an answer turn and returns to idle. The async
//! [`Controller::submit`] drives both halves around the one await point.
//! Event-loop callers (the TUI) dispatch the call themselves and feed the
//! outcome back through `complete`, which keeps at most one request
//! outstanding without any locking.

use crate::client::{Answer, AnswerClient, AskError};
use crate::config::Config;
use crate::transcript::{Transcript, Turn};

/// Whether a remote request is currently outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestState {
    /// No request outstanding; submissions are accepted.
    #[default]
    Idle,
    /// Exactly one request outstanding; further submissions are rejected,
    /// not queued.
    InFlight,
}

/// Why a submission was rejected. Rejections never touch the transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    /// The input was empty or whitespace-only.
    #[error("type a question before sending")]
    EmptyQuestion,

    /// A request is already outstanding.
    #[error("still waiting for the previous answer")]
    RequestInFlight,
}

/// Conversation controller: transcript, request state, and error banner.
#[derive(Debug)]
pub struct Controller {
    transcript: Transcript,
    state: RequestState,
    banner: Option<String>,
    client: AnswerClient,
}

impl Controller {
    /// Build a controller for the endpoint named by `config`.
    pub fn new(config: &Config) -> Result<Self, AskError> {
        Ok(Self {
            transcript: Transcript::new(),
            state: RequestState::Idle,
            banner: None,
            client: AnswerClient::new(config)?,
        })
    }

    /// The conversation so far.
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Current request state.
    pub fn state(&self) -> RequestState {
        self.state
    }

    /// Whether a request is outstanding.
    pub fn is_in_flight(&self) -> bool {
        self.state == RequestState::InFlight
    }

    /// The currently visible error message, if any. At most one is visible
    /// at a time; it reflects the most recent failure.
    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    /// Dismiss the error banner without touching the transcript.
    pub fn clear_banner(&mut self) {
        self.banner = None;
    }

    /// The client used for dispatch; event-loop callers clone it into the
    /// task that performs the call.
    pub fn client(&self) -> &AnswerClient {
        &self.client
    }

    /// Accept or reject a submission.
    ///
    /// On acceptance the question turn is appended exactly as typed
    /// (untrimmed), any banner is cleared, the state moves to in-flight, and
    /// the text to dispatch is returned. The caller must settle the request
    /// by passing the outcome to [`Controller::complete`].
    ///
    /// A submission while in flight is ignored: no transcript mutation, no
    /// banner. An empty submission surfaces a validation message in the
    /// banner.
    pub fn begin_submit(&mut self, input: &str) -> Result<String, SubmitError> {
        if self.state == RequestState::InFlight {
            return Err(SubmitError::RequestInFlight);
        }
        if input.trim().is_empty() {
            self.banner = Some(SubmitError::EmptyQuestion.to_string());
            return Err(SubmitError::EmptyQuestion);
        }

        self.banner = None;
        self.transcript.push(Turn::question(input));
        self.state = RequestState::InFlight;
        Ok(input.to_string())
    }

    /// Settle the outstanding request.
    ///
    /// Success appends a complete answer turn carrying the service's text
    /// and sources. Failure appends a failed answer turn with a synthesized
    /// message and raises the same message as the banner. Either way the
    /// state returns to idle. Failures are never retried.
    pub fn complete(&mut self, outcome: Result<Answer, AskError>) {
        if self.state != RequestState::InFlight {
            // Stale completion; nothing is outstanding.
            return;
        }

        match outcome {
            Ok(answer) => {
                self.transcript.push(Turn::answer(answer.text, answer.sources));
            }
            Err(err) => {
                let message = format!("Error: {err}");
                self.transcript.push(Turn::failed(message.clone()));
                self.banner = Some(message);
            }
        }
        self.state = RequestState::Idle;
    }

    /// One full submit/settle cycle: validate, dispatch, settle.
    ///
    /// The `ask` call is the sole suspension point; the transcript and
    /// request state mutate only before it and after it, on the caller's
    /// task.
    pub async fn submit(&mut self, input: &str) -> Result<(), SubmitError> {
        let question = self.begin_submit(input)?;
        let outcome = self.client.ask(&question).await;
        self.complete(outcome);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::{Role, TurnStatus};

    fn controller() -> Controller {
        Controller::new(&Config::default()).unwrap()
    }

    #[test]
    fn test_empty_submit_is_rejected() {
        let mut c = controller();

        assert_eq!(c.begin_submit(""), Err(SubmitError::EmptyQuestion));
        assert_eq!(c.begin_submit("   \n\t"), Err(SubmitError::EmptyQuestion));

        assert!(c.transcript().is_empty());
        assert_eq!(c.state(), RequestState::Idle);
        assert!(c.banner().is_some());
    }

    #[test]
    fn test_accepted_submit_preserves_raw_text() {
        let mut c = controller();

        let dispatched = c.begin_submit("  how do prefabs work?  ").unwrap();
        assert_eq!(dispatched, "  how do prefabs work?  ");

        let turns = c.transcript().turns();
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].role, Role::Question);
        assert_eq!(turns[0].text, "  how do prefabs work?  ");
        assert_eq!(turns[0].status, TurnStatus::Complete);
        assert_eq!(c.state(), RequestState::InFlight);
    }

    #[test]
    fn test_success_appends_answer_and_returns_to_idle() {
        let mut c = controller();
        c.begin_submit("x").unwrap();

        c.complete(Ok(Answer {
            text: "hi".into(),
            sources: vec!["doc1".into()],
        }));

        let turns = c.transcript().turns();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[1].role, Role::Answer);
        assert_eq!(turns[1].text, "hi");
        assert_eq!(turns[1].sources, vec!["doc1".to_string()]);
        assert_eq!(turns[1].status, TurnStatus::Complete);
        assert_eq!(c.state(), RequestState::Idle);
        assert!(c.banner().is_none());
    }

    #[test]
    fn test_failure_appends_failed_turn_and_banner() {
        let mut c = controller();
        c.begin_submit("x").unwrap();

        c.complete(Err(AskError::Server {
            status: 500,
            message: "boom".into(),
        }));

        let turns = c.transcript().turns();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[1].status, TurnStatus::Failed);
        assert!(turns[1].text.contains("boom"));
        assert!(turns[1].text.starts_with("Error: "));
        assert!(turns[1].sources.is_empty());
        assert!(c.banner().unwrap().contains("boom"));
        assert_eq!(c.state(), RequestState::Idle);
    }

    #[test]
    fn test_malformed_response_message() {
        let mut c = controller();
        c.begin_submit("x").unwrap();
        c.complete(Err(AskError::MalformedResponse));

        assert!(c
            .transcript()
            .last()
            .unwrap()
            .text
            .contains("invalid response format"));
    }

    #[test]
    fn test_second_submit_while_in_flight_is_ignored() {
        let mut c = controller();
        c.begin_submit("first").unwrap();

        assert_eq!(c.begin_submit("second"), Err(SubmitError::RequestInFlight));

        // One question turn, no banner raised for the ignored attempt.
        assert_eq!(c.transcript().len(), 1);
        assert!(c.banner().is_none());
        assert_eq!(c.state(), RequestState::InFlight);

        c.complete(Ok(Answer {
            text: "done".into(),
            sources: Vec::new(),
        }));
        assert_eq!(c.transcript().len(), 2);
    }

    #[test]
    fn test_next_accepted_submit_clears_banner() {
        let mut c = controller();
        c.begin_submit("x").unwrap();
        c.complete(Err(AskError::Timeout));
        assert!(c.banner().is_some());

        c.begin_submit("y").unwrap();
        assert!(c.banner().is_none());

        // The failed turn stays in the transcript.
        assert_eq!(c.transcript().len(), 3);
        assert_eq!(c.transcript().turns()[1].status, TurnStatus::Failed);
    }

    #[test]
    fn test_stale_completion_is_ignored() {
        let mut c = controller();
        c.complete(Ok(Answer {
            text: "ghost".into(),
            sources: Vec::new(),
        }));

        assert!(c.transcript().is_empty());
        assert_eq!(c.state(), RequestState::Idle);
    }

    #[test]
    fn test_no_two_unanswered_questions() {
        let mut c = controller();
        c.begin_submit("a").unwrap();
        let _ = c.begin_submit("b");
        c.complete(Err(AskError::Timeout));
        c.begin_submit("c").unwrap();

        // Every question turn is followed by an answer turn before the next
        // question appears.
        let turns = c.transcript().turns();
        for pair in turns.windows(2) {
            if pair[0].role == Role::Question {
                assert_eq!(pair[1].role, Role::Answer);
            }
        }
    }
}
