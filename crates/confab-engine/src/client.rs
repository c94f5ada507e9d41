//! HTTP client for the remote answering service.
//!
//! One endpoint: `POST {base}{ask_path}` with `{"question": ...}`, answered
//! by `{"answer": ..., "sources": [...]}`. Timeouts are enforced at the
//! client level; the controller never waits unboundedly.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::config::Config;

/// Question sent in the throwaway connectivity probe.
const PROBE_QUESTION: &str = "connectivity check";

/// A successful response from the answering service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    /// The answer text, unformatted.
    pub text: String,
    /// Citation sources in the order the service returned them.
    pub sources: Vec<String>,
}

/// Request body for the ask endpoint.
#[derive(Debug, Serialize)]
struct AskRequest<'a> {
    question: &'a str,
}

/// Response body of a successful ask call.
#[derive(Debug, Deserialize)]
struct AskResponseBody {
    answer: Option<String>,
    #[serde(default)]
    sources: Vec<String>,
}

/// Error detail some deployments embed in failure bodies.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// Client for the answering service.
#[derive(Debug, Clone)]
pub struct AnswerClient {
    http: reqwest::Client,
    endpoint: String,
}

impl AnswerClient {
    /// Build a client from configuration.
    pub fn new(config: &Config) -> Result<Self, AskError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(transport_error)?;

        Ok(Self {
            http,
            endpoint: config.endpoint(),
        })
    }

    /// Full URL this client posts questions to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Submit one question and wait for the service to settle.
    pub async fn ask(&self, question: &str) -> Result<Answer, AskError> {
        let response = self
            .http
            .post(&self.endpoint)
            .json(&AskRequest { question })
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let body = response.text().await.map_err(transport_error)?;

        if !status.is_success() {
            let status = status.as_u16();
            return Err(AskError::Server {
                status,
                message: server_error_message(status, &body),
            });
        }

        parse_answer(&body)
    }

    /// Send a throwaway question and report round-trip latency.
    ///
    /// Diagnostics only: this never touches a transcript or controller.
    pub async fn probe(&self) -> Result<Duration, AskError> {
        let start = Instant::now();
        self.ask(PROBE_QUESTION).await?;
        Ok(start.elapsed())
    }
}

/// Decode a 2xx body. `answer` must be present and non-empty.
fn parse_answer(body: &str) -> Result<Answer, AskError> {
    let body: AskResponseBody =
        serde_json::from_str(body).map_err(|_| AskError::MalformedResponse)?;
    match body.answer {
        Some(text) if !text.is_empty() => Ok(Answer {
            text,
            sources: body.sources,
        }),
        _ => Err(AskError::MalformedResponse),
    }
}

/// User-visible message for a non-2xx response.
///
/// An `error` field in a JSON body is surfaced verbatim; anything else gets
/// a generic message.
fn server_error_message(status: u16, body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .unwrap_or_else(|| format!("the answering service returned HTTP {status}"))
}

fn transport_error(err: reqwest::Error) -> AskError {
    if err.is_timeout() {
        AskError::Timeout
    } else {
        AskError::Transport(err.to_string())
    }
}

/// Errors from one ask call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AskError {
    /// The request never reached the service, or the connection broke.
    #[error("could not reach the answering service: {0}")]
    Transport(String),

    /// The service did not settle within the configured timeout.
    #[error("the answering service did not respond in time")]
    Timeout,

    /// Non-2xx response; `message` is the server's own error text when it
    /// provided one.
    #[error("{message}")]
    Server { status: u16, message: String },

    /// 2xx response without a usable `answer` field.
    #[error("invalid response format")]
    MalformedResponse,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_answer_with_sources() {
        let answer = parse_answer(r#"{"answer":"hi","sources":["doc1"]}"#).unwrap();
        assert_eq!(answer.text, "hi");
        assert_eq!(answer.sources, vec!["doc1".to_string()]);
    }

    #[test]
    fn test_parse_answer_sources_optional() {
        let answer = parse_answer(r#"{"answer":"hi"}"#).unwrap();
        assert!(answer.sources.is_empty());
    }

    #[test]
    fn test_parse_answer_source_order_preserved() {
        let answer =
            parse_answer(r#"{"answer":"hi","sources":["z.md","a.md","z.md"]}"#).unwrap();
        assert_eq!(
            answer.sources,
            vec!["z.md".to_string(), "a.md".to_string(), "z.md".to_string()]
        );
    }

    #[test]
    fn test_parse_answer_missing_answer_is_malformed() {
        assert_eq!(
            parse_answer(r#"{"sources":["doc1"]}"#),
            Err(AskError::MalformedResponse)
        );
    }

    #[test]
    fn test_parse_answer_empty_answer_is_malformed() {
        assert_eq!(
            parse_answer(r#"{"answer":""}"#),
            Err(AskError::MalformedResponse)
        );
    }

    #[test]
    fn test_parse_answer_garbage_is_malformed() {
        assert_eq!(parse_answer("<html>oops"), Err(AskError::MalformedResponse));
    }

    #[test]
    fn test_server_error_message_from_body() {
        assert_eq!(server_error_message(500, r#"{"error":"boom"}"#), "boom");
    }

    #[test]
    fn test_server_error_message_generic_fallback() {
        let message = server_error_message(502, "bad gateway");
        assert!(message.contains("502"));

        let message = server_error_message(500, r#"{"detail":"nope"}"#);
        assert!(message.contains("500"));
    }

    #[test]
    fn test_client_uses_config_endpoint() {
        let config = Config {
            backend_url: "http://example.test".into(),
            ask_path: "/api/ask".into(),
            ..Config::default()
        };
        let client = AnswerClient::new(&config).unwrap();
        assert_eq!(client.endpoint(), "http://example.test/api/ask");
    }
}
