//! Bounded-concurrency annotation client for OpenAI-compatible endpoints
//!
//! Used by the CLI `annotate` subcommand to obtain external annotations for
//! records that lack them. The classification core never touches this
//! module. In-flight requests are bounded by a semaphore; transient
//! failures (429, 5xx, connect/timeout) retry with exponential backoff and
//! jitter, everything else surfaces immediately.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::warn;

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug, Error)]
pub enum AnnotatorError {
    #[error("http transport error: {0}")]
    Transport(#[from] reqwest::Error),
    /// Non-2xx response; body truncated to 500 characters.
    #[error("annotation request failed [{status}]: {body}")]
    Request { status: u16, body: String },
    #[error("malformed completion payload: {0}")]
    Malformed(String),
}

impl AnnotatorError {
    fn retryable(&self) -> bool {
        match self {
            AnnotatorError::Request { status, .. } => *status == 429 || *status >= 500,
            AnnotatorError::Transport(err) => err.is_connect() || err.is_timeout(),
            AnnotatorError::Malformed(_) => false,
        }
    }
}

// =============================================================================
// Configuration
// =============================================================================

#[derive(Debug, Clone)]
pub struct AnnotatorConfig {
    /// OpenAI-compatible API base, e.g. `http://127.0.0.1:8080/v1`.
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    /// Maximum concurrent HTTP requests.
    pub max_inflight: usize,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Total attempts per request, including the first.
    pub max_attempts: u32,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl AnnotatorConfig {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: None,
            model: model.into(),
            max_inflight: 8,
            timeout: Duration::from_secs(300),
            max_attempts: 3,
            temperature: 1.0,
            max_tokens: 4096,
        }
    }
}

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub role: &'static str,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: "system", content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user", content: content.into() }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

// =============================================================================
// AnnotatorPool
// =============================================================================

/// Async chat-completions client with bounded in-flight requests.
pub struct AnnotatorPool {
    client: reqwest::Client,
    limiter: Arc<Semaphore>,
    cfg: AnnotatorConfig,
}

impl AnnotatorPool {
    pub fn new(cfg: AnnotatorConfig) -> Result<Self, AnnotatorError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(key) = &cfg.api_key {
            let value = HeaderValue::from_str(&format!("Bearer {key}"))
                .map_err(|_| AnnotatorError::Malformed("api key is not a valid header".into()))?;
            headers.insert(AUTHORIZATION, value);
        }
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(cfg.timeout)
            .connect_timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            limiter: Arc::new(Semaphore::new(cfg.max_inflight)),
            cfg,
        })
    }

    /// Send a chat request, respecting the concurrency limit, and return the
    /// first choice's content.
    pub async fn chat(&self, messages: &[Message]) -> Result<String, AnnotatorError> {
        let _permit = self
            .limiter
            .acquire()
            .await
            .expect("annotation semaphore is never closed");
        self.post_with_retry(messages).await
    }

    /// Annotate one problem: ask for the structural annotation as JSON and
    /// parse it.
    pub async fn annotate(&self, problem_text: &str, code: &str) -> Result<Value, AnnotatorError> {
        let messages = [
            Message::system(ANNOTATION_PROMPT),
            Message::user(format!("Problem:\n{problem_text}\n\nSolution code:\n{code}")),
        ];
        let content = self.chat(&messages).await?;
        parse_annotation(&content)
    }

    async fn post_with_retry(&self, messages: &[Message]) -> Result<String, AnnotatorError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.post_once(messages).await {
                Ok(content) => return Ok(content),
                Err(err) if attempt < self.cfg.max_attempts && err.retryable() => {
                    let delay = backoff_delay(attempt);
                    warn!(attempt, delay_ms = delay.as_millis() as u64, %err, "retrying annotation request");
                    tokio::time::sleep(delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn post_once(&self, messages: &[Message]) -> Result<String, AnnotatorError> {
        let body = ChatRequest {
            model: &self.cfg.model,
            messages,
            temperature: self.cfg.temperature,
            max_tokens: self.cfg.max_tokens,
        };
        let response = self
            .client
            .post(format!("{}/chat/completions", self.cfg.base_url))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let body: String = body.chars().take(500).collect();
            return Err(AnnotatorError::Request { status: status.as_u16(), body });
        }

        let parsed: ChatResponse = response.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| AnnotatorError::Malformed("no completion content".into()))
    }
}

/// Exponential backoff from 1 s, capped at 60 s, plus up to 5 s of jitter.
fn backoff_delay(attempt: u32) -> Duration {
    let base = 1u64 << (attempt - 1).min(6);
    let jitter_ms = rand::thread_rng().gen_range(0..5_000);
    Duration::from_secs(base.min(60)) + Duration::from_millis(jitter_ms)
}

/// Parse the model's reply as a JSON object, tolerating markdown fences.
fn parse_annotation(content: &str) -> Result<Value, AnnotatorError> {
    let trimmed = content.trim();
    let trimmed = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix("```").unwrap_or(trimmed).trim();
    serde_json::from_str(trimmed).map_err(|err| AnnotatorError::Malformed(err.to_string()))
}

const ANNOTATION_PROMPT: &str = "\
You label competition math problems. Reply with a single JSON object and no \
other text, shaped as:
{
  \"from_text\": {
    \"domain\": \"algebra|number_theory|combinatorics|geometry\",
    \"objects\": [..], \"constraints\": [..], \"mechanisms\": [..],
    \"output_type\": \"proof|existence|non_existence|classification|maximum|minimum|exact_value\"
  },
  \"from_solution\": {
    \"reasoning_shape\": \"linear|branching\",
    \"case_split\": \"none|binary|multi\",
    \"auxiliary_construction\": \"none|symbolic|structural\",
    \"reasoning_depth\": \"shallow|medium|deep\",
    \"intermediate_reuse\": \"none|single|multiple\"
  }
}";

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_statuses() {
        let retryable = AnnotatorError::Request { status: 429, body: String::new() };
        assert!(retryable.retryable());
        let retryable = AnnotatorError::Request { status: 503, body: String::new() };
        assert!(retryable.retryable());
        let fatal = AnnotatorError::Request { status: 401, body: String::new() };
        assert!(!fatal.retryable());
        let fatal = AnnotatorError::Malformed("bad".into());
        assert!(!fatal.retryable());
    }

    #[test]
    fn test_backoff_grows_and_caps() {
        for attempt in 1..10 {
            let delay = backoff_delay(attempt);
            assert!(delay >= Duration::from_secs(1));
            assert!(delay <= Duration::from_secs(65));
        }
    }

    #[test]
    fn test_parse_annotation_tolerates_fences() {
        let plain = parse_annotation(r#"{"from_text": {}}"#).unwrap();
        assert!(plain["from_text"].is_object());

        let fenced = parse_annotation("```json\n{\"from_text\": {}}\n```").unwrap();
        assert!(fenced["from_text"].is_object());

        assert!(parse_annotation("not json at all").is_err());
    }

    #[test]
    fn test_config_trims_trailing_slash() {
        let cfg = AnnotatorConfig::new("http://localhost:8080/v1/", "test-model");
        assert_eq!(cfg.base_url, "http://localhost:8080/v1");
        assert_eq!(cfg.max_inflight, 8);
        assert_eq!(cfg.max_attempts, 3);
    }

    #[test]
    fn test_chat_request_wire_shape() {
        let messages = [Message::system("s"), Message::user("u")];
        let body = ChatRequest {
            model: "m",
            messages: &messages,
            temperature: 1.0,
            max_tokens: 64,
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["model"], "m");
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][1]["content"], "u");
    }
}
