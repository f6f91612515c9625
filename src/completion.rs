//! Text completion for the collected words.
//!
//! The hosted model is reached with one JSON POST per completion. Whatever goes
//! wrong on the way (transport failure, error payload, unexpected shape) the
//! caller gets the fallback text, never an error.

use std::future::Future;
use std::sync::{Arc, Mutex};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

pub const DEFAULT_ENDPOINT: &str = "https://api-inference.huggingface.co/models/google/flan-t5-small";
/// Appended to the prompt to invite a continuation.
pub const PROMPT_SUFFIX: &str = " ...";
pub const FALLBACK_TEXT: &str = "AI error.";

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected response: {0}")]
    Malformed(String),
}

pub trait CompletionClient: Send + Sync {
    /// Completes `prompt`. Never fails; errors become the fallback text.
    fn complete(&self, prompt: &str) -> impl Future<Output = String> + Send;
}

/// Wire body of a completion request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletionRequest {
    pub inputs: String,
}

/// Client for a hosted text-generation model behind the inference API.
#[derive(Debug, Clone)]
pub struct HuggingFaceClient {
    http: reqwest::Client,
    endpoint: String,
    prompt_suffix: String,
    fallback: String,
    api_token: Option<String>,
}

impl Default for HuggingFaceClient {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINT)
    }
}

impl HuggingFaceClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
            prompt_suffix: PROMPT_SUFFIX.to_string(),
            fallback: FALLBACK_TEXT.to_string(),
            api_token: None,
        }
    }

    pub fn with_prompt_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.prompt_suffix = suffix.into();
        self
    }

    pub fn with_fallback(mut self, fallback: impl Into<String>) -> Self {
        self.fallback = fallback.into();
        self
    }

    pub fn with_api_token(mut self, token: Option<String>) -> Self {
        self.api_token = token;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn request_body(&self, prompt: &str) -> CompletionRequest {
        CompletionRequest {
            inputs: format!("{}{}", prompt, self.prompt_suffix),
        }
    }

    pub async fn try_complete(&self, prompt: &str) -> Result<String, CompletionError> {
        let mut request = self.http.post(&self.endpoint).json(&self.request_body(prompt));
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        debug!("{}", request_summary(&self.endpoint, prompt));
        let response = request.send().await?;
        let status = response.status();
        let data: serde_json::Value = response.json().await?;

        generated_text(&data).ok_or_else(|| {
            CompletionError::Malformed(format!("status {status}, body {}", truncate(&data.to_string(), 200)))
        })
    }
}

impl CompletionClient for HuggingFaceClient {
    async fn complete(&self, prompt: &str) -> String {
        match self.try_complete(prompt).await {
            Ok(text) => {
                info!("Completion received ({} chars)", text.chars().count());
                text
            }
            Err(e) => {
                warn!("Completion failed: {}", e);
                self.fallback.clone()
            }
        }
    }
}

/// Pulls `[0].generated_text` out of an inference response. Empty text counts
/// as missing.
pub fn generated_text(data: &serde_json::Value) -> Option<String> {
    data.get(0)?
        .get("generated_text")?
        .as_str()
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn request_summary(endpoint: &str, prompt: &str) -> String {
    format!("POST {} ({} chars)", endpoint, prompt.chars().count())
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((i, _)) => &s[..i],
        None => s,
    }
}

/// Offline stand-in: answers every prompt with the same text and remembers
/// what it was asked.
#[derive(Debug, Clone, Default)]
pub struct CannedCompletion {
    reply: String,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl CannedCompletion {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            prompts: Arc::default(),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

impl CompletionClient for CannedCompletion {
    async fn complete(&self, prompt: &str) -> String {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        self.reply.clone()
    }
}
