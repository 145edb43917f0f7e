//! Conversation history summarization
//!
//! When a session crosses the turn threshold, the verbatim history is
//! condensed by a smaller model so later turns carry fewer tokens. This
//! is a cost reduction, not a correctness step: callers treat failure as
//! non-fatal and keep the full history.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::{Error, Result};

/// A produced summary plus the tokens it cost to make
#[derive(Debug, Clone)]
pub struct Summary {
    pub text: String,
    pub model: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
}

/// Seam for history condensation; the live implementation calls the
/// chat-completions API
#[async_trait]
pub trait Summarize: Send + Sync {
    /// Condense one conversation transcript
    async fn summarize(&self, conversation: &str) -> Result<Summary>;
}

/// Chat-completions response subset
#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize, Default)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
}

/// Summarizes history via the chat-completions API
pub struct HistorySummarizer {
    client: reqwest::Client,
    api_key: String,
    model: String,
    timeout: Duration,
}

impl HistorySummarizer {
    /// Create a summarizer for the given model
    #[must_use]
    pub fn new(api_key: String, model: String, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model,
            timeout,
        }
    }
}

#[async_trait]
impl Summarize for HistorySummarizer {
    async fn summarize(&self, conversation: &str) -> Result<Summary> {
        let prompt = format!(
            "Summarize the following hospital front-desk conversation concisely, preserving \
             the caller's symptoms, any doctors or departments discussed, and commitments \
             made. Keep it under 200 words.\n\n{conversation}"
        );

        let body = serde_json::json!({
            "model": self.model,
            "messages": [{"role": "user", "content": prompt}],
            "temperature": 0.3,
            "max_tokens": 300,
        });

        let request = self
            .client
            .post("https://api.openai.com/v1/chat/completions")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send();

        let response = tokio::time::timeout(self.timeout, request)
            .await
            .map_err(|_| Error::Summarization("summarization timed out".to_string()))??;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Summarization(format!(
                "chat API error {status}: {body}"
            )));
        }

        let parsed: ChatResponse = response.json().await?;
        let text = parsed
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| Error::Summarization("empty summary returned".to_string()))?;

        let usage = parsed.usage.unwrap_or_default();
        tracing::debug!(
            model = %self.model,
            prompt_tokens = usage.prompt_tokens,
            completion_tokens = usage.completion_tokens,
            "history summarized"
        );

        Ok(Summary {
            text,
            model: self.model.clone(),
            input_tokens: usage.prompt_tokens,
            output_tokens: usage.completion_tokens,
        })
    }
}
