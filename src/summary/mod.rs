//! External summary generation.
//!
//! The combined transcript is handed to a remote text-generation endpoint
//! as a prompt; the response text becomes the summary artifact. The prompt
//! asks for a title line plus a bullet summary — that structure is enforced
//! only by the prompt contract, never validated here.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info};

use crate::config::SummaryConfig;

const SUMMARY_PROMPT: &str = "You are given a meeting transcript with \
timestamps and source labels. Write a short title on the first line, then \
a bullet-point summary of the key discussion points, decisions, and action \
items. Respond in plain text.";

/// Prompt in, summary text out.
#[async_trait]
pub trait SummaryService: Send + Sync {
    async fn summarize(&self, transcript: &str) -> Result<String>;
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}

/// Chat-completions style summary backend.
pub struct OpenAiSummaryService {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl OpenAiSummaryService {
    /// Builds the service from config; returns None when no API key is set,
    /// in which case sessions complete without a summary (flagged partial).
    pub fn from_config(config: &SummaryConfig) -> Result<Option<Self>> {
        let Some(api_key) = config.api_key.clone() else {
            return Ok(None);
        };

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .context("Failed to build summary HTTP client")?;

        info!(
            "Summary service configured: {} ({})",
            config.endpoint, config.model
        );

        Ok(Some(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key,
            model: config.model.clone(),
        }))
    }
}

#[async_trait]
impl SummaryService for OpenAiSummaryService {
    async fn summarize(&self, transcript: &str) -> Result<String> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SUMMARY_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: transcript,
                },
            ],
        };

        debug!("Requesting summary for {} chars", transcript.len());

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("Failed to send summary request")?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .context("Failed to read summary response body")?;

        if !status.is_success() {
            error!(
                "Summary request failed with status {}: {}",
                status, response_text
            );
            anyhow::bail!("summary endpoint returned {}", status);
        }

        let parsed: ChatResponse =
            serde_json::from_str(&response_text).context("Unexpected summary response shape")?;

        let text = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .unwrap_or_default();

        if text.trim().is_empty() {
            anyhow::bail!("summary endpoint returned empty text");
        }

        info!("Summary generated: {} chars", text.len());
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_api_key_means_no_service() {
        let config = SummaryConfig::default();
        assert!(OpenAiSummaryService::from_config(&config)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_service_built_with_api_key() {
        let config = SummaryConfig {
            api_key: Some("test-key".to_string()),
            ..SummaryConfig::default()
        };
        assert!(OpenAiSummaryService::from_config(&config)
            .unwrap()
            .is_some());
    }

    #[test]
    fn test_response_parsing() {
        let raw = r#"{"choices":[{"message":{"role":"assistant","content":"Standup\n- shipped"}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.choices[0].message.content, "Standup\n- shipped");
    }
}
