// OpenAI-compatible moderation endpoint implementation.
//
// Sends one POST per message to `/v1/moderations` (or any endpoint that
// speaks the same shape) and turns the first result into a
// PrimaryClassification. The whole exchange, including reading the body,
// is bounded by the configured timeout.
//
// API docs: https://platform.openai.com/docs/api-reference/moderations

use std::collections::BTreeMap;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::primary::{PrimaryClassification, PrimaryClassifier, PrimaryError};
use crate::config::PrimarySettings;

/// Primary classifier backed by an OpenAI-compatible moderation API.
pub struct OpenAiModeration {
    client: Client,
    api_key: String,
    url: String,
    model: Option<String>,
    timeout: Duration,
}

impl OpenAiModeration {
    /// Create a classifier from the configured primary settings.
    pub fn new(settings: &PrimarySettings) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("safechat/", env!("CARGO_PKG_VERSION")))
            .timeout(settings.timeout)
            .connect_timeout(settings.timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            api_key: settings.api_key.clone(),
            url: settings.url.clone(),
            model: settings.model.clone(),
            timeout: settings.timeout,
        })
    }

    async fn request(&self, text: &str) -> Result<PrimaryClassification, PrimaryError> {
        let request = ModerationRequest {
            input: text,
            model: self.model.as_deref(),
        };

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(PrimaryError::RemoteError(format!(
                "status {status}: {}",
                preview(&body)
            )));
        }

        let body = response.bytes().await.map_err(|e| self.transport_error(e))?;
        let parsed: ModerationResponse = serde_json::from_slice(&body)
            .map_err(|e| PrimaryError::RemoteError(format!("malformed response: {e}")))?;

        parse_first_result(parsed)
    }

    fn transport_error(&self, err: reqwest::Error) -> PrimaryError {
        if err.is_timeout() {
            PrimaryError::Timeout(self.timeout)
        } else if err.is_decode() {
            PrimaryError::RemoteError(err.to_string())
        } else {
            PrimaryError::Unreachable(err.to_string())
        }
    }
}

#[async_trait]
impl PrimaryClassifier for OpenAiModeration {
    async fn classify(&self, text: &str) -> Result<PrimaryClassification, PrimaryError> {
        let result = tokio::time::timeout(self.timeout, self.request(text))
            .await
            .map_err(|_| PrimaryError::Timeout(self.timeout))??;

        debug!(
            flagged = result.flagged,
            categories = ?result.categories,
            text_preview = preview(text),
            "Classified message"
        );

        Ok(result)
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}

/// Convert the wire response into a classification using only `results[0]`.
fn parse_first_result(response: ModerationResponse) -> Result<PrimaryClassification, PrimaryError> {
    let first = response
        .results
        .into_iter()
        .next()
        .ok_or_else(|| PrimaryError::RemoteError("response contained no results".to_string()))?;

    // BTreeMap keeps labels sorted, so reason order is stable across calls.
    let categories = first
        .categories
        .into_iter()
        .filter_map(|(label, hit)| hit.then_some(label))
        .collect();

    Ok(PrimaryClassification {
        flagged: first.flagged,
        categories,
    })
}

/// First 50 characters, safe on any char boundary.
fn preview(text: &str) -> &str {
    match text.char_indices().nth(50) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

// --- Moderation API request/response types ---

#[derive(Serialize)]
struct ModerationRequest<'a> {
    input: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
}

#[derive(Deserialize)]
struct ModerationResponse {
    results: Vec<ModerationResult>,
}

#[derive(Deserialize)]
struct ModerationResult {
    flagged: bool,
    #[serde(default)]
    categories: BTreeMap<String, bool>,
}
