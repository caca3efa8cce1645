// HTTP client for a running safechat gateway.
//
// Used by the CLI's `--server` mode and by the composer's scheduler.
// Errors here are transport errors between client and gateway; the
// scheduler never shows them to the user verbatim.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use super::Checker;
use crate::moderation::{CapabilityProbe, Verdict};

/// Client for the gateway's `/api/check` and `/api/health` routes.
pub struct GatewayClient {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Serialize)]
struct CheckBody<'a> {
    text: &'a str,
}

impl GatewayClient {
    /// Create a client pointing at the given base URL (e.g. `http://localhost:8000`).
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("safechat/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Ask the gateway for a verdict.
    pub async fn check(&self, text: &str) -> Result<Verdict> {
        let url = format!("{}/api/check", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&CheckBody { text })
            .send()
            .await
            .context("Gateway check request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Gateway returned {}: {}", status, body);
        }

        let verdict: Verdict = response
            .json()
            .await
            .context("Failed to parse gateway verdict")?;
        debug!(safe = verdict.safe(), mode = %verdict.mode(), "Gateway verdict");
        Ok(verdict)
    }

    /// Fetch the gateway's capability probe.
    pub async fn probe(&self) -> Result<CapabilityProbe> {
        let url = format!("{}/api/health", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Gateway health request failed")?;

        if !response.status().is_success() {
            anyhow::bail!("Gateway returned {}", response.status());
        }

        response
            .json::<CapabilityProbe>()
            .await
            .context("Failed to parse gateway health response")
    }
}

#[async_trait]
impl Checker for GatewayClient {
    async fn check(&self, text: &str) -> Result<Verdict> {
        GatewayClient::check(self, text).await
    }
}
