use std::env;
use std::time::Duration;

use anyhow::{Context, Result};

/// Default OpenAI moderation endpoint.
pub const DEFAULT_MODERATION_URL: &str = "https://api.openai.com/v1/moderations";

/// Bound on a single primary call when SAFECHAT_PRIMARY_TIMEOUT_MS is unset.
pub const DEFAULT_PRIMARY_TIMEOUT_MS: u64 = 5_000;

/// Client debounce window when SAFECHAT_DEBOUNCE_MS is unset.
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;

/// Settings for the external moderation service. Only exists when a
/// credential is present.
#[derive(Debug, Clone)]
pub struct PrimarySettings {
    pub api_key: String,
    pub url: String,
    /// Optional model name forwarded to the endpoint.
    pub model: Option<String>,
    pub timeout: Duration,
}

/// Central configuration loaded from environment variables.
///
/// All secrets come from env vars (never hardcoded). The .env file
/// is loaded automatically at startup via dotenvy. Nothing here changes
/// after startup.
#[derive(Debug, Clone)]
pub struct Config {
    primary: Option<PrimarySettings>,
    /// Gateway bind address (defaults to 0.0.0.0).
    pub bind: String,
    /// Gateway port (defaults to 8000).
    pub port: u16,
    /// Client debounce window.
    pub debounce: Duration,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from any variable lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let timeout_ms = parse_or(&get, "SAFECHAT_PRIMARY_TIMEOUT_MS", DEFAULT_PRIMARY_TIMEOUT_MS)?;
        if timeout_ms == 0 {
            anyhow::bail!("SAFECHAT_PRIMARY_TIMEOUT_MS must be greater than zero");
        }

        let primary = get("OPENAI_API_KEY").map(|api_key| PrimarySettings {
            api_key: api_key.trim().to_string(),
            url: get("SAFECHAT_MODERATION_URL")
                .unwrap_or_else(|| DEFAULT_MODERATION_URL.to_string()),
            model: get("SAFECHAT_MODERATION_MODEL"),
            timeout: Duration::from_millis(timeout_ms),
        });

        Ok(Self {
            primary,
            bind: get("SAFECHAT_BIND").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(&get, "SAFECHAT_PORT", 8000)?,
            debounce: Duration::from_millis(parse_or(
                &get,
                "SAFECHAT_DEBOUNCE_MS",
                DEFAULT_DEBOUNCE_MS,
            )?),
        })
    }

    /// Primary classifier settings, or `None` when no credential is set.
    pub fn primary(&self) -> Option<&PrimarySettings> {
        self.primary.as_ref()
    }
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value: {raw}")),
        None => Ok(default),
    }
}
