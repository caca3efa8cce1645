// Client side: what a chat composer needs to talk to the gateway.
//
// The Checker trait is the seam between the scheduler and whatever answers
// checks: a remote gateway over HTTP or an in-process DecisionEngine.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::moderation::{DecisionEngine, Verdict};

pub mod gateway;
pub mod scheduler;

pub use gateway::GatewayClient;
pub use scheduler::{CheckScheduler, DisplayState};

/// Something that can answer a moderation check.
#[async_trait]
pub trait Checker: Send + Sync + 'static {
    async fn check(&self, text: &str) -> Result<Verdict>;
}

#[async_trait]
impl Checker for DecisionEngine {
    async fn check(&self, text: &str) -> Result<Verdict> {
        Ok(self.decide(text).await)
    }
}

#[async_trait]
impl<T: Checker + ?Sized> Checker for Arc<T> {
    async fn check(&self, text: &str) -> Result<Verdict> {
        (**self).check(text).await
    }
}
