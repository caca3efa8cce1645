// Decision engine: one verdict per message.
//
// Protocol:
//   1. Empty (after trimming) ⇒ safe, mode `none`, no classification.
//   2. Primary configured ⇒ one attempt. Success is authoritative and the
//      heuristic classifier is not consulted.
//   3. Otherwise (unconfigured or any failure) ⇒ heuristic classifier.
//
// Failures never reach the caller; they are logged and absorbed. The engine
// holds no mutable state, so concurrent calls need no coordination.

use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, warn};

use super::heuristic::HeuristicClassifier;
use super::primary::{PrimaryClassifier, PrimaryError};
use super::verdict::{CapabilityProbe, Mode, Verdict};
use crate::config::Config;

/// Orchestrates the primary and heuristic classifiers.
#[derive(Clone)]
pub struct DecisionEngine {
    heuristic: Arc<HeuristicClassifier>,
    primary: Option<Arc<dyn PrimaryClassifier>>,
}

impl DecisionEngine {
    /// Create an engine. `None` for `primary` means every decision uses
    /// the heuristic classifier.
    pub fn new(
        heuristic: HeuristicClassifier,
        primary: Option<Arc<dyn PrimaryClassifier>>,
    ) -> Self {
        Self {
            heuristic: Arc::new(heuristic),
            primary,
        }
    }

    /// Build the engine described by the loaded configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let heuristic = HeuristicClassifier::new()?;
        let primary: Option<Arc<dyn PrimaryClassifier>> = match config.primary() {
            Some(settings) => Some(Arc::new(super::openai::OpenAiModeration::new(settings)?)),
            None => None,
        };
        Ok(Self::new(heuristic, primary))
    }

    /// Decide whether `text` is safe to send.
    pub async fn decide(&self, text: &str) -> Verdict {
        let text = text.trim();
        if text.is_empty() {
            return Verdict::empty();
        }

        match self.try_primary(text).await {
            Ok(verdict) => verdict,
            Err(PrimaryError::Unconfigured) => {
                debug!("Primary classifier not configured, using heuristic");
                self.heuristic_verdict(text)
            }
            Err(e) => {
                warn!(kind = e.kind(), error = %e, "Primary classifier failed, falling back to heuristic");
                self.heuristic_verdict(text)
            }
        }
    }

    /// Report which classifiers can currently serve a decision.
    pub fn probe(&self) -> CapabilityProbe {
        CapabilityProbe {
            primary_available: self.primary.is_some(),
            heuristic_available: true,
        }
    }

    async fn try_primary(&self, text: &str) -> Result<Verdict, PrimaryError> {
        let primary = self.primary.as_ref().ok_or(PrimaryError::Unconfigured)?;
        let classification = primary.classify(text).await?;
        debug!(
            classifier = primary.name(),
            flagged = classification.flagged,
            "Primary classifier answered"
        );
        Ok(Verdict::from_reasons(classification.reasons(), Mode::Primary))
    }

    fn heuristic_verdict(&self, text: &str) -> Verdict {
        let matches = self.heuristic.classify(text);
        Verdict::from_reasons(matches.into_iter().map(|m| m.reason), Mode::Heuristic)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::moderation::primary::PrimaryClassification;

    /// Scripted primary that counts its calls.
    struct ScriptedPrimary {
        calls: AtomicU32,
        outcome: fn() -> Result<PrimaryClassification, PrimaryError>,
    }

    impl ScriptedPrimary {
        fn new(outcome: fn() -> Result<PrimaryClassification, PrimaryError>) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicU32::new(0),
                outcome,
            })
        }
    }

    #[async_trait]
    impl PrimaryClassifier for ScriptedPrimary {
        async fn classify(&self, _text: &str) -> Result<PrimaryClassification, PrimaryError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            (self.outcome)()
        }

        fn name(&self) -> &'static str {
            "scripted"
        }
    }

    fn engine_with(primary: Option<Arc<dyn PrimaryClassifier>>) -> DecisionEngine {
        DecisionEngine::new(HeuristicClassifier::new().unwrap(), primary)
    }

    #[tokio::test]
    async fn test_empty_input_skips_classification() {
        let primary = ScriptedPrimary::new(|| Ok(PrimaryClassification::default()));
        let engine = engine_with(Some(primary.clone()));

        for text in ["", "   ", "\n\t "] {
            let v = engine.decide(text).await;
            assert_eq!(v, Verdict::empty());
        }
        assert_eq!(primary.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unconfigured_uses_heuristic() {
        let engine = engine_with(None);
        let v = engine.decide("Hello, how are you today?").await;
        assert!(v.safe());
        assert_eq!(v.mode(), Mode::Heuristic);
    }

    #[tokio::test]
    async fn test_primary_success_is_exclusive() {
        let primary = ScriptedPrimary::new(|| Ok(PrimaryClassification::default()));
        let engine = engine_with(Some(primary.clone()));

        // Would match the violence and spam rules heuristically.
        let v = engine.decide("buy a gun").await;
        assert!(v.safe());
        assert!(v.reasons().is_empty());
        assert_eq!(v.mode(), Mode::Primary);
        assert_eq!(primary.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_primary_flagged_reasons() {
        let primary = ScriptedPrimary::new(|| {
            Ok(PrimaryClassification {
                flagged: true,
                categories: vec!["hate".to_string()],
            })
        });
        let v = engine_with(Some(primary)).decide("something").await;
        assert!(!v.safe());
        assert_eq!(v.reasons(), ["Detected: Hate"]);
        assert_eq!(v.mode(), Mode::Primary);
    }

    #[tokio::test]
    async fn test_every_failure_kind_falls_back_once() {
        let outcomes: [fn() -> Result<PrimaryClassification, PrimaryError>; 4] = [
            || Err(PrimaryError::Unconfigured),
            || Err(PrimaryError::Unreachable("connection refused".into())),
            || Err(PrimaryError::RemoteError("status 500".into())),
            || Err(PrimaryError::Timeout(Duration::from_secs(5))),
        ];
        for outcome in outcomes {
            let primary = ScriptedPrimary::new(outcome);
            let engine = engine_with(Some(primary.clone()));
            let v = engine.decide("I will kill it").await;
            assert_eq!(v.mode(), Mode::Heuristic);
            assert_eq!(v.reasons(), ["Detected: Violence"]);
            assert_eq!(primary.calls.load(Ordering::SeqCst), 1, "no retries");
        }
    }

    #[tokio::test]
    async fn test_text_is_trimmed_before_classification() {
        let engine = engine_with(None);
        let v = engine.decide("   spam link   ").await;
        assert_eq!(v.reasons(), ["Detected: Spam"]);
    }

    #[test]
    fn test_probe_reflects_configuration() {
        assert_eq!(
            engine_with(None).probe(),
            CapabilityProbe {
                primary_available: false,
                heuristic_available: true
            }
        );
        let primary = ScriptedPrimary::new(|| Ok(PrimaryClassification::default()));
        assert!(engine_with(Some(primary)).probe().primary_available);
    }
}
