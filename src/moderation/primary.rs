// Primary classifier: the swap-ready abstraction over an external
// moderation service.
//
// Implementations make exactly one network attempt per call and must
// bound it in time. Every failure is reported as one of the PrimaryError
// kinds; the decision engine treats all of them the same way (fall back
// to the heuristic classifier).

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Why the primary classifier produced no usable result.
#[derive(Debug, Error)]
pub enum PrimaryError {
    /// No credential or endpoint is configured.
    #[error("primary classifier is not configured")]
    Unconfigured,

    /// The service could not be reached.
    #[error("primary classifier unreachable: {0}")]
    Unreachable(String),

    /// The service answered with a non-success status or a bad payload.
    #[error("primary classifier returned an error: {0}")]
    RemoteError(String),

    /// The call did not complete within its bound.
    #[error("primary classifier timed out after {0:?}")]
    Timeout(Duration),
}

impl PrimaryError {
    /// Short machine-friendly name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            PrimaryError::Unconfigured => "unconfigured",
            PrimaryError::Unreachable(_) => "unreachable",
            PrimaryError::RemoteError(_) => "remote_error",
            PrimaryError::Timeout(_) => "timeout",
        }
    }
}

/// Structured answer from the primary service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrimaryClassification {
    /// The service's overall flag.
    pub flagged: bool,
    /// Labels of every category the service marked, in sorted order.
    pub categories: Vec<String>,
}

impl PrimaryClassification {
    /// Reason texts for this classification.
    ///
    /// The service's overall flag decides safety: an unflagged result has
    /// no reasons even if some category is marked. A flagged result with
    /// no category labels still yields one generic reason.
    pub fn reasons(&self) -> Vec<String> {
        if !self.flagged {
            return Vec::new();
        }
        let mut reasons: Vec<String> = self
            .categories
            .iter()
            .map(|label| super::verdict::reason_for_label(label))
            .collect();
        if reasons.is_empty() {
            reasons.push(super::verdict::reason_for_label("flagged_content"));
        }
        reasons
    }

    pub fn is_safe(&self) -> bool {
        self.reasons().is_empty()
    }
}

/// An external moderation service. Implementations must be async because
/// they call out over the network.
#[async_trait]
pub trait PrimaryClassifier: Send + Sync {
    /// Classify one trimmed, non-empty message.
    async fn classify(&self, text: &str) -> Result<PrimaryClassification, PrimaryError>;

    /// Name used in logs.
    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unflagged_without_categories_is_safe() {
        let c = PrimaryClassification::default();
        assert!(c.is_safe());
        assert!(c.reasons().is_empty());
    }

    #[test]
    fn test_categories_become_reasons() {
        let c = PrimaryClassification {
            flagged: true,
            categories: vec!["harassment".to_string(), "self_harm".to_string()],
        };
        assert_eq!(
            c.reasons(),
            vec!["Detected: Harassment", "Detected: Self Harm"]
        );
        assert!(!c.is_safe());
    }

    #[test]
    fn test_flagged_without_categories_gets_generic_reason() {
        let c = PrimaryClassification {
            flagged: true,
            categories: Vec::new(),
        };
        assert_eq!(c.reasons(), vec!["Detected: Flagged Content"]);
    }

    #[test]
    fn test_unflagged_with_categories_is_safe() {
        let c = PrimaryClassification {
            flagged: false,
            categories: vec!["violence".to_string()],
        };
        assert!(c.reasons().is_empty());
        assert!(c.is_safe());
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(PrimaryError::Unconfigured.kind(), "unconfigured");
        assert_eq!(
            PrimaryError::Timeout(Duration::from_secs(5)).kind(),
            "timeout"
        );
        assert_eq!(
            PrimaryError::RemoteError("500".into()).to_string(),
            "primary classifier returned an error: 500"
        );
    }
}
