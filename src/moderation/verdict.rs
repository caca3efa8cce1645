// Verdict types: what one moderation decision produces.
//
// A Verdict is built only through its constructors, which keep
// `safe` and `reasons` in agreement: safe if and only if there are no
// reasons. Reasons are deduplicated in detection order.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Content categories recognised by the heuristic rule set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Violence,
    Harassment,
    Inappropriate,
    Spam,
}

impl Category {
    pub fn label(&self) -> &'static str {
        match self {
            Category::Violence => "violence",
            Category::Harassment => "harassment",
            Category::Inappropriate => "inappropriate",
            Category::Spam => "spam",
        }
    }

    /// The user-facing reason shown when this category matches.
    pub fn reason(&self) -> String {
        reason_for_label(self.label())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Which classifier produced a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// The external moderation service answered.
    Primary,
    /// The local rule set answered (primary unconfigured or failed).
    Heuristic,
    /// Nothing was classified because the text was empty.
    None,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Mode::Primary => "primary",
            Mode::Heuristic => "heuristic",
            Mode::None => "none",
        };
        f.write_str(s)
    }
}

/// The outcome of one moderation decision.
///
/// Fields are private so a verdict with `safe: true` and reasons (or the
/// reverse) cannot be constructed. Deserialization goes through
/// [`Verdict::from_reasons`] for the same reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "WireVerdict")]
pub struct Verdict {
    safe: bool,
    reasons: Vec<String>,
    mode: Mode,
}

impl Verdict {
    /// Verdict for empty or whitespace-only input.
    pub fn empty() -> Self {
        Self {
            safe: true,
            reasons: Vec::new(),
            mode: Mode::None,
        }
    }

    /// Build a verdict from detected reasons. Duplicates are dropped,
    /// keeping the first occurrence.
    pub fn from_reasons<I, S>(reasons: I, mode: Mode) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut deduped: Vec<String> = Vec::new();
        for reason in reasons {
            let reason = reason.into();
            if !deduped.contains(&reason) {
                deduped.push(reason);
            }
        }
        Self {
            safe: deduped.is_empty(),
            reasons: deduped,
            mode,
        }
    }

    pub fn safe(&self) -> bool {
        self.safe
    }

    pub fn reasons(&self) -> &[String] {
        &self.reasons
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }
}

// Incoming verdicts (gateway client) are rebuilt from their reasons so a
// malformed payload cannot break the safe/reasons agreement.
#[derive(Deserialize)]
struct WireVerdict {
    #[allow(dead_code)]
    safe: bool,
    reasons: Vec<String>,
    mode: Mode,
}

impl From<WireVerdict> for Verdict {
    fn from(wire: WireVerdict) -> Self {
        Verdict::from_reasons(wire.reasons, wire.mode)
    }
}

/// Current availability of each classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityProbe {
    pub primary_available: bool,
    pub heuristic_available: bool,
}

/// Turn a category label into the reason text shown to users.
///
/// Underscores become spaces and every letter that follows a non-letter
/// is upper-cased: `self_harm/intent` → `Detected: Self Harm/Intent`.
pub fn reason_for_label(label: &str) -> String {
    let mut titled = String::with_capacity(label.len());
    let mut at_word_start = true;
    for c in label.chars() {
        let c = if c == '_' { ' ' } else { c };
        if c.is_alphabetic() {
            if at_word_start {
                titled.extend(c.to_uppercase());
            } else {
                titled.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            titled.push(c);
            at_word_start = true;
        }
    }
    format!("Detected: {titled}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_verdict_is_safe_with_mode_none() {
        let v = Verdict::empty();
        assert!(v.safe());
        assert!(v.reasons().is_empty());
        assert_eq!(v.mode(), Mode::None);
    }

    #[test]
    fn test_from_reasons_derives_safe_flag() {
        let clean = Verdict::from_reasons(Vec::<String>::new(), Mode::Heuristic);
        assert!(clean.safe());

        let flagged = Verdict::from_reasons(["Detected: Spam"], Mode::Heuristic);
        assert!(!flagged.safe());
        assert_eq!(flagged.reasons(), ["Detected: Spam"]);
    }

    #[test]
    fn test_from_reasons_dedups_in_insertion_order() {
        let v = Verdict::from_reasons(
            ["Detected: Spam", "Detected: Violence", "Detected: Spam"],
            Mode::Primary,
        );
        assert_eq!(v.reasons(), ["Detected: Spam", "Detected: Violence"]);
    }

    #[test]
    fn test_serializes_to_wire_shape() {
        let v = Verdict::from_reasons(["Detected: Violence"], Mode::Heuristic);
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "safe": false,
                "reasons": ["Detected: Violence"],
                "mode": "heuristic"
            })
        );
    }

    #[test]
    fn test_deserialize_rederives_safe_from_reasons() {
        let json = r#"{"safe": true, "reasons": ["Detected: Spam"], "mode": "primary"}"#;
        let v: Verdict = serde_json::from_str(json).unwrap();
        assert!(!v.safe());
        assert_eq!(v.mode(), Mode::Primary);
    }

    #[test]
    fn test_reason_for_label_title_cases() {
        assert_eq!(reason_for_label("violence"), "Detected: Violence");
        assert_eq!(reason_for_label("self_harm"), "Detected: Self Harm");
        assert_eq!(
            reason_for_label("harassment/threatening"),
            "Detected: Harassment/Threatening"
        );
        assert_eq!(reason_for_label("self-harm/intent"), "Detected: Self-Harm/Intent");
    }

    #[test]
    fn test_category_reasons() {
        assert_eq!(Category::Inappropriate.reason(), "Detected: Inappropriate");
        assert_eq!(Category::Spam.to_string(), "spam");
    }
}
