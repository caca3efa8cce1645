// Heuristic classifier: the always-available local fallback.
//
// A fixed set of whole-word rules per category, compiled once at startup.
// Matching uses regex-lite, which runs in time linear in the input and
// never backtracks, so every input string classifies in bounded time.
// Classification itself cannot fail; only rule compilation can, and that
// happens before the server accepts requests.

use anyhow::{Context, Result};
use regex_lite::{Regex, RegexBuilder};

use super::verdict::Category;

/// Word lists for each category. Each list becomes one alternation
/// wrapped in word boundaries.
const DEFAULT_RULES: [(Category, &[&str]); 4] = [
    (
        Category::Violence,
        &[
            "kill", "murder", "assault", "attack", "fight", "violence", "harm", "hurt", "weapon",
            "gun", "knife", "bomb", "explosive", "threat", "threaten", "intimidate",
        ],
    ),
    (
        Category::Harassment,
        &[
            "stupid", "idiot", "moron", "dumb", "ugly", "fat", "gross", "hate", "despise",
            "loathe", "harass", "bully", "intimidate",
        ],
    ),
    (
        Category::Inappropriate,
        &[
            "sex", "sexual", "nude", "naked", "porn", "adult", "drug", "alcohol", "drunk", "high",
            "stoned", "scam", "fraud", "cheat", "steal", "rob",
        ],
    ),
    (
        Category::Spam,
        &[
            "buy", "sell", "promo", "discount", "offer", "deal", "click", "link", "website", "url",
            "follow", "subscribe", "like", "share",
        ],
    ),
];

/// One immutable rule: a category, its pattern, and the reason shown to users.
#[derive(Debug, Clone)]
pub struct CategoryRule {
    pub category: Category,
    pattern: Regex,
    pub reason: String,
}

impl CategoryRule {
    /// Compile a rule from a pattern. Matching is case-insensitive.
    pub fn new(category: Category, pattern: &str) -> Result<Self> {
        let pattern = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .with_context(|| format!("Invalid heuristic pattern for {category}: {pattern}"))?;
        Ok(Self {
            category,
            pattern,
            reason: category.reason(),
        })
    }

    /// Build a whole-word rule from a list of words.
    pub fn from_words(category: Category, words: &[&str]) -> Result<Self> {
        let alternation = words
            .iter()
            .map(|w| regex_lite::escape(w))
            .collect::<Vec<_>>()
            .join("|");
        Self::new(category, &format!(r"\b(?:{alternation})\b"))
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }
}

/// A category whose rule matched the text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryMatch {
    pub category: Category,
    pub reason: String,
}

/// Rule-based classifier. Cheap to share: rules are read-only after
/// construction, so one instance serves concurrent calls without locking.
#[derive(Debug, Clone)]
pub struct HeuristicClassifier {
    rules: Vec<CategoryRule>,
}

impl HeuristicClassifier {
    /// Build the classifier with the built-in rule set.
    pub fn new() -> Result<Self> {
        let rules = DEFAULT_RULES
            .iter()
            .map(|(category, words)| CategoryRule::from_words(*category, words))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::with_rules(rules))
    }

    /// Build the classifier from explicit rules. Reasons are reported in
    /// rule order.
    pub fn with_rules(rules: Vec<CategoryRule>) -> Self {
        Self { rules }
    }

    /// Every category with at least one matching rule, in rule order,
    /// one entry per category. An empty result means no issues were found.
    pub fn classify(&self, text: &str) -> Vec<CategoryMatch> {
        let mut matches: Vec<CategoryMatch> = Vec::new();
        for rule in &self.rules {
            if matches.iter().any(|m| m.category == rule.category) {
                continue;
            }
            if rule.is_match(text) {
                matches.push(CategoryMatch {
                    category: rule.category,
                    reason: rule.reason.clone(),
                });
            }
        }
        matches
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> HeuristicClassifier {
        HeuristicClassifier::new().unwrap()
    }

    fn categories(text: &str) -> Vec<Category> {
        classifier()
            .classify(text)
            .into_iter()
            .map(|m| m.category)
            .collect()
    }

    #[test]
    fn test_default_rules_compile() {
        let c = classifier();
        assert_eq!(c.rules.len(), DEFAULT_RULES.len());
        assert_eq!(
            c.rules.iter().map(|r| r.category).collect::<Vec<_>>(),
            vec![
                Category::Violence,
                Category::Harassment,
                Category::Inappropriate,
                Category::Spam
            ]
        );
    }

    #[test]
    fn test_clean_text_has_no_matches() {
        assert!(classifier().classify("Hello, how are you today?").is_empty());
    }

    #[test]
    fn test_violence_match() {
        let matches = classifier().classify("I will hurt you");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].category, Category::Violence);
        assert_eq!(matches[0].reason, "Detected: Violence");
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(categories("BUY NOW"), vec![Category::Spam]);
        assert_eq!(categories("You IDIOT"), vec![Category::Harassment]);
    }

    #[test]
    fn test_whole_words_only() {
        // "skillful" contains "kill", "highlight" contains "high", "robins" contains "rob"
        assert!(categories("what a skillful highlight").is_empty());
        assert!(categories("scattered robins").is_empty());
    }

    #[test]
    fn test_word_boundaries_are_ascii() {
        // Non-ASCII letters do not count as word characters.
        assert_eq!(categories("killé"), vec![Category::Violence]);
        assert_eq!(categories("élink"), vec![Category::Spam]);
    }

    #[test]
    fn test_multiple_categories_in_rule_order() {
        assert_eq!(
            categories("click this link, you idiot"),
            vec![Category::Harassment, Category::Spam]
        );
        assert_eq!(
            categories("subscribe or I attack, stoned moron"),
            vec![
                Category::Violence,
                Category::Harassment,
                Category::Inappropriate,
                Category::Spam
            ]
        );
    }

    #[test]
    fn test_one_reason_per_category() {
        let matches = classifier().classify("kill murder gun knife bomb");
        assert_eq!(matches.len(), 1);
    }

    #[test]
    fn test_word_shared_between_categories_matches_both() {
        assert_eq!(
            categories("don't intimidate me"),
            vec![Category::Violence, Category::Harassment]
        );
    }

    #[test]
    fn test_empty_and_odd_input_is_total() {
        assert!(classifier().classify("").is_empty());
        assert!(classifier().classify("\u{0}\u{fffd}🙂").is_empty());
        let long = "a ".repeat(100_000);
        assert!(classifier().classify(&long).is_empty());
    }

    #[test]
    fn test_deterministic() {
        let c = classifier();
        let text = "Great deal on weapons, follow me";
        assert_eq!(c.classify(text), c.classify(text));
    }

    #[test]
    fn test_custom_rules() {
        let rule = CategoryRule::new(Category::Spam, r"\bfree\s+money\b").unwrap();
        let c = HeuristicClassifier::with_rules(vec![rule]);
        assert_eq!(c.classify("FREE   money here").len(), 1);
        assert!(c.classify("money for free").is_empty());
    }

    #[test]
    fn test_malformed_rule_is_a_construction_error() {
        assert!(CategoryRule::new(Category::Spam, "(unclosed").is_err());
    }
}
