// Moderation: the decision engine and the classifiers it orchestrates.
//
// The PrimaryClassifier trait wraps the external service so a different
// provider can be swapped in without touching the engine. The heuristic
// classifier needs no configuration and is always available.

pub mod engine;
pub mod heuristic;
pub mod openai;
pub mod primary;
pub mod verdict;

pub use engine::DecisionEngine;
pub use verdict::{CapabilityProbe, Category, Mode, Verdict};
