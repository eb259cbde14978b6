//! Explain Module - per-feature attribution of a phishing probability

pub mod engine;
pub mod types;

pub use engine::{ShapleyExplainer, MAX_BACKGROUND_ROWS};
pub use types::{describe, ExplainError, Explanation, FeatureContribution};
