use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::logic::features::FeatureContractError;
use crate::logic::model::InferenceError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureContribution {
    pub name: String,
    /// Raw feature value
    pub value: f64,
    /// Signed shift of the phishing probability
    pub contribution: f32,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Explanation {
    /// Mean probability over the background rows
    pub base_value: f32,
    pub probability: f32,
    /// Sorted by |contribution| DESC
    pub contributions: Vec<FeatureContribution>,
    pub method: String,
    pub permutations: usize,
    pub background_rows: usize,
}

impl Explanation {
    pub fn top(&self, n: usize) -> &[FeatureContribution] {
        &self.contributions[..n.min(self.contributions.len())]
    }

    /// Equals `probability - base_value` up to float rounding
    pub fn total(&self) -> f32 {
        self.contributions.iter().map(|c| c.contribution).sum()
    }
}

/// Explanation could not be produced; the prediction itself is unaffected
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExplainError {
    #[error("explanations are disabled")]
    Disabled,

    #[error("artifact carries no background rows")]
    NoBackground,

    #[error("background row {row} has {found} values, expected {expected}")]
    BackgroundShape { row: usize, expected: usize, found: usize },

    #[error("background row {0} contains a non-finite value")]
    NonFiniteBackground(usize),

    #[error("classifier exposes labels only")]
    LabelOnly,

    #[error(transparent)]
    Contract(#[from] FeatureContractError),

    #[error("scoring failed: {0}")]
    Inference(String),
}

impl From<InferenceError> for ExplainError {
    fn from(e: InferenceError) -> Self {
        ExplainError::Inference(e.0)
    }
}

pub fn describe(name: &str) -> Option<String> {
    match name {
        "phish_hints" => Some("Sensitive keyword in the URL (login, secure, update...)".to_string()),
        "domain_in_title" => Some("Domain name appears in the page title".to_string()),
        "google_index" => Some("Search engine has indexed the URL".to_string()),
        "page_rank" => Some("Domain authority from OpenPageRank".to_string()),
        "ratio_intHyperlinks" => Some("Share of page links pointing to the same host".to_string()),
        "nb_www" => Some("Occurrences of 'www'".to_string()),
        "nb_dots" => Some("Number of dots in the URL".to_string()),
        "nb_qm" => Some("Number of query markers".to_string()),
        "ratio_digits_url" => Some("Digit density of the URL".to_string()),
        "ratio_digits_host" => Some("Digit density of the hostname".to_string()),
        "longest_words_raw" | "length_words_raw" => Some("Word lengths across the URL".to_string()),
        _ => None,
    }
}
