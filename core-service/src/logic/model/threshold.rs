//! Decision Threshold Configuration
//!
//! Probability cut between the two classes.
//! `probability > threshold` ⇒ phishing.

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_THRESHOLD;

/// Predicted class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Label {
    Legitimate = 0,
    Phishing = 1,
}

impl Label {
    /// Class index as the classifier was trained (0 legitimate, 1 phishing)
    pub fn class(&self) -> u8 {
        *self as u8
    }

    /// Any non-zero class id is phishing
    pub fn from_class(class: i64) -> Self {
        if class == 0 {
            Label::Legitimate
        } else {
            Label::Phishing
        }
    }

    pub fn is_phishing(&self) -> bool {
        matches!(self, Label::Phishing)
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Label::Legitimate => write!(f, "legitimate"),
            Label::Phishing => write!(f, "phishing"),
        }
    }
}

/// Threshold Configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    /// Cut point in [0, 1]
    pub threshold: f32,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self { threshold: DEFAULT_THRESHOLD }
    }
}

impl ThresholdConfig {
    /// `None` when `threshold` is not a probability
    pub fn new(threshold: f32) -> Option<Self> {
        if threshold.is_finite() && (0.0..=1.0).contains(&threshold) {
            Some(Self { threshold })
        } else {
            None
        }
    }

    pub fn label_for(&self, probability: f32) -> Label {
        if probability > self.threshold {
            Label::Phishing
        } else {
            Label::Legitimate
        }
    }

    pub fn is_default(&self) -> bool {
        self.threshold == DEFAULT_THRESHOLD
    }
}
