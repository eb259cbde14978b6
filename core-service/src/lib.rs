//! PhishScope Core - URL feature extraction & phishing classification

pub mod constants;
pub mod logic;

pub use logic::config::{ExplainConfig, LookupConfig, ModelConfig};
pub use logic::detector::{PhishingDetector, Verdict};
pub use logic::error::PhishError;
pub use logic::explain::{ExplainError, Explanation};
pub use logic::features::{Extraction, FeatureExtractor, FeatureRecord};
pub use logic::model::{ClassifierArtifact, EngineStatus, InferenceAdapter, Label, Prediction};
