//! Inference Adapter - record → row → pipeline → Prediction
//!
//! Validate FeatureRecord theo column contract của artifact rồi chạy pipeline.
//! Backend nằm sau trait `ScoreModel` để dễ swap model.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};

use super::artifact::{ArtifactLoadError, ClassifierArtifact};
use super::threshold::{Label, ThresholdConfig};
use crate::constants::DEFAULT_THRESHOLD;
use crate::logic::config::ModelConfig;
use crate::logic::error::PhishError;
use crate::logic::explain::{ExplainError, Explanation, ShapleyExplainer};
use crate::logic::features::{FeatureContractError, FeatureRecord};

// ============================================================================
// ERROR HANDLING
// ============================================================================

#[derive(Debug)]
pub struct InferenceError(pub String);

impl std::fmt::Display for InferenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "InferenceError: {}", self.0)
    }
}

impl std::error::Error for InferenceError {}

// ============================================================================
// SCORING TRAIT
// ============================================================================

/// Classifier output for a batch
#[derive(Debug, Clone, PartialEq)]
pub enum Scores {
    /// P(phishing) per row
    Probabilities(Vec<f32>),
    /// Hard class per row (no probability available)
    Labels(Vec<i64>),
}

impl Scores {
    pub fn len(&self) -> usize {
        match self {
            Scores::Probabilities(p) => p.len(),
            Scores::Labels(l) => l.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Trait cho classifier backends (ONNX, native trees, test doubles)
pub trait ScoreModel: Send + Sync {
    fn kind(&self) -> &'static str;
    /// `rows` are already in the classifier input space
    fn score(&self, rows: ArrayView2<'_, f32>) -> Result<Scores, InferenceError>;
}

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// Prediction output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    pub label: Label,
    /// 1 phishing, 0 legitimate
    pub class: u8,
    /// P(phishing); absent for label-only classifiers
    pub probability: Option<f32>,
    pub threshold: f32,
    pub inference_time_us: u64,
    /// Classifier kind that produced the score
    pub method: String,
}

/// Engine Status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineStatus {
    pub model_loaded: bool,
    pub model_name: String,
    pub classifier_kind: String,
    pub inference_device: String,
    pub layout_version: u8,
    pub layout_hash: u32,
    pub loaded_at: DateTime<Utc>,
    pub threshold: f32,
    pub explanations_available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation_unavailable_reason: Option<String>,
    pub avg_latency_ms: f32,
    pub inference_count: u64,
}

// ============================================================================
// ADAPTER
// ============================================================================

pub struct InferenceAdapter {
    artifact: Arc<ClassifierArtifact>,
    threshold: ThresholdConfig,
    explainer: Result<ShapleyExplainer, ExplainError>,
    latency_sum_us: AtomicU64,
    inference_count: AtomicU64,
}

impl InferenceAdapter {
    /// Threshold precedence: config, then manifest, then 0.5
    pub fn new(artifact: Arc<ClassifierArtifact>, config: &ModelConfig) -> Result<Self, ArtifactLoadError> {
        let value = config.threshold.or(artifact.threshold()).unwrap_or(DEFAULT_THRESHOLD);
        let threshold = ThresholdConfig::new(value).ok_or(ArtifactLoadError::Threshold(value))?;

        let explainer = ShapleyExplainer::new(artifact.pipeline(), artifact.background(), &config.explain);
        match &explainer {
            Ok(e) => log::info!(
                "Explanations enabled ({} orderings, {} background rows)",
                e.permutations(),
                e.background_rows()
            ),
            Err(ExplainError::Disabled) => log::info!("Explanations disabled by configuration"),
            Err(e) => log::warn!("Explanations unavailable: {}", e),
        }

        Ok(Self {
            artifact,
            threshold,
            explainer,
            latency_sum_us: AtomicU64::new(0),
            inference_count: AtomicU64::new(0),
        })
    }

    pub fn load(config: &ModelConfig) -> Result<Self, ArtifactLoadError> {
        let artifact = ClassifierArtifact::load(&config.manifest_path)?;
        Self::new(Arc::new(artifact), config)
    }

    pub fn artifact(&self) -> &ClassifierArtifact {
        &self.artifact
    }

    pub fn threshold(&self) -> f32 {
        self.threshold.threshold
    }

    pub fn explanations_available(&self) -> bool {
        self.explainer.is_ok()
    }

    pub fn classify(&self, record: &FeatureRecord) -> Result<Prediction, PhishError> {
        let start_time = Instant::now();
        let row = self.contract_row(record)?;

        let pipeline = self.artifact.pipeline();
        let input = Array2::from_shape_vec((1, row.len()), pipeline.prepare(&row))
            .map_err(|e| InferenceError(format!("Array error: {}", e)))?;

        let (label, probability) = match pipeline.score_prepared(input.view())? {
            Scores::Probabilities(p) => {
                let prob = p
                    .first()
                    .copied()
                    .filter(|p| p.is_finite())
                    .ok_or_else(|| InferenceError("classifier returned no finite probability".into()))?
                    .clamp(0.0, 1.0);
                (self.threshold.label_for(prob), Some(prob))
            }
            Scores::Labels(l) => {
                let class = l
                    .first()
                    .copied()
                    .ok_or_else(|| InferenceError("classifier returned no label".into()))?;
                (Label::from_class(class), None)
            }
        };

        let inference_time = start_time.elapsed().as_micros() as u64;

        // Track metrics
        self.latency_sum_us.fetch_add(inference_time, Ordering::Relaxed);
        self.inference_count.fetch_add(1, Ordering::Relaxed);

        log::debug!(
            "Classified as {} (p={:?}, t={}) in {}us",
            label,
            probability,
            self.threshold.threshold,
            inference_time
        );

        Ok(Prediction {
            label,
            class: label.class(),
            probability,
            threshold: self.threshold.threshold,
            inference_time_us: inference_time,
            method: pipeline.model().kind().to_string(),
        })
    }

    pub fn explain(&self, record: &FeatureRecord) -> Result<Explanation, ExplainError> {
        let explainer = self.explainer.as_ref().map_err(Clone::clone)?;
        let row = self.contract_row(record)?;
        explainer.explain(self.artifact.pipeline(), &row)
    }

    fn contract_row(&self, record: &FeatureRecord) -> Result<Vec<f32>, FeatureContractError> {
        let meta = self.artifact.metadata();
        if record.version != meta.layout_version || record.layout_hash != meta.layout_hash {
            return Err(FeatureContractError::Layout {
                expected_version: meta.layout_version,
                expected_hash: meta.layout_hash,
                found_version: record.version,
                found_hash: record.layout_hash,
            });
        }
        record.to_row(self.artifact.columns())
    }

    pub fn status(&self) -> EngineStatus {
        let meta = self.artifact.metadata();
        let sum = self.latency_sum_us.load(Ordering::Relaxed);
        let count = self.inference_count.load(Ordering::Relaxed);
        let avg = if count > 0 { (sum as f32 / count as f32) / 1000.0 } else { 0.0 };

        let device = match meta.classifier_kind.as_str() {
            "onnx" => "ONNX Runtime (CPU)",
            "tree_ensemble" => "Native tree evaluator (CPU)",
            _ => "In-process",
        };

        EngineStatus {
            model_loaded: true,
            model_name: meta.manifest_path.clone(),
            classifier_kind: meta.classifier_kind.clone(),
            inference_device: device.to_string(),
            layout_version: meta.layout_version,
            layout_hash: meta.layout_hash,
            loaded_at: meta.loaded_at,
            threshold: self.threshold.threshold,
            explanations_available: self.explainer.is_ok(),
            explanation_unavailable_reason: self.explainer.as_ref().err().map(|e| e.to_string()),
            avg_latency_ms: avg,
            inference_count: count,
        }
    }
}
