//! Classifier Artifact - manifest + fitted stages + classifier backend
//!
//! Loaded once per process and shared read-only.
//!
//! Load order:
//! 1. manifest parse + `format_version`
//! 2. `feature_names` must equal the extractor layout exactly
//! 3. optional `layout_hash` cross-check
//! 4. stage parameter lengths
//! 5. optional SHA-256 of the classifier file
//! 6. backend load

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::logic::features::{layout_hash, FEATURE_LAYOUT, FEATURE_VERSION};

use super::inference::{InferenceError, ScoreModel};
use super::onnx::OnnxModel;
use super::pipeline::{PhishingPipeline, StageShapeError};
use super::transform::{PowerTransform, RobustScaler};
use super::trees::TreeEnsemble;

pub const MANIFEST_FORMAT_VERSION: u32 = 1;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum ArtifactLoadError {
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid manifest {}: {source}", .path.display())]
    Manifest {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unsupported manifest format version {found} (expected {expected})")]
    UnsupportedVersion { expected: u32, found: u32 },

    #[error("feature layout mismatch: artifact expects [{}], extractor produces [{}]", .found.join(", "), .expected.join(", "))]
    LayoutMismatch { expected: Vec<String>, found: Vec<String> },

    #[error("layout hash mismatch: expected {expected:08x}, manifest declares {found:08x}")]
    LayoutHash { expected: u32, found: u32 },

    #[error(transparent)]
    StageShape(#[from] StageShapeError),

    #[error("invalid stage parameter: {0}")]
    StageValue(String),

    #[error("checksum mismatch for {}: expected {expected}, got {actual}", .path.display())]
    Checksum { path: PathBuf, expected: String, actual: String },

    #[error("invalid decision threshold {0} (must be within [0, 1])")]
    Threshold(f32),

    #[error("classifier backend failed to load: {0}")]
    Backend(#[from] InferenceError),
}

// ============================================================================
// MANIFEST
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerTransformParams {
    pub lambdas: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalerParams {
    pub center: Vec<f64>,
    pub scale: Vec<f64>,
}

fn default_probability_output() -> Option<String> {
    Some("probabilities".to_string())
}

fn default_label_output() -> Option<String> {
    Some("label".to_string())
}

fn default_base_score() -> f64 {
    0.5
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifierSpec {
    Onnx {
        path: String,
        #[serde(default = "default_probability_output")]
        probability_output: Option<String>,
        #[serde(default = "default_label_output")]
        label_output: Option<String>,
        #[serde(default)]
        sha256: Option<String>,
    },
    TreeEnsemble {
        path: String,
        #[serde(default = "default_base_score")]
        base_score: f64,
        #[serde(default)]
        sha256: Option<String>,
    },
}

impl ClassifierSpec {
    pub fn kind(&self) -> &'static str {
        match self {
            ClassifierSpec::Onnx { .. } => "onnx",
            ClassifierSpec::TreeEnsemble { .. } => "tree_ensemble",
        }
    }

    pub fn path(&self) -> &str {
        match self {
            ClassifierSpec::Onnx { path, .. } | ClassifierSpec::TreeEnsemble { path, .. } => path,
        }
    }

    pub fn sha256(&self) -> Option<&str> {
        match self {
            ClassifierSpec::Onnx { sha256, .. } | ClassifierSpec::TreeEnsemble { sha256, .. } => {
                sha256.as_deref()
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactManifest {
    pub format_version: u32,
    pub feature_names: Vec<String>,
    #[serde(default)]
    pub layout_hash: Option<u32>,
    pub power_transform: PowerTransformParams,
    pub scaler: ScalerParams,
    pub classifier: ClassifierSpec,
    /// Raw feature rows in `feature_names` order
    #[serde(default)]
    pub background: Vec<Vec<f64>>,
    #[serde(default)]
    pub threshold: Option<f32>,
}

impl ArtifactManifest {
    pub fn from_json(path: &Path, json: &str) -> Result<Self, ArtifactLoadError> {
        serde_json::from_str(json)
            .map_err(|source| ArtifactLoadError::Manifest { path: path.to_path_buf(), source })
    }

    /// Everything that can be checked without touching the classifier file
    pub fn validate(&self) -> Result<(), ArtifactLoadError> {
        if self.format_version != MANIFEST_FORMAT_VERSION {
            return Err(ArtifactLoadError::UnsupportedVersion {
                expected: MANIFEST_FORMAT_VERSION,
                found: self.format_version,
            });
        }

        if self.feature_names.iter().map(String::as_str).ne(FEATURE_LAYOUT.iter().copied()) {
            return Err(ArtifactLoadError::LayoutMismatch {
                expected: FEATURE_LAYOUT.iter().map(|s| s.to_string()).collect(),
                found: self.feature_names.clone(),
            });
        }

        if let Some(found) = self.layout_hash {
            let expected = layout_hash();
            if found != expected {
                return Err(ArtifactLoadError::LayoutHash { expected, found });
            }
        }

        let mut params = self
            .power_transform
            .lambdas
            .iter()
            .chain(&self.scaler.center)
            .chain(&self.scaler.scale);
        if params.any(|v| !v.is_finite()) {
            return Err(ArtifactLoadError::StageValue("non-finite stage parameter".into()));
        }
        if self.scaler.scale.iter().any(|&s| s < 0.0) {
            return Err(ArtifactLoadError::StageValue("negative scaler scale".into()));
        }

        if let Some(threshold) = self.threshold {
            if !(threshold.is_finite() && (0.0..=1.0).contains(&threshold)) {
                return Err(ArtifactLoadError::Threshold(threshold));
            }
        }

        Ok(())
    }
}

// ============================================================================
// ARTIFACT
// ============================================================================

/// Model metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    pub manifest_path: String,
    pub classifier_kind: String,
    pub classifier_path: Option<String>,
    pub sha256: Option<String>,
    pub layout_version: u8,
    pub layout_hash: u32,
    pub loaded_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct ClassifierArtifact {
    pipeline: PhishingPipeline,
    background: Vec<Vec<f64>>,
    threshold: Option<f32>,
    metadata: ArtifactMetadata,
}

impl ClassifierArtifact {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ArtifactLoadError> {
        let path = path.as_ref();
        log::info!("Loading classifier artifact from: {}", path.display());

        let json = std::fs::read_to_string(path)
            .map_err(|source| ArtifactLoadError::Io { path: path.to_path_buf(), source })?;
        let manifest = ArtifactManifest::from_json(path, &json)?;
        manifest.validate()?;

        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        let classifier_path = base_dir.join(manifest.classifier.path());

        let digest = match manifest.classifier.sha256() {
            Some(expected) => Some(verify_checksum(&classifier_path, expected)?),
            None => None,
        };

        let columns = manifest.feature_names.clone();
        let model: Box<dyn ScoreModel> = match &manifest.classifier {
            ClassifierSpec::Onnx { probability_output, label_output, .. } => Box::new(OnnxModel::load(
                &classifier_path,
                probability_output.as_deref(),
                label_output.as_deref(),
            )?),
            ClassifierSpec::TreeEnsemble { base_score, .. } => {
                Box::new(TreeEnsemble::load(&classifier_path, &columns, *base_score)?)
            }
        };

        let metadata = ArtifactMetadata {
            manifest_path: path.display().to_string(),
            classifier_kind: manifest.classifier.kind().to_string(),
            classifier_path: Some(classifier_path.display().to_string()),
            sha256: digest,
            layout_version: FEATURE_VERSION,
            layout_hash: layout_hash(),
            loaded_at: Utc::now(),
        };

        let artifact = Self::assemble(manifest, model, metadata)?;
        log::info!(
            "Classifier artifact loaded: {} ({} background rows)",
            artifact.metadata.classifier_kind,
            artifact.background.len()
        );
        Ok(artifact)
    }

    /// Build from an in-memory manifest and an already constructed classifier
    pub fn from_manifest(
        manifest: ArtifactManifest,
        model: Box<dyn ScoreModel>,
    ) -> Result<Self, ArtifactLoadError> {
        manifest.validate()?;
        let metadata = ArtifactMetadata {
            manifest_path: "<memory>".to_string(),
            classifier_kind: model.kind().to_string(),
            classifier_path: None,
            sha256: None,
            layout_version: FEATURE_VERSION,
            layout_hash: layout_hash(),
            loaded_at: Utc::now(),
        };
        Self::assemble(manifest, model, metadata)
    }

    fn assemble(
        manifest: ArtifactManifest,
        model: Box<dyn ScoreModel>,
        metadata: ArtifactMetadata,
    ) -> Result<Self, ArtifactLoadError> {
        let pipeline = PhishingPipeline::new(
            manifest.feature_names,
            PowerTransform::new(manifest.power_transform.lambdas),
            RobustScaler::new(manifest.scaler.center, manifest.scaler.scale),
            model,
        )?;
        Ok(Self {
            pipeline,
            background: manifest.background,
            threshold: manifest.threshold,
            metadata,
        })
    }

    pub fn pipeline(&self) -> &PhishingPipeline {
        &self.pipeline
    }

    pub fn columns(&self) -> &[String] {
        self.pipeline.columns()
    }

    /// Raw background rows for explanations
    pub fn background(&self) -> &[Vec<f64>] {
        &self.background
    }

    /// Threshold declared by the manifest
    pub fn threshold(&self) -> Option<f32> {
        self.threshold
    }

    pub fn metadata(&self) -> &ArtifactMetadata {
        &self.metadata
    }
}

/// Returns the lowercase hex digest on success
fn verify_checksum(path: &Path, expected: &str) -> Result<String, ArtifactLoadError> {
    let bytes = std::fs::read(path)
        .map_err(|source| ArtifactLoadError::Io { path: path.to_path_buf(), source })?;
    let actual = hex::encode(Sha256::digest(&bytes));
    if !actual.eq_ignore_ascii_case(expected.trim()) {
        return Err(ArtifactLoadError::Checksum {
            path: path.to_path_buf(),
            expected: expected.to_string(),
            actual,
        });
    }
    Ok(actual)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::features::FEATURE_COUNT;
    use crate::logic::testing::ConstantModel;
    use serde_json::json;
    use std::io::Write;

    const STUMP: &str = r#"[
        { "nodeid": 0, "split": "page_rank", "split_condition": 2.0,
          "yes": 1, "no": 2, "missing": 1,
          "children": [ { "nodeid": 1, "leaf": 1.0 }, { "nodeid": 2, "leaf": -1.0 } ] }
    ]"#;

    fn manifest_json(classifier: serde_json::Value) -> serde_json::Value {
        json!({
            "format_version": 1,
            "feature_names": FEATURE_LAYOUT,
            "power_transform": { "lambdas": vec![1.0; FEATURE_COUNT] },
            "scaler": { "center": vec![0.0; FEATURE_COUNT], "scale": vec![1.0; FEATURE_COUNT] },
            "classifier": classifier,
            "background": [vec![0.0; FEATURE_COUNT]],
            "threshold": 0.4
        })
    }

    fn write_artifact(dir: &Path, manifest: &serde_json::Value) -> PathBuf {
        let mut trees = std::fs::File::create(dir.join("trees.json")).unwrap();
        trees.write_all(STUMP.as_bytes()).unwrap();
        let path = dir.join("pipeline.json");
        std::fs::write(&path, serde_json::to_vec_pretty(manifest).unwrap()).unwrap();
        path
    }

    fn parse(value: serde_json::Value) -> ArtifactManifest {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_load_tree_ensemble_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_artifact(
            dir.path(),
            &manifest_json(json!({ "kind": "tree_ensemble", "path": "trees.json" })),
        );

        let artifact = ClassifierArtifact::load(&path).unwrap();
        assert_eq!(artifact.columns().len(), FEATURE_COUNT);
        assert_eq!(artifact.threshold(), Some(0.4));
        assert_eq!(artifact.background().len(), 1);
        assert_eq!(artifact.metadata().classifier_kind, "tree_ensemble");
        assert_eq!(artifact.pipeline().model().kind(), "tree_ensemble");
        assert_eq!(artifact.metadata().layout_hash, layout_hash());
    }

    #[test]
    fn test_checksum_verified() {
        let dir = tempfile::tempdir().unwrap();
        let digest = hex::encode(Sha256::digest(STUMP.as_bytes()));

        let ok = write_artifact(
            dir.path(),
            &manifest_json(json!({ "kind": "tree_ensemble", "path": "trees.json", "sha256": digest.to_uppercase() })),
        );
        let artifact = ClassifierArtifact::load(&ok).unwrap();
        assert_eq!(artifact.metadata().sha256.as_deref(), Some(digest.as_str()));

        let bad = write_artifact(
            dir.path(),
            &manifest_json(json!({ "kind": "tree_ensemble", "path": "trees.json", "sha256": "00" })),
        );
        assert!(matches!(
            ClassifierArtifact::load(&bad).unwrap_err(),
            ArtifactLoadError::Checksum { .. }
        ));
    }

    #[test]
    fn test_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            ClassifierArtifact::load(dir.path().join("nope.json")).unwrap_err(),
            ArtifactLoadError::Io { .. }
        ));

        let path = dir.path().join("pipeline.json");
        let manifest = manifest_json(json!({ "kind": "tree_ensemble", "path": "absent.json" }));
        std::fs::write(&path, serde_json::to_vec(&manifest).unwrap()).unwrap();
        assert!(matches!(
            ClassifierArtifact::load(&path).unwrap_err(),
            ArtifactLoadError::Backend(_)
        ));
    }

    #[test]
    fn test_corrupt_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipeline.json");
        std::fs::write(&path, b"{ not json").unwrap();
        assert!(matches!(
            ClassifierArtifact::load(&path).unwrap_err(),
            ArtifactLoadError::Manifest { .. }
        ));
    }

    #[test]
    fn test_layout_mismatch_rejected() {
        let mut value = manifest_json(json!({ "kind": "tree_ensemble", "path": "trees.json" }));
        let mut names: Vec<&str> = FEATURE_LAYOUT.to_vec();
        names.swap(0, 1);
        value["feature_names"] = json!(names);
        assert!(matches!(
            parse(value).validate().unwrap_err(),
            ArtifactLoadError::LayoutMismatch { .. }
        ));

        let mut value = manifest_json(json!({ "kind": "tree_ensemble", "path": "trees.json" }));
        value["layout_hash"] = json!(layout_hash() ^ 1);
        assert!(matches!(
            parse(value).validate().unwrap_err(),
            ArtifactLoadError::LayoutHash { .. }
        ));
    }

    #[test]
    fn test_version_and_threshold_checked() {
        let mut value = manifest_json(json!({ "kind": "tree_ensemble", "path": "trees.json" }));
        value["format_version"] = json!(2);
        assert!(matches!(
            parse(value).validate().unwrap_err(),
            ArtifactLoadError::UnsupportedVersion { found: 2, .. }
        ));

        let mut value = manifest_json(json!({ "kind": "tree_ensemble", "path": "trees.json" }));
        value["threshold"] = json!(1.5);
        assert!(matches!(parse(value).validate().unwrap_err(), ArtifactLoadError::Threshold(_)));
    }

    #[test]
    fn test_stage_shape_rejected() {
        let mut value = manifest_json(json!({ "kind": "tree_ensemble", "path": "trees.json" }));
        value["scaler"]["center"] = json!([0.0, 1.0]);
        let err = ClassifierArtifact::from_manifest(parse(value), Box::new(ConstantModel::new(0.5)))
            .unwrap_err();
        assert!(matches!(err, ArtifactLoadError::StageShape(StageShapeError { stage: "scaler.center", .. })));
    }

    #[test]
    fn test_onnx_output_defaults() {
        let manifest = parse(manifest_json(json!({ "kind": "onnx", "path": "xgb.onnx" })));
        match manifest.classifier {
            ClassifierSpec::Onnx { probability_output, label_output, sha256, .. } => {
                assert_eq!(probability_output.as_deref(), Some("probabilities"));
                assert_eq!(label_output.as_deref(), Some("label"));
                assert!(sha256.is_none());
            }
            other => panic!("unexpected classifier {:?}", other),
        }
    }
}
