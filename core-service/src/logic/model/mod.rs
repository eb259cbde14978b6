//! Model Module - Pipeline artifact & inference
//!
//! Tách logic inference khỏi feature extraction.
//! Backends (ONNX, native trees) nằm sau `ScoreModel`.

pub mod artifact;
pub mod inference;
pub mod onnx;
pub mod pipeline;
pub mod threshold;
pub mod transform;
pub mod trees;

// Re-export common types
pub use artifact::{
    ArtifactLoadError, ArtifactManifest, ArtifactMetadata, ClassifierArtifact, ClassifierSpec,
    PowerTransformParams, ScalerParams, MANIFEST_FORMAT_VERSION,
};
pub use inference::{EngineStatus, InferenceAdapter, InferenceError, Prediction, ScoreModel, Scores};
pub use onnx::OnnxModel;
pub use pipeline::{PhishingPipeline, StageShapeError};
pub use threshold::{Label, ThresholdConfig};
pub use transform::{PowerTransform, RobustScaler};
pub use trees::TreeEnsemble;
