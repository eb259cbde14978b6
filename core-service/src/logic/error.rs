//! Errors surfaced to callers of the detector
//!
//! Signal failures never reach this level; they are absorbed into fallbacks.

use thiserror::Error;

use crate::logic::external_intel::SignalError;
use crate::logic::features::{FeatureContractError, MalformedInputError};
use crate::logic::model::{ArtifactLoadError, InferenceError};

#[derive(Debug, Error)]
pub enum PhishError {
    #[error(transparent)]
    MalformedInput(#[from] MalformedInputError),

    #[error(transparent)]
    FeatureContract(#[from] FeatureContractError),

    #[error(transparent)]
    Inference(#[from] InferenceError),

    #[error(transparent)]
    ArtifactLoad(#[from] ArtifactLoadError),

    /// HTTP client for the lookups could not be built
    #[error("signal sources unavailable: {0}")]
    Sources(#[from] SignalError),
}

impl PhishError {
    /// Caller supplied something unusable (as opposed to a server fault)
    pub fn is_client_error(&self) -> bool {
        matches!(self, PhishError::MalformedInput(_) | PhishError::FeatureContract(_))
    }
}
