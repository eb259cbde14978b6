//! External Intelligence Types

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// SIGNALS
// ============================================================================

/// One independent remote lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    /// Target page HTML (feeds `domain_in_title` and `ratio_intHyperlinks`)
    PageContent,
    /// OpenPageRank domain score
    PageRank,
    /// Search-engine index presence
    GoogleIndex,
}

impl Signal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Signal::PageContent => "page_content",
            Signal::PageRank => "page_rank",
            Signal::GoogleIndex => "google_index",
        }
    }
}

impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// ERRORS
// ============================================================================

/// A lookup that could not produce its value
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignalError {
    #[error("credentials not configured")]
    MissingCredentials,

    #[error("network error: {0}")]
    Network(String),

    #[error("HTTP status {0}")]
    Status(u16),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("timed out")]
    Timeout,
}

impl SignalError {
    /// Worth another attempt
    pub fn is_transient(&self) -> bool {
        match self {
            SignalError::Network(_) | SignalError::Timeout => true,
            SignalError::Status(code) => *code == 429 || *code >= 500,
            SignalError::MissingCredentials | SignalError::Parse(_) => false,
        }
    }
}

impl From<reqwest::Error> for SignalError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SignalError::Timeout
        } else if let Some(status) = err.status() {
            SignalError::Status(status.as_u16())
        } else if err.is_decode() {
            SignalError::Parse(err.to_string())
        } else {
            SignalError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for SignalError {
    fn from(err: serde_json::Error) -> Self {
        SignalError::Parse(err.to_string())
    }
}

// ============================================================================
// OUTCOMES
// ============================================================================

/// How a lookup ended; the feature value is the fallback unless `Ok`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SignalOutcome {
    Ok,
    Failed { reason: String },
    TimedOut,
    Skipped { reason: String },
}

impl SignalOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, SignalOutcome::Ok)
    }
}

impl From<&SignalError> for SignalOutcome {
    fn from(err: &SignalError) -> Self {
        match err {
            SignalError::MissingCredentials => SignalOutcome::Skipped { reason: err.to_string() },
            SignalError::Timeout => SignalOutcome::TimedOut,
            other => SignalOutcome::Failed { reason: other.to_string() },
        }
    }
}

// ============================================================================
// PAGE SNAPSHOT
// ============================================================================

/// What the extractor needs from a fetched page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSnapshot {
    /// Trimmed `<title>` text; `None` when absent or blank
    pub title: Option<String>,
    /// Raw `href` of every `<a href>` in document order
    pub hrefs: Vec<String>,
}
