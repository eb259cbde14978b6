//! Runtime configuration
//!
//! Built once at process start (from the environment or by hand in tests)
//! and passed into the extractor and the inference adapter.

use std::path::PathBuf;
use std::time::Duration;

use crate::constants;

/// Credentials and limits for the external signal lookups
#[derive(Debug, Clone)]
pub struct LookupConfig {
    pub open_pagerank_api_key: Option<String>,
    pub google_api_key: Option<String>,
    pub google_cse_id: Option<String>,

    pub open_pagerank_url: String,
    pub google_search_url: String,

    /// Upper bound for one lookup, retries included
    pub timeout: Duration,
    pub max_retries: u32,
    pub retry_backoff: Duration,

    pub max_page_bytes: usize,
    pub user_agent: String,

    /// Prefix `http://` when the input has no scheme
    pub assume_http: bool,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            open_pagerank_api_key: None,
            google_api_key: None,
            google_cse_id: None,
            open_pagerank_url: constants::DEFAULT_OPEN_PAGERANK_URL.to_string(),
            google_search_url: constants::DEFAULT_GOOGLE_SEARCH_URL.to_string(),
            timeout: Duration::from_secs(constants::DEFAULT_LOOKUP_TIMEOUT_SECS),
            max_retries: constants::DEFAULT_LOOKUP_RETRIES,
            retry_backoff: Duration::from_millis(constants::DEFAULT_RETRY_BACKOFF_MS),
            max_page_bytes: constants::DEFAULT_MAX_PAGE_BYTES,
            user_agent: constants::default_user_agent(),
            assume_http: true,
        }
    }
}

impl LookupConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            open_pagerank_api_key: constants::get_open_pagerank_api_key(),
            google_api_key: constants::get_google_api_key(),
            google_cse_id: constants::get_google_cse_id(),
            open_pagerank_url: constants::get_open_pagerank_url(),
            google_search_url: constants::get_google_search_url(),
            timeout: Duration::from_secs(constants::get_lookup_timeout_secs()),
            max_retries: constants::get_lookup_retries(),
            retry_backoff: Duration::from_millis(constants::get_retry_backoff_ms()),
            max_page_bytes: constants::get_max_page_bytes(),
            user_agent: constants::get_user_agent(),
            assume_http: constants::get_assume_http(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn has_pagerank_credentials(&self) -> bool {
        self.open_pagerank_api_key.is_some()
    }

    pub fn has_search_credentials(&self) -> bool {
        self.google_api_key.is_some() && self.google_cse_id.is_some()
    }
}

/// Explanation sampling settings
#[derive(Debug, Clone)]
pub struct ExplainConfig {
    pub enabled: bool,
    pub permutations: usize,
    pub seed: u64,
}

impl Default for ExplainConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            permutations: constants::DEFAULT_EXPLAIN_PERMUTATIONS,
            seed: constants::DEFAULT_EXPLAIN_SEED,
        }
    }
}

/// Where the trained pipeline lives and how predictions are cut
#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub manifest_path: PathBuf,
    /// Overrides the manifest threshold when set
    pub threshold: Option<f32>,
    pub explain: ExplainConfig,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            manifest_path: PathBuf::from(constants::DEFAULT_MODEL_PATH),
            threshold: None,
            explain: ExplainConfig::default(),
        }
    }
}

impl ModelConfig {
    pub fn from_env() -> Self {
        Self {
            manifest_path: PathBuf::from(constants::get_model_path()),
            threshold: constants::get_threshold(),
            explain: ExplainConfig {
                enabled: constants::is_explain_enabled(),
                permutations: constants::get_explain_permutations(),
                seed: constants::get_explain_seed(),
            },
        }
    }
}
