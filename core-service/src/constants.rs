//! Central Configuration Constants
//!
//! Single source of truth for all configuration defaults.
//! Every value can be overridden through the environment (or a `.env` file
//! loaded by the binaries).

/// Per-lookup timeout (seconds)
pub const DEFAULT_LOOKUP_TIMEOUT_SECS: u64 = 5;

/// Retries for transient lookup failures (0 = single attempt)
pub const DEFAULT_LOOKUP_RETRIES: u32 = 0;

/// First retry delay, doubled on each further attempt
pub const DEFAULT_RETRY_BACKOFF_MS: u64 = 200;

/// Page bodies larger than this are truncated before parsing
pub const DEFAULT_MAX_PAGE_BYTES: usize = 2 * 1024 * 1024;

/// OpenPageRank endpoint
pub const DEFAULT_OPEN_PAGERANK_URL: &str = "https://openpagerank.com/api/v1.0/getPageRank";

/// Google Custom Search endpoint
pub const DEFAULT_GOOGLE_SEARCH_URL: &str = "https://www.googleapis.com/customsearch/v1";

/// Default trained pipeline manifest
pub const DEFAULT_MODEL_PATH: &str = "models/phishing_pipeline.json";

/// Probability above which a URL is labelled phishing
pub const DEFAULT_THRESHOLD: f32 = 0.5;

/// Permutations sampled per explanation (each also run reversed)
pub const DEFAULT_EXPLAIN_PERMUTATIONS: usize = 32;

/// Seed for explanation sampling
pub const DEFAULT_EXPLAIN_SEED: u64 = 42;

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "PhishScope";

/// User-Agent sent with every outbound request
pub fn default_user_agent() -> String {
    format!("{}/{} (+phishing-url-check)", APP_NAME, APP_VERSION)
}

// ============================================
// Helper functions to read from env with fallback
// ============================================

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|s| !s.trim().is_empty())
}

fn env_parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
    env_string(key).and_then(|s| s.trim().parse().ok())
}

fn env_flag(key: &str, default: bool) -> bool {
    env_string(key)
        .map(|s| {
            let s = s.trim().to_lowercase();
            s != "false" && s != "0" && s != "no"
        })
        .unwrap_or(default)
}

/// OpenPageRank API key (lookup skipped when absent)
pub fn get_open_pagerank_api_key() -> Option<String> {
    env_string("OPEN_PAGERANK_API_KEY")
}

/// Google API key (index lookup skipped when absent)
pub fn get_google_api_key() -> Option<String> {
    env_string("GOOGLE_API_KEY")
}

/// Google Custom Search engine id
pub fn get_google_cse_id() -> Option<String> {
    env_string("GOOGLE_CSE_ID")
}

pub fn get_lookup_timeout_secs() -> u64 {
    env_parsed("PHISH_LOOKUP_TIMEOUT_SECS").unwrap_or(DEFAULT_LOOKUP_TIMEOUT_SECS)
}

pub fn get_lookup_retries() -> u32 {
    env_parsed("PHISH_LOOKUP_RETRIES").unwrap_or(DEFAULT_LOOKUP_RETRIES)
}

pub fn get_retry_backoff_ms() -> u64 {
    env_parsed("PHISH_RETRY_BACKOFF_MS").unwrap_or(DEFAULT_RETRY_BACKOFF_MS)
}

pub fn get_max_page_bytes() -> usize {
    env_parsed("PHISH_MAX_PAGE_BYTES").unwrap_or(DEFAULT_MAX_PAGE_BYTES)
}

pub fn get_user_agent() -> String {
    env_string("PHISH_USER_AGENT").unwrap_or_else(default_user_agent)
}

/// Prefix `http://` to scheme-less input
pub fn get_assume_http() -> bool {
    env_flag("PHISH_ASSUME_HTTP", true)
}

pub fn get_open_pagerank_url() -> String {
    env_string("OPEN_PAGERANK_URL").unwrap_or_else(|| DEFAULT_OPEN_PAGERANK_URL.to_string())
}

pub fn get_google_search_url() -> String {
    env_string("GOOGLE_SEARCH_URL").unwrap_or_else(|| DEFAULT_GOOGLE_SEARCH_URL.to_string())
}

pub fn get_model_path() -> String {
    env_string("PHISH_MODEL_PATH").unwrap_or_else(|| DEFAULT_MODEL_PATH.to_string())
}

/// Threshold override; `None` lets the manifest (or the default) decide
pub fn get_threshold() -> Option<f32> {
    env_parsed("PHISH_THRESHOLD")
}

pub fn is_explain_enabled() -> bool {
    env_flag("PHISH_EXPLAIN", true)
}

pub fn get_explain_permutations() -> usize {
    env_parsed("PHISH_EXPLAIN_PERMUTATIONS").unwrap_or(DEFAULT_EXPLAIN_PERMUTATIONS)
}

pub fn get_explain_seed() -> u64 {
    env_parsed("PHISH_EXPLAIN_SEED").unwrap_or(DEFAULT_EXPLAIN_SEED)
}
