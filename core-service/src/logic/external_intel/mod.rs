//! External Intelligence Module - Best-effort URL signals
//!
//! Mục đích: Kết nối với nguồn signal bên ngoài cho feature extraction
//!
//! # Components
//! - `page.rs`: target page fetch (title + anchors)
//! - `page_rank.rs`: OpenPageRank domain reputation
//! - `search_index.rs`: Google Custom Search index presence
//! - `lookup.rs`: deadline/retry/fallback wrapper shared by all of them
//!
//! Each source sits behind its own trait so it can be swapped or mocked
//! independently of the others.

pub mod lookup;
pub mod page;
pub mod page_rank;
pub mod search_index;
pub mod types;

use std::sync::Arc;

use async_trait::async_trait;
use url::Url;

use crate::logic::config::LookupConfig;

// Re-exports from types
pub use types::{PageSnapshot, Signal, SignalError, SignalOutcome};

// Re-exports from submodules
pub use lookup::{best_effort, Lookup, RetryPolicy};
pub use page::{parse_html, HttpPageFetcher};
pub use page_rank::OpenPageRankClient;
pub use search_index::GoogleIndexClient;

// ============================================================================
// SOURCE TRAITS
// ============================================================================

/// Fetches and reduces the target page
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch_page(&self, url: &Url) -> Result<PageSnapshot, SignalError>;
}

/// Integer domain reputation keyed by hostname
#[async_trait]
pub trait RankSource: Send + Sync {
    async fn page_rank(&self, host: &str) -> Result<u32, SignalError>;
}

/// Whether a search index knows the URL
#[async_trait]
pub trait IndexSource: Send + Sync {
    async fn is_indexed(&self, url: &str) -> Result<bool, SignalError>;
}

// ============================================================================
// SOURCE BUNDLE
// ============================================================================

/// The three signal sources an extractor consults
#[derive(Clone)]
pub struct SignalSources {
    pub page: Arc<dyn PageSource>,
    pub rank: Arc<dyn RankSource>,
    pub index: Arc<dyn IndexSource>,
}

impl SignalSources {
    pub fn new(
        page: Arc<dyn PageSource>,
        rank: Arc<dyn RankSource>,
        index: Arc<dyn IndexSource>,
    ) -> Self {
        Self { page, rank, index }
    }

    /// HTTP-backed sources sharing one connection pool
    pub fn http(config: &LookupConfig) -> Result<Self, SignalError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .connect_timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(|e| SignalError::Network(format!("Failed to create HTTP client: {}", e)))?;

        if !config.has_pagerank_credentials() {
            log::info!("OPEN_PAGERANK_API_KEY not set - page_rank will use its fallback");
        }
        if !config.has_search_credentials() {
            log::info!("GOOGLE_API_KEY/GOOGLE_CSE_ID not set - google_index will use its fallback");
        }

        Ok(Self {
            page: Arc::new(HttpPageFetcher::new(client.clone(), config.max_page_bytes)),
            rank: Arc::new(OpenPageRankClient::new(
                client.clone(),
                config.open_pagerank_url.clone(),
                config.open_pagerank_api_key.clone(),
            )),
            index: Arc::new(GoogleIndexClient::new(
                client,
                config.google_search_url.clone(),
                config.google_api_key.clone(),
                config.google_cse_id.clone(),
            )),
        })
    }
}
