//! Configuration module

use std::env;

use phishscope_core::{LookupConfig, ModelConfig};

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,

    /// Environment (development, production)
    pub environment: String,

    /// External lookups (PageRank, search index, page fetch)
    pub lookup: LookupConfig,

    /// Pipeline artifact, threshold, explanations
    pub model: ModelConfig,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),

            environment: env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string()),

            lookup: LookupConfig::from_env(),
            model: ModelConfig::from_env(),
        }
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}
