//! PhishScope API Server
//!
//! HTTP front for the phishing detector.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                     PHISHSCOPE API                       │
//! ├──────────────────────────────────────────────────────────┤
//! │  ┌───────────┐   ┌──────────────────┐   ┌─────────────┐  │
//! │  │  Router   │──▶│ Feature Extractor│──▶│  Inference  │  │
//! │  │  (Axum)   │   │ (lookups, join!) │   │  Adapter    │  │
//! │  └───────────┘   └────────┬─────────┘   └─────────────┘  │
//! │                           ▼                              │
//! │          OpenPageRank · Google CSE · target page         │
//! └──────────────────────────────────────────────────────────┘
//! ```

mod config;
mod error;
mod handlers;


use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use phishscope_core::PhishingDetector;

pub use error::{AppError, AppResult};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "phish_api=debug,phishscope_core=info,tower_http=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    tracing::info!("PhishScope API starting ({})...", config.environment);
    if !config.is_production() {
        if !config.lookup.has_pagerank_credentials() {
            tracing::warn!("OPEN_PAGERANK_API_KEY not set - page_rank will use its fallback");
        }
        if !config.lookup.has_search_credentials() {
            tracing::warn!("GOOGLE_API_KEY/GOOGLE_CSE_ID not set - google_index will use its fallback");
        }
    }

    // Load pipeline (fatal when missing or corrupt)
    let detector = PhishingDetector::from_config(&config.lookup, &config.model)
        .with_context(|| format!("loading pipeline {}", config.model.manifest_path.display()))?;

    // Build application state
    let state = AppState {
        detector: Arc::new(detector),
        config: Arc::new(config.clone()),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub detector: Arc<PhishingDetector>,
    pub config: Arc<config::Config>,
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::check))
        .route("/api/v1/model", get(handlers::model::status))
        .route("/api/v1/features", post(handlers::features::extract))
        .route("/api/v1/predict", post(handlers::predict::predict))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state)
}
