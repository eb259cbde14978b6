//! Model status handler

use axum::{extract::State, Json};
use serde::Serialize;

use phishscope_core::logic::features::LayoutInfo;
use phishscope_core::EngineStatus;

use crate::AppState;

#[derive(Serialize)]
pub struct ModelResponse {
    pub engine: EngineStatus,
    pub layout: LayoutInfo,
}

/// Loaded pipeline + the column contract it was checked against
pub async fn status(State(state): State<AppState>) -> Json<ModelResponse> {
    Json(ModelResponse {
        engine: state.detector.adapter().status(),
        layout: LayoutInfo::current(),
    })
}
