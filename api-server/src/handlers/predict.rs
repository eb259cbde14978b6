//! Prediction handler

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::Deserialize;
use validator::Validate;

use phishscope_core::Verdict;

use crate::{AppResult, AppState};

#[derive(Debug, Deserialize, Validate)]
pub struct PredictRequest {
    #[validate(length(min = 1, max = 2048, message = "url must be 1-2048 characters"))]
    pub url: String,

    #[serde(default)]
    pub explain: bool,
}

pub async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> AppResult<Json<Verdict>> {
    let Json(req) = payload?;
    req.validate()?;

    tracing::debug!("Predict request for {} (explain={})", req.url, req.explain);

    let verdict = state.detector.check(&req.url, req.explain).await?;
    Ok(Json(verdict))
}
