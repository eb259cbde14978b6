//! Feature extraction handler

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::Deserialize;
use validator::Validate;

use phishscope_core::Extraction;

use crate::{AppResult, AppState};

#[derive(Debug, Deserialize, Validate)]
pub struct FeaturesRequest {
    #[validate(length(min = 1, max = 2048, message = "url must be 1-2048 characters"))]
    pub url: String,
}

/// Feature record + lookup report, no classification
pub async fn extract(
    State(state): State<AppState>,
    payload: Result<Json<FeaturesRequest>, JsonRejection>,
) -> AppResult<Json<Extraction>> {
    let Json(req) = payload?;
    req.validate()?;

    let extraction = state.detector.features(&req.url).await?;
    Ok(Json(extraction))
}
