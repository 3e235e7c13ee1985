//! Image analysis HTTP route handlers
//!
//! - `POST /analyze` - Basic recommendations (up to 10 tracks)
//! - `POST /analyze/enhanced` - Contextual, diversified recommendations (up to 15 tracks)
//!
//! Both expect a multipart upload with the image in the `image` field.

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    routing::post,
    Json, Router,
};
use std::sync::Arc;
use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::models::AnalyzeResponse;
use crate::services::{RankingMode, RecommendationService};

/// Multipart field carrying the upload
pub const IMAGE_FIELD: &str = "image";

/// Shared application state for analysis handlers
#[derive(Clone)]
pub struct AnalyzeState {
    pub recommendations: Arc<RecommendationService>,
}

impl AnalyzeState {
    pub fn new(recommendations: RecommendationService) -> Self {
        Self {
            recommendations: Arc::new(recommendations),
        }
    }
}

/// Create the analysis router
pub fn analyze_router(state: AnalyzeState) -> Router {
    Router::new()
        .route("/analyze", post(analyze_basic))
        .route("/analyze/enhanced", post(analyze_enhanced))
        .with_state(state)
}

async fn analyze_basic(
    State(state): State<AnalyzeState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<AnalyzeResponse>> {
    analyze(&state, multipart, RankingMode::Basic).await
}

async fn analyze_enhanced(
    State(state): State<AnalyzeState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<AnalyzeResponse>> {
    analyze(&state, multipart, RankingMode::Enhanced).await
}

async fn analyze(
    state: &AnalyzeState,
    multipart: Result<Multipart, MultipartRejection>,
    mode: RankingMode,
) -> ApiResult<Json<AnalyzeResponse>> {
    let image = read_image(multipart).await?;
    let response = state.recommendations.analyze(image, mode).await?;
    Ok(Json(response))
}

/// Pull the `image` field out of the upload
///
/// Input problems are rejected here, before any pipeline work starts.
async fn read_image(multipart: Result<Multipart, MultipartRejection>) -> ApiResult<Vec<u8>> {
    let mut multipart = multipart.map_err(|rejection| {
        debug!(%rejection, "Request is not a multipart upload");
        ApiError::MissingImage
    })?;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let has_file_name = field
            .file_name()
            .is_some_and(|name| !name.trim().is_empty());
        if !has_file_name {
            return Err(ApiError::EmptyImage);
        }

        let bytes = field.bytes().await?;
        if bytes.is_empty() {
            return Err(ApiError::EmptyImage);
        }
        return Ok(bytes.to_vec());
    }

    Err(ApiError::MissingImage)
}
