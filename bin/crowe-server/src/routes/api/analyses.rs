//! Image analyses.

use std::str::FromStr;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use crowe_core::assistant::ImageAnalysisRequest;
use crowe_core::entities::analysis::DEFAULT_ANALYSIS_LIMIT;
use crowe_core::entities::{AnalysisKind, AnalysisStore};

use crate::error::ServerError;
use crate::middleware::UserId;
use crate::schemas::analysis::{AnalysisBody, AnalysisList, AnalyzeRequest};
use crate::schemas::{LimitQuery, required};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/analyze", post(analyze))
        .route("/analyses", get(list_analyses))
}

async fn analyze(
    State(state): State<Arc<AppState>>,
    UserId(user_id): UserId,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<AnalysisBody>, ServerError> {
    let (Some(image_url), Some(kind)) = (
        req.image_url.filter(|u| !u.trim().is_empty()),
        req.kind,
    ) else {
        return Err(ServerError::BadRequest(
            "Image URL and analysis type are required".into(),
        ));
    };
    let kind = AnalysisKind::from_str(&kind)
        .map_err(|_| ServerError::BadRequest(format!("unknown analysis type: {kind}")))?;

    let analysis = state
        .assistant()?
        .analyze_image(ImageAnalysisRequest {
            user_id,
            kind,
            image_url,
            farm_id: req.farm_id,
            strain_id: req.strain_id,
        })
        .await?;
    Ok(Json(AnalysisBody { analysis }))
}

async fn list_analyses(
    State(state): State<Arc<AppState>>,
    UserId(user_id): UserId,
    Query(q): Query<LimitQuery>,
) -> Result<Json<AnalysisList>, ServerError> {
    let analyses = state
        .store
        .get_user_analyses(&user_id, q.limit.unwrap_or(DEFAULT_ANALYSIS_LIMIT))
        .await?;
    Ok(Json(AnalysisList { analyses }))
}
