//! Strain recommendations and the language-model connection check.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use tracing::warn;

use crate::error::ServerError;
use crate::middleware::UserId;
use crate::schemas::analysis::{ConnectionStatus, RecommendRequest, RecommendResponse};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/strains/recommend", post(recommend_strains))
        .route("/test-openai", get(test_openai))
}

async fn recommend_strains(
    State(state): State<Arc<AppState>>,
    UserId(_user_id): UserId,
    Json(req): Json<RecommendRequest>,
) -> Result<Json<RecommendResponse>, ServerError> {
    let recommendations = state
        .assistant()?
        .recommend_strains(&req.farm_context, &req.goals)
        .await?;
    Ok(Json(RecommendResponse { recommendations }))
}

/// Verify the configured key against the provider. Answers 400 with the
/// provider's complaint when the check fails.
async fn test_openai(State(state): State<Arc<AppState>>) -> (StatusCode, Json<ConnectionStatus>) {
    let Some(client) = &state.openai else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ConnectionStatus {
                status: "error",
                message: "OPENAI_API_KEY environment variable is required".into(),
                timestamp: None,
            }),
        );
    };
    match client.check_connection().await {
        Ok(()) => (
            StatusCode::OK,
            Json(ConnectionStatus {
                status: "success",
                message: "OpenAI API key is working correctly".into(),
                timestamp: Some(Utc::now().to_rfc3339()),
            }),
        ),
        Err(e) => {
            warn!(error = %e, "OpenAI connection test failed");
            (
                StatusCode::BAD_REQUEST,
                Json(ConnectionStatus {
                    status: "error",
                    message: e.to_string(),
                    timestamp: None,
                }),
            )
        }
    }
}

#[cfg(test)]
mod test {
    use crate::routes::test_support::{Scripted, app, call};
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    #[tokio::test]
    async fn recommendations_are_wrapped() {
        let (app, _) = app(Some(Scripted {
            json: Some(json!({
                "recommendations": [{
                    "name": "Shiitake",
                    "scientificName": "Lentinula edodes",
                    "difficulty": "advanced",
                    "yieldPotential": "high",
                    "colonizationTime": "8-12 weeks",
                    "fruitingTime": "1-2 weeks",
                    "substrates": ["oak sawdust"],
                    "optimalConditions": {"temperature": "12-20C", "humidity": "85%", "light": "moderate", "co2": "low"},
                    "notes": "Needs a cold shock."
                }],
                "explanation": "Good fit for a cool outbuilding."
            })),
            ..Scripted::default()
        }));
        let (status, body) = call(
            &app,
            Method::POST,
            "/api/strains/recommend",
            Some("u1"),
            Some(json!({"farmContext": "cool shed", "goals": "premium market"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["recommendations"]["recommendations"][0]["scientificName"],
            "Lentinula edodes"
        );
        assert_eq!(body["recommendations"]["explanation"], "Good fit for a cool outbuilding.");
    }

    #[tokio::test]
    async fn connection_test_without_key() {
        let (app, _) = app(None);
        let (status, body) = call(&app, Method::GET, "/api/test-openai", None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], "error");
    }
}
