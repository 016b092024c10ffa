//! Unified server error type.
//!
//! Every handler returns `Result<T, ServerError>`, which implements
//! [`axum::response::IntoResponse`] so errors become a JSON `{"error": …}`
//! body with an appropriate status code.
//!
//! Storage and generation failures are logged with full detail; the caller
//! only gets a generic message.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use crowe_core::CoreError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The caller referenced a resource that does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The caller sent an invalid or malformed request.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// No user identity on the request.
    #[error("unauthorized")]
    Unauthorized,

    /// A collaborator the route needs is not configured.
    #[error("not configured: {0}")]
    NotConfigured(String),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, client_message) = match &self {
            ServerError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
            ServerError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
            ServerError::Unauthorized => (StatusCode::UNAUTHORIZED, "missing user id".to_owned()),
            ServerError::NotConfigured(m) => (StatusCode::SERVICE_UNAVAILABLE, m.clone()),

            ServerError::Core(e) => match e {
                CoreError::ChatNotFound { .. } | CoreError::FarmNotFound { .. } => {
                    (StatusCode::NOT_FOUND, e.to_string())
                }
                CoreError::BackendUnavailable { .. } => {
                    error!(error = %e, "storage backend error");
                    (
                        StatusCode::SERVICE_UNAVAILABLE,
                        "storage backend unavailable".to_owned(),
                    )
                }
                CoreError::GenerationFailed(_) => {
                    error!(error = %e, "language model error");
                    (
                        StatusCode::BAD_GATEWAY,
                        "language model request failed".to_owned(),
                    )
                }
                CoreError::Serialization(_) | CoreError::InvalidConfig(_) => {
                    error!(error = %e, "internal server error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "internal server error".to_owned(),
                    )
                }
            },
        };
        (status, Json(json!({ "error": client_message }))).into_response()
    }
}
