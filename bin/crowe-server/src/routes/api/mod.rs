//! Routes nested under `/api`. Handlers touching user data take a
//! [`UserId`] and so answer 401 to anonymous callers.
//!
//! [`UserId`]: crate::middleware::UserId

mod analyses;
mod assistant;
mod chats;
mod farms;
mod tasks;

use axum::Router;
use std::sync::Arc;

use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .merge(chats::router())
        .merge(tasks::router())
        .merge(farms::router())
        .merge(analyses::router())
        .merge(assistant::router())
}
