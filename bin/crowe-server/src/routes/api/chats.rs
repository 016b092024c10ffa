//! Chat transcripts and the conversational endpoint.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use crowe_core::assistant::ChatReply;
use crowe_core::entities::ChatStore;
use tracing::debug;

use crate::error::ServerError;
use crate::middleware::UserId;
use crate::schemas::chat::{ChatBody, ChatList, ChatRequest};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/chats", get(list_chats))
        .route("/chats/{id}", get(get_chat))
        .route("/chat", post(chat))
}

async fn list_chats(
    State(state): State<Arc<AppState>>,
    UserId(user_id): UserId,
) -> Result<Json<ChatList>, ServerError> {
    let chats = state.store.get_user_chats(&user_id).await?;
    Ok(Json(ChatList { chats }))
}

async fn get_chat(
    State(state): State<Arc<AppState>>,
    UserId(user_id): UserId,
    Path(id): Path<String>,
) -> Result<Json<ChatBody>, ServerError> {
    let chat = state
        .store
        .get_chat(&user_id, &id)
        .await?
        .ok_or_else(|| ServerError::NotFound(format!("chat {id} not found")))?;
    Ok(Json(ChatBody { chat }))
}

/// Append the user's message, answer it, and return the assistant's reply.
async fn chat(
    State(state): State<Arc<AppState>>,
    UserId(user_id): UserId,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatReply>, ServerError> {
    let assistant = state.assistant()?;
    let chat_id = req.chat_id.clone();
    let content = req
        .prompt()
        .ok_or_else(|| ServerError::BadRequest("message content is required".into()))?;
    debug!(user_id = %user_id, chat_id = ?chat_id, len = content.len(), "chat request");

    let reply = assistant
        .reply(&user_id, chat_id.as_deref(), content)
        .await?;
    Ok(Json(reply))
}
