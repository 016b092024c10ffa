//! Task listing, creation, daily planning and updates.

use std::sync::Arc;

use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::DateTime;
use crowe_core::entities::{NewTask, TaskStore};
use tracing::info;

use crate::error::ServerError;
use crate::middleware::UserId;
use crate::schemas::task::{CreateTaskRequest, TaskBody, TaskList, UpdateTaskRequest};
use crate::schemas::{Ack, required};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route(
        "/tasks",
        get(list_tasks).post(create_tasks).patch(update_task),
    )
}

async fn list_tasks(
    State(state): State<Arc<AppState>>,
    UserId(user_id): UserId,
) -> Result<Json<TaskList>, ServerError> {
    let tasks = state.store.get_user_tasks(&user_id).await?;
    Ok(Json(TaskList { tasks }))
}

/// Create one task from the body, or with `generate: true` ask the assistant
/// for today's plan and store it.
async fn create_tasks(
    State(state): State<Arc<AppState>>,
    UserId(user_id): UserId,
    Json(req): Json<CreateTaskRequest>,
) -> Result<Response, ServerError> {
    if req.generate {
        let farm_context = required(req.farm_context, "farmContext")?;
        let planned = state
            .assistant()?
            .plan_daily_tasks(&user_id, req.farm_id.as_deref(), &farm_context)
            .await?;
        return Ok(Json(planned).into_response());
    }

    let due_date = req
        .due_date
        .map(|ms| {
            DateTime::from_timestamp_millis(ms)
                .ok_or_else(|| ServerError::BadRequest(format!("dueDate out of range: {ms}")))
        })
        .transpose()?;
    let task = state
        .store
        .create_task(NewTask {
            user_id: user_id.clone(),
            title: required(req.title, "title")?,
            description: req.description,
            status: req.status,
            priority: req.priority,
            due_date,
            farm_id: req.farm_id,
        })
        .await?;
    info!(user_id = %user_id, task_id = %task.id, "task created via api");
    Ok(Json(TaskBody { task }).into_response())
}

async fn update_task(
    State(state): State<Arc<AppState>>,
    UserId(user_id): UserId,
    Json(req): Json<UpdateTaskRequest>,
) -> Result<Json<Ack>, ServerError> {
    state
        .store
        .update_task(&user_id, &req.task_id, req.patch)
        .await?;
    Ok(Json(Ack::ok()))
}

#[cfg(test)]
mod test {
    use crate::routes::test_support::{Scripted, app, call};
    use axum::http::{Method, StatusCode};
    use crowe_core::entities::{TaskStatus, TaskStore};
    use serde_json::json;

    #[tokio::test]
    async fn create_list_and_patch() {
        let (app, store) = app(None);
        let (status, body) = call(
            &app,
            Method::POST,
            "/api/tasks",
            Some("u1"),
            Some(json!({"title": "Soak grain", "priority": "high", "dueDate": 1_700_000_000_000i64})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["task"]["status"], "pending");
        assert_eq!(body["task"]["dueDate"], 1_700_000_000_000i64);
        let id = body["task"]["id"].as_str().unwrap().to_owned();

        let (status, body) = call(
            &app,
            Method::PATCH,
            "/api/tasks",
            Some("u1"),
            Some(json!({"taskId": id, "status": "completed", "dueDate": null})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"success": true}));

        let task = store.get_task("u1", &id).await.unwrap().unwrap();
        assert_eq!(task.status, TaskStatus::Completed);
        assert_eq!(task.due_date, None);
        assert_eq!(task.title, "Soak grain");

        let (_, body) = call(&app, Method::GET, "/api/tasks", Some("u1"), None).await;
        assert_eq!(body["tasks"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn patch_of_unknown_task_still_succeeds() {
        let (app, store) = app(None);
        let (status, _) = call(
            &app,
            Method::PATCH,
            "/api/tasks",
            Some("u1"),
            Some(json!({"taskId": "ghost", "title": "x"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(store.get_user_tasks("u1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_title_is_400() {
        let (app, _) = app(None);
        let (status, body) =
            call(&app, Method::POST, "/api/tasks", Some("u1"), Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "title is required");
    }

    #[tokio::test]
    async fn generate_plans_daily_tasks() {
        let (app, _) = app(Some(Scripted {
            json: Some(json!({
                "tasks": [
                    {"title": "Mist", "description": "x", "priority": "high", "estimatedTime": "10m"},
                    {"title": "Log temps", "description": "y", "priority": "low", "estimatedTime": "5m"},
                    {"title": "Harvest", "description": "z", "priority": "medium", "estimatedTime": "1h"}
                ],
                "notes": "Pins forming."
            })),
            ..Scripted::default()
        }));
        let (status, body) = call(
            &app,
            Method::POST,
            "/api/tasks",
            Some("u1"),
            Some(json!({"generate": true, "farmContext": "shelf of oysters", "farmId": "f1"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["tasks"].as_array().unwrap().len(), 3);
        assert_eq!(body["tasks"][0]["farmId"], "f1");
        assert_eq!(body["notes"], "Pins forming.");
    }

    #[tokio::test]
    async fn failed_generation_is_502() {
        let (app, _) = app(Some(Scripted::default()));
        let (status, body) = call(
            &app,
            Method::POST,
            "/api/tasks",
            Some("u1"),
            Some(json!({"generate": true, "farmContext": "ctx"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"], "language model request failed");
    }
}
