use crowe_core::entities::{Priority, Task, TaskPatch, TaskStatus};
use serde::{Deserialize, Serialize};

/// `POST /api/tasks`: one task, or `generate: true` to plan the day.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    #[serde(default)]
    pub generate: bool,
    pub farm_context: Option<String>,
    pub farm_id: Option<String>,
    pub title: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub priority: Priority,
    /// Epoch milliseconds.
    pub due_date: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    pub task_id: String,
    #[serde(flatten)]
    pub patch: TaskPatch,
}

#[derive(Debug, Serialize)]
pub struct TaskList {
    pub tasks: Vec<Task>,
}

#[derive(Debug, Serialize)]
pub struct TaskBody {
    pub task: Task,
}
