use std::future::Future;

use tracing::debug;

use crate::entities::dao::task::listing_order;
use crate::entities::{KvStore, NewTask, Task, TaskPatch, keys, new_id};
use crate::error::Result;

pub trait TaskStore: Send + Sync + 'static {
    fn create_task(&self, task: NewTask) -> impl Future<Output = Result<Task>> + Send;

    fn get_task(
        &self,
        user_id: &str,
        task_id: &str,
    ) -> impl Future<Output = Result<Option<Task>>> + Send;

    /// Overlay `patch` on the stored task. Silently does nothing when the
    /// task does not exist.
    fn update_task(
        &self,
        user_id: &str,
        task_id: &str,
        patch: TaskPatch,
    ) -> impl Future<Output = Result<()>> + Send;

    /// All of the user's tasks in listing order (see
    /// [`listing_order`](crate::entities::dao::task::listing_order)).
    fn get_user_tasks(&self, user_id: &str) -> impl Future<Output = Result<Vec<Task>>> + Send;
}

impl TaskStore for KvStore {
    async fn create_task(&self, task: NewTask) -> Result<Task> {
        let now = self.now();
        let created = Task {
            id: new_id(),
            title: task.title,
            description: task.description,
            status: task.status,
            priority: task.priority,
            due_date: task.due_date,
            created_at: now,
            updated_at: now,
            user_id: task.user_id,
            farm_id: task.farm_id,
        };
        self.write(&keys::tasks(&created.user_id), &created.id, &created)
            .await?;
        debug!(user_id = %created.user_id, task_id = %created.id, "task created");
        Ok(created)
    }

    async fn get_task(&self, user_id: &str, task_id: &str) -> Result<Option<Task>> {
        self.read(&keys::tasks(user_id), task_id).await
    }

    async fn update_task(&self, user_id: &str, task_id: &str, patch: TaskPatch) -> Result<()> {
        let Some(existing) = self.get_task(user_id, task_id).await? else {
            debug!(user_id, task_id, "update of missing task ignored");
            return Ok(());
        };
        let updated = patch.merge(existing, self.now());
        self.write(&keys::tasks(user_id), task_id, &updated).await
    }

    async fn get_user_tasks(&self, user_id: &str) -> Result<Vec<Task>> {
        let mut tasks: Vec<Task> = self.read_all(&keys::tasks(user_id)).await?;
        tasks.sort_by(listing_order);
        Ok(tasks)
    }
}
