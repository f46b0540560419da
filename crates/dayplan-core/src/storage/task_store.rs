use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::Result;
use crate::identity::Identity;
use crate::task::{NewTask, Task, TaskId, TaskPatch, TaskStatus};

/// Persistence collaborator for tasks.
///
/// Every call is scoped to `user`. Touching another user's task fails with
/// [`CoreError::Unauthorized`](crate::CoreError::Unauthorized) rather than
/// being filtered away; a missing task fails with
/// [`CoreError::NotFound`](crate::CoreError::NotFound).
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// All of the user's tasks, oldest first.
    async fn list_all(&self, user: &Identity) -> Result<Vec<Task>>;

    /// Tasks whose start falls on `date` (UTC), ordered by start.
    async fn list_for_day(&self, user: &Identity, date: NaiveDate) -> Result<Vec<Task>>;

    async fn get(&self, user: &Identity, id: TaskId) -> Result<Task>;

    async fn create(&self, user: &Identity, task: NewTask) -> Result<Task>;

    /// Applies `patch` and returns the stored result.
    async fn update(&self, user: &Identity, id: TaskId, patch: TaskPatch) -> Result<Task>;

    async fn delete(&self, user: &Identity, id: TaskId) -> Result<()>;

    /// Marks the task done.
    async fn complete(&self, user: &Identity, id: TaskId) -> Result<Task> {
        let patch = TaskPatch {
            status: Some(TaskStatus::Done),
            ..TaskPatch::default()
        };
        self.update(user, id, patch).await
    }
}
