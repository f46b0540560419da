//! In-process task store.
//!
//! Same ownership and validation rules as [`TaskDb`](super::TaskDb), without
//! a database. Used by tests and by embedders that keep tasks elsewhere.

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, Utc};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use super::task_store::TaskStore;
use crate::error::{CoreError, DatabaseError, Result};
use crate::identity::Identity;
use crate::task::{day_start, NewTask, Task, TaskId, TaskPatch, TaskStatus};

#[derive(Default)]
struct Inner {
    next_id: i64,
    tasks: BTreeMap<TaskId, Task>,
}

#[derive(Default)]
pub struct InMemoryTaskStore {
    inner: Mutex<Inner>,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the store with existing tasks, keeping their ids.
    pub fn with_tasks(tasks: impl IntoIterator<Item = Task>) -> Self {
        let mut inner = Inner::default();
        for task in tasks {
            inner.next_id = inner.next_id.max(task.id.0);
            inner.tasks.insert(task.id, task);
        }
        Self {
            inner: Mutex::new(inner),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| DatabaseError::QueryFailed("task store mutex poisoned".into()).into())
    }

    fn owned<'a>(inner: &'a mut Inner, user: &Identity, id: TaskId) -> Result<&'a mut Task> {
        let task = inner
            .tasks
            .get_mut(&id)
            .ok_or(CoreError::NotFound { task_id: id })?;
        if task.user_id != user.user_id() {
            return Err(CoreError::Unauthorized { task_id: id });
        }
        Ok(task)
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn list_all(&self, user: &Identity) -> Result<Vec<Task>> {
        let inner = self.lock()?;
        let mut tasks: Vec<Task> = inner
            .tasks
            .values()
            .filter(|t| t.user_id == user.user_id())
            .cloned()
            .collect();
        tasks.sort_by_key(|t| (t.created_at, t.id));
        Ok(tasks)
    }

    async fn list_for_day(&self, user: &Identity, date: NaiveDate) -> Result<Vec<Task>> {
        let from = day_start(date);
        let until = from + Duration::days(1);
        let inner = self.lock()?;
        let mut tasks: Vec<Task> = inner
            .tasks
            .values()
            .filter(|t| t.user_id == user.user_id())
            .filter(|t| matches!(t.start_at, Some(start) if start >= from && start < until))
            .cloned()
            .collect();
        tasks.sort_by_key(|t| (t.start_at, t.id));
        Ok(tasks)
    }

    async fn get(&self, user: &Identity, id: TaskId) -> Result<Task> {
        let mut inner = self.lock()?;
        Self::owned(&mut inner, user, id).map(|t| t.clone())
    }

    async fn create(&self, user: &Identity, task: NewTask) -> Result<Task> {
        task.validate()?;
        let mut inner = self.lock()?;
        inner.next_id += 1;
        let id = TaskId(inner.next_id);
        let stored = Task {
            id,
            user_id: user.user_id().to_string(),
            title: task.title.trim().to_string(),
            start_at: task.start_at,
            end_at: task.end_at,
            due_at: task.due_at,
            status: TaskStatus::InProgress,
            category: task.category,
            created_at: Utc::now(),
        };
        inner.tasks.insert(id, stored.clone());
        Ok(stored)
    }

    async fn update(&self, user: &Identity, id: TaskId, patch: TaskPatch) -> Result<Task> {
        let mut inner = self.lock()?;
        let task = Self::owned(&mut inner, user, id)?;
        patch.validate_against(task)?;
        *task = task.patched(&patch);
        Ok(task.clone())
    }

    async fn delete(&self, user: &Identity, id: TaskId) -> Result<()> {
        let mut inner = self.lock()?;
        Self::owned(&mut inner, user, id)?;
        inner.tasks.remove(&id);
        Ok(())
    }
}
