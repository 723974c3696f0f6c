//! Per-user task operations
//!
//! Callers pass a `user_id` that has already been authenticated. Ownership is
//! enforced by the store: a task owned by someone else reports `NotFound`,
//! exactly like a task that never existed.

use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::task::{NewTask, Task, TaskFilter, TaskPatch};
use crate::store::{StoreError, TaskStore};

/// Task error types
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    #[error("{0}")]
    Validation(String),

    #[error("Task not found")]
    NotFound,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Task CRUD scoped to an owner
#[derive(Clone)]
pub struct TaskService {
    store: Arc<dyn TaskStore>,
}

impl TaskService {
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self { store }
    }

    /// Checks that the task storage is reachable
    pub async fn ping(&self) -> Result<(), TaskError> {
        Ok(self.store.ping().await?)
    }

    pub async fn list(&self, user_id: Uuid, filter: &TaskFilter) -> Result<Vec<Task>, TaskError> {
        let tasks = self.store.list(user_id, filter).await?;
        debug!(user_id = %user_id, count = tasks.len(), "Listed tasks");
        Ok(tasks)
    }

    /// Creates a task
    ///
    /// # Errors
    ///
    /// Returns `TaskError::Validation` if the title is blank.
    pub async fn create(&self, user_id: Uuid, task: NewTask) -> Result<Task, TaskError> {
        ensure_title(&task.title)?;

        let task = self.store.insert(user_id, &task).await?;
        info!(user_id = %user_id, task_id = %task.id, "Task created");
        Ok(task)
    }

    pub async fn get(&self, user_id: Uuid, task_id: Uuid) -> Result<Task, TaskError> {
        self.store
            .find(user_id, task_id)
            .await?
            .ok_or(TaskError::NotFound)
    }

    /// Applies a partial update
    ///
    /// An empty patch changes nothing, not even `updated_at`, and returns the
    /// task as stored.
    pub async fn update(
        &self,
        user_id: Uuid,
        task_id: Uuid,
        patch: TaskPatch,
    ) -> Result<Task, TaskError> {
        if patch.is_empty() {
            return self.get(user_id, task_id).await;
        }
        if let Some(title) = &patch.title {
            ensure_title(title)?;
        }

        let task = self
            .store
            .update(user_id, task_id, &patch)
            .await?
            .ok_or(TaskError::NotFound)?;

        info!(user_id = %user_id, task_id = %task_id, "Task updated");
        Ok(task)
    }

    pub async fn delete(&self, user_id: Uuid, task_id: Uuid) -> Result<(), TaskError> {
        if !self.store.delete(user_id, task_id).await? {
            return Err(TaskError::NotFound);
        }

        info!(user_id = %user_id, task_id = %task_id, "Task deleted");
        Ok(())
    }
}

fn ensure_title(title: &str) -> Result<(), TaskError> {
    if title.trim().is_empty() {
        return Err(TaskError::Validation("Title must not be empty".to_string()));
    }
    Ok(())
}
