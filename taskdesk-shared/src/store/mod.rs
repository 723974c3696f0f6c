//! Storage abstraction for users and tasks
//!
//! The services talk to storage only through [`UserStore`] and [`TaskStore`].
//! Two implementations exist:
//!
//! - [`postgres`]: the production stores, delegating to the model SQL
//! - [`memory`]: in-process stores with the same observable behavior, used
//!   by tests and local experiments
//!
//! Every task operation takes the owning `user_id`. Implementations must
//! never return, modify or delete a task whose owner differs.

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::task::{NewTask, Task, TaskFilter, TaskPatch};
use crate::models::user::{NewUser, User};

pub mod memory;
pub mod postgres;

pub use memory::{MemoryTaskStore, MemoryUserStore};
pub use postgres::{PgTaskStore, PgUserStore};

/// Storage error types
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write
    #[error("Unique constraint violated: {constraint}")]
    Conflict { constraint: String },

    /// Any other database failure
    #[error("Database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return StoreError::Conflict {
                    constraint: db_err.constraint().unwrap_or_default().to_string(),
                };
            }
        }
        StoreError::Database(err)
    }
}

/// User persistence
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts a user, failing with [`StoreError::Conflict`] on a taken
    /// email or username
    async fn insert(&self, user: &NewUser) -> Result<User, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;
}

/// Task persistence, always scoped to an owner
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Lists the owner's tasks, due date ascending (undated last) then
    /// newest first
    async fn list(&self, user_id: Uuid, filter: &TaskFilter) -> Result<Vec<Task>, StoreError>;

    async fn insert(&self, user_id: Uuid, task: &NewTask) -> Result<Task, StoreError>;

    async fn find(&self, user_id: Uuid, task_id: Uuid) -> Result<Option<Task>, StoreError>;

    /// Applies a non-empty patch and refreshes `updated_at`
    ///
    /// Returns `None` if the task does not exist or belongs to someone else.
    async fn update(
        &self,
        user_id: Uuid,
        task_id: Uuid,
        patch: &TaskPatch,
    ) -> Result<Option<Task>, StoreError>;

    /// Returns false if the task does not exist or belongs to someone else
    async fn delete(&self, user_id: Uuid, task_id: Uuid) -> Result<bool, StoreError>;

    /// Checks that the backing storage is reachable
    async fn ping(&self) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_database_error_is_not_conflict() {
        let err = StoreError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, StoreError::Database(_)));
    }

    #[test]
    fn test_conflict_display_names_constraint() {
        let err = StoreError::Conflict {
            constraint: "users_email_unique".to_string(),
        };
        assert_eq!(err.to_string(), "Unique constraint violated: users_email_unique");
    }
}
