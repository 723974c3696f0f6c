//! In-memory stores
//!
//! Behave like the PostgreSQL stores as far as callers can observe: the same
//! uniqueness constraints (reported under the same constraint names), the
//! same owner isolation and the same listing order. Nothing is persisted.

use async_trait::async_trait;
use chrono::Utc;
use std::cmp::Ordering;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{StoreError, TaskStore, UserStore};
use crate::models::task::{NewTask, Task, TaskFilter, TaskPatch};
use crate::models::user::{NewUser, User, EMAIL_CONSTRAINT, USERNAME_CONSTRAINT};

/// User store held in process memory
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<Uuid, User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes a user, as an out-of-band deletion would
    pub async fn remove(&self, id: Uuid) -> bool {
        self.users.write().await.remove(&id).is_some()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn insert(&self, user: &NewUser) -> Result<User, StoreError> {
        let mut users = self.users.write().await;

        if users.values().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict {
                constraint: EMAIL_CONSTRAINT.to_string(),
            });
        }
        if users.values().any(|u| u.username == user.username) {
            return Err(StoreError::Conflict {
                constraint: USERNAME_CONSTRAINT.to_string(),
            });
        }

        let created = User {
            id: Uuid::new_v4(),
            email: user.email.clone(),
            username: user.username.clone(),
            password_hash: user.password_hash.clone(),
            created_at: Utc::now(),
        };
        users.insert(created.id, created.clone());

        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.username == username).cloned())
    }
}

/// Task store held in process memory
#[derive(Debug, Default)]
pub struct MemoryTaskStore {
    tasks: RwLock<HashMap<Uuid, Task>>,
}

impl MemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Due date ascending with undated tasks last, then newest first
fn listing_order(a: &Task, b: &Task) -> Ordering {
    let by_due = match (a.due_date, b.due_date) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    by_due.then_with(|| b.created_at.cmp(&a.created_at))
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
    async fn list(&self, user_id: Uuid, filter: &TaskFilter) -> Result<Vec<Task>, StoreError> {
        let tasks = self.tasks.read().await;

        let mut owned: Vec<Task> = tasks
            .values()
            .filter(|t| t.user_id == user_id && filter.matches(t))
            .cloned()
            .collect();
        owned.sort_by(listing_order);

        Ok(owned)
    }

    async fn insert(&self, user_id: Uuid, task: &NewTask) -> Result<Task, StoreError> {
        let now = Utc::now();
        let created = Task {
            id: Uuid::new_v4(),
            user_id,
            title: task.title.clone(),
            description: task.description.clone(),
            completed: false,
            priority: task.priority,
            due_date: task.due_date,
            created_at: now,
            updated_at: now,
        };

        self.tasks.write().await.insert(created.id, created.clone());
        Ok(created)
    }

    async fn find(&self, user_id: Uuid, task_id: Uuid) -> Result<Option<Task>, StoreError> {
        let tasks = self.tasks.read().await;
        Ok(tasks.get(&task_id).filter(|t| t.user_id == user_id).cloned())
    }

    async fn update(
        &self,
        user_id: Uuid,
        task_id: Uuid,
        patch: &TaskPatch,
    ) -> Result<Option<Task>, StoreError> {
        let mut tasks = self.tasks.write().await;

        let Some(task) = tasks.get_mut(&task_id).filter(|t| t.user_id == user_id) else {
            return Ok(None);
        };

        patch.apply_to(task);
        task.updated_at = Utc::now();

        Ok(Some(task.clone()))
    }

    async fn delete(&self, user_id: Uuid, task_id: Uuid) -> Result<bool, StoreError> {
        let mut tasks = self.tasks.write().await;

        let owned = tasks.get(&task_id).is_some_and(|t| t.user_id == user_id);
        if owned {
            tasks.remove(&task_id);
        }

        Ok(owned)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::task::Priority;
    use chrono::NaiveDate;

    fn new_user(email: &str, username: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            username: username.to_string(),
            password_hash: "hash".to_string(),
        }
    }

    fn new_task(title: &str, due: Option<(i32, u32, u32)>) -> NewTask {
        NewTask {
            title: title.to_string(),
            due_date: due.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_user_uniqueness() {
        let store = MemoryUserStore::new();
        store.insert(&new_user("a@example.com", "alice")).await.unwrap();

        let dup_email = store.insert(&new_user("a@example.com", "other")).await;
        assert!(matches!(
            dup_email,
            Err(StoreError::Conflict { ref constraint }) if constraint == EMAIL_CONSTRAINT
        ));

        let dup_username = store.insert(&new_user("b@example.com", "alice")).await;
        assert!(matches!(
            dup_username,
            Err(StoreError::Conflict { ref constraint }) if constraint == USERNAME_CONSTRAINT
        ));
    }

    #[tokio::test]
    async fn test_user_lookup() {
        let store = MemoryUserStore::new();
        let user = store.insert(&new_user("a@example.com", "alice")).await.unwrap();

        assert_eq!(store.find_by_id(user.id).await.unwrap().unwrap().email, "a@example.com");
        assert!(store.find_by_email("a@example.com").await.unwrap().is_some());
        assert!(store.find_by_username("alice").await.unwrap().is_some());
        assert!(store.find_by_email("nobody@example.com").await.unwrap().is_none());

        assert!(store.remove(user.id).await);
        assert!(store.find_by_id(user.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_new_task_defaults() {
        let store = MemoryTaskStore::new();
        let task = store.insert(Uuid::new_v4(), &new_task("a", None)).await.unwrap();

        assert!(!task.completed);
        assert_eq!(task.priority, Priority::Medium);
        assert_eq!(task.created_at, task.updated_at);
    }

    #[tokio::test]
    async fn test_listing_order() {
        let store = MemoryTaskStore::new();
        let owner = Uuid::new_v4();

        store.insert(owner, &new_task("undated-old", None)).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        store.insert(owner, &new_task("later", Some((2025, 6, 1)))).await.unwrap();
        store.insert(owner, &new_task("sooner", Some((2025, 1, 1)))).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        store.insert(owner, &new_task("undated-new", None)).await.unwrap();

        let titles: Vec<String> = store
            .list(owner, &TaskFilter::default())
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.title)
            .collect();

        assert_eq!(titles, vec!["sooner", "later", "undated-new", "undated-old"]);
    }

    #[tokio::test]
    async fn test_owner_isolation() {
        let store = MemoryTaskStore::new();
        let owner = Uuid::new_v4();
        let intruder = Uuid::new_v4();
        let task = store.insert(owner, &new_task("private", None)).await.unwrap();

        assert!(store.list(intruder, &TaskFilter::default()).await.unwrap().is_empty());
        assert!(store.find(intruder, task.id).await.unwrap().is_none());

        let patch = TaskPatch {
            completed: Some(true),
            ..Default::default()
        };
        assert!(store.update(intruder, task.id, &patch).await.unwrap().is_none());
        assert!(!store.delete(intruder, task.id).await.unwrap());

        let unchanged = store.find(owner, task.id).await.unwrap().unwrap();
        assert_eq!(unchanged, task);
    }

    #[tokio::test]
    async fn test_delete_is_final() {
        let store = MemoryTaskStore::new();
        let owner = Uuid::new_v4();
        let task = store.insert(owner, &new_task("gone", None)).await.unwrap();

        assert!(store.delete(owner, task.id).await.unwrap());
        assert!(!store.delete(owner, task.id).await.unwrap());
        assert!(store.find(owner, task.id).await.unwrap().is_none());
    }
}
