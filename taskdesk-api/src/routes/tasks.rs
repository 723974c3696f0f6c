/// Task endpoints
///
/// All routes require a bearer token; the session middleware injects the
/// caller's `AuthContext`. Tasks of other users answer `404`.
///
/// # Endpoints
///
/// - `GET /tasks` - List own tasks, optional `completed` and `priority` filters
/// - `POST /tasks` - Create a task
/// - `GET /tasks/:id` - Fetch one task
/// - `PUT /tasks/:id` - Partial update
/// - `DELETE /tasks/:id` - Delete a task
use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::ValidJson,
};
use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    Extension, Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use taskdesk_shared::{
    auth::middleware::AuthContext,
    models::task::{NewTask, Priority, Task, TaskFilter, TaskPatch},
};
use uuid::Uuid;
use validator::Validate;

/// Listing filters
#[derive(Debug, Default, Deserialize)]
pub struct ListTasksQuery {
    pub completed: Option<bool>,
    pub priority: Option<String>,
}

/// Create task request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,

    pub description: Option<String>,

    /// `low`, `medium` or `high`; defaults to `medium`
    pub priority: Option<String>,

    /// `YYYY-MM-DD`
    pub due_date: Option<NaiveDate>,
}

/// Update task request
///
/// Absent fields are left alone. `description` and `due_date` may be set to
/// `null` to clear them; `null` for the other fields counts as absent.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    #[serde(default)]
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,

    #[serde(default)]
    pub completed: Option<bool>,

    #[serde(default)]
    pub priority: Option<String>,

    #[serde(default, deserialize_with = "double_option")]
    pub due_date: Option<Option<NaiveDate>>,
}

/// Delete confirmation
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Distinguishes a present `null` (`Some(None)`) from an absent field (`None`)
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn parse_task_id(path: Result<Path<Uuid>, PathRejection>) -> ApiResult<Uuid> {
    path.map(|Path(id)| id)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

fn parse_priority(value: Option<&str>) -> ApiResult<Option<Priority>> {
    value
        .map(|p| p.parse::<Priority>())
        .transpose()
        .map_err(|e| ApiError::BadRequest(e.to_string()))
}

impl UpdateTaskRequest {
    fn into_patch(self) -> ApiResult<TaskPatch> {
        Ok(TaskPatch {
            priority: parse_priority(self.priority.as_deref())?,
            title: self.title,
            description: self.description,
            completed: self.completed,
            due_date: self.due_date,
        })
    }
}

/// List the caller's tasks
///
/// Ordered by due date (undated last), then newest first.
///
/// # Errors
///
/// - `400 Bad Request`: Unparseable `completed` or unknown `priority`
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    query: Result<Query<ListTasksQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Task>>> {
    let Query(query) = query.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;

    let filter = TaskFilter {
        completed: query.completed,
        priority: parse_priority(query.priority.as_deref())?,
    };

    let tasks = state.tasks.list(auth.user_id, &filter).await?;
    Ok(Json(tasks))
}

/// Create a task
///
/// ```text
/// POST /tasks
/// Content-Type: application/json
///
/// { "title": "Buy milk", "priority": "low", "due_date": "2025-03-01" }
/// ```
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ValidJson(req): ValidJson<CreateTaskRequest>,
) -> ApiResult<Json<Task>> {
    let new_task = NewTask {
        title: req.title,
        description: req.description,
        priority: parse_priority(req.priority.as_deref())?.unwrap_or_default(),
        due_date: req.due_date,
    };

    let task = state.tasks.create(auth.user_id, new_task).await?;
    Ok(Json(task))
}

pub async fn get_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    task_id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<Task>> {
    let task = state.tasks.get(auth.user_id, parse_task_id(task_id)?).await?;
    Ok(Json(task))
}

/// Partially update a task
///
/// An empty body `{}` returns the task unchanged.
pub async fn update_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    task_id: Result<Path<Uuid>, PathRejection>,
    ValidJson(req): ValidJson<UpdateTaskRequest>,
) -> ApiResult<Json<Task>> {
    let task_id = parse_task_id(task_id)?;
    let patch = req.into_patch()?;

    let task = state.tasks.update(auth.user_id, task_id, patch).await?;
    Ok(Json(task))
}

pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    task_id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<MessageResponse>> {
    state.tasks.delete(auth.user_id, parse_task_id(task_id)?).await?;

    Ok(Json(MessageResponse {
        message: "Task deleted successfully".to_string(),
    }))
}
