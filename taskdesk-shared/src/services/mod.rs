//! Business operations on top of the stores
//!
//! - `auth`: registration, login and session verification
//! - `tasks`: task CRUD scoped to the authenticated user

pub mod auth;
pub mod tasks;

pub use auth::{AuthError, AuthService, AuthSession};
pub use tasks::{TaskError, TaskService};
