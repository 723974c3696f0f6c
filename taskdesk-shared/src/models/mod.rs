//! Database models for TaskDesk
//!
//! Each model carries its own SQL as associated functions taking a `&PgPool`.
//! The storage traits in [`crate::store`] wrap these for the services.
//!
//! # Models
//!
//! - `user`: User accounts and credentials
//! - `task`: Personal to-do items owned by a user

pub mod task;
pub mod user;
