//! # TaskDesk Shared Library
//!
//! Domain types, storage and business logic behind the TaskDesk API server.
//!
//! ## Module Organization
//!
//! - `auth`: Password hashing, bearer tokens and request auth context
//! - `db`: Connection pool and schema bootstrap
//! - `models`: Database models and their SQL
//! - `store`: Storage traits with PostgreSQL and in-memory implementations
//! - `services`: Registration, login, session checks and task CRUD

pub mod auth;
pub mod db;
pub mod models;
pub mod services;
pub mod store;

/// Current version of the TaskDesk shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
