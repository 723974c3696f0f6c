//! # TaskDesk API Server Library
//!
//! HTTP layer of TaskDesk: accounts, bearer sessions and per-user tasks.
//!
//! ## Modules
//!
//! - `app`: Application state, router builder and session middleware
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod routes;
