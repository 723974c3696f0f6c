//! Database layer for TaskDesk
//!
//! # Modules
//!
//! - `pool`: PostgreSQL connection pool management with health checks
//! - `schema`: idempotent table bootstrap run at startup
//! - Models are in the `models` module at crate root level

pub mod pool;
pub mod schema;
