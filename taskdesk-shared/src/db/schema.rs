//! Schema bootstrap
//!
//! Creates the `users` and `tasks` tables and the owner index if they do not
//! exist yet. Safe to run on every startup; existing tables are left as they
//! are, so this is not a migration tool.

use sqlx::PgPool;
use tracing::info;

const STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        email VARCHAR(255) NOT NULL,
        username VARCHAR(100) NOT NULL,
        password_hash VARCHAR(255) NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        CONSTRAINT users_email_unique UNIQUE (email),
        CONSTRAINT users_username_unique UNIQUE (username)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS tasks (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        title VARCHAR(255) NOT NULL,
        description TEXT,
        completed BOOLEAN NOT NULL DEFAULT FALSE,
        priority VARCHAR(10) NOT NULL DEFAULT 'medium'
            CHECK (priority IN ('low', 'medium', 'high')),
        due_date DATE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    "CREATE INDEX IF NOT EXISTS tasks_user_id_idx ON tasks (user_id)",
];

/// Creates any missing tables and indexes
///
/// # Errors
///
/// Returns the first failing statement's error. `gen_random_uuid()` needs
/// PostgreSQL 13 or later.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    for statement in STATEMENTS {
        sqlx::query(statement).execute(pool).await?;
    }

    info!("Database schema is ready");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statements_are_idempotent() {
        for statement in STATEMENTS {
            assert!(statement.contains("IF NOT EXISTS"));
        }
    }

    #[test]
    fn test_constraint_names_match_models() {
        use crate::models::user::{EMAIL_CONSTRAINT, USERNAME_CONSTRAINT};

        assert!(STATEMENTS[0].contains(EMAIL_CONSTRAINT));
        assert!(STATEMENTS[0].contains(USERNAME_CONSTRAINT));
    }
}
