//! Database pool construction and schema setup.

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::config::DatabaseConfig;

const CREATE_USERS: &str = "\
CREATE TABLE IF NOT EXISTS users ( \
    id INTEGER PRIMARY KEY AUTOINCREMENT, \
    email TEXT NOT NULL UNIQUE, \
    password_hash TEXT NOT NULL, \
    admin INTEGER NOT NULL DEFAULT 1, \
    created_utc TEXT NOT NULL \
)";

const CREATE_REPORTS: &str = "\
CREATE TABLE IF NOT EXISTS reports ( \
    id INTEGER PRIMARY KEY AUTOINCREMENT, \
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE, \
    make TEXT NOT NULL, \
    model TEXT NOT NULL, \
    year INTEGER NOT NULL, \
    mileage INTEGER NOT NULL, \
    lng REAL NOT NULL, \
    lat REAL NOT NULL, \
    price REAL NOT NULL, \
    approved INTEGER NOT NULL DEFAULT 0, \
    created_utc TEXT NOT NULL \
)";

const CREATE_REPORTS_USER_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_reports_user_id ON reports(user_id)";

pub async fn create_pool(config: &DatabaseConfig) -> Result<SqlitePool, anyhow::Error> {
    let options = SqliteConnectOptions::from_str(&config.url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(options)
        .await?;

    Ok(pool)
}

/// Idempotent schema setup. The unique index on `users.email` is what makes
/// the duplicate-signup check safe against concurrent inserts.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), anyhow::Error> {
    sqlx::query(CREATE_USERS).execute(pool).await?;
    sqlx::query(CREATE_REPORTS).execute(pool).await?;
    sqlx::query(CREATE_REPORTS_USER_INDEX).execute(pool).await?;
    Ok(())
}
