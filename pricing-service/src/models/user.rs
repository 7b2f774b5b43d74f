//! User model - accounts backing signup/signin.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// User entity. `password_hash` holds `hex(salt) + "." + hex(derived_key)`
/// and never leaves the service; responses go through the `user` projection,
/// which exposes `id` and `email` only.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
    pub admin: bool,
    pub created_utc: DateTime<Utc>,
}
