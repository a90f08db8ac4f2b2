//! User entity.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database row of `users`.
#[derive(Debug, Clone, FromRow)]
pub struct UserEntity {
    pub id: i64,
    pub city_id: i64,
    pub name: String,
    pub email: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}
