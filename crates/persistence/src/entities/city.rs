//! City entity.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database row of `cities`.
#[derive(Debug, Clone, FromRow)]
pub struct CityEntity {
    pub id: i64,
    pub country_id: i64,
    pub name: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}
