//! Activity log entity.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database row of `activity_logs`.
#[derive(Debug, Clone, FromRow)]
pub struct ActivityLogEntity {
    pub id: i64,
    pub user_id: i64,
    pub action: String,
    pub description: Option<String>,
    /// `success` or `failure`.
    pub status: String,
    pub ip_address: Option<String>,
    pub created_at: DateTime<Utc>,
}
