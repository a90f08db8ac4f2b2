//! Audit entry entity.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database row of `audit_entries`.
#[derive(Debug, Clone, FromRow)]
pub struct AuditEntryEntity {
    pub id: i64,

    /// Admin who performed the action.
    pub actor_id: i64,

    /// `export`, `create` or `delete`.
    pub action: String,

    /// Resource collection, e.g. `cities`.
    pub resource: String,

    /// Affected record; absent for exports.
    pub resource_id: Option<i64>,

    pub metadata: serde_json::Value,

    pub occurred_at: DateTime<Utc>,
}
