//! Audit entry repository.

use async_trait::async_trait;
use domain::models::{AuditAction, AuditEntry};
use domain::store::AuditRecorder;
use sqlx::PgPool;

use crate::entities::AuditEntryEntity;
use crate::metrics::QueryTimer;

/// Repository for `audit_entries`.
#[derive(Clone)]
pub struct AuditEntryRepository {
    pool: PgPool,
}

impl AuditEntryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new audit entry.
    pub async fn insert(&self, entry: AuditEntry) -> Result<AuditEntry, sqlx::Error> {
        let timer = QueryTimer::start("audit_entries", "insert");
        let result = sqlx::query_as::<_, AuditEntryEntity>(
            r#"
            INSERT INTO audit_entries (actor_id, action, resource, resource_id, metadata, occurred_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, actor_id, action, resource, resource_id, metadata, occurred_at
            "#,
        )
        .bind(entry.actor_id)
        .bind(entry.action.as_str())
        .bind(&entry.resource)
        .bind(entry.resource_id)
        .bind(&entry.metadata)
        .bind(entry.occurred_at)
        .fetch_one(&self.pool)
        .await;
        timer.finish(&result);

        result.map(entity_to_domain)
    }

    /// Insert an audit entry without waiting for the database.
    ///
    /// Failures are logged and otherwise dropped.
    pub fn insert_async(&self, entry: AuditEntry) {
        let repo = self.clone();
        tokio::spawn(async move {
            let action = entry.action;
            let resource = entry.resource.clone();
            if let Err(e) = repo.insert(entry).await {
                tracing::error!(
                    action = %action,
                    resource = %resource,
                    error = %e,
                    "Failed to insert audit entry"
                );
            }
        });
    }
}

#[async_trait]
impl AuditRecorder for AuditEntryRepository {
    async fn record(&self, entry: AuditEntry) {
        self.insert_async(entry);
    }
}

fn entity_to_domain(entity: AuditEntryEntity) -> AuditEntry {
    AuditEntry {
        actor_id: entity.actor_id,
        action: entity.action.parse().unwrap_or(AuditAction::Export),
        resource: entity.resource,
        resource_id: entity.resource_id,
        metadata: entity.metadata,
        occurred_at: entity.occurred_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    #[test]
    fn test_entity_to_domain() {
        let entry = entity_to_domain(AuditEntryEntity {
            id: 1,
            actor_id: 5,
            action: "delete".to_string(),
            resource: "users".to_string(),
            resource_id: Some(12),
            metadata: json!({"record": {"id": 12}}),
            occurred_at: Utc::now(),
        });
        assert_eq!(entry.action, AuditAction::Delete);
        assert_eq!(entry.resource_id, Some(12));
    }
}
