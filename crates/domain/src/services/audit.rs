//! Audit entry construction.
//!
//! Handlers and services build entries through [`AuditEntryBuilder`] or the
//! shortcuts in [`audit_helpers`], then hand them to an `AuditRecorder`.

use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value as JsonValue};

use crate::models::{AuditAction, AuditEntry};

/// Fluent builder for [`AuditEntry`].
#[derive(Debug, Clone)]
pub struct AuditEntryBuilder {
    actor_id: i64,
    action: AuditAction,
    resource: String,
    resource_id: Option<i64>,
    metadata: Map<String, JsonValue>,
}

impl AuditEntryBuilder {
    /// Start an entry for an action taken by an admin.
    pub fn admin_action(actor_id: i64, action: AuditAction) -> Self {
        Self {
            actor_id,
            action,
            resource: String::new(),
            resource_id: None,
            metadata: Map::new(),
        }
    }

    /// Set the resource collection and the affected record.
    pub fn on_resource(mut self, resource: impl Into<String>, id: i64) -> Self {
        self.resource = resource.into();
        self.resource_id = Some(id);
        self
    }

    /// Set just the resource collection (exports touch no single record).
    pub fn on_resource_type(mut self, resource: impl Into<String>) -> Self {
        self.resource = resource.into();
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: JsonValue) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    pub fn build(self, occurred_at: DateTime<Utc>) -> AuditEntry {
        AuditEntry {
            actor_id: self.actor_id,
            action: self.action,
            resource: self.resource,
            resource_id: self.resource_id,
            metadata: JsonValue::Object(self.metadata),
            occurred_at,
        }
    }
}

/// Shortcuts for the audited back-office actions.
pub mod audit_helpers {
    use super::*;

    /// Completed CSV export with the filters it applied.
    pub fn exported(
        actor_id: i64,
        resource: &str,
        filters: JsonValue,
        row_count: u64,
        occurred_at: DateTime<Utc>,
    ) -> AuditEntry {
        AuditEntryBuilder::admin_action(actor_id, AuditAction::Export)
            .on_resource_type(resource)
            .with_metadata("filters", filters)
            .with_metadata("row_count", json!(row_count))
            .build(occurred_at)
    }

    pub fn created(
        actor_id: i64,
        resource: &str,
        id: i64,
        record: JsonValue,
        occurred_at: DateTime<Utc>,
    ) -> AuditEntry {
        AuditEntryBuilder::admin_action(actor_id, AuditAction::Create)
            .on_resource(resource, id)
            .with_metadata("record", record)
            .build(occurred_at)
    }

    pub fn deleted(
        actor_id: i64,
        resource: &str,
        id: i64,
        record: JsonValue,
        occurred_at: DateTime<Utc>,
    ) -> AuditEntry {
        AuditEntryBuilder::admin_action(actor_id, AuditAction::Delete)
            .on_resource(resource, id)
            .with_metadata("record", record)
            .build(occurred_at)
    }
}
