//! User activity log model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::format_timestamp;
use crate::listing::{Column, FieldValue, Record, ResourceSchema, SortDirection, SortSpec};

/// Outcome of a logged action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityStatus {
    Success,
    Failure,
}

impl ActivityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityStatus::Success => "success",
            ActivityStatus::Failure => "failure",
        }
    }
}

impl FromStr for ActivityStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "success" => Ok(ActivityStatus::Success),
            "failure" => Ok(ActivityStatus::Failure),
            _ => Err(format!("Unknown activity status: {}", s)),
        }
    }
}

impl std::fmt::Display for ActivityStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityLog {
    pub id: i64,
    pub user_id: i64,
    pub action: String,
    pub description: Option<String>,
    pub status: ActivityStatus,
    pub ip_address: Option<String>,
    pub created_at: DateTime<Utc>,
}

pub static ACTIVITY_LOG_SCHEMA: ResourceSchema = ResourceSchema {
    resource: "activity_logs",
    table: "activity_logs",
    label: "Activity log",
    foreign_key: "user_id",
    search_columns: &["action", "description"],
    status_column: "status",
    statuses: &["success", "failure"],
    timestamp_column: "created_at",
    sortable: &["id", "action", "description", "status", "created_at"],
    default_sort: SortSpec::new("created_at", SortDirection::Desc),
    default_window: true,
    dependents: None,
};

impl Record for ActivityLog {
    fn schema() -> &'static ResourceSchema {
        &ACTIVITY_LOG_SCHEMA
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn with_id(self, id: i64) -> Self {
        Self { id, ..self }
    }

    fn stamped(self, created_at: DateTime<Utc>) -> Self {
        Self { created_at, ..self }
    }

    fn field(&self, column: &str) -> FieldValue {
        match column {
            "id" => FieldValue::Int(self.id),
            "user_id" => FieldValue::Int(self.user_id),
            "action" => FieldValue::text(&self.action),
            "description" => FieldValue::optional_text(self.description.as_deref()),
            "status" => FieldValue::text(self.status.as_str()),
            "ip_address" => FieldValue::optional_text(self.ip_address.as_deref()),
            "created_at" => FieldValue::Timestamp(self.created_at),
            _ => FieldValue::Null,
        }
    }

    fn insert_values(&self) -> Vec<(&'static str, FieldValue)> {
        vec![
            ("user_id", FieldValue::Int(self.user_id)),
            ("action", FieldValue::text(&self.action)),
            (
                "description",
                FieldValue::optional_text(self.description.as_deref()),
            ),
            ("status", FieldValue::text(self.status.as_str())),
            (
                "ip_address",
                FieldValue::optional_text(self.ip_address.as_deref()),
            ),
            ("created_at", FieldValue::Timestamp(self.created_at)),
        ]
    }

    fn columns() -> Vec<Column<Self>> {
        vec![
            Column::new("id", |l: &ActivityLog| l.id.to_string()),
            Column::new("user_id", |l: &ActivityLog| l.user_id.to_string()),
            Column::new("action", |l: &ActivityLog| l.action.clone()),
            Column::new("description", |l: &ActivityLog| {
                l.description.clone().unwrap_or_default()
            }),
            Column::new("status", |l: &ActivityLog| l.status.to_string()),
            Column::new("ip_address", |l: &ActivityLog| {
                l.ip_address.clone().unwrap_or_default()
            }),
            Column::new("created_at", |l: &ActivityLog| format_timestamp(l.created_at)),
        ]
    }
}
