//! Admin-managed user model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use validator::Validate;

use super::format_timestamp;
use crate::listing::{
    Column, Dependents, FieldValue, Record, ResourceSchema, SortDirection, SortSpec,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    #[default]
    Active,
    Inactive,
    Suspended,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Active => "active",
            UserStatus::Inactive => "inactive",
            UserStatus::Suspended => "suspended",
        }
    }
}

impl FromStr for UserStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(UserStatus::Active),
            "inactive" => Ok(UserStatus::Inactive),
            "suspended" => Ok(UserStatus::Suspended),
            _ => Err(format!("Unknown user status: {}", s)),
        }
    }
}

impl std::fmt::Display for UserStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user as seen by the back office.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub city_id: i64,
    pub name: String,
    pub email: String,
    pub status: UserStatus,
    pub created_at: DateTime<Utc>,
}

pub static USER_SCHEMA: ResourceSchema = ResourceSchema {
    resource: "users",
    table: "users",
    label: "User",
    foreign_key: "city_id",
    search_columns: &["name", "email"],
    status_column: "status",
    statuses: &["active", "inactive", "suspended"],
    timestamp_column: "created_at",
    sortable: &["id", "name", "email", "status", "created_at"],
    default_sort: SortSpec::new("created_at", SortDirection::Desc),
    default_window: false,
    dependents: Some(Dependents {
        table: "activity_logs",
        column: "user_id",
        label: "activity logs",
    }),
};

impl Record for User {
    fn schema() -> &'static ResourceSchema {
        &USER_SCHEMA
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
            "city_id" => FieldValue::Int(self.city_id),
            "name" => FieldValue::text(&self.name),
            "email" => FieldValue::text(&self.email),
            "status" => FieldValue::text(self.status.as_str()),
            "created_at" => FieldValue::Timestamp(self.created_at),
            _ => FieldValue::Null,
        }
    }

    fn insert_values(&self) -> Vec<(&'static str, FieldValue)> {
        vec![
            ("city_id", FieldValue::Int(self.city_id)),
            ("name", FieldValue::text(&self.name)),
            ("email", FieldValue::text(&self.email)),
            ("status", FieldValue::text(self.status.as_str())),
            ("created_at", FieldValue::Timestamp(self.created_at)),
        ]
    }

    fn columns() -> Vec<Column<Self>> {
        vec![
            Column::new("id", |u: &User| u.id.to_string()),
            Column::new("city_id", |u: &User| u.city_id.to_string()),
            Column::new("name", |u: &User| u.name.clone()),
            Column::new("email", |u: &User| u.email.clone()),
            Column::new("status", |u: &User| u.status.to_string()),
            Column::new("created_at", |u: &User| format_timestamp(u.created_at)),
        ]
    }
}

/// Request payload for creating a user.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(range(min = 1, message = "city_id must be a positive integer"))]
    pub city_id: i64,

    #[validate(custom(function = "shared::validation::validate_name"))]
    pub name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[serde(default)]
    pub status: UserStatus,
}

impl CreateUserRequest {
    /// Unsaved user; id and `created_at` are assigned on insert.
    pub fn into_user(self) -> User {
        User {
            id: 0,
            city_id: self.city_id,
            name: self.name.trim().to_string(),
            email: self.email.trim().to_lowercase(),
            status: self.status,
            created_at: DateTime::<Utc>::default(),
        }
    }
}
