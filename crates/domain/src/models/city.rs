//! City model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use validator::Validate;

use super::format_timestamp;
use crate::listing::{
    Column, Dependents, FieldValue, Record, ResourceSchema, SortDirection, SortSpec,
};

/// City lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CityStatus {
    #[default]
    Active,
    Inactive,
}

impl CityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CityStatus::Active => "active",
            CityStatus::Inactive => "inactive",
        }
    }
}

impl FromStr for CityStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(CityStatus::Active),
            "inactive" => Ok(CityStatus::Inactive),
            _ => Err(format!("Unknown city status: {}", s)),
        }
    }
}

impl std::fmt::Display for CityStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub id: i64,
    pub country_id: i64,
    pub name: String,
    pub status: CityStatus,
    pub created_at: DateTime<Utc>,
}

pub static CITY_SCHEMA: ResourceSchema = ResourceSchema {
    resource: "cities",
    table: "cities",
    label: "City",
    foreign_key: "country_id",
    search_columns: &["name"],
    status_column: "status",
    statuses: &["active", "inactive"],
    timestamp_column: "created_at",
    sortable: &["id", "name", "status", "created_at"],
    default_sort: SortSpec::new("name", SortDirection::Asc),
    default_window: false,
    dependents: Some(Dependents {
        table: "users",
        column: "city_id",
        label: "users",
    }),
};

impl Record for City {
    fn schema() -> &'static ResourceSchema {
        &CITY_SCHEMA
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
            "country_id" => FieldValue::Int(self.country_id),
            "name" => FieldValue::text(&self.name),
            "status" => FieldValue::text(self.status.as_str()),
            "created_at" => FieldValue::Timestamp(self.created_at),
            _ => FieldValue::Null,
        }
    }

    fn insert_values(&self) -> Vec<(&'static str, FieldValue)> {
        vec![
            ("country_id", FieldValue::Int(self.country_id)),
            ("name", FieldValue::text(&self.name)),
            ("status", FieldValue::text(self.status.as_str())),
            ("created_at", FieldValue::Timestamp(self.created_at)),
        ]
    }

    fn columns() -> Vec<Column<Self>> {
        vec![
            Column::new("id", |c: &City| c.id.to_string()),
            Column::new("country_id", |c: &City| c.country_id.to_string()),
            Column::new("name", |c: &City| c.name.clone()),
            Column::new("status", |c: &City| c.status.to_string()),
            Column::new("created_at", |c: &City| format_timestamp(c.created_at)),
        ]
    }
}

/// Request payload for creating a city.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCityRequest {
    #[validate(range(min = 1, message = "country_id must be a positive integer"))]
    pub country_id: i64,

    #[validate(custom(function = "shared::validation::validate_name"))]
    pub name: String,

    #[serde(default)]
    pub status: CityStatus,
}

impl CreateCityRequest {
    /// Unsaved city; id and `created_at` are assigned on insert.
    pub fn into_city(self) -> City {
        City {
            id: 0,
            country_id: self.country_id,
            name: self.name.trim().to_string(),
            status: self.status,
            created_at: DateTime::<Utc>::default(),
        }
    }
}
