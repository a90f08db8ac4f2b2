//! Static resource metadata and the `Record` seam.
//!
//! A `ResourceSchema` names every column the listing core is allowed to
//! touch. Column names never come from request input: sort fields are
//! checked against `sortable` and filters map onto fixed columns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            _ => Err(format!("'{}' must be one of: asc, desc", s)),
        }
    }
}

impl std::fmt::Display for SortDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortDirection::Asc => write!(f, "asc"),
            SortDirection::Desc => write!(f, "desc"),
        }
    }
}

/// A validated sort key. Ties are always broken by `id ASC`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub field: &'static str,
    pub direction: SortDirection,
}

impl SortSpec {
    pub const fn new(field: &'static str, direction: SortDirection) -> Self {
        Self { field, direction }
    }
}

/// Child relation that blocks deletion while rows reference the parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dependents {
    pub table: &'static str,
    pub column: &'static str,
    /// Human-readable plural used in conflict messages.
    pub label: &'static str,
}

/// Static description of an admin resource.
#[derive(Debug, PartialEq)]
pub struct ResourceSchema {
    /// Resource name used in routes, filenames and audit entries.
    pub resource: &'static str,
    pub table: &'static str,
    /// Singular label for messages ("City", "User").
    pub label: &'static str,
    /// Foreign-key column; also the filter key accepted from requests.
    pub foreign_key: &'static str,
    /// Columns matched by the free-text `search` filter.
    pub search_columns: &'static [&'static str],
    pub status_column: &'static str,
    pub statuses: &'static [&'static str],
    /// Column targeted by `start_date` / `end_date`.
    pub timestamp_column: &'static str,
    pub sortable: &'static [&'static str],
    pub default_sort: SortSpec,
    /// Substitute a trailing date window when no date bounds are given.
    pub default_window: bool,
    pub dependents: Option<Dependents>,
}

impl ResourceSchema {
    /// Resolve a request-supplied sort field to its static column name.
    pub fn sortable_column(&self, field: &str) -> Option<&'static str> {
        self.sortable.iter().copied().find(|c| *c == field)
    }
}

/// A single column value, as exposed to filters and sorting.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Int(i64),
    Text(String),
    Timestamp(DateTime<Utc>),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }

    pub fn optional_text(value: Option<&str>) -> Self {
        value.map(FieldValue::text).unwrap_or(FieldValue::Null)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            FieldValue::Timestamp(ts) => Some(*ts),
            _ => None,
        }
    }

    /// Ordering between two non-null values of the same kind.
    ///
    /// Mixed kinds compare equal; schemas never sort a column holding more
    /// than one kind.
    pub fn cmp_values(&self, other: &Self) -> Ordering {
        match (self, other) {
            (FieldValue::Int(a), FieldValue::Int(b)) => a.cmp(b),
            (FieldValue::Text(a), FieldValue::Text(b)) => a.cmp(b),
            (FieldValue::Timestamp(a), FieldValue::Timestamp(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }
}

/// One CSV column: a header label and an accessor.
pub struct Column<R> {
    pub header: &'static str,
    pub value: fn(&R) -> String,
}

impl<R> Column<R> {
    pub const fn new(header: &'static str, value: fn(&R) -> String) -> Self {
        Self { header, value }
    }
}

impl<R> Clone for Column<R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> Copy for Column<R> {}

impl<R> std::fmt::Debug for Column<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Column").field("header", &self.header).finish()
    }
}

/// An entity the listing core can filter, sort, page and export.
pub trait Record: Clone + Send + Sync + Serialize + 'static {
    fn schema() -> &'static ResourceSchema;

    fn id(&self) -> i64;

    /// Returns the record with its store-assigned id.
    fn with_id(self, id: i64) -> Self;

    /// Returns the record with its creation timestamp assigned.
    fn stamped(self, created_at: DateTime<Utc>) -> Self;

    /// Value of a schema column. Unknown columns read as `Null`.
    fn field(&self, column: &str) -> FieldValue;

    /// Columns written on insert, `id` excluded.
    fn insert_values(&self) -> Vec<(&'static str, FieldValue)>;

    /// Ordered CSV projection.
    fn columns() -> Vec<Column<Self>>;
}
