//! Query descriptors.
//!
//! A `QueryDescriptor` is the store-agnostic form of a listing query:
//! ANDed predicates over schema columns plus a validated sort. The
//! PostgreSQL store renders it to SQL; the in-memory store evaluates it
//! directly with [`QueryDescriptor::matches`] and [`QueryDescriptor::compare`].

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use std::cmp::Ordering;

use super::filter::FilterSet;
use super::schema::{FieldValue, Record, ResourceSchema, SortDirection, SortSpec};
use crate::error::FieldError;

pub const SORT_KEY: &str = "sort";
pub const DIRECTION_KEY: &str = "direction";

/// A single listing constraint.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Exact match on one column.
    Equals {
        column: &'static str,
        value: FieldValue,
    },
    /// Inclusive timestamp range; a missing side is unbounded.
    Range {
        column: &'static str,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    },
    /// Case-insensitive substring match on any of the columns.
    TextSearch {
        columns: &'static [&'static str],
        needle: String,
    },
}

impl Predicate {
    pub fn matches<R: Record>(&self, record: &R) -> bool {
        match self {
            Predicate::Equals { column, value } => &record.field(column) == value,
            Predicate::Range { column, from, to } => match record.field(column).as_timestamp() {
                Some(ts) => from.map_or(true, |f| ts >= f) && to.map_or(true, |t| ts <= t),
                None => false,
            },
            Predicate::TextSearch { columns, needle } => {
                let needle = needle.to_lowercase();
                columns.iter().any(|column| {
                    record
                        .field(column)
                        .as_text()
                        .map(|text| text.to_lowercase().contains(&needle))
                        .unwrap_or(false)
                })
            }
        }
    }
}

/// First instant of a calendar day.
pub fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Last microsecond of a calendar day.
pub fn end_of_day(date: NaiveDate) -> DateTime<Utc> {
    let last = NaiveTime::from_hms_micro_opt(23, 59, 59, 999_999).unwrap_or(NaiveTime::MIN);
    date.and_time(last).and_utc()
}

impl SortSpec {
    /// Validate request sort keys against the schema allow-list.
    ///
    /// An absent field falls back to the schema default; an absent
    /// direction falls back to ascending for an explicit field.
    pub fn parse(
        schema: &ResourceSchema,
        field: Option<&str>,
        direction: Option<&str>,
    ) -> Result<Self, Vec<FieldError>> {
        let mut errors = Vec::new();

        let column = match field {
            None => Some(schema.default_sort.field),
            Some(name) => match schema.sortable_column(name) {
                Some(column) => Some(column),
                None => {
                    errors.push(FieldError::new(
                        SORT_KEY,
                        format!(
                            "'{}' must be one of: {}",
                            name,
                            schema.sortable.join(", ")
                        ),
                    ));
                    None
                }
            },
        };

        let direction = match direction {
            Some(raw) => match raw.parse::<SortDirection>() {
                Ok(direction) => Some(direction),
                Err(message) => {
                    errors.push(FieldError::new(DIRECTION_KEY, message));
                    None
                }
            },
            None if field.is_none() => Some(schema.default_sort.direction),
            None => Some(SortDirection::Asc),
        };

        match (column, direction) {
            (Some(column), Some(direction)) if errors.is_empty() => {
                Ok(SortSpec::new(column, direction))
            }
            _ => Err(errors),
        }
    }
}

/// A complete, validated listing query.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryDescriptor {
    pub schema: &'static ResourceSchema,
    pub predicates: Vec<Predicate>,
    pub sort: SortSpec,
}

impl QueryDescriptor {
    pub fn build(schema: &'static ResourceSchema, filters: &FilterSet, sort: SortSpec) -> Self {
        let mut predicates = Vec::new();

        if let Some(id) = filters.foreign_id {
            predicates.push(Predicate::Equals {
                column: schema.foreign_key,
                value: FieldValue::Int(id),
            });
        }

        if let Some(ref status) = filters.status {
            predicates.push(Predicate::Equals {
                column: schema.status_column,
                value: FieldValue::text(status.clone()),
            });
        }

        if filters.start_date.is_some() || filters.end_date.is_some() {
            predicates.push(Predicate::Range {
                column: schema.timestamp_column,
                from: filters.start_date.map(start_of_day),
                to: filters.end_date.map(end_of_day),
            });
        }

        if let Some(ref search) = filters.search {
            predicates.push(Predicate::TextSearch {
                columns: schema.search_columns,
                needle: search.clone(),
            });
        }

        Self {
            schema,
            predicates,
            sort,
        }
    }

    /// Unfiltered, default-sorted query.
    pub fn all(schema: &'static ResourceSchema) -> Self {
        Self {
            schema,
            predicates: Vec::new(),
            sort: schema.default_sort,
        }
    }

    pub fn matches<R: Record>(&self, record: &R) -> bool {
        self.predicates.iter().all(|p| p.matches(record))
    }

    /// Total order used by in-memory evaluation.
    ///
    /// Nulls sort last in either direction, matching `NULLS LAST` in SQL.
    pub fn compare<R: Record>(&self, a: &R, b: &R) -> Ordering {
        let left = a.field(self.sort.field);
        let right = b.field(self.sort.field);

        let primary = match (left.is_null(), right.is_null()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => {
                let ord = left.cmp_values(&right);
                match self.sort.direction {
                    SortDirection::Asc => ord,
                    SortDirection::Desc => ord.reverse(),
                }
            }
        };

        primary.then_with(|| a.id().cmp(&b.id()))
    }
}
