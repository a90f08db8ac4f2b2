//! Filter normalization.
//!
//! Turns raw query-string pairs into a typed `FilterSet`. Normalization is
//! pure: `today` is passed in by the caller.

use chrono::{Duration, NaiveDate};
use serde_json::{json, Map, Value as JsonValue};
use shared::validation::{non_blank, parse_date, parse_positive_id, validate_one_of};
use std::collections::HashMap;

use super::schema::ResourceSchema;
use crate::error::FieldError;

pub const START_DATE_KEY: &str = "start_date";
pub const END_DATE_KEY: &str = "end_date";
pub const SEARCH_KEY: &str = "search";
pub const STATUS_KEY: &str = "status";

/// Length of the trailing window applied when a resource asks for one.
pub const DEFAULT_WINDOW_DAYS: i64 = 30;

/// Longest trailing window honoured; larger settings are clamped.
pub const MAX_WINDOW_DAYS: i64 = 36_500;

/// Normalized, optional listing constraints.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub foreign_id: Option<i64>,
    pub search: Option<String>,
    pub status: Option<String>,
}

impl FilterSet {
    /// Normalize raw input against a resource schema.
    ///
    /// `default_window_days` is honoured only when the schema opts in and
    /// both date bounds are absent. A single bound leaves the other side
    /// open.
    pub fn normalize(
        schema: &ResourceSchema,
        raw: &HashMap<String, String>,
        today: NaiveDate,
        default_window_days: i64,
    ) -> Result<Self, Vec<FieldError>> {
        let mut errors = Vec::new();
        let mut filters = FilterSet::default();

        let value = |key: &str| raw.get(key).and_then(|v| non_blank(v));

        if let Some(v) = value(START_DATE_KEY) {
            match parse_date(v) {
                Ok(date) => filters.start_date = Some(date),
                Err(e) => errors.push(FieldError::from_validation(START_DATE_KEY, e)),
            }
        }

        if let Some(v) = value(END_DATE_KEY) {
            match parse_date(v) {
                Ok(date) => filters.end_date = Some(date),
                Err(e) => errors.push(FieldError::from_validation(END_DATE_KEY, e)),
            }
        }

        if let Some(v) = value(schema.foreign_key) {
            match parse_positive_id(v) {
                Ok(id) => filters.foreign_id = Some(id),
                Err(e) => errors.push(FieldError::from_validation(schema.foreign_key, e)),
            }
        }

        if let Some(v) = value(STATUS_KEY) {
            match validate_one_of(v, schema.statuses) {
                Ok(()) => filters.status = Some(v.to_string()),
                Err(e) => errors.push(FieldError::from_validation(STATUS_KEY, e)),
            }
        }

        filters.search = value(SEARCH_KEY).map(str::to_string);

        if let (Some(start), Some(end)) = (filters.start_date, filters.end_date) {
            if start > end {
                errors.push(FieldError::new(
                    END_DATE_KEY,
                    "end_date must not be earlier than start_date",
                ));
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        let no_bounds_given = value(START_DATE_KEY).is_none() && value(END_DATE_KEY).is_none();
        if schema.default_window && no_bounds_given {
            let days = Duration::days(default_window_days.clamp(0, MAX_WINDOW_DAYS));
            filters.start_date = Some(today.checked_sub_signed(days).unwrap_or(NaiveDate::MIN));
            filters.end_date = Some(today);
        }

        Ok(filters)
    }

    pub fn is_empty(&self) -> bool {
        self == &FilterSet::default()
    }

    /// Filters as a JSON object keyed the way requests name them.
    pub fn to_metadata(&self, schema: &ResourceSchema) -> JsonValue {
        let mut map = Map::new();
        if let Some(date) = self.start_date {
            map.insert(START_DATE_KEY.into(), json!(date.to_string()));
        }
        if let Some(date) = self.end_date {
            map.insert(END_DATE_KEY.into(), json!(date.to_string()));
        }
        if let Some(id) = self.foreign_id {
            map.insert(schema.foreign_key.into(), json!(id));
        }
        if let Some(ref search) = self.search {
            map.insert(SEARCH_KEY.into(), json!(search));
        }
        if let Some(ref status) = self.status {
            map.insert(STATUS_KEY.into(), json!(status));
        }
        JsonValue::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ActivityLog, City};
    use crate::listing::Record;

    fn raw(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_empty_input_without_window() {
        let filters = FilterSet::normalize(City::schema(), &raw(&[]), today(), 30).unwrap();
        assert!(filters.is_empty());
    }

    #[test]
    fn test_default_window_when_both_bounds_absent() {
        let filters = FilterSet::normalize(ActivityLog::schema(), &raw(&[]), today(), 30).unwrap();
        assert_eq!(filters.start_date, Some(date(2024, 5, 31)));
        assert_eq!(filters.end_date, Some(today()));
    }

    #[test]
    fn test_configured_window_length() {
        let filters = FilterSet::normalize(ActivityLog::schema(), &raw(&[]), today(), 7).unwrap();
        assert_eq!(filters.start_date, Some(date(2024, 6, 23)));
    }

    #[test]
    fn test_oversized_window_is_clamped() {
        let filters =
            FilterSet::normalize(ActivityLog::schema(), &raw(&[]), today(), 1_000_000_000)
                .unwrap();
        assert_eq!(
            filters.start_date,
            today().checked_sub_signed(Duration::days(MAX_WINDOW_DAYS))
        );
        assert_eq!(filters.end_date, Some(today()));
    }

    #[test]
    fn test_window_near_calendar_start_does_not_underflow() {
        let early = NaiveDate::MIN + Duration::days(10);
        let filters =
            FilterSet::normalize(ActivityLog::schema(), &raw(&[]), early, 30).unwrap();
        assert_eq!(filters.start_date, Some(NaiveDate::MIN));
        assert_eq!(filters.end_date, Some(early));
    }

    #[test]
    fn test_only_start_date_leaves_end_open() {
        let filters = FilterSet::normalize(
            ActivityLog::schema(),
            &raw(&[("start_date", "2024-01-01")]),
            today(),
            30,
        )
        .unwrap();
        assert_eq!(filters.start_date, Some(date(2024, 1, 1)));
        assert_eq!(filters.end_date, None);
    }

    #[test]
    fn test_only_end_date_leaves_start_open() {
        let filters = FilterSet::normalize(
            ActivityLog::schema(),
            &raw(&[("end_date", "2024-02-01")]),
            today(),
            30,
        )
        .unwrap();
        assert_eq!(filters.start_date, None);
        assert_eq!(filters.end_date, Some(date(2024, 2, 1)));
    }

    #[test]
    fn test_blank_values_are_absent() {
        let filters = FilterSet::normalize(
            City::schema(),
            &raw(&[("search", "   "), ("status", ""), ("country_id", "")]),
            today(),
            30,
        )
        .unwrap();
        assert!(filters.is_empty());
    }

    #[test]
    fn test_typed_values() {
        let filters = FilterSet::normalize(
            City::schema(),
            &raw(&[
                ("country_id", "12"),
                ("search", "  ber "),
                ("status", "active"),
            ]),
            today(),
            30,
        )
        .unwrap();
        assert_eq!(filters.foreign_id, Some(12));
        assert_eq!(filters.search.as_deref(), Some("ber"));
        assert_eq!(filters.status.as_deref(), Some("active"));
    }

    #[test]
    fn test_unrecognized_keys_are_ignored() {
        let filters = FilterSet::normalize(
            City::schema(),
            &raw(&[("page", "2"), ("user_id", "x")]),
            today(),
            30,
        )
        .unwrap();
        assert!(filters.is_empty());
    }

    #[test]
    fn test_errors_are_collected_per_field() {
        let errors = FilterSet::normalize(
            ActivityLog::schema(),
            &raw(&[
                ("user_id", "abc"),
                ("status", "pending"),
                ("start_date", "2024-13-01"),
            ]),
            today(),
            30,
        )
        .unwrap_err();

        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["start_date", "user_id", "status"]);
    }

    #[test]
    fn test_inverted_range_is_rejected() {
        let errors = FilterSet::normalize(
            ActivityLog::schema(),
            &raw(&[("start_date", "2024-03-02"), ("end_date", "2024-03-01")]),
            today(),
            30,
        )
        .unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "end_date");
    }

    #[test]
    fn test_metadata_uses_request_keys() {
        let filters = FilterSet {
            start_date: Some(date(2024, 1, 1)),
            foreign_id: Some(3),
            status: Some("failure".to_string()),
            ..Default::default()
        };
        let metadata = filters.to_metadata(ActivityLog::schema());
        assert_eq!(
            metadata,
            json!({"start_date": "2024-01-01", "user_id": 3, "status": "failure"})
        );
    }
}
