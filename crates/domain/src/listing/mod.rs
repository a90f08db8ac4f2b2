//! Filtered listing core: filter normalization, query descriptors, paging
//! and CSV export.

pub mod export;
pub mod filter;
pub mod page;
pub mod query;
pub mod schema;

pub use export::{CsvExport, ExportJob, DEFAULT_EXPORT_BATCH_SIZE};
pub use filter::{FilterSet, DEFAULT_WINDOW_DAYS, MAX_WINDOW_DAYS};
pub use page::{paginate, Page, Pagination};
pub use query::{end_of_day, start_of_day, Predicate, QueryDescriptor};
pub use schema::{
    Column, Dependents, FieldValue, Record, ResourceSchema, SortDirection, SortSpec,
};

use chrono::NaiveDate;
use shared::pagination::{PageRequest, DEFAULT_PER_PAGE, MAX_PER_PAGE};
use shared::validation::{non_blank, parse_integer};
use std::collections::HashMap;

use crate::error::{DomainError, FieldError};

pub const PAGE_KEY: &str = "page";
pub const PER_PAGE_KEY: &str = "per_page";

/// Tunables shared by every listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListingSettings {
    pub default_per_page: i64,
    pub max_per_page: i64,
    pub export_batch_size: i64,
    /// Length of the trailing window for resources that default to one.
    pub default_window_days: i64,
}

impl Default for ListingSettings {
    fn default() -> Self {
        Self {
            default_per_page: DEFAULT_PER_PAGE,
            max_per_page: MAX_PER_PAGE,
            export_batch_size: DEFAULT_EXPORT_BATCH_SIZE,
            default_window_days: DEFAULT_WINDOW_DAYS,
        }
    }
}

/// Filters and sort for an unpaginated read (exports).
#[derive(Debug, Clone, PartialEq)]
pub struct ExportRequest {
    pub filters: FilterSet,
    pub query: QueryDescriptor,
}

impl ExportRequest {
    /// Parse filters and sort. Paging keys are ignored.
    pub fn parse(
        schema: &'static ResourceSchema,
        raw: &HashMap<String, String>,
        today: NaiveDate,
        settings: &ListingSettings,
    ) -> Result<Self, DomainError> {
        let mut errors = Vec::new();
        match parse_query(schema, raw, today, settings, &mut errors) {
            Some((filters, query)) if errors.is_empty() => Ok(Self { filters, query }),
            _ => Err(DomainError::Validation(errors)),
        }
    }
}

/// A fully parsed listing request.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingRequest {
    pub filters: FilterSet,
    pub query: QueryDescriptor,
    pub page: PageRequest,
}

impl ListingRequest {
    /// Parse filters, sort and paging from one query string.
    ///
    /// Errors from all three are reported together.
    pub fn parse(
        schema: &'static ResourceSchema,
        raw: &HashMap<String, String>,
        today: NaiveDate,
        settings: &ListingSettings,
    ) -> Result<Self, DomainError> {
        let mut errors: Vec<FieldError> = Vec::new();
        let parsed = parse_query(schema, raw, today, settings, &mut errors);

        let mut paging_value = |key: &'static str, default: i64| {
            match raw.get(key).and_then(|v| non_blank(v)) {
                None => default,
                Some(v) => parse_integer(v).unwrap_or_else(|e| {
                    errors.push(FieldError::from_validation(key, e));
                    default
                }),
            }
        };
        let page = paging_value(PAGE_KEY, 1);
        let per_page = paging_value(PER_PAGE_KEY, settings.default_per_page);

        match parsed {
            Some((filters, query)) if errors.is_empty() => Ok(Self {
                filters,
                query,
                page: PageRequest::new(page, per_page, settings.max_per_page),
            }),
            _ => Err(DomainError::Validation(errors)),
        }
    }
}

fn parse_query(
    schema: &'static ResourceSchema,
    raw: &HashMap<String, String>,
    today: NaiveDate,
    settings: &ListingSettings,
    errors: &mut Vec<FieldError>,
) -> Option<(FilterSet, QueryDescriptor)> {
    let value = |key: &str| raw.get(key).and_then(|v| non_blank(v));

    let filters = FilterSet::normalize(schema, raw, today, settings.default_window_days)
        .map_err(|e| errors.extend(e))
        .ok();

    let sort = SortSpec::parse(
        schema,
        value(query::SORT_KEY),
        value(query::DIRECTION_KEY),
    )
    .map_err(|e| errors.extend(e))
    .ok();

    let (filters, sort) = (filters?, sort?);
    let query = QueryDescriptor::build(schema, &filters, sort);
    Some((filters, query))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::City;

    fn raw(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
    }

    fn parse(pairs: &[(&str, &str)]) -> Result<ListingRequest, DomainError> {
        ListingRequest::parse(
            City::schema(),
            &raw(pairs),
            today(),
            &ListingSettings::default(),
        )
    }

    fn error_fields(err: DomainError) -> Vec<String> {
        match err {
            DomainError::Validation(details) => details.into_iter().map(|d| d.field).collect(),
            other => panic!("Expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_defaults() {
        let request = parse(&[]).unwrap();
        assert_eq!(request.page, PageRequest::new(1, 25, 100));
        assert_eq!(request.query.sort, City::schema().default_sort);
        assert!(request.filters.is_empty());
    }

    #[test]
    fn test_page_size_is_clamped() {
        assert_eq!(parse(&[("per_page", "0")]).unwrap().page.per_page, 1);
        assert_eq!(parse(&[("per_page", "-5")]).unwrap().page.per_page, 1);
        assert_eq!(parse(&[("per_page", "1000")]).unwrap().page.per_page, 100);
        assert_eq!(parse(&[("page", "0")]).unwrap().page.page, 1);
    }

    #[test]
    fn test_non_numeric_paging_is_rejected() {
        let fields = error_fields(parse(&[("page", "two"), ("per_page", "x")]).unwrap_err());
        assert_eq!(fields, vec!["page", "per_page"]);
    }

    #[test]
    fn test_errors_from_every_part_are_combined() {
        let fields = error_fields(
            parse(&[("country_id", "abc"), ("sort", "password"), ("page", "?")]).unwrap_err(),
        );
        assert_eq!(fields, vec!["country_id", "sort", "page"]);
    }

    #[test]
    fn test_export_request_ignores_paging() {
        let request = ExportRequest::parse(
            City::schema(),
            &raw(&[("page", "x"), ("status", "inactive")]),
            today(),
            &ListingSettings::default(),
        )
        .unwrap();
        assert_eq!(request.filters.status.as_deref(), Some("inactive"));
        assert_eq!(request.query.predicates.len(), 1);
    }

    #[test]
    fn test_export_and_listing_build_the_same_query() {
        let pairs = raw(&[("status", "active"), ("sort", "id"), ("direction", "desc")]);
        let settings = ListingSettings::default();
        let listing = ListingRequest::parse(City::schema(), &pairs, today(), &settings).unwrap();
        let export = ExportRequest::parse(City::schema(), &pairs, today(), &settings).unwrap();

        assert_eq!(listing.query, export.query);
        assert_eq!(
            export,
            ExportRequest {
                filters: listing.filters.clone(),
                query: listing.query.clone(),
            }
        );
        assert_ne!(
            listing.query,
            QueryDescriptor::all(crate::models::User::schema())
        );
    }

    #[test]
    fn test_configured_page_sizes() {
        let settings = ListingSettings {
            default_per_page: 10,
            max_per_page: 20,
            ..Default::default()
        };
        let request =
            ListingRequest::parse(City::schema(), &raw(&[]), today(), &settings).unwrap();
        assert_eq!(request.page.per_page, 10);

        let request = ListingRequest::parse(
            City::schema(),
            &raw(&[("per_page", "50")]),
            today(),
            &settings,
        )
        .unwrap();
        assert_eq!(request.page.per_page, 20);
    }
}
