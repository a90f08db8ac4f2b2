//! Bounded page retrieval.

use serde::Serialize;
use shared::pagination::{total_pages, PageRequest};

use super::query::QueryDescriptor;
use super::schema::Record;
use crate::error::DomainError;
use crate::store::RecordStore;

/// Page metadata returned alongside the rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
    pub total_pages: i64,
}

/// One bounded slice of a listing.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub pagination: Pagination,
}

/// Count the full result, then fetch the requested slice.
///
/// Pages past the end come back empty with the real total.
pub async fn paginate<R: Record>(
    store: &dyn RecordStore<R>,
    query: &QueryDescriptor,
    request: PageRequest,
) -> Result<Page<R>, DomainError> {
    let total = store.count(query).await?;
    let data = store
        .fetch(query, request.limit(), request.offset())
        .await?;

    Ok(Page {
        data,
        pagination: Pagination {
            page: request.page,
            per_page: request.per_page,
            total,
            total_pages: total_pages(total, request.per_page),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::{FilterSet, SortDirection, SortSpec};
    use crate::models::{City, CityStatus};
    use crate::store::InMemoryRecordStore;
    use chrono::{TimeZone, Utc};

    fn city(id: i64, name: &str, status: CityStatus) -> City {
        City {
            id,
            country_id: 1,
            name: name.to_string(),
            status,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    fn store() -> InMemoryRecordStore<City> {
        InMemoryRecordStore::with_records(vec![
            city(1, "B", CityStatus::Active),
            city(2, "A", CityStatus::Active),
            city(3, "C", CityStatus::Inactive),
        ])
    }

    #[tokio::test]
    async fn test_active_cities_sorted_by_name() {
        let filters = FilterSet {
            status: Some("active".to_string()),
            ..Default::default()
        };
        let query = QueryDescriptor::build(
            City::schema(),
            &filters,
            SortSpec::new("name", SortDirection::Asc),
        );
        let page = paginate(&store(), &query, PageRequest::new(1, 2, 100))
            .await
            .unwrap();

        let ids: Vec<i64> = page.data.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![2, 1]);
        assert_eq!(
            page.pagination,
            Pagination {
                page: 1,
                per_page: 2,
                total: 2,
                total_pages: 1
            }
        );
    }

    #[tokio::test]
    async fn test_page_past_end_is_empty() {
        let query = QueryDescriptor::all(City::schema());
        let page = paginate(&store(), &query, PageRequest::new(5, 2, 100))
            .await
            .unwrap();
        assert!(page.data.is_empty());
        assert_eq!(page.pagination.total, 3);
        assert_eq!(page.pagination.total_pages, 2);
    }

    #[tokio::test]
    async fn test_empty_store() {
        let store = InMemoryRecordStore::<City>::new();
        let query = QueryDescriptor::all(City::schema());
        let page = paginate(&store, &query, PageRequest::default()).await.unwrap();
        assert!(page.data.is_empty());
        assert_eq!(page.pagination.total_pages, 0);
    }
}
