//! Listing service shared by every admin resource.
//!
//! Wraps one resource's `RecordStore` with request parsing, paging, CSV
//! export and the guarded write paths. Callers pass the acting admin and
//! the current time explicitly.

use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

use super::audit::audit_helpers;
use crate::error::{DomainError, StoreError};
use crate::listing::{
    paginate, CsvExport, ExportJob, ExportRequest, ListingRequest, ListingSettings, Page, Record,
};
use crate::store::{AuditRecorder, RecordStore};

pub struct ListingService<R: Record> {
    store: Arc<dyn RecordStore<R>>,
    audit: Arc<dyn AuditRecorder>,
    settings: ListingSettings,
}

impl<R: Record> Clone for ListingService<R> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            audit: Arc::clone(&self.audit),
            settings: self.settings,
        }
    }
}

impl<R: Record> ListingService<R> {
    pub fn new(
        store: Arc<dyn RecordStore<R>>,
        audit: Arc<dyn AuditRecorder>,
        settings: ListingSettings,
    ) -> Self {
        Self {
            store,
            audit,
            settings,
        }
    }

    pub fn settings(&self) -> &ListingSettings {
        &self.settings
    }

    /// One page of records matching the request's filters and sort.
    pub async fn list_page(
        &self,
        raw: &HashMap<String, String>,
        today: NaiveDate,
    ) -> Result<Page<R>, DomainError> {
        let request = ListingRequest::parse(R::schema(), raw, today, &self.settings)?;
        paginate(self.store.as_ref(), &request.query, request.page).await
    }

    /// Start a CSV export of every record matching the request.
    ///
    /// Fails before any output if the request is invalid or the store
    /// cannot serve the first batch. The audit entry is recorded when the
    /// returned body has been fully consumed.
    pub async fn stream_export(
        &self,
        raw: &HashMap<String, String>,
        actor_id: i64,
        now: DateTime<Utc>,
    ) -> Result<CsvExport, DomainError> {
        let schema = R::schema();
        let request = ExportRequest::parse(schema, raw, now.date_naive(), &self.settings)?;

        info!(
            resource = schema.resource,
            actor_id = actor_id,
            predicates = request.query.predicates.len(),
            "Starting CSV export"
        );

        ExportJob::new(
            Arc::clone(&self.store),
            Arc::clone(&self.audit),
            request.query,
            actor_id,
            request.filters.to_metadata(schema),
            now,
        )
        .with_batch_size(self.settings.export_batch_size)
        .start()
        .await
    }

    pub async fn get(&self, id: i64) -> Result<R, DomainError> {
        self.store
            .find(id)
            .await?
            .ok_or_else(|| not_found::<R>(id))
    }

    /// Insert a new record stamped with `now` and audit the creation.
    pub async fn create(
        &self,
        record: R,
        actor_id: i64,
        now: DateTime<Utc>,
    ) -> Result<R, DomainError> {
        let schema = R::schema();
        let created = self.store.insert(record.stamped(now)).await?;

        let snapshot = serde_json::to_value(&created).unwrap_or_default();
        self.audit
            .record(audit_helpers::created(
                actor_id,
                schema.resource,
                created.id(),
                snapshot,
                now,
            ))
            .await;

        info!(
            resource = schema.resource,
            id = created.id(),
            actor_id = actor_id,
            "Record created"
        );
        Ok(created)
    }

    /// Delete a record unless other records still reference it.
    pub async fn delete(
        &self,
        id: i64,
        actor_id: i64,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        let schema = R::schema();
        let existing = self.get(id).await?;

        if let Some(dependents) = schema.dependents {
            let count = self.store.count_dependents(id).await?;
            if count > 0 {
                warn!(
                    resource = schema.resource,
                    id = id,
                    dependents = count,
                    "Delete refused: record is still referenced"
                );
                return Err(DomainError::Conflict(format!(
                    "{} {} is referenced by {} {}",
                    schema.label, id, count, dependents.label
                )));
            }
        }

        // A row inserted after the count still blocks the delete at the store.
        match self.store.delete(id).await {
            Ok(true) => {}
            Ok(false) => return Err(not_found::<R>(id)),
            Err(StoreError::Referenced(detail)) => {
                warn!(
                    resource = schema.resource,
                    id = id,
                    detail = %detail,
                    "Delete refused by the store: record is still referenced"
                );
                let by = schema.dependents.map(|d| d.label).unwrap_or("other records");
                return Err(DomainError::Conflict(format!(
                    "{} {} is still referenced by {}",
                    schema.label, id, by
                )));
            }
            Err(e) => return Err(e.into()),
        }

        let snapshot = serde_json::to_value(&existing).unwrap_or_default();
        self.audit
            .record(audit_helpers::deleted(
                actor_id,
                schema.resource,
                id,
                snapshot,
                now,
            ))
            .await;

        info!(
            resource = schema.resource,
            id = id,
            actor_id = actor_id,
            "Record deleted"
        );
        Ok(())
    }

    pub async fn ping(&self) -> Result<(), DomainError> {
        self.store.ping().await.map_err(DomainError::from)
    }
}

fn not_found<R: Record>(id: i64) -> DomainError {
    DomainError::NotFound(format!("{} {} not found", R::schema().label, id))
}
