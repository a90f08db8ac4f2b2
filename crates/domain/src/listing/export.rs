//! Streaming CSV export.
//!
//! Rows are fetched in fixed-size batches and encoded one batch per body
//! chunk, so memory stays bounded by the batch size. The first batch is
//! read before the stream is handed out: an unreachable store fails the
//! request while it can still return an error status.

use chrono::{DateTime, Utc};
use futures::stream::{self, BoxStream, StreamExt};
use serde_json::Value as JsonValue;
use shared::export::{export_filename, ChunkWriter, CSV_CONTENT_TYPE};
use std::sync::Arc;
use tracing::{error, info};

use super::query::QueryDescriptor;
use super::schema::Record;
use crate::error::DomainError;
use crate::services::audit::audit_helpers;
use crate::store::{AuditRecorder, RecordStore};

/// Batch size used when none is configured.
pub const DEFAULT_EXPORT_BATCH_SIZE: i64 = 500;

/// A ready-to-send CSV download.
pub struct CsvExport {
    pub filename: String,
    pub content_type: &'static str,
    pub body: BoxStream<'static, Result<Vec<u8>, DomainError>>,
}

impl std::fmt::Debug for CsvExport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CsvExport")
            .field("filename", &self.filename)
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}

/// One unpaginated export of a filtered listing.
pub struct ExportJob<R: Record> {
    store: Arc<dyn RecordStore<R>>,
    audit: Arc<dyn AuditRecorder>,
    query: QueryDescriptor,
    batch_size: i64,
    actor_id: i64,
    filters: JsonValue,
    now: DateTime<Utc>,
}

impl<R: Record> ExportJob<R> {
    pub fn new(
        store: Arc<dyn RecordStore<R>>,
        audit: Arc<dyn AuditRecorder>,
        query: QueryDescriptor,
        actor_id: i64,
        filters: JsonValue,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            store,
            audit,
            query,
            batch_size: DEFAULT_EXPORT_BATCH_SIZE,
            actor_id,
            filters,
            now,
        }
    }

    pub fn with_batch_size(mut self, batch_size: i64) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Fetch the first batch and return the streaming body.
    pub async fn start(self) -> Result<CsvExport, DomainError> {
        let first = self.store.fetch(&self.query, self.batch_size, 0).await?;
        let filename = export_filename(R::schema().resource, self.now);

        let state = ExportState {
            job: self,
            pending: Some(first),
            offset: 0,
            rows: 0,
            header_sent: false,
            exhausted: false,
            finished: false,
        };

        let body = stream::unfold(state, |mut state| async move {
            state.next_chunk().await.map(|chunk| (chunk, state))
        })
        .boxed();

        Ok(CsvExport {
            filename,
            content_type: CSV_CONTENT_TYPE,
            body,
        })
    }
}

struct ExportState<R: Record> {
    job: ExportJob<R>,
    pending: Option<Vec<R>>,
    offset: i64,
    rows: u64,
    header_sent: bool,
    exhausted: bool,
    finished: bool,
}

impl<R: Record> ExportState<R> {
    async fn next_chunk(&mut self) -> Option<Result<Vec<u8>, DomainError>> {
        if self.finished {
            return None;
        }

        let batch = match self.pending.take() {
            Some(batch) => batch,
            None if self.exhausted => {
                self.finish().await;
                return None;
            }
            None => match self
                .job
                .store
                .fetch(&self.job.query, self.job.batch_size, self.offset)
                .await
            {
                Ok(batch) => batch,
                Err(e) => {
                    self.finished = true;
                    error!(
                        resource = R::schema().resource,
                        rows_written = self.rows,
                        error = %e,
                        "CSV export aborted by store failure"
                    );
                    return Some(Err(e.into()));
                }
            },
        };

        if batch.is_empty() && self.header_sent {
            self.finish().await;
            return None;
        }

        self.exhausted = (batch.len() as i64) < self.job.batch_size;
        self.offset += batch.len() as i64;

        match self.encode(&batch) {
            Ok(chunk) => {
                self.rows += batch.len() as u64;
                Some(Ok(chunk))
            }
            Err(e) => {
                self.finished = true;
                error!(
                    resource = R::schema().resource,
                    error = %e,
                    "CSV export aborted by encoding failure"
                );
                Some(Err(e))
            }
        }
    }

    fn encode(&mut self, batch: &[R]) -> Result<Vec<u8>, DomainError> {
        let columns = R::columns();
        let mut writer = ChunkWriter::new();

        if !self.header_sent {
            writer.write_row(columns.iter().map(|c| c.header))?;
            self.header_sent = true;
        }

        for record in batch {
            writer.write_row(columns.iter().map(|c| (c.value)(record)))?;
        }

        Ok(writer.into_bytes()?)
    }

    async fn finish(&mut self) {
        self.finished = true;
        let resource = R::schema().resource;

        let entry = audit_helpers::exported(
            self.job.actor_id,
            resource,
            self.job.filters.clone(),
            self.rows,
            self.job.now,
        );
        self.job.audit.record(entry).await;

        metrics::counter!("csv_export_rows_total", "resource" => resource).increment(self.rows);
        info!(
            resource = resource,
            actor_id = self.job.actor_id,
            rows = self.rows,
            "CSV export completed"
        );
    }
}
