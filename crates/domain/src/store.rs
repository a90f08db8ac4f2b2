//! Storage seams used by the listing core.
//!
//! `RecordStore` and `AuditRecorder` are implemented by the PostgreSQL
//! repositories in the persistence crate. The in-memory implementations
//! below back unit and router tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::StoreError;
use crate::listing::{FieldValue, QueryDescriptor, Record};
use crate::models::AuditEntry;

/// Read/write access to one resource's records.
#[async_trait]
pub trait RecordStore<R: Record>: Send + Sync {
    /// Number of records matching the query.
    async fn count(&self, query: &QueryDescriptor) -> Result<i64, StoreError>;

    /// Matching records in query order, bounded by `limit` and `offset`.
    async fn fetch(
        &self,
        query: &QueryDescriptor,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<R>, StoreError>;

    async fn find(&self, id: i64) -> Result<Option<R>, StoreError>;

    /// Rows in the schema's dependent relation referencing `id`.
    /// Resources without dependents always report zero.
    async fn count_dependents(&self, id: i64) -> Result<i64, StoreError>;

    /// Persist a new record and return it with its assigned id.
    async fn insert(&self, record: R) -> Result<R, StoreError>;

    /// Returns `false` when no row had the id.
    async fn delete(&self, id: i64) -> Result<bool, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}

/// Sink for audit entries.
///
/// Recording never fails the caller; implementations log their own errors.
#[async_trait]
pub trait AuditRecorder: Send + Sync {
    async fn record(&self, entry: AuditEntry);
}

type DependentCounter = Arc<dyn Fn(i64) -> i64 + Send + Sync>;

/// Mutex-guarded vector store.
pub struct InMemoryRecordStore<R> {
    records: Arc<Mutex<Vec<R>>>,
    next_id: Arc<AtomicI64>,
    unavailable: Arc<AtomicBool>,
    fail_after_fetches: Arc<Mutex<Option<usize>>>,
    dependents: Option<DependentCounter>,
}

impl<R> Clone for InMemoryRecordStore<R> {
    fn clone(&self) -> Self {
        Self {
            records: Arc::clone(&self.records),
            next_id: Arc::clone(&self.next_id),
            unavailable: Arc::clone(&self.unavailable),
            fail_after_fetches: Arc::clone(&self.fail_after_fetches),
            dependents: self.dependents.clone(),
        }
    }
}

impl<R: Record> Default for InMemoryRecordStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Record> InMemoryRecordStore<R> {
    pub fn new() -> Self {
        Self {
            records: Arc::new(Mutex::new(Vec::new())),
            next_id: Arc::new(AtomicI64::new(1)),
            unavailable: Arc::new(AtomicBool::new(false)),
            fail_after_fetches: Arc::new(Mutex::new(None)),
            dependents: None,
        }
    }

    /// Store seeded with records that already carry their ids.
    pub fn with_records(records: Vec<R>) -> Self {
        let store = Self::new();
        let max_id = records.iter().map(Record::id).max().unwrap_or(0);
        store.next_id.store(max_id + 1, Ordering::SeqCst);
        *store.lock() = records;
        store
    }

    /// Count dependents by scanning `children` for rows whose dependent
    /// column equals the parent id.
    pub fn with_dependents<C: Record>(mut self, children: &InMemoryRecordStore<C>) -> Self {
        let column = R::schema().dependents.map(|d| d.column);
        let rows = Arc::clone(&children.records);
        self.dependents = column.map(|column| {
            let counter: DependentCounter = Arc::new(move |id| {
                rows.lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .iter()
                    .filter(|child| child.field(column) == FieldValue::Int(id))
                    .count() as i64
            });
            counter
        });
        self
    }

    /// Toggle a simulated outage: every call fails with `Unavailable`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Let `n` more fetches succeed, then fail every later one.
    pub fn fail_after_fetches(&self, n: usize) {
        *self
            .fail_after_fetches
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(n);
    }

    pub fn snapshot(&self) -> Vec<R> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<R>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("in-memory store offline".to_string()));
        }
        Ok(())
    }

    fn check_fetch_budget(&self) -> Result<(), StoreError> {
        let mut budget = self
            .fail_after_fetches
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        match budget.as_mut() {
            Some(0) => Err(StoreError::Unavailable(
                "in-memory store went away mid-read".to_string(),
            )),
            Some(remaining) => {
                *remaining -= 1;
                Ok(())
            }
            None => Ok(()),
        }
    }

    fn matching(&self, query: &QueryDescriptor) -> Vec<R> {
        let mut rows: Vec<R> = self
            .lock()
            .iter()
            .filter(|r| query.matches(*r))
            .cloned()
            .collect();
        rows.sort_by(|a, b| query.compare(a, b));
        rows
    }
}

#[async_trait]
impl<R: Record> RecordStore<R> for InMemoryRecordStore<R> {
    async fn count(&self, query: &QueryDescriptor) -> Result<i64, StoreError> {
        self.check_available()?;
        let records = self.lock();
        Ok(records.iter().filter(|r| query.matches(*r)).count() as i64)
    }

    async fn fetch(
        &self,
        query: &QueryDescriptor,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<R>, StoreError> {
        self.check_available()?;
        self.check_fetch_budget()?;
        Ok(self
            .matching(query)
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn find(&self, id: i64) -> Result<Option<R>, StoreError> {
        self.check_available()?;
        Ok(self.lock().iter().find(|r| r.id() == id).cloned())
    }

    async fn count_dependents(&self, id: i64) -> Result<i64, StoreError> {
        self.check_available()?;
        Ok(self.dependents.as_ref().map(|count| count(id)).unwrap_or(0))
    }

    async fn insert(&self, record: R) -> Result<R, StoreError> {
        self.check_available()?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let record = record.with_id(id);
        self.lock().push(record.clone());
        Ok(record)
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        self.check_available()?;
        let referenced = self.dependents.as_ref().map(|count| count(id)).unwrap_or(0);
        if referenced > 0 {
            return Err(StoreError::Referenced(format!(
                "{} rows reference {} {}",
                referenced,
                R::schema().table,
                id
            )));
        }
        let mut records = self.lock();
        let before = records.len();
        records.retain(|r| r.id() != id);
        Ok(records.len() != before)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.check_available()
    }
}

/// Audit recorder that keeps entries in memory.
#[derive(Clone, Default)]
pub struct InMemoryAuditLog {
    entries: Arc<Mutex<Vec<AuditEntry>>>,
}

impl InMemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<AuditEntry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Entries grouped by resource name.
    pub fn by_resource(&self) -> HashMap<String, Vec<AuditEntry>> {
        let mut grouped: HashMap<String, Vec<AuditEntry>> = HashMap::new();
        for entry in self.entries() {
            grouped.entry(entry.resource.clone()).or_default().push(entry);
        }
        grouped
    }
}

#[async_trait]
impl AuditRecorder for InMemoryAuditLog {
    async fn record(&self, entry: AuditEntry) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry);
    }
}
