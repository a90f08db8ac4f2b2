//! Domain error types.

use serde::Serialize;
use shared::export::CsvError;
use thiserror::Error;

/// A validation failure attached to a single input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Build from a `validator` error, falling back to its code.
    pub fn from_validation(field: impl Into<String>, err: validator::ValidationError) -> Self {
        let message = err
            .message
            .map(|m| m.to_string())
            .unwrap_or_else(|| err.code.to_string());
        Self::new(field, message)
    }
}

/// Failures reported by a backing store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be reached (pool exhausted, connection closed, I/O).
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// A row referenced by the write does not exist.
    #[error("Referenced record not found: {0}")]
    MissingReference(String),

    /// A delete was refused because other rows still reference the record.
    #[error("Record still referenced: {0}")]
    Referenced(String),

    /// A unique constraint rejected the write.
    #[error("Duplicate record: {0}")]
    Duplicate(String),

    #[error("Query failed: {0}")]
    Query(String),
}

/// Errors surfaced by listing, export and write operations.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Validation failed: {}", summarize(.0))]
    Validation(Vec<FieldError>),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Export(#[from] CsvError),
}

impl From<Vec<FieldError>> for DomainError {
    fn from(errors: Vec<FieldError>) -> Self {
        DomainError::Validation(errors)
    }
}

impl From<validator::ValidationErrors> for DomainError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut details: Vec<FieldError> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors
                    .iter()
                    .map(move |e| FieldError::from_validation(field.to_string(), e.clone()))
            })
            .collect();
        details.sort_by(|a, b| a.field.cmp(&b.field));
        DomainError::Validation(details)
    }
}

fn summarize(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}
