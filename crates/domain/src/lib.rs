//! Domain layer for the back-office listing service.
//!
//! This crate contains:
//! - Resource models (City, User, ActivityLog) and audit entries
//! - The listing core: filters, query descriptors, paging, CSV export
//! - Storage seams and their in-memory implementations
//! - Domain services and error types

pub mod error;
pub mod listing;
pub mod models;
pub mod services;
pub mod store;

pub use error::{DomainError, FieldError, StoreError};
