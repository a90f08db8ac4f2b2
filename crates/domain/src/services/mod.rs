//! Domain services.
//!
//! Services contain the business rules that sit between route handlers and
//! the storage seams.

pub mod audit;
pub mod listing;

pub use audit::{audit_helpers, AuditEntryBuilder};
pub use listing::ListingService;
