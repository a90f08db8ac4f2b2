//! Repository implementations.

pub mod activity_log;
pub mod audit_entry;
pub mod city;
pub mod record_store;
pub mod user;

pub use activity_log::ActivityLogRepository;
pub use audit_entry::AuditEntryRepository;
pub use city::CityRepository;
pub use record_store::{store_error, PgRecordStore, PgTable};
pub use user::UserRepository;
