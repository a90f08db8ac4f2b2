//! Database row mappings.

pub mod activity_log;
pub mod audit_entry;
pub mod city;
pub mod user;

pub use activity_log::ActivityLogEntity;
pub use audit_entry::AuditEntryEntity;
pub use city::CityEntity;
pub use user::UserEntity;
