//! Back-office domain models.

pub mod activity_log;
pub mod audit;
pub mod city;
pub mod user;

pub use activity_log::{ActivityLog, ActivityStatus, ACTIVITY_LOG_SCHEMA};
pub use audit::{AuditAction, AuditEntry};
pub use city::{City, CityStatus, CreateCityRequest, CITY_SCHEMA};
pub use user::{CreateUserRequest, User, UserStatus, USER_SCHEMA};

use chrono::{DateTime, Utc};

/// Timestamp layout used in CSV cells.
pub const CSV_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub(crate) fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.format(CSV_TIMESTAMP_FORMAT).to_string()
}
