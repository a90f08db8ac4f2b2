//! Persistence layer for the back-office service.
//!
//! This crate contains:
//! - Database connection management
//! - Entity definitions (database row mappings)
//! - PostgreSQL implementations of the domain storage seams
//! - Query metrics

pub mod db;
pub mod entities;
pub mod metrics;
pub mod repositories;
