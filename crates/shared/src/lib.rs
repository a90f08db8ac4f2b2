//! Shared utilities and common types for the backoffice backend.
//!
//! This crate provides functionality used across all other crates:
//! - Offset pagination arithmetic
//! - CSV row encoding and export filenames
//! - Parsing helpers for raw query-string values

pub mod export;
pub mod pagination;
pub mod validation;
