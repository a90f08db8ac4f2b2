//! HTTP route handlers.

pub mod cities;
pub mod health;
pub mod listing;
pub mod users;
