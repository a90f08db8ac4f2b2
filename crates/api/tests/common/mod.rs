//! Common test utilities for integration tests.
//!
//! The router runs against the in-memory stores from the domain crate, so
//! these tests need no database.

// Not every test binary uses every helper.
#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request},
    Router,
};
use backoffice_api::{
    app::{create_app, Stores},
    config::{
        Config, DatabaseConfig, ListingConfig, LoggingConfig, SecurityConfig, ServerConfig,
    },
    extractors::ACTOR_ID_HEADER,
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use domain::models::{
    ActivityLog, ActivityStatus, City, CityStatus, User, UserStatus,
};
use domain::store::{InMemoryAuditLog, InMemoryRecordStore};
use std::sync::Arc;

/// Actor id sent by the request helpers.
pub const TEST_ACTOR: i64 = 7;

/// Create a test configuration.
pub fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
            request_timeout_secs: 30,
        },
        database: DatabaseConfig {
            url: "postgres://unused".to_string(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout_secs: 5,
            idle_timeout_secs: 60,
        },
        logging: LoggingConfig {
            level: "debug".to_string(),
            format: "pretty".to_string(),
        },
        listing: ListingConfig::default(),
        security: SecurityConfig::default(),
    }
}

/// In-memory backing stores plus the audit log they write to.
pub struct TestBackend {
    pub cities: InMemoryRecordStore<City>,
    pub users: InMemoryRecordStore<User>,
    pub activity_logs: InMemoryRecordStore<ActivityLog>,
    pub audit: InMemoryAuditLog,
}

impl TestBackend {
    /// Seed the stores. Cities count users as dependents and users count
    /// activity logs.
    pub fn new(cities: Vec<City>, users: Vec<User>, activity_logs: Vec<ActivityLog>) -> Self {
        let activity_logs = InMemoryRecordStore::with_records(activity_logs);
        let users = InMemoryRecordStore::with_records(users).with_dependents(&activity_logs);
        let cities = InMemoryRecordStore::with_records(cities).with_dependents(&users);
        Self {
            cities,
            users,
            activity_logs,
            audit: InMemoryAuditLog::new(),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new(), Vec::new(), Vec::new())
    }

    pub fn stores(&self) -> Stores {
        Stores {
            cities: Arc::new(self.cities.clone()),
            users: Arc::new(self.users.clone()),
            activity_logs: Arc::new(self.activity_logs.clone()),
            audit: Arc::new(self.audit.clone()),
            pool: None,
        }
    }

    pub fn app(&self) -> Router {
        self.app_with_config(test_config())
    }

    pub fn app_with_config(&self, config: Config) -> Router {
        create_app(config, self.stores())
    }
}

/// Fixed point in time used for seeded `created_at` values.
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap()
}

pub fn city(id: i64, name: &str, status: CityStatus) -> City {
    City {
        id,
        country_id: 1,
        name: name.to_string(),
        status,
        created_at: base_time() + Duration::days(id),
    }
}

pub fn user(id: i64, city_id: i64, name: &str) -> User {
    User {
        id,
        city_id,
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
        status: UserStatus::Active,
        created_at: base_time() + Duration::days(id),
    }
}

/// Activity log created `days_ago` days before the current time.
pub fn activity_log(id: i64, user_id: i64, action: &str, days_ago: i64) -> ActivityLog {
    ActivityLog {
        id,
        user_id,
        action: action.to_string(),
        description: None,
        status: ActivityStatus::Success,
        ip_address: Some("192.0.2.1".to_string()),
        created_at: Utc::now() - Duration::days(days_ago),
    }
}

/// The three cities used by most listing tests.
pub fn sample_cities() -> Vec<City> {
    vec![
        city(1, "B", CityStatus::Active),
        city(2, "A", CityStatus::Active),
        city(3, "C", CityStatus::Inactive),
    ]
}

/// Build a GET request carrying the test actor.
pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .header(ACTOR_ID_HEADER, TEST_ACTOR.to_string())
        .body(Body::empty())
        .unwrap()
}

/// Build a GET request without an actor header.
pub fn anonymous_get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Build a JSON request carrying the test actor.
pub fn json_request(method: Method, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(ACTOR_ID_HEADER, TEST_ACTOR.to_string())
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

/// Build a DELETE request carrying the test actor.
pub fn delete_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .header(ACTOR_ID_HEADER, TEST_ACTOR.to_string())
        .body(Body::empty())
        .unwrap()
}

/// Helper to parse JSON response body.
pub async fn parse_response_body(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null)
}

/// Read a CSV response into its header and data rows.
pub async fn parse_csv_body(response: axum::response::Response) -> (Vec<String>, Vec<Vec<String>>) {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let mut reader = csv::Reader::from_reader(body.as_ref());
    let headers = reader
        .headers()
        .unwrap()
        .iter()
        .map(str::to_string)
        .collect();
    let rows = reader
        .records()
        .map(|r| r.unwrap().iter().map(str::to_string).collect())
        .collect();
    (headers, rows)
}

/// Ids from a listing response's `data` array, in order.
pub fn ids(body: &serde_json::Value) -> Vec<i64> {
    body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_i64().unwrap())
        .collect()
}
