//! Health check endpoint handlers.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::time::Instant;

use crate::app::AppState;

/// Health check response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub database: DatabaseHealth,
}

/// Database health status.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct DatabaseHealth {
    pub connected: bool,
    pub latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pool: Option<PoolHealth>,
}

/// Connection pool occupancy at the time of the check.
#[derive(Debug, Serialize)]
pub struct PoolHealth {
    pub total: u32,
    pub idle: u32,
    pub active: u32,
}

impl From<persistence::metrics::PoolStats> for PoolHealth {
    fn from(stats: persistence::metrics::PoolStats) -> Self {
        Self {
            total: stats.total,
            idle: stats.idle,
            active: stats.active,
        }
    }
}

/// Simple status response for liveness/readiness probes.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
}

/// True when every resource store answers a ping.
async fn stores_reachable(state: &AppState) -> bool {
    let (cities, users, activity_logs) = futures::join!(
        state.cities.ping(),
        state.users.ping(),
        state.activity_logs.ping()
    );
    cities.is_ok() && users.is_ok() && activity_logs.is_ok()
}

/// Full health check endpoint.
///
/// Pings the stores and samples pool gauges when backed by PostgreSQL.
pub async fn health_check(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, StatusCode> {
    let start = Instant::now();
    let connected = stores_reachable(&state).await;
    let latency_ms = start.elapsed().as_millis() as u64;

    let pool = state
        .pool
        .as_ref()
        .map(|pool| PoolHealth::from(persistence::metrics::record_pool_metrics(pool)));

    if !connected {
        tracing::warn!("Health check failed: store unreachable");
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    }

    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: DatabaseHealth {
            connected,
            latency_ms: Some(latency_ms),
            pool,
        },
    }))
}

/// Liveness probe endpoint.
///
/// Returns 200 OK if the process is running.
pub async fn live() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "alive".to_string(),
    })
}

/// Readiness probe endpoint.
///
/// Returns 200 OK if the service can accept traffic.
pub async fn ready(State(state): State<AppState>) -> Result<Json<StatusResponse>, StatusCode> {
    if stores_reachable(&state).await {
        Ok(Json(StatusResponse {
            status: "ready".to_string(),
        }))
    } else {
        Err(StatusCode::SERVICE_UNAVAILABLE)
    }
}
