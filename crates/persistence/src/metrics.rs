//! Store metrics.
//!
//! Every query issued by the PostgreSQL stores is timed per table and
//! operation. Pool occupancy is sampled on demand by the health endpoint.

use metrics::{counter, gauge, histogram};
use sqlx::PgPool;
use std::time::Instant;

pub const QUERY_DURATION: &str = "database_query_duration_seconds";
pub const QUERY_ERRORS: &str = "database_query_errors_total";
pub const POOL_CONNECTIONS: &str = "database_pool_connections";

/// Times one store query and records it under `table` / `operation`.
///
/// ```ignore
/// let timer = QueryTimer::start("cities", "fetch");
/// let result = builder.build_query_as::<CityEntity>().fetch_all(&pool).await;
/// timer.finish(&result);
/// ```
#[derive(Debug)]
pub struct QueryTimer {
    table: &'static str,
    operation: &'static str,
    start: Instant,
}

impl QueryTimer {
    pub fn start(table: &'static str, operation: &'static str) -> Self {
        Self {
            table,
            operation,
            start: Instant::now(),
        }
    }

    /// Record the elapsed time, tagged with the query outcome.
    pub fn finish<T, E>(self, result: &Result<T, E>) {
        let outcome = outcome(result);
        histogram!(
            QUERY_DURATION,
            "table" => self.table,
            "operation" => self.operation,
            "outcome" => outcome
        )
        .record(self.start.elapsed().as_secs_f64());

        if result.is_err() {
            counter!(QUERY_ERRORS, "table" => self.table, "operation" => self.operation)
                .increment(1);
        }
    }
}

fn outcome<T, E>(result: &Result<T, E>) -> &'static str {
    if result.is_ok() {
        "ok"
    } else {
        "error"
    }
}

/// Connection counts for one pool sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    pub total: u32,
    pub idle: u32,
    pub active: u32,
}

impl PoolStats {
    pub fn new(total: u32, idle: u32) -> Self {
        Self {
            total,
            idle,
            active: total.saturating_sub(idle),
        }
    }
}

/// Sample the pool, publish `database_pool_connections{state}` and return
/// the counts.
pub fn record_pool_metrics(pool: &PgPool) -> PoolStats {
    let stats = PoolStats::new(pool.size(), pool.num_idle() as u32);

    gauge!(POOL_CONNECTIONS, "state" => "active").set(f64::from(stats.active));
    gauge!(POOL_CONNECTIONS, "state" => "idle").set(f64::from(stats.idle));
    gauge!(POOL_CONNECTIONS, "state" => "total").set(f64::from(stats.total));
    stats
}
