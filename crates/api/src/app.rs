use axum::{middleware, routing::get, Router};
use domain::models::{ActivityLog, City, User};
use domain::services::ListingService;
use domain::store::{AuditRecorder, RecordStore};
use persistence::repositories::{
    ActivityLogRepository, AuditEntryRepository, CityRepository, UserRepository,
};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{metrics_handler, metrics_middleware, trace_id};
use crate::routes::{cities, health, listing, users};

/// Storage backends for every resource.
#[derive(Clone)]
pub struct Stores {
    pub cities: Arc<dyn RecordStore<City>>,
    pub users: Arc<dyn RecordStore<User>>,
    pub activity_logs: Arc<dyn RecordStore<ActivityLog>>,
    pub audit: Arc<dyn AuditRecorder>,
    /// Present when the stores share a PostgreSQL pool.
    pub pool: Option<PgPool>,
}

impl Stores {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            cities: Arc::new(CityRepository::new(pool.clone())),
            users: Arc::new(UserRepository::new(pool.clone())),
            activity_logs: Arc::new(ActivityLogRepository::new(pool.clone())),
            audit: Arc::new(AuditEntryRepository::new(pool.clone())),
            pool: Some(pool),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub pool: Option<PgPool>,
    pub cities: ListingService<City>,
    pub users: ListingService<User>,
    pub activity_logs: ListingService<ActivityLog>,
}

impl AppState {
    pub fn new(config: Arc<Config>, stores: Stores) -> Self {
        let settings = config.listing.settings();
        Self {
            cities: ListingService::new(stores.cities, Arc::clone(&stores.audit), settings),
            users: ListingService::new(stores.users, Arc::clone(&stores.audit), settings),
            activity_logs: ListingService::new(stores.activity_logs, stores.audit, settings),
            pool: stores.pool,
            config,
        }
    }
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.security.cors_origins.is_empty() {
        // Default: allow any origin (for development)
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<_> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

pub fn create_app(config: Config, stores: Stores) -> Router {
    let config = Arc::new(config);
    let state = AppState::new(Arc::clone(&config), stores);

    // Admin listing routes. `/export` is matched before `/:id`.
    let admin_routes = Router::new()
        .route(
            "/api/admin/v1/cities",
            get(listing::list::<City>).post(cities::create_city),
        )
        .route("/api/admin/v1/cities/export", get(listing::export::<City>))
        .route(
            "/api/admin/v1/cities/:id",
            get(listing::show::<City>).delete(cities::delete_city),
        )
        .route(
            "/api/admin/v1/users",
            get(listing::list::<User>).post(users::create_user),
        )
        .route("/api/admin/v1/users/export", get(listing::export::<User>))
        .route(
            "/api/admin/v1/users/:id",
            get(listing::show::<User>).delete(users::delete_user),
        )
        .route(
            "/api/admin/v1/activity_logs",
            get(listing::list::<ActivityLog>),
        )
        .route(
            "/api/admin/v1/activity_logs/export",
            get(listing::export::<ActivityLog>),
        )
        .route(
            "/api/admin/v1/activity_logs/:id",
            get(listing::show::<ActivityLog>),
        );

    // Public routes (no actor required)
    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    Router::new()
        .merge(public_routes)
        .merge(admin_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors_layer(&config))
        .with_state(state)
}
