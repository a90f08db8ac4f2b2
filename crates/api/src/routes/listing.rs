//! Read endpoints shared by every admin resource.
//!
//! Handlers are generic over the record type; each resource picks its
//! service out of `AppState` through `AdminResource`.

use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use domain::listing::{Page, Record};
use domain::models::{ActivityLog, City, User};
use domain::services::ListingService;
use std::collections::HashMap;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::Actor;

/// A record type exposed under `/api/admin/v1/{resource}`.
pub trait AdminResource: Record {
    fn service(state: &AppState) -> &ListingService<Self>;
}

impl AdminResource for City {
    fn service(state: &AppState) -> &ListingService<Self> {
        &state.cities
    }
}

impl AdminResource for User {
    fn service(state: &AppState) -> &ListingService<Self> {
        &state.users
    }
}

impl AdminResource for ActivityLog {
    fn service(state: &AppState) -> &ListingService<Self> {
        &state.activity_logs
    }
}

/// List one page of records.
///
/// GET /api/admin/v1/{resource}
pub async fn list<R: AdminResource>(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Page<R>>, ApiError> {
    let page = R::service(&state)
        .list_page(&params, Utc::now().date_naive())
        .await?;
    Ok(Json(page))
}

/// Stream every matching record as CSV.
///
/// GET /api/admin/v1/{resource}/export
///
/// Invalid filters and an unreachable store are reported as regular JSON
/// errors. Once the first byte is sent, a store failure ends the body early.
pub async fn export<R: AdminResource>(
    State(state): State<AppState>,
    actor: Actor,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Response, ApiError> {
    let export = R::service(&state)
        .stream_export(&params, actor.id, Utc::now())
        .await?;

    let disposition = format!("attachment; filename=\"{}\"", export.filename);
    Ok((
        [
            (header::CONTENT_TYPE, export.content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        Body::from_stream(export.body),
    )
        .into_response())
}

/// Fetch one record.
///
/// GET /api/admin/v1/{resource}/:id
pub async fn show<R: AdminResource>(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<R>, ApiError> {
    let record = R::service(&state).get(id).await?;
    Ok(Json(record))
}
