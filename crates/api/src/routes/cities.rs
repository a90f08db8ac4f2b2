//! City write endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use domain::models::{City, CreateCityRequest};
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::Actor;

/// Create a city.
///
/// POST /api/admin/v1/cities
pub async fn create_city(
    State(state): State<AppState>,
    actor: Actor,
    Json(request): Json<CreateCityRequest>,
) -> Result<(StatusCode, Json<City>), ApiError> {
    request.validate()?;

    let city = state
        .cities
        .create(request.into_city(), actor.id, Utc::now())
        .await?;
    Ok((StatusCode::CREATED, Json(city)))
}

/// Delete a city that no user references.
///
/// DELETE /api/admin/v1/cities/:id
pub async fn delete_city(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.cities.delete(id, actor.id, Utc::now()).await?;
    Ok(StatusCode::NO_CONTENT)
}
