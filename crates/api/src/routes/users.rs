//! User write endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use domain::models::{CreateUserRequest, User};
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::Actor;

/// Create a user in an existing city.
///
/// POST /api/admin/v1/users
pub async fn create_user(
    State(state): State<AppState>,
    actor: Actor,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    request.validate()?;

    // Unknown city is a 404 naming the city.
    state.cities.get(request.city_id).await?;

    let user = state
        .users
        .create(request.into_user(), actor.id, Utc::now())
        .await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Delete a user with no activity logs.
///
/// DELETE /api/admin/v1/users/:id
pub async fn delete_user(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.users.delete(id, actor.id, Utc::now()).await?;
    Ok(StatusCode::NO_CONTENT)
}
