//! Acting admin extractor.
//!
//! Authentication happens upstream; this service only needs the id of the
//! admin performing the request so that writes and exports can be audited.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::error::ApiError;

/// Header carrying the acting admin's id.
pub const ACTOR_ID_HEADER: &str = "X-Actor-Id";

/// The admin performing the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: i64,
}

impl Actor {
    /// Parses a header value into an actor. Only positive integers are accepted.
    pub fn parse(value: &str) -> Result<Self, ApiError> {
        match value.trim().parse::<i64>() {
            Ok(id) if id > 0 => Ok(Actor { id }),
            _ => Err(ApiError::Unauthorized("Invalid actor id".to_string())),
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(ACTOR_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("Missing X-Actor-Id header".to_string()))?;

        Actor::parse(value)
    }
}
