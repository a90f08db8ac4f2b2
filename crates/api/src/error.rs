use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain::{DomainError, FieldError, StoreError};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        details: Vec<ValidationDetail>,
    },

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Vec<ValidationDetail>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationDetail {
    pub field: String,
    pub message: String,
}

impl From<FieldError> for ValidationDetail {
    fn from(err: FieldError) -> Self {
        Self {
            field: err.field,
            message: err.message,
        }
    }
}

impl ApiError {
    /// Validation failure with one entry per offending field.
    pub fn validation(details: Vec<ValidationDetail>) -> Self {
        let message = if details.len() == 1 {
            details[0].message.clone()
        } else {
            format!("{} validation errors", details.len())
        };
        ApiError::Validation { message, details }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = match self {
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg, None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg, None),
            ApiError::Validation { message, details } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_error",
                message,
                Some(details),
            ),
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".into(),
                    None,
                )
            }
            ApiError::ServiceUnavailable(msg) => {
                tracing::error!("Service unavailable: {}", msg);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "service_unavailable",
                    "The data store is temporarily unavailable".into(),
                    None,
                )
            }
        };

        let body = ErrorBody {
            error: error_code.into(),
            message,
            details,
        };

        (status, Json(body)).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(msg) => ApiError::ServiceUnavailable(msg),
            StoreError::Duplicate(_) => ApiError::Conflict("Resource already exists".into()),
            StoreError::MissingReference(_) => {
                ApiError::NotFound("Referenced resource not found".into())
            }
            StoreError::Referenced(_) => {
                ApiError::Conflict("Resource is still referenced".into())
            }
            StoreError::Query(msg) => ApiError::Internal(format!("Database error: {}", msg)),
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(details) => {
                ApiError::validation(details.into_iter().map(ValidationDetail::from).collect())
            }
            DomainError::NotFound(msg) => ApiError::NotFound(msg),
            DomainError::Conflict(msg) => ApiError::Conflict(msg),
            DomainError::Store(err) => err.into(),
            DomainError::Export(err) => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        DomainError::from(errors).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::Value;

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_api_error_unauthorized() {
        let response = ApiError::Unauthorized("missing actor".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_api_error_conflict() {
        let response = ApiError::Conflict("still referenced".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_validation_response_lists_fields() {
        let err: ApiError = DomainError::Validation(vec![
            FieldError::new("status", "'x' must be one of: active, inactive"),
            FieldError::new("sort", "'y' must be one of: id, name"),
        ])
        .into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = body_json(response).await;
        assert_eq!(body["error"], "validation_error");
        assert_eq!(body["message"], "2 validation errors");
        assert_eq!(body["details"][0]["field"], "status");
        assert_eq!(body["details"][1]["field"], "sort");
    }

    #[tokio::test]
    async fn test_internal_error_hides_message() {
        let err: ApiError = DomainError::Store(StoreError::Query("syntax error".into())).into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["message"], "An internal error occurred");
        assert!(body.get("details").is_none());
    }

    #[test]
    fn test_unavailable_store_maps_to_503() {
        let err: ApiError = StoreError::Unavailable("pool timed out".into()).into();
        assert_eq!(
            err.into_response().status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_store_constraint_errors() {
        let duplicate: ApiError = StoreError::Duplicate("users_email_key".into()).into();
        assert!(matches!(duplicate, ApiError::Conflict(_)));

        let missing: ApiError = StoreError::MissingReference("users_city_id_fkey".into()).into();
        assert!(matches!(missing, ApiError::NotFound(_)));

        let referenced: ApiError = StoreError::Referenced("users_city_id_fkey".into()).into();
        assert_eq!(referenced.into_response().status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_api_error_display() {
        assert_eq!(
            ApiError::NotFound("City 3 not found".to_string()).to_string(),
            "Not found: City 3 not found"
        );
        assert_eq!(
            ApiError::validation(vec![ValidationDetail {
                field: "name".into(),
                message: "Name is required".into(),
            }])
            .to_string(),
            "Validation error: Name is required"
        );
    }
}
