//! Integration tests for the paginated listing endpoints.
//!
//! Tests cover:
//! - GET /api/admin/v1/{resource} (filters, sort, paging, validation)
//! - GET /api/admin/v1/{resource}/:id
//! - Health probes

mod common;

use axum::http::StatusCode;
use common::{
    activity_log, anonymous_get_request, get_request, ids, parse_response_body,
    sample_cities, user, TestBackend,
};
use tower::ServiceExt;

// =============================================================================
// Filtering, sorting and paging
// =============================================================================

#[tokio::test]
async fn test_list_filters_sorts_and_pages() {
    let backend = TestBackend::new(sample_cities(), vec![], vec![]);
    let app = backend.app();

    let request = get_request(
        "/api/admin/v1/cities?status=active&sort=name&direction=asc&per_page=2&page=1",
    );
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    assert_eq!(ids(&body), vec![2, 1]);
    assert_eq!(body["pagination"]["total"], 2);
    assert_eq!(body["pagination"]["page"], 1);
    assert_eq!(body["pagination"]["per_page"], 2);
    assert_eq!(body["pagination"]["total_pages"], 1);
}

#[tokio::test]
async fn test_list_without_filters_uses_default_sort() {
    let backend = TestBackend::new(sample_cities(), vec![], vec![]);
    let response = backend
        .app()
        .oneshot(anonymous_get_request("/api/admin/v1/cities"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    // Cities default to name ascending.
    assert_eq!(ids(&body), vec![2, 1, 3]);
    assert_eq!(body["pagination"]["per_page"], 25);
}

#[tokio::test]
async fn test_list_sort_descending_by_id() {
    let backend = TestBackend::new(sample_cities(), vec![], vec![]);
    let response = backend
        .app()
        .oneshot(get_request("/api/admin/v1/cities?sort=id&direction=desc"))
        .await
        .unwrap();

    let body = parse_response_body(response).await;
    assert_eq!(ids(&body), vec![3, 2, 1]);
}

#[tokio::test]
async fn test_list_date_range_is_inclusive() {
    // Seeded cities are created on 2024-01-16, 2024-01-17 and 2024-01-18.
    let backend = TestBackend::new(sample_cities(), vec![], vec![]);
    let app = backend.app();

    let response = app
        .clone()
        .oneshot(get_request(
            "/api/admin/v1/cities?start_date=2024-01-17&end_date=2024-01-17",
        ))
        .await
        .unwrap();
    assert_eq!(ids(&parse_response_body(response).await), vec![2]);

    let response = app
        .clone()
        .oneshot(get_request("/api/admin/v1/cities?start_date=2024-01-17&sort=id"))
        .await
        .unwrap();
    assert_eq!(ids(&parse_response_body(response).await), vec![2, 3]);

    let response = app
        .oneshot(get_request("/api/admin/v1/cities?end_date=2024-01-16"))
        .await
        .unwrap();
    assert_eq!(ids(&parse_response_body(response).await), vec![1]);
}

#[tokio::test]
async fn test_list_search_is_case_insensitive() {
    let backend = TestBackend::new(
        sample_cities(),
        vec![user(1, 1, "Grace"), user(2, 2, "Ada"), user(3, 2, "Linus")],
        vec![],
    );

    let response = backend
        .app()
        .oneshot(get_request("/api/admin/v1/users?search=ADA"))
        .await
        .unwrap();
    assert_eq!(ids(&parse_response_body(response).await), vec![2]);
}

#[tokio::test]
async fn test_list_filters_by_foreign_key() {
    let backend = TestBackend::new(
        sample_cities(),
        vec![user(1, 1, "Grace"), user(2, 2, "Ada"), user(3, 2, "Linus")],
        vec![],
    );

    let response = backend
        .app()
        .oneshot(get_request("/api/admin/v1/users?city_id=2&sort=id"))
        .await
        .unwrap();

    let body = parse_response_body(response).await;
    assert_eq!(ids(&body), vec![2, 3]);
    assert_eq!(body["data"][0]["email"], "ada@example.com");
}

#[tokio::test]
async fn test_list_page_size_is_clamped() {
    let backend = TestBackend::new(sample_cities(), vec![], vec![]);
    let app = backend.app();

    let response = app
        .clone()
        .oneshot(get_request("/api/admin/v1/cities?per_page=0"))
        .await
        .unwrap();
    let body = parse_response_body(response).await;
    assert_eq!(body["pagination"]["per_page"], 1);
    assert_eq!(body["pagination"]["total_pages"], 3);
    assert_eq!(ids(&body).len(), 1);

    let response = app
        .oneshot(get_request("/api/admin/v1/cities?per_page=1000"))
        .await
        .unwrap();
    let body = parse_response_body(response).await;
    assert_eq!(body["pagination"]["per_page"], 100);
}

#[tokio::test]
async fn test_list_page_past_end_is_empty() {
    let backend = TestBackend::new(sample_cities(), vec![], vec![]);
    let response = backend
        .app()
        .oneshot(get_request("/api/admin/v1/cities?page=5&per_page=2"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    assert!(ids(&body).is_empty());
    assert_eq!(body["pagination"]["total"], 3);
    assert_eq!(body["pagination"]["page"], 5);
}

#[tokio::test]
async fn test_activity_logs_default_to_trailing_window() {
    let backend = TestBackend::new(
        vec![],
        vec![],
        vec![
            activity_log(1, 1, "login", 0),
            activity_log(2, 1, "export", 10),
            activity_log(3, 1, "login", 45),
        ],
    );
    let app = backend.app();

    let response = app
        .clone()
        .oneshot(get_request("/api/admin/v1/activity_logs"))
        .await
        .unwrap();
    let body = parse_response_body(response).await;
    // Newest first by default.
    assert_eq!(ids(&body), vec![1, 2]);

    let response = app
        .oneshot(get_request("/api/admin/v1/activity_logs?start_date=2000-01-01"))
        .await
        .unwrap();
    let body = parse_response_body(response).await;
    assert_eq!(ids(&body), vec![1, 2, 3]);
}

// =============================================================================
// Validation
// =============================================================================

#[tokio::test]
async fn test_list_unknown_sort_field_is_rejected() {
    let backend = TestBackend::new(sample_cities(), vec![], vec![]);
    let response = backend
        .app()
        .oneshot(get_request("/api/admin/v1/cities?sort=password"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = parse_response_body(response).await;
    assert_eq!(body["error"], "validation_error");
    assert_eq!(body["details"][0]["field"], "sort");
}

#[tokio::test]
async fn test_list_non_numeric_foreign_key_is_rejected() {
    let backend = TestBackend::new(sample_cities(), vec![], vec![]);
    let response = backend
        .app()
        .oneshot(get_request("/api/admin/v1/cities?country_id=abc"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = parse_response_body(response).await;
    assert_eq!(body["details"][0]["field"], "country_id");
}

#[tokio::test]
async fn test_list_reports_every_invalid_field() {
    let backend = TestBackend::new(sample_cities(), vec![], vec![]);
    let response = backend
        .app()
        .oneshot(get_request(
            "/api/admin/v1/cities?start_date=2024-13-01&status=archived&page=two",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = parse_response_body(response).await;
    let fields: Vec<&str> = body["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["start_date", "status", "page"]);
    assert_eq!(body["message"], "3 validation errors");
}

#[tokio::test]
async fn test_list_inverted_date_range_is_rejected() {
    let backend = TestBackend::new(sample_cities(), vec![], vec![]);
    let response = backend
        .app()
        .oneshot(get_request(
            "/api/admin/v1/cities?start_date=2024-02-01&end_date=2024-01-01",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = parse_response_body(response).await;
    assert_eq!(body["details"][0]["field"], "end_date");
}

#[tokio::test]
async fn test_list_store_unavailable_returns_503() {
    let backend = TestBackend::new(sample_cities(), vec![], vec![]);
    backend.cities.set_unavailable(true);

    let response = backend
        .app()
        .oneshot(get_request("/api/admin/v1/cities"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = parse_response_body(response).await;
    assert_eq!(body["error"], "service_unavailable");
}

// =============================================================================
// GET /api/admin/v1/{resource}/:id
// =============================================================================

#[tokio::test]
async fn test_show_record() {
    let backend = TestBackend::new(sample_cities(), vec![], vec![]);
    let response = backend
        .app()
        .oneshot(get_request("/api/admin/v1/cities/2"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    assert_eq!(body["name"], "A");
    assert_eq!(body["status"], "active");
}

#[tokio::test]
async fn test_show_missing_record_is_404() {
    let backend = TestBackend::new(sample_cities(), vec![], vec![]);
    let response = backend
        .app()
        .oneshot(get_request("/api/admin/v1/users/99"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = parse_response_body(response).await;
    assert_eq!(body["message"], "User 99 not found");
}

// =============================================================================
// Health and request ids
// =============================================================================

#[tokio::test]
async fn test_health_reflects_store_availability() {
    let backend = TestBackend::empty();
    let app = backend.app();

    let response = app
        .clone()
        .oneshot(anonymous_get_request("/api/health"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    assert_eq!(body["status"], "healthy");

    backend.users.set_unavailable(true);
    let response = app
        .clone()
        .oneshot(anonymous_get_request("/api/health/ready"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let response = app
        .oneshot(anonymous_get_request("/api/health/live"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    use axum::{body::Body, http::Request};

    let backend = TestBackend::empty();
    let request = Request::builder()
        .uri("/api/health/live")
        .header("X-Request-ID", "trace-abc")
        .body(Body::empty())
        .unwrap();

    let response = backend.app().oneshot(request).await.unwrap();
    assert_eq!(response.headers()["x-request-id"], "trace-abc");
}
