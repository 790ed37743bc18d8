//! Route-level checks: the authenticate-then-authorize boundary and the
//! response envelope.

mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use sqlx::PgPool;
use tower::util::ServiceExt;

use gatepass_server::routes::create_routes;

#[sqlx::test(migrations = "./migrations")]
async fn health_needs_no_token(pool: PgPool) {
    let app = create_routes(common::test_state(pool));

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "./migrations")]
async fn missing_token_is_unauthorized(pool: PgPool) {
    let app = create_routes(common::test_state(pool));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/scanner/stats")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "./migrations")]
async fn scanner_token_cannot_reach_admin_endpoints(pool: PgPool) {
    let scanner = common::create_user(&pool, "scanner").await;
    let app = create_routes(common::test_state(pool));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/tickets/create")
                .header(header::AUTHORIZATION, format!("Bearer {}", scanner.api_token))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "./migrations")]
async fn admin_token_reaches_scanner_endpoints(pool: PgPool) {
    let admin = common::create_user(&pool, "admin").await;
    let app = create_routes(common::test_state(pool));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/scanner/stats")
                .header(header::AUTHORIZATION, format!("Bearer {}", admin.api_token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "./migrations")]
async fn scan_of_unknown_code_returns_not_found_envelope(pool: PgPool) {
    let scanner = common::create_user(&pool, "scanner").await;
    let app = create_routes(common::test_state(pool));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/scanner/validate")
                .header(header::AUTHORIZATION, format!("Bearer {}", scanner.api_token))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"qrCode":"TKT-MISSING|x|y"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
    assert_eq!(body["error"]["details"]["valid"], false);
}
