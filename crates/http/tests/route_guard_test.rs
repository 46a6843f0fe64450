//! Tests for the role-based route guard middleware

#![cfg(feature = "server")]

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use axum::routing::get;
use axum::{Router, middleware};
use jobhub_core::repository::encode_session_cookie;
use jobhub_core::{Role, Session};
use jobhub_http::middleware::route_guard;
use tower::ServiceExt;

fn app() -> Router {
    Router::new()
        .route("/jobs", get(|| async { "jobs" }))
        .route("/employer/job-listing", get(|| async { "job listing" }))
        .route("/jobseeker/profile", get(|| async { "profile" }))
        .route("/admin/users", get(|| async { "users" }))
        .layer(middleware::from_fn(route_guard))
}

fn session_cookie(role: Role) -> String {
    let session = Session {
        role,
        name: "Someone".to_string(),
        email: "someone@jobhub.test".to_string(),
        refresh_token: "refresh-1".to_string(),
    };
    format!("session={}", encode_session_cookie(&session).unwrap())
}

async fn visit(path: &str, cookie: Option<String>) -> (StatusCode, Option<String>, String) {
    let mut request = Request::builder().uri(path);
    if let Some(cookie) = cookie {
        request = request.header(header::COOKIE, cookie);
    }

    let response = app()
        .oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let location = response
        .headers()
        .get(header::LOCATION)
        .map(|value| value.to_str().unwrap().to_string());
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, location, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
async fn test_employer_is_redirected_from_jobseeker_pages() {
    let (status, location, _) =
        visit("/jobseeker/profile", Some(session_cookie(Role::Employer))).await;

    assert_eq!(status, StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location.as_deref(), Some("/anonymous/signup"));
}

#[tokio::test]
async fn test_employer_reaches_employer_pages() {
    let (status, location, body) =
        visit("/employer/job-listing", Some(session_cookie(Role::Employer))).await;

    assert_eq!(status, StatusCode::OK);
    assert!(location.is_none());
    assert_eq!(body, "job listing");
}

#[tokio::test]
async fn test_missing_cookie_is_redirected_from_all_namespaces() {
    for path in ["/employer/job-listing", "/jobseeker/profile", "/admin/users"] {
        let (status, location, _) = visit(path, None).await;
        assert_eq!(status, StatusCode::TEMPORARY_REDIRECT, "path {path}");
        assert_eq!(location.as_deref(), Some("/anonymous/signup"));
    }
}

#[tokio::test]
async fn test_public_page_ignores_session_state() {
    for cookie in [
        None,
        Some(session_cookie(Role::Admin)),
        Some("session=%7Bbroken".to_string()),
    ] {
        let (status, _, body) = visit("/jobs", cookie).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "jobs");
    }
}

#[tokio::test]
async fn test_corrupted_cookie_is_treated_as_absent() {
    let (status, location, _) = visit("/admin/users", Some("session=%7Bbroken".to_string())).await;

    assert_eq!(status, StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location.as_deref(), Some("/anonymous/signup"));
}

#[tokio::test]
async fn test_admin_reaches_admin_pages() {
    let (status, _, body) = visit(
        "/admin/users",
        Some(format!("theme=dark; {}", session_cookie(Role::Admin))),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "users");
}
