//! Integration tests for the session-aware API client

#![cfg(feature = "client")]

use jobhub_core::tests::RecordingNavigator;
use jobhub_core::{
    CookieSessionRepository, CredentialStore, MemoryCookieJar, Role, Session, TokenHolder,
};
use jobhub_http::client::{ApiClient, ApiRequest, ClientConfig, SessionClient, SessionContext};
use jobhub_http::client::error::ClientError;
use jobhub_http::types::{SignInRequest, VerifyOtpRequest};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Harness {
    client: SessionClient,
    credentials: CredentialStore,
    tokens: TokenHolder,
    navigator: RecordingNavigator,
}

fn harness(server: &MockServer) -> Harness {
    harness_with_config(server, ClientConfig::default())
}

fn harness_with_config(server: &MockServer, config: ClientConfig) -> Harness {
    let credentials = CredentialStore::new(Arc::new(CookieSessionRepository::new(
        MemoryCookieJar::new(),
    )));
    let tokens = TokenHolder::new();
    let navigator = RecordingNavigator::new();
    let context = SessionContext::new(
        credentials.clone(),
        tokens.clone(),
        Arc::new(navigator.clone()),
    );
    let client = ApiClient::builder()
        .base_url(server.uri())
        .config(config)
        .build_session(context)
        .unwrap();

    Harness {
        client,
        credentials,
        tokens,
        navigator,
    }
}

fn stored_session(refresh_token: &str) -> Session {
    Session {
        role: Role::Jobseeker,
        name: "Jo Seeker".to_string(),
        email: "jo@seek.test".to_string(),
        refresh_token: refresh_token.to_string(),
    }
}

fn refresh_grant(access: &str, refresh: Option<&str>) -> Value {
    let mut body = json!({
        "accessToken": access,
        "role": "JOBSEEKER",
        "name": "Jo Seeker",
        "email": "jo@seek.test"
    });
    if let Some(refresh) = refresh {
        body["refreshToken"] = json!(refresh);
    }
    body
}

#[tokio::test]
async fn test_client_builder_requires_base_url() {
    let result = ApiClient::builder().build();
    assert!(matches!(result, Err(ClientError::Configuration(_))));
}

#[tokio::test]
async fn test_client_builder_trims_trailing_slash() {
    let client = ApiClient::new("http://localhost:8080/").unwrap();
    assert_eq!(client.base_url(), "http://localhost:8080");
    assert_eq!(client.config(), &ClientConfig::default());
}

#[tokio::test]
async fn test_attaches_raw_access_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jobs"))
        .and(header("authorization", "access-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server);
    h.tokens.set("access-1");

    let jobs: Vec<Value> = h.client.get("/jobs").await.unwrap();
    assert!(jobs.is_empty());
}

#[tokio::test]
async fn test_no_header_without_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jobs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let h = harness(&server);
    let _: Vec<Value> = h.client.get("/jobs").await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn test_otp_verification_is_exempt_from_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/verify-otp"))
        .and(body_json(json!({ "email": "jo@seek.test", "otp": "123456" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(refresh_grant("access-new", Some("refresh-new"))),
        )
        .mount(&server)
        .await;

    let h = harness(&server);
    h.tokens.set("left-over-token");

    let session = h
        .client
        .verify_otp(&VerifyOtpRequest {
            email: "jo@seek.test".to_string(),
            otp: "123456".to_string(),
        })
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("authorization").is_none());
    assert_eq!(session.refresh_token, "refresh-new");
    assert_eq!(h.tokens.get().as_deref(), Some("access-new"));
}

#[tokio::test]
async fn test_overridden_otp_path_is_still_exempt() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v2/verify-otp"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(refresh_grant("access-new", Some("refresh-new"))),
        )
        .expect(1)
        .mount(&server)
        .await;

    let h = harness_with_config(
        &server,
        ClientConfig {
            verify_otp_path: "/v2/verify-otp".to_string(),
            ..ClientConfig::default()
        },
    );
    h.tokens.set("left-over");

    h.client
        .verify_otp(&VerifyOtpRequest {
            email: "jo@seek.test".to_string(),
            otp: "654321".to_string(),
        })
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn test_sign_in_establishes_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/signin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accessToken": "access-1",
            "refreshToken": "refresh-1",
            "role": "EMPLOYER",
            "name": "Acme HR",
            "email": "hr@acme.test"
        })))
        .mount(&server)
        .await;

    let h = harness(&server);
    let session = h
        .client
        .sign_in(&SignInRequest {
            email: "hr@acme.test".to_string(),
            password: "hunter2".to_string(),
            role: Role::Employer,
        })
        .await
        .unwrap();

    assert_eq!(session.role, Role::Employer);
    assert_eq!(h.tokens.get().as_deref(), Some("access-1"));
    assert_eq!(h.credentials.get(), Some(session));
}

#[tokio::test]
async fn test_stale_token_is_refreshed_and_request_retried_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jobseeker/applications"))
        .and(header("authorization", "access-old"))
        .respond_with(ResponseTemplate::new(410))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh-token"))
        .and(body_json(json!({ "refreshToken": "refresh-1" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(refresh_grant("access-new", Some("refresh-2"))),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/jobseeker/applications"))
        .and(header("authorization", "access-new"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": 7 }])))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server);
    h.credentials.set(Some(stored_session("refresh-1"))).unwrap();
    h.tokens.set("access-old");

    let applications: Vec<Value> = h.client.get("/jobseeker/applications").await.unwrap();

    assert_eq!(applications[0]["id"], 7);
    assert_eq!(h.tokens.get().as_deref(), Some("access-new"));
    assert_eq!(h.credentials.get().unwrap().refresh_token, "refresh-2");
    assert!(h.navigator.visited().is_empty());
}

#[tokio::test]
async fn test_refresh_without_new_refresh_token_keeps_old_one() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jobs/saved"))
        .and(header("authorization", "access-old"))
        .respond_with(ResponseTemplate::new(410))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(refresh_grant("access-new", None)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/jobs/saved"))
        .and(header("authorization", "access-new"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let h = harness(&server);
    h.credentials.set(Some(stored_session("refresh-1"))).unwrap();
    h.tokens.set("access-old");

    let _: Vec<Value> = h.client.get("/jobs/saved").await.unwrap();

    assert_eq!(h.tokens.get().as_deref(), Some("access-new"));
    let session = h.credentials.get().unwrap();
    assert_eq!(session.refresh_token, "refresh-1");
    assert_eq!(session.role, Role::Jobseeker);
}

#[tokio::test]
async fn test_refresh_never_changes_stored_role() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jobseeker/profile"))
        .and(header("authorization", "access-old"))
        .respond_with(ResponseTemplate::new(410))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accessToken": "access-new",
            "refreshToken": "refresh-2",
            "role": "ADMIN",
            "name": "Someone Else",
            "email": "else@jobhub.test"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/jobseeker/profile"))
        .and(header("authorization", "access-new"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let h = harness(&server);
    h.credentials.set(Some(stored_session("refresh-1"))).unwrap();
    h.tokens.set("access-old");

    let _: Value = h.client.get("/jobseeker/profile").await.unwrap();

    let session = h.credentials.get().unwrap();
    assert_eq!(session.role, Role::Jobseeker);
    assert_eq!(session.name, "Jo Seeker");
    assert_eq!(session.email, "jo@seek.test");
    assert_eq!(session.refresh_token, "refresh-2");
}

#[tokio::test]
async fn test_concurrent_stale_requests_refresh_independently() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("authorization", "access-old"))
        .respond_with(ResponseTemplate::new(410))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh-token"))
        .and(body_json(json!({ "refreshToken": "refresh-1" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(refresh_grant("access-new", Some("refresh-2"))),
        )
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(header("authorization", "access-new"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(2)
        .mount(&server)
        .await;

    let h = harness(&server);
    h.credentials.set(Some(stored_session("refresh-1"))).unwrap();
    h.tokens.set("access-old");

    let (jobs, saved) = tokio::join!(
        h.client.get::<Vec<Value>>("/jobs"),
        h.client.get::<Vec<Value>>("/jobs/saved"),
    );

    assert!(jobs.is_ok());
    assert!(saved.is_ok());
    assert_eq!(h.tokens.get().as_deref(), Some("access-new"));
    assert_eq!(h.credentials.get().unwrap().refresh_token, "refresh-2");
    assert!(h.navigator.visited().is_empty());
}

#[tokio::test]
async fn test_teardown_during_refresh_is_not_undone() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jobseeker/applications"))
        .and(header("authorization", "access-old"))
        .respond_with(ResponseTemplate::new(410))
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh-token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(refresh_grant("access-new", Some("refresh-2")))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/jobseeker/applications"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let h = harness(&server);
    h.credentials.set(Some(stored_session("refresh-1"))).unwrap();
    h.tokens.set("access-old");

    let (result, ()) = tokio::join!(
        h.client.get::<Vec<Value>>("/jobseeker/applications"),
        async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            h.credentials.clear().unwrap();
            h.tokens.clear();
        },
    );

    assert!(result.is_ok());
    assert!(h.credentials.get().is_none());
    assert!(h.tokens.get().is_none());
}

#[tokio::test]
async fn test_reload_without_access_token_recovers_through_refresh() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jobseeker/profile"))
        .and(header("authorization", "access-new"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "name": "Jo" })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/jobseeker/profile"))
        .respond_with(ResponseTemplate::new(410))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(refresh_grant("access-new", None)))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server);
    h.credentials.set(Some(stored_session("refresh-1"))).unwrap();

    let profile: Value = h.client.get("/jobseeker/profile").await.unwrap();
    assert_eq!(profile["name"], "Jo");
}

#[tokio::test]
async fn test_refresh_failure_terminates_session() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/employer/jobs"))
        .respond_with(ResponseTemplate::new(410))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh-token"))
        .respond_with(ResponseTemplate::new(403).set_body_string("refresh token revoked"))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server);
    h.credentials.set(Some(stored_session("refresh-1"))).unwrap();
    h.tokens.set("access-old");

    let result: Result<Value, _> = h.client.get("/employer/jobs").await;

    assert!(result.unwrap_err().is_session_terminated());
    assert!(h.credentials.get().is_none());
    assert!(h.tokens.get().is_none());
    assert_eq!(h.navigator.visited(), vec!["/anonymous/signin".to_string()]);
}

#[tokio::test]
async fn test_stale_after_refresh_does_not_recurse() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jobs/recommended"))
        .respond_with(ResponseTemplate::new(410))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(refresh_grant("access-new", None)))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server);
    h.credentials.set(Some(stored_session("refresh-1"))).unwrap();
    h.tokens.set("access-old");

    let result = h.client.send(&ApiRequest::get("/jobs/recommended")).await;

    assert!(matches!(result, Err(ClientError::SessionTerminated { .. })));
    assert!(h.credentials.get().is_none());
    assert_eq!(h.navigator.last().as_deref(), Some("/anonymous/signin"));
}

#[tokio::test]
async fn test_stale_without_stored_session_passes_through() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jobs"))
        .respond_with(ResponseTemplate::new(410).set_body_string("token expired"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(refresh_grant("x", None)))
        .expect(0)
        .mount(&server)
        .await;

    let h = harness(&server);
    let response = h.client.send(&ApiRequest::get("/jobs")).await.unwrap();

    assert_eq!(response.status().as_u16(), 410);
    assert!(h.navigator.visited().is_empty());
}

#[tokio::test]
async fn test_unauthorized_always_clears_session() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/employer/jobs/3"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(refresh_grant("x", None)))
        .expect(0)
        .mount(&server)
        .await;

    let h = harness(&server);
    h.credentials.set(Some(stored_session("refresh-1"))).unwrap();
    h.tokens.set("access-1");

    let result = h.client.delete("/employer/jobs/3").await;

    assert!(result.unwrap_err().is_session_terminated());
    assert!(h.credentials.get().is_none());
    assert_eq!(h.navigator.visited(), vec!["/anonymous/signin".to_string()]);
}

#[tokio::test]
async fn test_unauthorized_after_refresh_clears_session() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/admin/users"))
        .and(header("authorization", "access-old"))
        .respond_with(ResponseTemplate::new(410))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/admin/users"))
        .and(header("authorization", "access-new"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(refresh_grant("access-new", None)))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server);
    h.credentials.set(Some(stored_session("refresh-1"))).unwrap();
    h.tokens.set("access-old");

    let result: Result<Value, _> = h.client.get("/admin/users").await;

    assert!(result.unwrap_err().is_session_terminated());
    assert!(h.credentials.get().is_none());
}

#[tokio::test]
async fn test_other_errors_pass_through() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/employer/jobs"))
        .respond_with(ResponseTemplate::new(422).set_body_string("title is required"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/jobs/9"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such job"))
        .mount(&server)
        .await;

    let h = harness(&server);
    h.credentials.set(Some(stored_session("refresh-1"))).unwrap();
    h.tokens.set("access-1");

    let created: Result<Value, _> = h.client.post("/employer/jobs", &json!({})).await;
    match created {
        Err(ClientError::ServerError { status, message }) => {
            assert_eq!(status, 422);
            assert_eq!(message, "title is required");
        }
        other => panic!("Expected ServerError, got {other:?}"),
    }

    let missing: Result<Value, _> = h.client.get("/jobs/9").await;
    assert!(matches!(missing, Err(ClientError::NotFound(_))));

    assert!(h.credentials.get().is_some());
    assert!(h.navigator.visited().is_empty());
}

#[tokio::test]
async fn test_refresh_protocol_is_a_plain_exchange() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh-token"))
        .and(body_json(json!({ "refreshToken": "refresh-1" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(refresh_grant("access-2", Some("refresh-2"))),
        )
        .mount(&server)
        .await;

    let client = ApiClient::new(server.uri()).unwrap();
    let grant = client.refresh_session("refresh-1").await.unwrap();

    assert_eq!(grant.access_token, "access-2");
    assert_eq!(grant.refresh_token.as_deref(), Some("refresh-2"));
    assert_eq!(grant.role, Role::Jobseeker);

    let rejected = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh-token"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&rejected)
        .await;

    let client = ApiClient::new(rejected.uri()).unwrap();
    assert!(matches!(
        client.refresh_session("refresh-1").await,
        Err(ClientError::AuthenticationFailed(_))
    ));
}
