//! Integration tests for the radar HTTP API.
//!
//! Uses axum-test to exercise the router without binding a port.

// Allow holding MutexGuard across await in auth tests - tests are serialized
// to avoid env var conflicts
#![allow(clippy::unwrap_used, clippy::panic, clippy::await_holding_lock)]

use axum::http::{HeaderValue, StatusCode, header};
use axum_test::TestServer;
use radar::api::{
    API_KEY_ENV, AppState, EvaluateResponse, HealthResponse, create_router,
};
use radar_core::{Engine, EngineConfig, Ring};
use serde_json::{Value, json};
use std::sync::Mutex;

/// Serializes tests since some of them modify env vars.
static ENV_TEST_MUTEX: Mutex<()> = Mutex::new(());

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Holds the mutex and clears the API key on drop.
struct TestGuard {
    _guard: std::sync::MutexGuard<'static, ()>,
}

impl Drop for TestGuard {
    fn drop(&mut self) {
        // SAFETY: Tests run sequentially under ENV_TEST_MUTEX, so no concurrent env access.
        unsafe { std::env::remove_var(API_KEY_ENV) };
    }
}

fn lock_env() -> TestGuard {
    let guard = ENV_TEST_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    TestGuard { _guard: guard }
}

fn server_with(config: EngineConfig) -> TestServer {
    let engine = Engine::new(config).unwrap();
    TestServer::new(create_router(AppState::new(engine))).unwrap()
}

/// A test server without authentication.
fn create_test_server() -> (TestServer, TestGuard) {
    let guard = lock_env();
    // SAFETY: Tests run sequentially under ENV_TEST_MUTEX, so no concurrent env access.
    unsafe { std::env::remove_var(API_KEY_ENV) };
    (server_with(EngineConfig::default()), guard)
}

/// A test server requiring `api_key`.
fn create_auth_test_server(api_key: &str) -> (TestServer, TestGuard) {
    let guard = lock_env();
    // SAFETY: Tests run sequentially under ENV_TEST_MUTEX, so no concurrent env access.
    unsafe { std::env::set_var(API_KEY_ENV, api_key) };
    (server_with(EngineConfig::default()), guard)
}

fn strong_metrics() -> Value {
    json!({
        "popularity": 60000,
        "monthly_commits": 220,
        "monthly_releases": 3,
        "contributors": 400,
        "first_release_year": 2014,
        "enterprise_mentions": 20,
        "security_advisories": 0,
        "breaking_changes": 0,
        "pricing_volatility": false,
        "vendor_lock_in": false,
        "history": [
            { "commits": 150, "releases": 2 },
            { "commits": 150, "releases": 2 },
            { "commits": 220, "releases": 3 },
            { "commits": 220, "releases": 3 }
        ]
    })
}

fn sample_request() -> Value {
    let mut risky = strong_metrics();
    risky["security_advisories"] = json!(5);

    json!({
        "org": { "size": "mid", "risk_tolerance": "balanced", "compliance": "unregulated" },
        "technologies": {
            "tokio": { "quadrant": "libraries", "metrics": strong_metrics() },
            "leaky": { "quadrant": "libraries", "metrics": risky },
            "mystery": { "quadrant": "tools" }
        }
    })
}

// =============================================================================
// HEALTH AND CONFIG
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let (server, _guard) = create_test_server();

    let response = server.get("/health").await;
    response.assert_status_ok();

    let health: HealthResponse = response.json();
    assert_eq!(health.status, "ok");
    assert_eq!(health.version, env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_config_endpoint_reports_engine_config() {
    let _guard = lock_env();
    let server = server_with(EngineConfig {
        max_concurrency: 5,
        ..EngineConfig::default()
    });

    let response = server.get("/config").await;
    response.assert_status_ok();

    let config: EngineConfig = response.json();
    assert_eq!(config.max_concurrency, 5);
    assert_eq!(config.thresholds, EngineConfig::default().thresholds);
}

// =============================================================================
// EVALUATE
// =============================================================================

#[tokio::test]
async fn test_evaluate_places_technologies() {
    let (server, _guard) = create_test_server();

    let response = server.post("/evaluate").json(&sample_request()).await;
    response.assert_status_ok();

    let body: EvaluateResponse = response.json();
    assert!(body.success);
    assert!(body.error.is_none());

    let snapshot = body.snapshot.unwrap();
    assert_eq!(snapshot.len(), 3);
    let tokio = snapshot.decision("tokio").unwrap();
    assert_eq!(tokio.ring, Ring::Adopt);
    assert_eq!(tokio.justification[0], "driven by rising momentum");

    let leaky = snapshot.decision("leaky").unwrap();
    assert_eq!(leaky.ring, Ring::Hold);
    assert!(leaky.is_capped());

    assert_eq!(body.ring_counts.len(), 4);
    assert_eq!(body.ring_counts.values().sum::<usize>(), 3);
    assert_eq!(body.digest.unwrap().len(), 64);
}

#[tokio::test]
async fn test_evaluate_without_history_stops_at_trial() {
    let (server, _guard) = create_test_server();

    let mut metrics = strong_metrics();
    metrics.as_object_mut().unwrap().remove("history");

    let body: EvaluateResponse = server
        .post("/evaluate")
        .json(&json!({
            "technologies": { "tokio": { "quadrant": "libraries", "metrics": metrics } }
        }))
        .await
        .json();

    let tokio = body.snapshot.unwrap().decision("tokio").cloned().unwrap();
    assert_eq!(tokio.ring, Ring::Trial);
    assert_eq!(tokio.ceiling, Ring::Adopt);
}

#[tokio::test]
async fn test_evaluate_unknown_release_count_is_not_critical() {
    let (server, _guard) = create_test_server();

    let mut metrics = strong_metrics();
    let object = metrics.as_object_mut().unwrap();
    object.remove("history");
    object.remove("monthly_releases");
    object.insert("breaking_changes".to_string(), json!(1));

    let body: EvaluateResponse = server
        .post("/evaluate")
        .json(&json!({
            "technologies": { "tokio": { "quadrant": "libraries", "metrics": metrics } }
        }))
        .await
        .json();

    let tokio = body.snapshot.unwrap().decision("tokio").cloned().unwrap();
    assert_ne!(tokio.ring, Ring::Hold);
    assert_eq!(tokio.ceiling, Ring::Trial);
    assert!(
        tokio
            .justification
            .iter()
            .any(|l| l.contains("instability medium (assumed)"))
    );
}

#[tokio::test]
async fn test_evaluate_is_deterministic() {
    let (server, _guard) = create_test_server();

    let first: EvaluateResponse = server.post("/evaluate").json(&sample_request()).await.json();
    let second: EvaluateResponse = server.post("/evaluate").json(&sample_request()).await.json();

    assert!(first.digest.is_some());
    assert_eq!(first.digest, second.digest);
}

#[tokio::test]
async fn test_evaluate_org_defaults_when_missing() {
    let (server, _guard) = create_test_server();

    let response = server
        .post("/evaluate")
        .json(&json!({
            "technologies": { "tokio": { "quadrant": "libraries", "metrics": strong_metrics() } }
        }))
        .await;
    response.assert_status_ok();

    let body: EvaluateResponse = response.json();
    let snapshot = body.snapshot.unwrap();
    assert_eq!(snapshot.org, radar_core::OrgContext::default());
}

#[tokio::test]
async fn test_evaluate_regulated_org_is_stricter() {
    let (server, _guard) = create_test_server();

    let mut request = sample_request();
    request["org"] = json!({
        "size": "enterprise",
        "risk_tolerance": "conservative",
        "compliance": "regulated"
    });

    let body: EvaluateResponse = server.post("/evaluate").json(&request).await.json();
    let snapshot = body.snapshot.unwrap();
    let tokio = snapshot.decision("tokio").unwrap();
    assert!(tokio.ring < Ring::Adopt);
    assert!(tokio.ring <= tokio.ceiling);
}

#[tokio::test]
async fn test_evaluate_warnings_are_readable() {
    let (server, _guard) = create_test_server();

    let technologies: serde_json::Map<String, Value> = (0..6)
        .map(|i| {
            (
                format!("strong-{}", i),
                json!({ "quadrant": "libraries", "metrics": strong_metrics() }),
            )
        })
        .collect();

    let body: EvaluateResponse = server
        .post("/evaluate")
        .json(&json!({ "technologies": technologies }))
        .await
        .json();

    assert!(body.success);
    assert!(!body.snapshot.unwrap().is_consistent);
    assert!(body.warnings.iter().any(|w| w.contains("Adopt")));
}

#[tokio::test]
async fn test_evaluate_rejects_oversized_name() {
    let (server, _guard) = create_test_server();

    let name = "x".repeat(300);
    let response = server
        .post("/evaluate")
        .json(&json!({ "technologies": { name: { "quadrant": "tools" } } }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: EvaluateResponse = response.json();
    assert!(!body.success);
    assert!(body.error.unwrap().contains("Invalid input"));
}

#[tokio::test]
async fn test_evaluate_rejects_empty_quadrant() {
    let (server, _guard) = create_test_server();

    let response = server
        .post("/evaluate")
        .json(&json!({ "technologies": { "tokio": { "quadrant": "  " } } }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_evaluate_malformed_body() {
    let (server, _guard) = create_test_server();

    let response = server
        .post("/evaluate")
        .json(&json!({ "technologies": 5 }))
        .await;

    assert!(response.status_code().is_client_error());
}

// =============================================================================
// ROUTING
// =============================================================================

#[tokio::test]
async fn test_404_on_unknown_endpoint() {
    let (server, _guard) = create_test_server();

    let response = server.get("/unknown").await;
    response.assert_status_not_found();
}

#[tokio::test]
async fn test_method_not_allowed() {
    let (server, _guard) = create_test_server();

    let response = server.get("/evaluate").await;
    assert_eq!(response.status_code(), StatusCode::METHOD_NOT_ALLOWED);
}

// =============================================================================
// AUTHENTICATION
// =============================================================================

#[tokio::test]
async fn test_auth_valid_bearer_token() {
    let api_key = "test-secret-key-12345";
    let (server, _guard) = create_auth_test_server(api_key);

    let response = server
        .get("/config")
        .add_header(
            header::AUTHORIZATION,
            format!("Bearer {}", api_key).parse::<HeaderValue>().unwrap(),
        )
        .await;

    response.assert_status_ok();
}

#[tokio::test]
async fn test_auth_valid_raw_token() {
    let api_key = "test-raw-key-67890";
    let (server, _guard) = create_auth_test_server(api_key);

    let response = server
        .post("/evaluate")
        .add_header(header::AUTHORIZATION, HeaderValue::from_static(api_key))
        .json(&sample_request())
        .await;

    response.assert_status_ok();
}

#[tokio::test]
async fn test_auth_invalid_token_rejected() {
    let (server, _guard) = create_auth_test_server("correct-key");

    let response = server
        .post("/evaluate")
        .add_header(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer wrong-key"),
        )
        .json(&sample_request())
        .await;

    response.assert_status_unauthorized();
}

#[tokio::test]
async fn test_auth_missing_header_rejected() {
    let (server, _guard) = create_auth_test_server("correct-key");

    let response = server.get("/config").await;
    response.assert_status_unauthorized();
}

#[tokio::test]
async fn test_auth_health_endpoint_bypasses_auth() {
    let (server, _guard) = create_auth_test_server("correct-key");

    let response = server.get("/health").await;
    response.assert_status_ok();
}
