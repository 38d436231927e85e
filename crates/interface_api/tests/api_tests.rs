//! Router-level tests
//!
//! These run against the real router with mock partner ports and a lazy
//! database pool: everything up to the first repository call is exercised
//! (routing, authentication, authorization, DTO and domain validation).

use std::sync::Arc;

use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderValue, StatusCode};
use axum_test::TestServer;
use chrono::NaiveDate;
use sqlx::postgres::PgPoolOptions;

use interface_api::auth::create_token;
use interface_api::config::ApiConfig;
use interface_api::create_router;
use interface_api::services::PartnerPorts;
use partner_gateway::ports::mock::{
    MockLossHistoryProvider, MockPaymentGateway, MockPolicyExporter, MockVehicleRegistry,
};
use partner_gateway::RegistrationRecord;

const JWT_SECRET: &str = "test-secret";

fn test_server() -> TestServer {
    let pool = PgPoolOptions::new()
        .connect_lazy("postgres://localhost/umbrella_test")
        .expect("lazy pool");

    let config = ApiConfig {
        jwt_secret: JWT_SECRET.to_string(),
        ..Default::default()
    };

    let ports = PartnerPorts {
        exporter: Arc::new(MockPolicyExporter::accepting()),
        payments: Arc::new(MockPaymentGateway::completing()),
        loss_history: Arc::new(MockLossHistoryProvider::default()),
        registry: Arc::new(MockVehicleRegistry::with_registration(
            "8XK442",
            RegistrationRecord {
                vin: "1HGCM82633A004352".to_string(),
                registered_owner: "Morgan Lane".to_string(),
                status: "active".to_string(),
                expires: NaiveDate::from_ymd_opt(2026, 5, 1).unwrap(),
            },
        )),
    };

    TestServer::new(create_router(pool, config, ports)).expect("test server")
}

fn bearer(roles: &[&str]) -> HeaderValue {
    let token = create_token(
        "test.user",
        roles.iter().map(|r| r.to_string()).collect(),
        JWT_SECRET,
        600,
    )
    .unwrap();
    format!("Bearer {}", token).parse().unwrap()
}

#[tokio::test]
async fn health_endpoint_is_public() {
    let server = test_server();

    let response = server.get("/health").await;
    response.assert_status_ok();
    let body = response.text();
    assert!(body.contains("healthy"));
}

#[tokio::test]
async fn liveness_alias_is_public() {
    let server = test_server();
    server.get("/health/live").await.assert_status_ok();
}

#[tokio::test]
async fn api_routes_require_a_token() {
    let server = test_server();

    let response = server.get("/api/v1/policies").await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn garbage_tokens_are_rejected() {
    let server = test_server();

    let response = server
        .get("/api/v1/policies")
        .add_header(AUTHORIZATION, HeaderValue::from_static("Bearer not-a-jwt"))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn viewer_cannot_create_policies() {
    let server = test_server();

    let response = server
        .post("/api/v1/policies")
        .add_header(AUTHORIZATION, bearer(&["VIEWER"]))
        .json(&serde_json::json!({
            "effective_date": "2025-01-01",
            "expiry_date": "2025-12-31",
            "owner_id": "550e8400-e29b-41d4-a716-446655440000"
        }))
        .await;
    response.assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn adjuster_cannot_approve_claims() {
    let server = test_server();

    // Status target drives the required capability: approving takes
    // Claim:Approve, which ADJUSTER does not hold.
    let response = server
        .put("/api/v1/claims/550e8400-e29b-41d4-a716-446655440000/status")
        .add_header(AUTHORIZATION, bearer(&["ADJUSTER"]))
        .json(&serde_json::json!({ "status": "approved" }))
        .await;
    response.assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn invalid_period_rejected_before_persistence() {
    let server = test_server();

    // 366 days on a non-leap span exceeds the one-year cap; the request
    // dies in validation before any database access.
    let response = server
        .post("/api/v1/policies")
        .add_header(AUTHORIZATION, bearer(&["MANAGER"]))
        .json(&serde_json::json!({
            "effective_date": "2025-01-01",
            "expiry_date": "2026-01-02",
            "owner_id": "550e8400-e29b-41d4-a716-446655440000"
        }))
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn unknown_claim_status_is_a_bad_request() {
    let server = test_server();

    let response = server
        .put("/api/v1/claims/550e8400-e29b-41d4-a716-446655440000/status")
        .add_header(AUTHORIZATION, bearer(&["MANAGER"]))
        .json(&serde_json::json!({ "status": "reopened" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}
