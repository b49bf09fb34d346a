//! Integration tests for the health and readiness probes
//!
//! These tests require a running PostgreSQL database. Run with:
//! cargo test -- --ignored

mod common;

use axum::http::StatusCode;
use common::{parse_json, TestApp};

#[tokio::test]
#[ignore = "requires database"]
async fn test_health_endpoint_reports_healthy() {
    let app = TestApp::new().await;

    let (status, response) = app.get("/health").await;

    assert_eq!(status, StatusCode::OK);
    let json = parse_json(&response);
    assert_eq!(json["status"], "healthy");
    assert!(!json["version"].as_str().unwrap().is_empty());
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_readiness_probe_checks_the_database() {
    let app = TestApp::new().await;

    let (status, response) = app.get("/health/ready").await;

    assert_eq!(status, StatusCode::OK);
    let json = parse_json(&response);
    assert_eq!(json["status"], "ready");
    assert_eq!(json["checks"]["database"]["status"], "healthy");
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_liveness_probe_is_always_alive() {
    let app = TestApp::new().await;

    let (status, response) = app.get("/health/live").await;

    assert_eq!(status, StatusCode::OK);
    let json = parse_json(&response);
    assert_eq!(json["status"], "alive");
}
