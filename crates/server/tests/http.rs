use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use booth_ledger::{Ledger, LoadPolicy, StatsStore};
use booth_prover::MockProver;
use booth_server::{router, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

fn test_app(dir: &tempfile::TempDir) -> Router {
    let prover = Arc::new(MockProver::from_secret([7u8; 32]));
    let ledger = Arc::new(
        Ledger::open(
            StatsStore::new(dir.path().join("stats.json")),
            Box::new(Arc::clone(&prover)),
            LoadPolicy::Strict,
        )
        .unwrap(),
    );
    router(AppState { ledger, prover })
}

async fn request(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(match body {
            Some(body) => Body::from(body.to_string()),
            None => Body::empty(),
        })
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

/// Drives the full demo flow: prove a vote, submit it, read the tally.
#[tokio::test]
async fn vote_flow_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(&dir);

    let (status, proved) = request(&app, "POST", "/vote", Some(json!({ "vote": 1 }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(proved["success"], true);
    assert_eq!(proved["publicSignals"][1], "1");

    let (status, receipt) = request(
        &app,
        "POST",
        "/submit-vote",
        Some(json!({
            "proof": proved["proof"],
            "publicSignals": proved["publicSignals"],
            "age": 30,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(receipt["txId"].as_str().unwrap().starts_with("tx_"));
    assert_eq!(receipt["statsRecorded"], true);

    let (status, stats) = request(&app, "GET", "/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["totalVotes"], 1);
    assert_eq!(stats["results"]["candidateB"], 1);
    assert_eq!(stats["demographics"]["26-35"], 1);
    assert_eq!(stats["winner"], "Candidate B");

    let (status, results) = request(&app, "GET", "/results", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(results["totalVotes"], 1);
    assert_eq!(results["yes"], 1);
    assert_eq!(results["no"], 0);
}

#[tokio::test]
async fn duplicate_submission_is_a_bad_request() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(&dir);

    let (_, proved) = request(&app, "POST", "/vote", Some(json!({ "vote": 0 }))).await;
    let submission = json!({
        "proof": proved["proof"],
        "publicSignals": proved["publicSignals"],
        "age": 20,
    });

    let (status, _) = request(&app, "POST", "/submit-vote", Some(submission.clone())).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = request(&app, "POST", "/submit-vote", Some(submission)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Double-voting"));

    let (_, stats) = request(&app, "GET", "/stats", None).await;
    assert_eq!(stats["totalVotes"], 1);
}

#[tokio::test]
async fn tampered_public_signals_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(&dir);

    let (_, proved) = request(&app, "POST", "/vote", Some(json!({ "vote": 0 }))).await;
    let nullifier = proved["publicSignals"][0].clone();

    // Flip the vote value without re-proving.
    let (status, body) = request(
        &app,
        "POST",
        "/submit-vote",
        Some(json!({
            "proof": proved["proof"],
            "publicSignals": [nullifier, "1"],
            "age": 20,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("verification"));

    let (_, stats) = request(&app, "GET", "/stats", None).await;
    assert_eq!(stats["totalVotes"], 0);
}

#[tokio::test]
async fn eligibility_reports_rule_and_age_group() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(&dir);

    let (status, body) = request(
        &app,
        "POST",
        "/eligibility",
        Some(json!({ "age": 40, "voterId": 123_456_789_012u64 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["eligible"], true);
    assert_eq!(body["ageGroup"], "36+");

    let (_, body) = request(
        &app,
        "POST",
        "/eligibility",
        Some(json!({ "age": 16, "voterId": 123_456_789_012u64 })),
    )
    .await;
    assert_eq!(body["eligible"], false);
}

#[tokio::test]
async fn raw_stats_expose_the_persisted_layout() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(&dir);

    let (_, proved) = request(&app, "POST", "/vote", Some(json!({ "vote": 1 }))).await;
    request(
        &app,
        "POST",
        "/submit-vote",
        Some(json!({
            "proof": proved["proof"],
            "publicSignals": proved["publicSignals"],
            "age": 20,
        })),
    )
    .await;

    let (status, raw) = request(&app, "GET", "/stats/raw", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(raw["totalVotes"], 1);
    assert_eq!(raw["votes"].as_array().unwrap().len(), 1);
    assert_eq!(raw["results"]["candidateA"], 0);
    assert_eq!(raw["voterAgeGroups"]["18-25"], 1);
    assert_eq!(raw["timestamps"].as_array().unwrap().len(), 1);
}
