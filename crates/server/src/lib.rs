//! HTTP boundary for the invisible voting booth.
//!
//! A thin axum layer over [`booth_ledger::Ledger`] and the demo proof
//! provider. Route surface and JSON shapes follow the original demo backend.

pub mod logger;

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use booth_ledger::{AgeGroup, Candidate, Ledger, LedgerError, Submission, Summary};
use booth_prover::{generate_anon_token, Prover};
use serde::Deserialize;
use serde_json::{json, Value};

/// Shared handles behind every request handler.
#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<Ledger>,
    pub prover: Arc<dyn Prover>,
}

/// Builds the full route surface.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/eligibility", post(eligibility))
        .route("/vote", post(vote))
        .route("/submit-vote", post(submit_vote))
        .route("/results", get(results))
        .route("/stats", get(stats))
        .route("/stats/raw", get(stats_raw))
        .route("/zk-info", get(zk_info))
        .route("/demo", get(demo))
        .with_state(state)
}

/// [`LedgerError`] with an HTTP status attached.
struct ApiError(LedgerError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = if self.0.is_rejection() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        Self(err)
    }
}

async fn home() -> Json<Value> {
    Json(json!({
        "status": "Invisible Voting Booth",
        "endpoints": [
            "POST /eligibility {age, voterId}",
            "POST /vote {vote: 0|1}",
            "POST /submit-vote {proof, publicSignals}",
            "GET /results",
            "GET /stats",
            "GET /zk-info",
        ],
    }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EligibilityRequest {
    #[serde(default = "default_age")]
    age: u32,
    #[serde(default = "default_voter_id")]
    voter_id: u64,
}

fn default_age() -> u32 {
    25
}

fn default_voter_id() -> u64 {
    123_456_789_012
}

async fn eligibility(
    State(state): State<AppState>,
    Json(req): Json<EligibilityRequest>,
) -> Json<Value> {
    let outcome = state.prover.prove_eligibility(req.age, req.voter_id);
    Json(json!({
        "success": true,
        "eligible": outcome.eligible,
        "proof": outcome.proof,
        "zk_used": true,
        "ageGroup": outcome.age_group.label(),
    }))
}

#[derive(Deserialize)]
struct VoteRequest {
    #[serde(default = "default_true")]
    eligible: bool,
    #[serde(default = "default_vote")]
    vote: u8,
}

fn default_true() -> bool {
    true
}

fn default_vote() -> u8 {
    1
}

async fn vote(State(state): State<AppState>, Json(req): Json<VoteRequest>) -> Json<Value> {
    let anon_token = generate_anon_token();
    let vote_proof = state.prover.prove_vote(req.eligible, req.vote, &anon_token);
    Json(json!({
        "success": true,
        "proof": vote_proof.proof,
        "publicSignals": vote_proof.public_signals,
        "anonToken": anon_token,
        "zk_used": true,
    }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmitVoteRequest {
    #[serde(default)]
    proof: Value,
    #[serde(default)]
    public_signals: Vec<String>,
    #[serde(default)]
    age: Option<u32>,
}

async fn submit_vote(
    State(state): State<AppState>,
    Json(req): Json<SubmitVoteRequest>,
) -> Result<Json<booth_ledger::Receipt>, ApiError> {
    let submission = Submission {
        proof: req.proof,
        public_signals: req.public_signals,
        age_group: AgeGroup::from_age(req.age.unwrap_or(0)),
    };
    let receipt = state.ledger.submit_vote(&submission)?;
    Ok(Json(receipt))
}

async fn results(State(state): State<AppState>) -> Json<Value> {
    let snapshot = state.ledger.snapshot();
    Json(json!({
        "totalVotes": snapshot.total_votes,
        "yes": snapshot.results.get(&Candidate::B).copied().unwrap_or(0),
        "no": snapshot.results.get(&Candidate::A).copied().unwrap_or(0),
        "turnout": snapshot.total_votes,
        // Demo placeholders: there is no Merkle eligibility tree and no
        // chain settlement behind this ledger.
        "merkleRoot": Value::Null,
        "blockchainReady": false,
    }))
}

async fn stats(State(state): State<AppState>) -> Json<Summary> {
    Json(state.ledger.summary())
}

async fn stats_raw(State(state): State<AppState>) -> Json<booth_ledger::LedgerState> {
    Json(state.ledger.snapshot())
}

async fn zk_info(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "proof_system": "mock groth16, commitment-bound to public signals",
        "nullifier_derivation": "sha256(anonToken + vote)",
        "nullifier_storage": "stats file, votes[] array",
        "stats_storage": state.ledger.summary().storage_file,
    }))
}

async fn demo(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "sampleVoter": { "age": 25, "voterId": "123456789012" },
        "anonToken": generate_anon_token(),
        "currentStats": state.ledger.summary(),
    }))
}
