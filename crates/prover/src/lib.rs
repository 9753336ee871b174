//! Demo proof provider for the invisible voting booth.
//!
//! There is no real circuit toolchain here: proofs carry the fabricated
//! Groth16-shaped element triples of the original demo. What is real is the
//! failure path — every proof is bound to its public signals through a keyed
//! digest, so a tampered or mismatched submission fails verification instead
//! of being waved through.

use booth_ledger::{AgeGroup, ProofVerifier};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

/// The lowest voter id accepted by the eligibility rule.
pub const MIN_VOTER_ID: u64 = 100_000_000_000;

/// A Groth16-shaped proof object.
///
/// The element triples are demo constants; `commitment` binds the proof to
/// its public signals and the issuing prover.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Groth16Proof {
    pub pi_a: [String; 3],
    pub pi_b: [[String; 2]; 3],
    pub pi_c: [String; 3],
    pub commitment: String,
}

/// Output of [`Prover::prove_eligibility`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityProof {
    pub eligible: bool,
    pub proof: Groth16Proof,
    pub age_group: AgeGroup,
}

/// Output of [`Prover::prove_vote`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteProof {
    pub proof: Groth16Proof,
    /// `[nullifier, voteValue]`.
    pub public_signals: Vec<String>,
}

/// The proof provider seam consumed by the HTTP boundary.
pub trait Prover: Send + Sync {
    /// Proves the voter satisfies the eligibility rule without revealing who
    /// they are.
    fn prove_eligibility(&self, age: u32, voter_id: u64) -> EligibilityProof;

    /// Proves a vote and derives its nullifier from the anonymous token.
    fn prove_vote(&self, eligible: bool, vote: u8, anon_token: &str) -> VoteProof;

    /// Checks a proof against the public signals it claims to attest.
    fn verify(&self, proof: &Groth16Proof, public_signals: &[String]) -> bool;
}

/// The only prover implementation: fabricated proofs, real rejections.
pub struct MockProver {
    secret: [u8; 32],
}

impl MockProver {
    /// Creates a prover with a fresh per-process secret. Proofs issued by one
    /// instance do not verify against another.
    pub fn new() -> Self {
        let mut secret = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut secret);
        Self { secret }
    }

    /// Creates a prover with a fixed secret, for deterministic tests.
    pub fn from_secret(secret: [u8; 32]) -> Self {
        Self { secret }
    }

    fn commit(&self, public_signals: &[String]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.secret);
        for signal in public_signals {
            hasher.update((signal.len() as u64).to_le_bytes());
            hasher.update(signal.as_bytes());
        }
        hex::encode(hasher.finalize())
    }

    fn issue(&self, public_signals: &[String]) -> Groth16Proof {
        Groth16Proof {
            pi_a: ["1".into(), "0".into(), "0".into()],
            pi_b: [
                ["0".into(), "1".into()],
                ["0".into(), "0".into()],
                ["0".into(), "0".into()],
            ],
            pi_c: ["0".into(), "0".into(), "1".into()],
            commitment: self.commit(public_signals),
        }
    }
}

impl Default for MockProver {
    fn default() -> Self {
        Self::new()
    }
}

impl Prover for MockProver {
    fn prove_eligibility(&self, age: u32, voter_id: u64) -> EligibilityProof {
        let eligible = age >= 18 && voter_id >= MIN_VOTER_ID;
        debug!(age, voter_id, eligible, "eligibility proved");
        EligibilityProof {
            eligible,
            proof: self.issue(&[age.to_string(), voter_id.to_string()]),
            age_group: AgeGroup::from_age(age),
        }
    }

    fn prove_vote(&self, eligible: bool, vote: u8, anon_token: &str) -> VoteProof {
        let nullifier = derive_nullifier(anon_token, vote);
        let public_signals = vec![nullifier, vote.to_string()];
        debug!(eligible, vote, "vote proved");
        VoteProof {
            proof: self.issue(&public_signals),
            public_signals,
        }
    }

    fn verify(&self, proof: &Groth16Proof, public_signals: &[String]) -> bool {
        proof.commitment == self.commit(public_signals)
    }
}

impl ProofVerifier for MockProver {
    fn verify(&self, proof: &serde_json::Value, public_signals: &[String]) -> bool {
        // Clients may send the proof object itself or a JSON-encoded string
        // of it, as the original demo frontend did.
        let parsed = match proof {
            serde_json::Value::String(raw) => serde_json::from_str::<Groth16Proof>(raw),
            other => serde_json::from_value(other.clone()),
        };
        match parsed {
            Ok(proof) => Prover::verify(self, &proof, public_signals),
            Err(_) => false,
        }
    }
}

/// Generates a random 32-byte anonymity token, hex encoded.
pub fn generate_anon_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Derives the one-time nullifier from an anonymous token and the vote value.
pub fn derive_nullifier(anon_token: &str, vote: u8) -> String {
    let mut hasher = Sha256::new();
    hasher.update(anon_token.as_bytes());
    hasher.update(vote.to_string().as_bytes());
    hex::encode(hasher.finalize())
}
