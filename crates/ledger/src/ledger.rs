use std::sync::RwLock;

use tracing::{info, warn};

use crate::{
    error::LedgerError,
    state::LedgerState,
    store::{LoadPolicy, StatsStore},
    types::{epoch_millis, new_tx_id, AgeGroup, Candidate, Receipt, Summary},
};

/// Verification seam for the external proof provider.
///
/// The ledger treats verification as a hard dependency: any failure aborts the
/// submission with [`LedgerError::ProofInvalid`], there is no fallback-accept
/// path.
pub trait ProofVerifier: Send + Sync {
    fn verify(&self, proof: &serde_json::Value, public_signals: &[String]) -> bool;
}

impl<T: ProofVerifier + ?Sized> ProofVerifier for std::sync::Arc<T> {
    fn verify(&self, proof: &serde_json::Value, public_signals: &[String]) -> bool {
        (**self).verify(proof, public_signals)
    }
}

/// One incoming vote submission: the claimed proof, its public signals
/// `[nullifier, voteValue]`, and the non-secret demographic bucket.
#[derive(Debug, Clone)]
pub struct Submission {
    pub proof: serde_json::Value,
    pub public_signals: Vec<String>,
    pub age_group: AgeGroup,
}

/// The anonymous vote ledger.
///
/// Behaves as a monitor: the whole mutation sequence of a submission
/// (register nullifier, update tally, persist) runs under one write lock, so
/// concurrent submissions serialize rather than interleave. Queries take the
/// read lock and observe a consistent snapshot.
pub struct Ledger {
    store: StatsStore,
    verifier: Box<dyn ProofVerifier>,
    state: RwLock<LedgerState>,
}

impl Ledger {
    /// Opens the ledger, loading persisted state or initializing zero state.
    pub fn open(
        store: StatsStore,
        verifier: Box<dyn ProofVerifier>,
        policy: LoadPolicy,
    ) -> Result<Self, LedgerError> {
        let state = store.load(policy)?;
        info!(
            path = %store.path().display(),
            total_votes = state.total_votes,
            "ledger ready"
        );
        Ok(Self {
            store,
            verifier,
            state: RwLock::new(state),
        })
    }

    /// Runs the full submission sequence.
    ///
    /// Verify, parse, register, tally, persist; any failure leaves the ledger
    /// exactly as it was before the call.
    pub fn submit_vote(&self, submission: &Submission) -> Result<Receipt, LedgerError> {
        if !self
            .verifier
            .verify(&submission.proof, &submission.public_signals)
        {
            return Err(LedgerError::ProofInvalid);
        }

        let [nullifier, vote_value] = submission.public_signals.as_slice() else {
            return Err(LedgerError::MalformedVote(format!(
                "expected 2 public signals, got {}",
                submission.public_signals.len()
            )));
        };
        let candidate = Candidate::from_vote_value(vote_value)?;
        let group = submission.age_group;

        let mut state = self.state.write().expect("ledger lock poisoned");
        state.register(nullifier)?;
        let now = epoch_millis();
        state.record_vote(candidate, group, now);

        if let Err(err) = self.store.save(&state) {
            warn!(%err, "persist failed, rolling back submission");
            state.rollback(nullifier, candidate, group);
            return Err(err);
        }

        info!(
            candidate = %candidate,
            total_votes = state.total_votes,
            "vote accepted"
        );
        Ok(Receipt {
            tx_id: new_tx_id(now),
            stats_recorded: true,
            storage_location: self.store.path().display().to_string(),
        })
    }

    /// Aggregate tally view.
    pub fn summary(&self) -> Summary {
        self.state
            .read()
            .expect("ledger lock poisoned")
            .summary(&self.store.file_name())
    }

    /// A consistent copy of the full persisted state. Diagnostic surface.
    pub fn snapshot(&self) -> LedgerState {
        self.state.read().expect("ledger lock poisoned").clone()
    }

    /// Writes a final snapshot to storage. Called on shutdown.
    pub fn flush(&self) -> Result<(), LedgerError> {
        let state = self.state.read().expect("ledger lock poisoned");
        self.store.save(&state)
    }
}
