use std::{io, path::PathBuf};

use thiserror::Error;

/// An error that can occur while submitting to or loading the vote ledger.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// The nullifier was already recorded; the submission is a repeat vote.
    #[error("Double-voting blocked by nullifier")]
    DoubleVoteRejected,

    /// The vote value or public signals could not be parsed.
    #[error("Malformed vote: {0}")]
    MalformedVote(String),

    /// A candidate or demographic identifier outside the fixed sets.
    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    /// The proof did not verify against the submitted public signals.
    #[error("Proof verification failed")]
    ProofInvalid,

    /// The state snapshot could not be written to durable storage. The
    /// in-memory state has been rolled back; the submission is not committed.
    #[error("Failed to persist ledger state")]
    PersistenceFailure(#[source] io::Error),

    /// Persisted state exists but cannot be parsed (strict load only).
    #[error("Persisted ledger state at {} is corrupt", path.display())]
    CorruptState {
        /// The stats file that failed to parse.
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl LedgerError {
    /// Whether the error is the caller's fault (a 4xx at the HTTP boundary)
    /// rather than a storage fault.
    pub fn is_rejection(&self) -> bool {
        !matches!(
            self,
            LedgerError::PersistenceFailure(_) | LedgerError::CorruptState { .. }
        )
    }
}
