//! Anonymous vote ledger.
//!
//! The ledger accepts `{proof, publicSignals}` pairs produced by an external
//! proof provider, enforces at-most-once counting per nullifier, and keeps
//! aggregate tallies and demographic breakdowns. The whole mutation sequence
//! (verify, register, tally, persist) runs under a single lock, and state
//! snapshots are swapped onto disk atomically.

mod error;
mod ledger;
mod state;
mod store;
mod types;

pub use error::LedgerError;
pub use ledger::{Ledger, ProofVerifier, Submission};
pub use state::LedgerState;
pub use store::{LoadPolicy, StatsStore};
pub use types::{epoch_millis, AgeGroup, Candidate, Receipt, Summary, Winner};
