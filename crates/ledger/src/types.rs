use std::{
    fmt,
    time::{SystemTime, UNIX_EPOCH},
};

use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use strum::EnumIter;

use crate::error::LedgerError;

/// The closed set of candidates in the poll.
///
/// Serialized as the `candidateA` / `candidateB` keys used by the persisted
/// stats file and the results endpoint.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, EnumIter,
)]
pub enum Candidate {
    #[serde(rename = "candidateA")]
    A,
    #[serde(rename = "candidateB")]
    B,
}

impl Candidate {
    /// Parses the wire vote value carried in `publicSignals[1]`.
    ///
    /// `"0"` maps to candidate A and `"1"` to candidate B; anything else is
    /// rejected rather than silently creating a new tally bucket.
    pub fn from_vote_value(value: &str) -> Result<Self, LedgerError> {
        match value.trim() {
            "0" => Ok(Candidate::A),
            "1" => Ok(Candidate::B),
            other => Err(LedgerError::MalformedVote(format!(
                "unrecognized vote value {other:?}"
            ))),
        }
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Candidate::A => write!(f, "Candidate A"),
            Candidate::B => write!(f, "Candidate B"),
        }
    }
}

/// The closed set of demographic buckets tracked alongside the tally.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, EnumIter,
)]
pub enum AgeGroup {
    #[serde(rename = "18-25")]
    Age18To25,
    #[serde(rename = "26-35")]
    Age26To35,
    #[serde(rename = "36+")]
    Age36Plus,
}

impl AgeGroup {
    /// Buckets a raw age the way the eligibility flow does.
    pub fn from_age(age: u32) -> Self {
        match age {
            36.. => AgeGroup::Age36Plus,
            26..=35 => AgeGroup::Age26To35,
            _ => AgeGroup::Age18To25,
        }
    }

    /// Parses a bucket label, rejecting anything outside the fixed set.
    pub fn parse(label: &str) -> Result<Self, LedgerError> {
        match label {
            "18-25" => Ok(AgeGroup::Age18To25),
            "26-35" => Ok(AgeGroup::Age26To35),
            "36+" => Ok(AgeGroup::Age36Plus),
            other => Err(LedgerError::UnknownCategory(format!(
                "unknown age group {other:?}"
            ))),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AgeGroup::Age18To25 => "18-25",
            AgeGroup::Age26To35 => "26-35",
            AgeGroup::Age36Plus => "36+",
        }
    }
}

/// The leader of the poll as reported by [`Summary`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Winner {
    /// No votes have been recorded yet.
    None,
    /// Two or more candidates share a non-zero maximum.
    Tie,
    /// A unique candidate holds the strictly highest count.
    Candidate(Candidate),
}

impl Serialize for Winner {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Winner::None => serializer.serialize_none(),
            Winner::Tie => serializer.serialize_str("Tie"),
            Winner::Candidate(c) => serializer.serialize_str(&c.to_string()),
        }
    }
}

/// The confirmation object returned to a caller after an accepted submission.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    /// Opaque transaction identifier, unique per submission.
    pub tx_id: String,
    /// Always true for an accepted submission.
    pub stats_recorded: bool,
    /// Where the state snapshot was persisted.
    pub storage_location: String,
}

/// Aggregate view of the ledger answered by `summary()`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_votes: u64,
    pub results: BTreeMap<Candidate, u64>,
    pub demographics: BTreeMap<AgeGroup, u64>,
    pub winner: Winner,
    /// Mean gap between the last up-to-10 accepted submissions, as a display
    /// string like `"4s"`. `None` until two submissions exist.
    pub avg_vote_time: Option<String>,
    /// Storage descriptor, e.g. `"stats.json (12 records)"`.
    pub storage_file: String,
}

/// Milliseconds since the Unix epoch.
pub fn epoch_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Generates a fresh transaction identifier for a receipt.
pub(crate) fn new_tx_id(now_millis: u64) -> String {
    let unique = uuid::Uuid::new_v4().simple().to_string();
    format!("tx_{}_{}", now_millis, &unique[..8])
}
