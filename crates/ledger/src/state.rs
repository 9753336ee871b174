use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use crate::{
    error::LedgerError,
    types::{AgeGroup, Candidate, Summary, Winner},
};

/// How many trailing timestamps feed the rolling average interval.
const RECENT_WINDOW: usize = 10;

/// The full persisted ledger state.
///
/// Field names and layout match the stats file on disk: `votes` is the
/// append-only sequence of recorded nullifiers, `results` the per-candidate
/// counts, `timestamps` the epoch-millisecond acceptance times, and
/// `voterAgeGroups` the demographic counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerState {
    pub votes: Vec<String>,
    pub results: BTreeMap<Candidate, u64>,
    pub total_votes: u64,
    pub timestamps: Vec<u64>,
    pub voter_age_groups: BTreeMap<AgeGroup, u64>,
    /// Membership index over `votes`, rebuilt on load.
    #[serde(skip)]
    seen: HashSet<String>,
}

impl Default for LedgerState {
    fn default() -> Self {
        Self {
            votes: Vec::new(),
            results: Candidate::iter().map(|c| (c, 0)).collect(),
            total_votes: 0,
            timestamps: Vec::new(),
            voter_age_groups: AgeGroup::iter().map(|g| (g, 0)).collect(),
            seen: HashSet::new(),
        }
    }
}

impl LedgerState {
    /// Rebuilds the nullifier index and pre-seeds any missing fixed buckets.
    /// Must be called after deserializing a persisted snapshot.
    pub(crate) fn rebuild_index(&mut self) {
        self.seen = self.votes.iter().cloned().collect();
        for candidate in Candidate::iter() {
            self.results.entry(candidate).or_insert(0);
        }
        for group in AgeGroup::iter() {
            self.voter_age_groups.entry(group).or_insert(0);
        }
    }

    /// Whether the nullifier has already been recorded.
    pub fn contains(&self, nullifier: &str) -> bool {
        self.seen.contains(nullifier)
    }

    /// Records the nullifier. The caller must have checked [`Self::contains`].
    pub(crate) fn register(&mut self, nullifier: &str) -> Result<(), LedgerError> {
        if nullifier.is_empty() {
            return Err(LedgerError::MalformedVote("empty nullifier".into()));
        }
        if !self.seen.insert(nullifier.to_string()) {
            return Err(LedgerError::DoubleVoteRejected);
        }
        self.votes.push(nullifier.to_string());
        Ok(())
    }

    /// Applies one accepted vote to the tally.
    pub(crate) fn record_vote(&mut self, candidate: Candidate, group: AgeGroup, now_millis: u64) {
        *self.results.entry(candidate).or_insert(0) += 1;
        *self.voter_age_groups.entry(group).or_insert(0) += 1;
        self.total_votes += 1;
        self.timestamps.push(now_millis);
        self.debug_check_consistent();
    }

    /// Undoes a registered-but-unpersisted submission.
    pub(crate) fn rollback(&mut self, nullifier: &str, candidate: Candidate, group: AgeGroup) {
        self.seen.remove(nullifier);
        self.votes.pop();
        self.timestamps.pop();
        if let Some(count) = self.results.get_mut(&candidate) {
            *count = count.saturating_sub(1);
        }
        if let Some(count) = self.voter_age_groups.get_mut(&group) {
            *count = count.saturating_sub(1);
        }
        self.total_votes = self.total_votes.saturating_sub(1);
        self.debug_check_consistent();
    }

    /// The poll leader under the strict-majority rule.
    pub fn winner(&self) -> Winner {
        if self.total_votes == 0 {
            return Winner::None;
        }
        let max = self.results.values().copied().max().unwrap_or(0);
        let mut leaders = self.results.iter().filter(|(_, &count)| count == max);
        let (candidate, _) = leaders.next().expect("results map is pre-seeded");
        if leaders.next().is_some() {
            Winner::Tie
        } else {
            Winner::Candidate(*candidate)
        }
    }

    /// Mean gap in seconds between the last up-to-10 acceptance timestamps.
    /// `None` until two submissions exist, so an empty or singleton sequence
    /// never divides by zero.
    pub fn avg_recent_interval_secs(&self) -> Option<f64> {
        let start = self.timestamps.len().saturating_sub(RECENT_WINDOW);
        let recent = &self.timestamps[start..];
        if recent.len() < 2 {
            return None;
        }
        let gaps: u64 = recent
            .windows(2)
            .map(|pair| pair[1].saturating_sub(pair[0]))
            .sum();
        Some(gaps as f64 / (recent.len() - 1) as f64 / 1000.0)
    }

    /// Builds the aggregate summary view.
    pub fn summary(&self, storage_name: &str) -> Summary {
        Summary {
            total_votes: self.total_votes,
            results: self.results.clone(),
            demographics: self.voter_age_groups.clone(),
            winner: self.winner(),
            avg_vote_time: self
                .avg_recent_interval_secs()
                .map(|secs| format!("{secs:.0}s")),
            storage_file: format!("{} ({} records)", storage_name, self.votes.len()),
        }
    }

    /// `totalVotes == |votes| == sum(results) == sum(voterAgeGroups)` after
    /// every mutation.
    fn debug_check_consistent(&self) {
        debug_assert_eq!(self.total_votes as usize, self.votes.len());
        debug_assert_eq!(self.total_votes, self.results.values().sum::<u64>());
        debug_assert_eq!(
            self.total_votes,
            self.voter_age_groups.values().sum::<u64>()
        );
    }
}
