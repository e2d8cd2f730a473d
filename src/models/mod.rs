use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Current votes for one poll: voter id -> rating (1..=5).
/// Each voter has at most one entry; no vote history is kept.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct VoteLedger {
    votes: HashMap<String, i32>,
}

impl VoteLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a vote, replacing any earlier vote by the same voter.
    pub fn cast(&mut self, voter_id: String, rating: i32) {
        self.votes.insert(voter_id, rating);
    }

    /// Remove a voter's vote. Removing an absent entry is a no-op.
    pub fn retract(&mut self, voter_id: &str) {
        self.votes.remove(voter_id);
    }

    pub fn vote_count(&self) -> usize {
        self.votes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.votes.is_empty()
    }

    pub fn ratings(&self) -> impl Iterator<Item = i32> + '_ {
        self.votes.values().copied()
    }

    pub fn rating_of(&self, voter_id: &str) -> Option<i32> {
        self.votes.get(voter_id).copied()
    }
}

/// One open rating poll, keyed in the registry by the Discord message id
/// of the poll message. The item name never changes after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingPoll {
    pub item_name: String,
    pub votes: VoteLedger,
}

impl RatingPoll {
    pub fn new(item_name: String) -> Self {
        Self {
            item_name,
            votes: VoteLedger::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cast_is_idempotent() {
        let mut ledger = VoteLedger::new();
        ledger.cast("alice".to_string(), 4);
        let once = ledger.clone();
        ledger.cast("alice".to_string(), 4);
        assert_eq!(ledger, once);
        assert_eq!(ledger.vote_count(), 1);
    }

    #[test]
    fn cast_overwrites_previous_vote() {
        let mut ledger = VoteLedger::new();
        ledger.cast("alice".to_string(), 2);
        ledger.cast("alice".to_string(), 5);
        assert_eq!(ledger.vote_count(), 1);
        assert_eq!(ledger.rating_of("alice"), Some(5));
    }

    #[test]
    fn retract_missing_voter_is_noop() {
        let mut ledger = VoteLedger::new();
        ledger.cast("alice".to_string(), 3);
        ledger.retract("bob");
        assert_eq!(ledger.vote_count(), 1);
        ledger.retract("alice");
        assert!(ledger.is_empty());
    }

    #[test]
    fn ledger_serializes_as_plain_json_object() {
        let mut ledger = VoteLedger::new();
        ledger.cast("u1".to_string(), 5);
        let json = serde_json::to_string(&ledger).unwrap();
        let back: VoteLedger = serde_json::from_str(&json).unwrap();
        assert_eq!(back.rating_of("u1"), Some(5));

        let empty: VoteLedger = serde_json::from_str("{}").unwrap();
        assert!(empty.is_empty());
    }
}
