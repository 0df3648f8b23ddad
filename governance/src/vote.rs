//! Pending multi-party admission votes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use surety_types::Address;

/// Sponsors collected so far for a candidate awaiting admission.
///
/// Exists only while the candidate is pending; discarded on admission.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationVote {
    pub candidate: Address,
    pub voters: BTreeSet<Address>,
}

impl RegistrationVote {
    pub fn new(candidate: Address) -> Self {
        Self {
            candidate,
            voters: BTreeSet::new(),
        }
    }

    /// Record a sponsor. Returns `false` if they had already voted.
    pub fn add_voter(&mut self, voter: Address) -> bool {
        self.voters.insert(voter)
    }

    pub fn has_voted(&self, voter: &Address) -> bool {
        self.voters.contains(voter)
    }

    pub fn count(&self) -> u32 {
        self.voters.len() as u32
    }
}
