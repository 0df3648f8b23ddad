//! Airline admission: direct registration or multi-party vote.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use surety_types::{Address, ProtocolParams};
use tracing::{debug, info};

use crate::airline::AccountLedger;
use crate::error::GovernanceError;
use crate::vote::RegistrationVote;

/// Outcome of a registration request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Admission {
    /// The candidate is now a registered (unfunded) airline.
    Admitted { votes: u32 },
    /// The vote was recorded; more sponsors are needed.
    Pending { votes: u32, required: u32 },
}

/// Gates admission of new airlines.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AirlineGovernance {
    /// Funded-airline count from which admission requires a vote.
    threshold: u32,
    pending: BTreeMap<Address, RegistrationVote>,
}

impl AirlineGovernance {
    pub fn new(threshold: u32) -> Self {
        Self {
            threshold,
            pending: BTreeMap::new(),
        }
    }

    /// Sponsor `candidate` for admission.
    ///
    /// Below the threshold a single funded sponsor admits the candidate.
    /// From the threshold on, each call is one vote and the candidate is
    /// admitted once the voters reach `ceil(funded_count / 2)`, with the
    /// funded count read fresh on every vote.
    pub fn request_registration(
        &mut self,
        ledger: &mut AccountLedger,
        candidate: Address,
        sponsor: Address,
    ) -> Result<Admission, GovernanceError> {
        if !ledger.is_funded(&sponsor) {
            return Err(GovernanceError::Unauthorized(sponsor));
        }
        if ledger.is_registered(&candidate) {
            return Err(GovernanceError::AlreadyRegistered(candidate));
        }

        let funded = ledger.funded_count();
        if funded < self.threshold {
            ledger.register_candidate(candidate)?;
            info!(%candidate, %sponsor, funded, "airline admitted directly");
            return Ok(Admission::Admitted { votes: 1 });
        }

        if self
            .pending
            .get(&candidate)
            .is_some_and(|vote| vote.has_voted(&sponsor))
        {
            return Err(GovernanceError::DuplicateVote {
                voter: sponsor,
                candidate,
            });
        }

        let required = ProtocolParams::vote_quorum(funded);
        let vote = self
            .pending
            .entry(candidate)
            .or_insert_with(|| RegistrationVote::new(candidate));
        vote.add_voter(sponsor);
        let votes = vote.count();
        debug!(%candidate, %sponsor, votes, required, "registration vote recorded");

        if votes >= required {
            ledger.register_candidate(candidate)?;
            self.pending.remove(&candidate);
            info!(%candidate, votes, required, "airline admitted by vote");
            return Ok(Admission::Admitted { votes });
        }
        Ok(Admission::Pending { votes, required })
    }

    /// Votes collected for a pending candidate (0 if none).
    pub fn pending_votes(&self, candidate: &Address) -> u32 {
        self.pending.get(candidate).map_or(0, RegistrationVote::count)
    }

    pub fn pending_vote(&self, candidate: &Address) -> Option<&RegistrationVote> {
        self.pending.get(candidate)
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }
}
