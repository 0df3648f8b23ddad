//! Per-request response bookkeeping.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use surety_types::{Address, RequestKey, StatusCode, Timestamp};

/// One status request for a flight.
///
/// Open until some status code collects `min_responses` distinct oracles;
/// then closed with that code. Closed requests still record responses.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleRequest {
    pub key: RequestKey,
    /// The index an oracle must hold to answer.
    pub index: u8,
    pub requester: Address,
    /// Oracles per reported status code.
    pub responses: BTreeMap<StatusCode, BTreeSet<Address>>,
    /// First (and only accepted) code per oracle.
    pub responders: BTreeMap<Address, StatusCode>,
    /// Set once, when the request reaches quorum.
    pub finalized: Option<StatusCode>,
}

impl OracleRequest {
    pub fn new(key: RequestKey, index: u8, requester: Address) -> Self {
        Self {
            key,
            index,
            requester,
            responses: BTreeMap::new(),
            responders: BTreeMap::new(),
            finalized: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.finalized.is_none()
    }

    pub fn opened_at(&self) -> Timestamp {
        self.key.timestamp
    }

    /// Number of distinct oracles that reported `code`.
    pub fn count_for(&self, code: StatusCode) -> u32 {
        self.responses.get(&code).map_or(0, |set| set.len() as u32)
    }

    pub fn response_of(&self, oracle: &Address) -> Option<StatusCode> {
        self.responders.get(oracle).copied()
    }

    /// Record a first response. Returns the new count for `code`.
    pub(crate) fn record(&mut self, oracle: Address, code: StatusCode) -> u32 {
        self.responders.insert(oracle, code);
        let bucket = self.responses.entry(code).or_default();
        bucket.insert(oracle);
        bucket.len() as u32
    }
}
