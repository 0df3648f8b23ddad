//! Events published by the consensus engine for external oracle processes.

use serde::{Deserialize, Serialize};
use surety_types::{Address, RequestKey, StatusCode};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OracleEvent {
    /// A status request was opened. Oracles holding `index` should answer.
    RequestOpened {
        key: RequestKey,
        index: u8,
        requester: Address,
    },
    /// An oracle response was accepted.
    Report {
        key: RequestKey,
        oracle: Address,
        status: StatusCode,
    },
    /// A request reached quorum and the flight status was set.
    FinalStatus { key: RequestKey, status: StatusCode },
}

impl OracleEvent {
    pub fn key(&self) -> &RequestKey {
        match self {
            OracleEvent::RequestOpened { key, .. }
            | OracleEvent::Report { key, .. }
            | OracleEvent::FinalStatus { key, .. } => key,
        }
    }
}
