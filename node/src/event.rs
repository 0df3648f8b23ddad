//! Registry events published to subscribers (oracle processes, UIs, logs).

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::trace;

use surety_oracle::OracleEvent;
use surety_types::{Address, FlightKey, Wei};

/// Everything observable that the registry does.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SuretyEvent {
    AirlineRegistered {
        airline: Address,
        sponsor: Address,
        votes: u32,
    },
    /// A vote was recorded for a candidate still short of quorum.
    RegistrationVote {
        candidate: Address,
        sponsor: Address,
        votes: u32,
        required: u32,
    },
    AirlineFunded {
        airline: Address,
        total: Wei,
    },
    FlightRegistered {
        flight: FlightKey,
    },
    OracleRegistered {
        oracle: Address,
        indexes: [u8; 3],
    },
    /// Request opened, oracle report or final status.
    Oracle { event: OracleEvent },
    PolicyPurchased {
        passenger: Address,
        flight: FlightKey,
        premium: Wei,
    },
    InsureesCredited {
        flight: FlightKey,
        policies: u32,
        total: Wei,
    },
    PayoutWithdrawn {
        passenger: Address,
        amount: Wei,
    },
    OperatingStatusChanged {
        operational: bool,
    },
}

/// Non-blocking fan-out of [`SuretyEvent`]s over a bounded broadcast channel.
///
/// Publishing never waits: with no subscribers the event is dropped, and a
/// subscriber that falls behind sees `RecvError::Lagged`.
pub struct EventBus {
    tx: broadcast::Sender<SuretyEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SuretyEvent> {
        self.tx.subscribe()
    }

    pub fn publish(&self, event: SuretyEvent) {
        if self.tx.send(event).is_err() {
            trace!("event published with no subscribers");
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}
