//! A passenger's policy on one flight.

use serde::{Deserialize, Serialize};
use surety_types::{Address, FlightKey, Wei};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsurancePolicy {
    pub passenger: Address,
    pub flight: FlightKey,
    /// Total premium paid, never above the cap.
    pub amount_paid: Wei,
    /// Credit available for withdrawal. Zeroed on withdrawal.
    pub payout_credit: Wei,
    /// Set once the policy has been credited. Never cleared.
    pub credited: bool,
}

impl InsurancePolicy {
    pub fn new(passenger: Address, flight: FlightKey, amount_paid: Wei) -> Self {
        Self {
            passenger,
            flight,
            amount_paid,
            payout_credit: Wei::ZERO,
            credited: false,
        }
    }
}
