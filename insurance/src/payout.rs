//! Outbound value transfers.

use surety_types::{Address, Wei};

use crate::error::InsuranceError;

/// Moves withdrawn credit to a passenger.
///
/// Settlement itself is out of the registry's hands; implementations decide
/// what a transfer means.
pub trait PayoutSink: Send + Sync {
    fn transfer(&self, to: &Address, amount: Wei) -> Result<(), InsuranceError>;
}
