//! In-process payout sink that keeps a running balance per recipient.

use std::collections::BTreeMap;
use std::sync::Mutex;

use surety_insurance::{InsuranceError, PayoutSink};
use surety_types::{Address, Wei};
use tracing::info;

/// Credits payouts to an in-memory balance book.
///
/// Stands in for real settlement, which lives outside the registry.
#[derive(Default)]
pub struct BalanceBook {
    balances: Mutex<BTreeMap<Address, Wei>>,
}

impl BalanceBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn balance_of(&self, address: &Address) -> Wei {
        self.balances
            .lock()
            .map(|b| b.get(address).copied().unwrap_or_default())
            .unwrap_or_default()
    }
}

impl PayoutSink for BalanceBook {
    fn transfer(&self, to: &Address, amount: Wei) -> Result<(), InsuranceError> {
        let mut balances = self.balances.lock().map_err(|_| InsuranceError::TransferFailed {
            to: *to,
            reason: "balance book poisoned".into(),
        })?;
        let balance = balances.entry(*to).or_default();
        *balance = balance
            .checked_add(amount)
            .ok_or_else(|| InsuranceError::TransferFailed {
                to: *to,
                reason: "balance overflow".into(),
            })?;
        info!(%to, %amount, balance = %balance, "payout credited to balance book");
        Ok(())
    }
}
