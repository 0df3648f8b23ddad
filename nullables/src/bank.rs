//! Nullable bank: records payouts instead of moving value.

use std::sync::Mutex;
use surety_insurance::{InsuranceError, PayoutSink};
use surety_types::{Address, Wei};

type TransferHook = Box<dyn Fn(&Address, Wei) + Send + Sync>;

/// A payout sink for testing.
///
/// Every successful transfer is recorded. It can be told to reject
/// transfers, and a hook can run inside `transfer` to simulate a
/// recipient that calls back into the registry.
#[derive(Default)]
pub struct NullBank {
    transfers: Mutex<Vec<(Address, Wei)>>,
    failing: Mutex<bool>,
    hook: Mutex<Option<TransferHook>>,
}

impl NullBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following transfer fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        if let Ok(mut f) = self.failing.lock() {
            *f = failing;
        }
    }

    /// Run `hook` inside each transfer, before it is recorded.
    pub fn on_transfer(&self, hook: impl Fn(&Address, Wei) + Send + Sync + 'static) {
        if let Ok(mut h) = self.hook.lock() {
            *h = Some(Box::new(hook));
        }
    }

    pub fn transfers(&self) -> Vec<(Address, Wei)> {
        self.transfers.lock().map(|t| t.clone()).unwrap_or_default()
    }

    /// Total paid out to one address.
    pub fn paid_to(&self, to: &Address) -> Wei {
        self.transfers()
            .iter()
            .filter(|(addr, _)| addr == to)
            .fold(Wei::ZERO, |acc, (_, amount)| acc.saturating_add(*amount))
    }
}

impl PayoutSink for NullBank {
    fn transfer(&self, to: &Address, amount: Wei) -> Result<(), InsuranceError> {
        if self.failing.lock().map(|f| *f).unwrap_or(false) {
            return Err(InsuranceError::TransferFailed {
                to: *to,
                reason: "null bank set to fail".into(),
            });
        }
        if let Ok(hook) = self.hook.lock() {
            if let Some(hook) = hook.as_ref() {
                hook(to, amount);
            }
        }
        self.transfers
            .lock()
            .map_err(|_| InsuranceError::TransferFailed {
                to: *to,
                reason: "null bank poisoned".into(),
            })?
            .push((*to, amount));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[test]
    fn records_and_fails_on_demand() {
        let bank = NullBank::new();
        let to = Address::from_index(1);
        bank.transfer(&to, Wei::new(5)).unwrap();
        bank.set_failing(true);
        assert!(bank.transfer(&to, Wei::new(7)).is_err());
        assert_eq!(bank.paid_to(&to), Wei::new(5));
    }

    #[test]
    fn hook_runs_inside_transfer() {
        let bank = NullBank::new();
        let calls = Arc::new(AtomicU32::new(0));
        let seen = calls.clone();
        bank.on_transfer(move |_, _| {
            seen.fetch_add(1, Ordering::SeqCst);
        });
        bank.transfer(&Address::from_index(1), Wei::new(1)).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
