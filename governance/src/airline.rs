//! Airline records and funding.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use surety_types::{Address, Wei};
use tracing::info;

use crate::error::GovernanceError;

/// An airline known to the registry.
///
/// Invariant: `is_funded` implies `funded_amount >= minimum_funding`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Airline {
    pub address: Address,
    pub is_registered: bool,
    pub is_funded: bool,
    pub funded_amount: Wei,
}

/// Result of a successful [`AccountLedger::fund`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FundingReceipt {
    /// Total deposited by the airline so far.
    pub total: Wei,
    /// Whether this deposit made the airline funded.
    pub newly_funded: bool,
}

/// Owns all airline records. Records are never deleted.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AccountLedger {
    minimum_funding: Wei,
    airlines: BTreeMap<Address, Airline>,
    funded_count: u32,
}

impl AccountLedger {
    pub fn new(minimum_funding: Wei) -> Self {
        Self {
            minimum_funding,
            airlines: BTreeMap::new(),
            funded_count: 0,
        }
    }

    /// Register an unfunded airline.
    pub fn register_candidate(&mut self, address: Address) -> Result<(), GovernanceError> {
        if self.airlines.contains_key(&address) {
            return Err(GovernanceError::AlreadyRegistered(address));
        }
        self.airlines.insert(
            address,
            Airline {
                address,
                is_registered: true,
                is_funded: false,
                funded_amount: Wei::ZERO,
            },
        );
        info!(airline = %address, "airline registered");
        Ok(())
    }

    /// Deposit funds for a registered airline.
    ///
    /// Every deposit must be at least the minimum funding. The funded count
    /// only moves the first time an airline becomes funded.
    pub fn fund(&mut self, address: &Address, amount: Wei) -> Result<FundingReceipt, GovernanceError> {
        let minimum = self.minimum_funding;
        let airline = self
            .airlines
            .get_mut(address)
            .ok_or(GovernanceError::NotRegistered(*address))?;
        if amount < minimum {
            return Err(GovernanceError::InsufficientFunding {
                provided: amount,
                minimum,
            });
        }
        let total = airline
            .funded_amount
            .checked_add(amount)
            .ok_or(GovernanceError::FundingOverflow(*address))?;

        airline.funded_amount = total;
        let newly_funded = !airline.is_funded;
        if newly_funded {
            airline.is_funded = true;
            self.funded_count += 1;
            info!(airline = %address, funded_count = self.funded_count, "airline funded");
        }
        Ok(FundingReceipt {
            total,
            newly_funded,
        })
    }

    pub fn is_registered(&self, address: &Address) -> bool {
        self.airlines.get(address).is_some_and(|a| a.is_registered)
    }

    pub fn is_funded(&self, address: &Address) -> bool {
        self.airlines.get(address).is_some_and(|a| a.is_funded)
    }

    pub fn funded_count(&self) -> u32 {
        self.funded_count
    }

    /// Total deposited by an airline; zero if unknown.
    pub fn funded_amount(&self, address: &Address) -> Wei {
        self.airlines
            .get(address)
            .map(|a| a.funded_amount)
            .unwrap_or(Wei::ZERO)
    }

    pub fn get(&self, address: &Address) -> Option<&Airline> {
        self.airlines.get(address)
    }

    pub fn registered_count(&self) -> usize {
        self.airlines.len()
    }

    pub fn minimum_funding(&self) -> Wei {
        self.minimum_funding
    }
}
