//! Insurance ledger: purchases, crediting and withdrawals.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use surety_flights::FlightRegistry;
use surety_types::{Address, FlightKey, ProtocolParams, StatusCode, Wei};
use tracing::{debug, info, warn};

use crate::error::InsuranceError;
use crate::policy::InsurancePolicy;

/// Result of crediting one flight.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CreditSummary {
    pub policies: u32,
    pub total: Wei,
}

/// Credit taken out of the ledger by [`InsuranceLedger::withdraw`].
///
/// Holds the per-policy amounts so a failed transfer can be reverted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Withdrawal {
    pub passenger: Address,
    pub amount: Wei,
    pub policies: Vec<(FlightKey, Wei)>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InsuranceLedger {
    params: ProtocolParams,
    /// Policies per flight, per passenger.
    policies: BTreeMap<FlightKey, BTreeMap<Address, InsurancePolicy>>,
}

impl InsuranceLedger {
    pub fn new(params: &ProtocolParams) -> Self {
        Self {
            params: params.clone(),
            policies: BTreeMap::new(),
        }
    }

    /// Buy (or top up) a policy on a flight whose status is still unknown.
    ///
    /// The cap applies to the passenger's total premium on the flight.
    /// A policy that has already been credited is closed to top-ups.
    /// Returns that total.
    pub fn purchase(
        &mut self,
        flights: &FlightRegistry,
        passenger: Address,
        flight: FlightKey,
        amount: Wei,
    ) -> Result<Wei, InsuranceError> {
        match flights.get_status(&flight) {
            Ok(StatusCode::Unknown) => {}
            _ => return Err(InsuranceError::Unauthorized(flight)),
        }
        if amount.is_zero() {
            return Err(InsuranceError::ZeroPremium);
        }

        let existing = self.policy(&passenger, &flight);
        if existing.is_some_and(|p| p.credited) {
            warn!(%passenger, %flight, "top-up on a credited policy refused");
            return Err(InsuranceError::Unauthorized(flight));
        }
        let already = existing.map_or(Wei::ZERO, |p| p.amount_paid);
        let total = already.saturating_add(amount);
        if total > self.params.max_premium {
            return Err(InsuranceError::AmountExceedsCap {
                requested: total,
                cap: self.params.max_premium,
            });
        }

        let policy = self
            .policies
            .entry(flight.clone())
            .or_default()
            .entry(passenger)
            .or_insert_with(|| InsurancePolicy::new(passenger, flight.clone(), Wei::ZERO));
        policy.amount_paid = total;
        info!(%passenger, %flight, premium = %total, "insurance purchased");
        Ok(total)
    }

    /// Credit every uncredited policy on a flight settled as airline-late.
    ///
    /// Any other status credits nothing. Running it again credits nothing new.
    pub fn credit_if_eligible(
        &mut self,
        flights: &FlightRegistry,
        flight: &FlightKey,
    ) -> Result<CreditSummary, InsuranceError> {
        let status = flights
            .get_status(flight)
            .map_err(|_| InsuranceError::Unauthorized(flight.clone()))?;
        if !status.is_airline_fault() {
            debug!(%flight, %status, "flight not eligible for payout");
            return Ok(CreditSummary::default());
        }
        let Some(policies) = self.policies.get_mut(flight) else {
            return Ok(CreditSummary::default());
        };

        // Compute every payout before touching any policy.
        let mut payouts = Vec::new();
        for (passenger, policy) in policies.iter().filter(|(_, p)| !p.credited) {
            let payout = self
                .params
                .payout_for(policy.amount_paid)
                .ok_or_else(|| InsuranceError::PayoutOverflow(flight.clone()))?;
            payouts.push((*passenger, payout));
        }

        let mut summary = CreditSummary::default();
        for (passenger, payout) in payouts {
            if let Some(policy) = policies.get_mut(&passenger) {
                policy.payout_credit = payout;
                policy.credited = true;
                summary.policies += 1;
                summary.total = summary.total.saturating_add(payout);
            }
        }
        if summary.policies > 0 {
            info!(%flight, policies = summary.policies, total = %summary.total, "insurees credited");
        }
        Ok(summary)
    }

    /// Take all of a passenger's credit out of the ledger.
    ///
    /// Credits are zeroed here, before the caller moves any value. If the
    /// transfer then fails, hand the receipt to [`Self::revert_withdrawal`].
    pub fn withdraw(&mut self, passenger: &Address) -> Result<Withdrawal, InsuranceError> {
        let mut taken = Vec::new();
        let mut amount = Wei::ZERO;
        for (flight, by_passenger) in self.policies.iter_mut() {
            if let Some(policy) = by_passenger.get_mut(passenger) {
                if !policy.payout_credit.is_zero() {
                    amount = amount.saturating_add(policy.payout_credit);
                    taken.push((flight.clone(), policy.payout_credit));
                    policy.payout_credit = Wei::ZERO;
                }
            }
        }
        if taken.is_empty() {
            return Err(InsuranceError::NoCredit(*passenger));
        }
        debug!(%passenger, %amount, "credit withdrawn");
        Ok(Withdrawal {
            passenger: *passenger,
            amount,
            policies: taken,
        })
    }

    /// Put back the credit of a withdrawal whose transfer failed.
    pub fn revert_withdrawal(&mut self, withdrawal: &Withdrawal) {
        for (flight, credit) in &withdrawal.policies {
            if let Some(policy) = self
                .policies
                .get_mut(flight)
                .and_then(|by_passenger| by_passenger.get_mut(&withdrawal.passenger))
            {
                policy.payout_credit = policy.payout_credit.saturating_add(*credit);
            }
        }
        warn!(passenger = %withdrawal.passenger, amount = %withdrawal.amount, "withdrawal reverted");
    }

    pub fn policy(&self, passenger: &Address, flight: &FlightKey) -> Option<&InsurancePolicy> {
        self.policies.get(flight).and_then(|p| p.get(passenger))
    }

    pub fn policies_of<'a>(&'a self, passenger: &'a Address) -> impl Iterator<Item = &'a InsurancePolicy> + 'a {
        self.policies.values().filter_map(move |p| p.get(passenger))
    }

    pub fn policies_on(&self, flight: &FlightKey) -> impl Iterator<Item = &InsurancePolicy> {
        self.policies.get(flight).into_iter().flat_map(|p| p.values())
    }

    /// Credit currently available to a passenger.
    pub fn credit_of(&self, passenger: &Address) -> Wei {
        self.policies_of(passenger)
            .fold(Wei::ZERO, |acc, p| acc.saturating_add(p.payout_credit))
    }
}
