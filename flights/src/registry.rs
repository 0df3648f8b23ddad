//! Flight records keyed by (airline, flight number).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use surety_governance::AccountLedger;
use surety_types::{Address, FlightKey, StatusCode};
use tracing::{debug, info};

use crate::error::FlightError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flight {
    pub key: FlightKey,
    pub status: StatusCode,
    pub is_registered: bool,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct FlightRegistry {
    flights: BTreeMap<FlightKey, Flight>,
}

impl FlightRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a flight for a funded airline. Status starts as `Unknown`.
    pub fn register_flight(
        &mut self,
        ledger: &AccountLedger,
        key: FlightKey,
    ) -> Result<(), FlightError> {
        if !ledger.is_funded(&key.airline) {
            return Err(FlightError::Unauthorized(key.airline));
        }
        key.validate()?;
        if self.flights.contains_key(&key) {
            return Err(FlightError::DuplicateFlight(key));
        }
        info!(flight = %key, "flight registered");
        self.flights.insert(
            key.clone(),
            Flight {
                key,
                status: StatusCode::Unknown,
                is_registered: true,
            },
        );
        Ok(())
    }

    pub fn get_status(&self, key: &FlightKey) -> Result<StatusCode, FlightError> {
        self.flights
            .get(key)
            .map(|f| f.status)
            .ok_or_else(|| FlightError::NotFound(key.clone()))
    }

    /// Overwrite a flight's status. Returns whether the code changed.
    ///
    /// Only oracle consensus finalization writes statuses.
    pub fn set_status(&mut self, key: &FlightKey, code: StatusCode) -> Result<bool, FlightError> {
        let flight = self
            .flights
            .get_mut(key)
            .ok_or_else(|| FlightError::NotFound(key.clone()))?;
        if flight.status == code {
            return Ok(false);
        }
        debug!(flight = %key, from = %flight.status, to = %code, "flight status updated");
        flight.status = code;
        Ok(true)
    }

    pub fn contains(&self, key: &FlightKey) -> bool {
        self.flights.contains_key(key)
    }

    pub fn get(&self, key: &FlightKey) -> Option<&Flight> {
        self.flights.get(key)
    }

    pub fn flights_of<'a>(&'a self, airline: &'a Address) -> impl Iterator<Item = &'a Flight> + 'a {
        self.flights.values().filter(move |f| &f.key.airline == airline)
    }

    pub fn len(&self) -> usize {
        self.flights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flights.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use surety_types::Wei;

    fn airline(n: u32) -> Address {
        Address::from_index(n)
    }

    fn ledger_with(funded: &[u32], unfunded: &[u32]) -> AccountLedger {
        let mut ledger = AccountLedger::new(Wei::from_ether(10));
        for n in funded {
            ledger.register_candidate(airline(*n)).unwrap();
            ledger.fund(&airline(*n), Wei::from_ether(10)).unwrap();
        }
        for n in unfunded {
            ledger.register_candidate(airline(*n)).unwrap();
        }
        ledger
    }

    #[test]
    fn funded_airline_registers_flight_with_unknown_status() {
        let ledger = ledger_with(&[1], &[]);
        let mut flights = FlightRegistry::new();
        let key = FlightKey::new(airline(1), "ND1309");
        flights.register_flight(&ledger, key.clone()).unwrap();
        assert_eq!(flights.get_status(&key), Ok(StatusCode::Unknown));
        assert!(flights.get(&key).unwrap().is_registered);
    }

    #[test]
    fn unfunded_airline_unauthorized() {
        let ledger = ledger_with(&[], &[2]);
        let mut flights = FlightRegistry::new();
        let key = FlightKey::new(airline(2), "ND1309");
        assert_eq!(
            flights.register_flight(&ledger, key),
            Err(FlightError::Unauthorized(airline(2)))
        );
        assert!(flights.is_empty());
    }

    #[test]
    fn duplicate_flight_rejected() {
        let ledger = ledger_with(&[1], &[]);
        let mut flights = FlightRegistry::new();
        let key = FlightKey::new(airline(1), "ND1309");
        flights.register_flight(&ledger, key.clone()).unwrap();
        assert_eq!(
            flights.register_flight(&ledger, key.clone()),
            Err(FlightError::DuplicateFlight(key))
        );
    }

    #[test]
    fn unknown_flight_not_found() {
        let flights = FlightRegistry::new();
        let key = FlightKey::new(airline(1), "XX1");
        assert_eq!(flights.get_status(&key), Err(FlightError::NotFound(key)));
    }

    #[test]
    fn set_status_is_idempotent_and_overwrites() {
        let ledger = ledger_with(&[1], &[]);
        let mut flights = FlightRegistry::new();
        let key = FlightKey::new(airline(1), "ND1309");
        flights.register_flight(&ledger, key.clone()).unwrap();

        assert_eq!(flights.set_status(&key, StatusCode::LateAirline), Ok(true));
        assert_eq!(flights.set_status(&key, StatusCode::LateAirline), Ok(false));
        assert_eq!(flights.set_status(&key, StatusCode::OnTime), Ok(true));
        assert_eq!(flights.get_status(&key), Ok(StatusCode::OnTime));
    }

    #[test]
    fn flights_of_filters_by_airline() {
        let ledger = ledger_with(&[1, 2], &[]);
        let mut flights = FlightRegistry::new();
        flights
            .register_flight(&ledger, FlightKey::new(airline(1), "A1"))
            .unwrap();
        flights
            .register_flight(&ledger, FlightKey::new(airline(1), "A2"))
            .unwrap();
        flights
            .register_flight(&ledger, FlightKey::new(airline(2), "B1"))
            .unwrap();
        assert_eq!(flights.flights_of(&airline(1)).count(), 2);
        assert_eq!(flights.len(), 3);
    }
}
