//! Consensus engine: opens status requests and tallies oracle responses.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};
use surety_flights::{FlightError, FlightRegistry};
use surety_types::{Address, FlightKey, ProtocolParams, RequestKey, StatusCode, Timestamp};
use surety_vrf::{draw_index, VrfProvider};
use tracing::{debug, info, warn};

use crate::error::OracleError;
use crate::event::OracleEvent;
use crate::registry::OracleRegistry;
use crate::request::OracleRequest;

/// What an accepted response did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResponseOutcome {
    /// Recorded; `count` oracles now agree on `status`.
    Recorded { status: StatusCode, count: u32 },
    /// The oracle repeated its earlier answer. Nothing changed.
    Duplicate,
    /// This response completed the quorum and set the flight status.
    Finalized { status: StatusCode },
    /// Recorded against a request that was already finalized with `status`.
    Closed { status: StatusCode },
}

/// Owns every oracle request and is the only writer of flight statuses.
///
/// Published events accumulate in an outbox; the caller drains them with
/// [`ConsensusEngine::drain_events`] and delivers them without blocking the
/// engine.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConsensusEngine {
    index_space: u8,
    min_responses: u32,
    request_timeout_secs: Option<u64>,
    requests: BTreeMap<RequestKey, OracleRequest>,
    #[serde(skip)]
    outbox: VecDeque<OracleEvent>,
}

impl ConsensusEngine {
    pub fn new(params: &ProtocolParams) -> Self {
        Self {
            index_space: params.oracle_index_space,
            min_responses: params.min_responses,
            request_timeout_secs: params.request_timeout_secs,
            requests: BTreeMap::new(),
            outbox: VecDeque::new(),
        }
    }

    /// Open a status request for a registered flight.
    ///
    /// A request already filed for the same flight at the same timestamp is
    /// returned as-is; no new index is drawn and nothing is published.
    pub fn request_status(
        &mut self,
        flights: &FlightRegistry,
        rng: &dyn VrfProvider,
        requester: Address,
        flight: FlightKey,
        now: Timestamp,
    ) -> Result<RequestKey, OracleError> {
        if !flights.contains(&flight) {
            return Err(FlightError::NotFound(flight).into());
        }
        let key = RequestKey::new(flight, now);
        if self.requests.contains_key(&key) {
            debug!(request = %key, "status request already filed");
            return Ok(key);
        }

        let context = key.to_string();
        let index = draw_index(rng, context.as_bytes(), self.index_space)?;
        self.requests
            .insert(key.clone(), OracleRequest::new(key.clone(), index, requester));
        info!(request = %key, index, %requester, "status request opened");
        self.outbox.push_back(OracleEvent::RequestOpened {
            key: key.clone(),
            index,
            requester,
        });
        Ok(key)
    }

    /// Accept one oracle response.
    ///
    /// The first code to reach `min_responses` distinct oracles finalizes the
    /// request and is written to the flight registry exactly once. Later
    /// responses are still validated and recorded but never re-finalize.
    #[allow(clippy::too_many_arguments)]
    pub fn submit_response(
        &mut self,
        oracles: &OracleRegistry,
        flights: &mut FlightRegistry,
        oracle: Address,
        key: &RequestKey,
        index: u8,
        status: StatusCode,
        now: Timestamp,
    ) -> Result<ResponseOutcome, OracleError> {
        let min_responses = self.min_responses;
        let timeout = self.request_timeout_secs;
        let request = self
            .requests
            .get_mut(key)
            .ok_or_else(|| OracleError::StaleRequest(key.clone()))?;

        if is_expired(timeout, request, now) {
            return Err(OracleError::StaleRequest(key.clone()));
        }

        let assigned = oracles
            .get(&oracle)
            .ok_or(OracleError::NotRegistered(oracle))?;
        if index != request.index || !assigned.holds(index) {
            warn!(%oracle, index, expected = request.index, "response with mismatched index");
            return Err(OracleError::IndexMismatch { oracle, index });
        }

        match request.response_of(&oracle) {
            Some(previous) if previous == status => return Ok(ResponseOutcome::Duplicate),
            Some(previous) => {
                warn!(%oracle, %previous, submitted = %status, "conflicting oracle response");
                return Err(OracleError::ConflictingResponse {
                    oracle,
                    previous,
                    submitted: status,
                });
            }
            None => {}
        }

        let count = request.count_for(status) + 1;
        let finalizes = request.is_open() && count >= min_responses;
        if finalizes {
            // Write the flight first so a failure leaves the request untouched.
            flights.set_status(&key.flight, status)?;
        }

        request.record(oracle, status);
        debug!(request = %key, %oracle, %status, count, "oracle response recorded");
        self.outbox.push_back(OracleEvent::Report {
            key: key.clone(),
            oracle,
            status,
        });

        if let Some(final_status) = request.finalized {
            return Ok(ResponseOutcome::Closed {
                status: final_status,
            });
        }
        if finalizes {
            request.finalized = Some(status);
            info!(request = %key, %status, count, "flight status finalized");
            self.outbox.push_back(OracleEvent::FinalStatus {
                key: key.clone(),
                status,
            });
            return Ok(ResponseOutcome::Finalized { status });
        }
        Ok(ResponseOutcome::Recorded { status, count })
    }

    pub fn request(&self, key: &RequestKey) -> Option<&OracleRequest> {
        self.requests.get(key)
    }

    /// Requests still waiting for quorum and not yet timed out at `now`.
    pub fn open_requests(&self, now: Timestamp) -> impl Iterator<Item = &OracleRequest> {
        let timeout = self.request_timeout_secs;
        self.requests
            .values()
            .filter(move |r| r.is_open() && !is_expired(timeout, r, now))
    }

    /// Take every event published since the last drain, oldest first.
    pub fn drain_events(&mut self) -> Vec<OracleEvent> {
        self.outbox.drain(..).collect()
    }

    pub fn min_responses(&self) -> u32 {
        self.min_responses
    }
}

/// Only open requests expire; finalized ones stay answerable as `Closed`.
fn is_expired(timeout: Option<u64>, request: &OracleRequest, now: Timestamp) -> bool {
    request.is_open() && timeout.is_some_and(|secs| request.opened_at().has_expired(secs, now))
}

#[cfg(test)]
mod tests {
    use super::*;
    use surety_governance::AccountLedger;
    use surety_nullables::NullRandom;

    fn airline() -> Address {
        Address::from_index(1)
    }

    fn oracle(n: u32) -> Address {
        Address::from_index(100 + n)
    }

    struct Fixture {
        params: ProtocolParams,
        flights: FlightRegistry,
        oracles: OracleRegistry,
        engine: ConsensusEngine,
        flight: FlightKey,
    }

    /// Oracles 0..holders get indexes [7, 1, 2]; the rest get [0, 1, 2].
    fn fixture(total: u32, holders: u32) -> Fixture {
        let params = ProtocolParams::default();
        let mut ledger = AccountLedger::new(params.minimum_funding);
        ledger.register_candidate(airline()).unwrap();
        ledger.fund(&airline(), params.minimum_funding).unwrap();
        let mut flights = FlightRegistry::new();
        let flight = FlightKey::new(airline(), "ND1309");
        flights.register_flight(&ledger, flight.clone()).unwrap();

        let script: Vec<u8> = (0..total).map(|n| if n < holders { 7 } else { 0 }).collect();
        let rng = NullRandom::leading_bytes(&script);
        let mut oracles = OracleRegistry::new(&params);
        for n in 0..total {
            oracles
                .register(&rng, oracle(n), params.oracle_registration_fee)
                .unwrap();
        }
        let engine = ConsensusEngine::new(&params);
        Fixture {
            params,
            flights,
            oracles,
            engine,
            flight,
        }
    }

    fn open(f: &mut Fixture, index: u8, at: u64) -> RequestKey {
        let rng = NullRandom::leading_bytes(&[index]);
        f.engine
            .request_status(&f.flights, &rng, airline(), f.flight.clone(), Timestamp::new(at))
            .unwrap()
    }

    fn respond(
        f: &mut Fixture,
        n: u32,
        key: &RequestKey,
        index: u8,
        status: StatusCode,
    ) -> Result<ResponseOutcome, OracleError> {
        f.engine.submit_response(
            &f.oracles,
            &mut f.flights,
            oracle(n),
            key,
            index,
            status,
            Timestamp::new(2_000),
        )
    }

    #[test]
    fn request_publishes_index() {
        let mut f = fixture(3, 3);
        let key = open(&mut f, 7, 1_000);
        assert_eq!(f.engine.request(&key).unwrap().index, 7);
        let events = f.engine.drain_events();
        assert_eq!(
            events,
            vec![OracleEvent::RequestOpened {
                key: key.clone(),
                index: 7,
                requester: airline(),
            }]
        );
        assert!(f.engine.drain_events().is_empty());
    }

    #[test]
    fn request_for_unknown_flight_fails() {
        let mut f = fixture(0, 0);
        let rng = NullRandom::leading_bytes(&[7]);
        let result = f.engine.request_status(
            &f.flights,
            &rng,
            airline(),
            FlightKey::new(airline(), "NOPE"),
            Timestamp::new(1),
        );
        assert!(matches!(
            result,
            Err(OracleError::Flight(FlightError::NotFound(_)))
        ));
    }

    #[test]
    fn same_second_request_is_reused() {
        let mut f = fixture(3, 3);
        let first = open(&mut f, 7, 1_000);
        let second = open(&mut f, 3, 1_000);
        assert_eq!(first, second);
        assert_eq!(f.engine.request(&first).unwrap().index, 7);
        assert_eq!(f.engine.drain_events().len(), 1);
    }

    #[test]
    fn quorum_of_three_finalizes_once() {
        let mut f = fixture(5, 4);
        let key = open(&mut f, 7, 1_000);

        assert_eq!(
            respond(&mut f, 0, &key, 7, StatusCode::LateAirline).unwrap(),
            ResponseOutcome::Recorded {
                status: StatusCode::LateAirline,
                count: 1
            }
        );
        respond(&mut f, 1, &key, 7, StatusCode::LateAirline).unwrap();
        assert_eq!(f.flights.get_status(&f.flight), Ok(StatusCode::Unknown));

        assert_eq!(
            respond(&mut f, 2, &key, 7, StatusCode::LateAirline).unwrap(),
            ResponseOutcome::Finalized {
                status: StatusCode::LateAirline
            }
        );
        assert_eq!(f.flights.get_status(&f.flight), Ok(StatusCode::LateAirline));

        assert_eq!(
            respond(&mut f, 3, &key, 7, StatusCode::OnTime).unwrap(),
            ResponseOutcome::Closed {
                status: StatusCode::LateAirline
            }
        );
        assert_eq!(f.flights.get_status(&f.flight), Ok(StatusCode::LateAirline));
        assert_eq!(f.engine.request(&key).unwrap().count_for(StatusCode::OnTime), 1);

        let finals = f
            .engine
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, OracleEvent::FinalStatus { .. }))
            .count();
        assert_eq!(finals, 1);
        assert_eq!(f.engine.open_requests(Timestamp::new(2_000)).count(), 0);
    }

    #[test]
    fn unknown_request_is_stale() {
        let mut f = fixture(3, 3);
        let bogus = RequestKey::new(f.flight.clone(), Timestamp::new(5));
        assert!(matches!(
            respond(&mut f, 0, &bogus, 7, StatusCode::OnTime),
            Err(OracleError::StaleRequest(_))
        ));
    }

    #[test]
    fn wrong_index_rejected() {
        let mut f = fixture(4, 3);
        let key = open(&mut f, 7, 1_000);
        // Oracle 3 holds [0, 1, 2]: right request index, wrong holder.
        assert!(matches!(
            respond(&mut f, 3, &key, 7, StatusCode::OnTime),
            Err(OracleError::IndexMismatch { index: 7, .. })
        ));
        // Oracle 0 holds 1 but the request named 7.
        assert!(matches!(
            respond(&mut f, 0, &key, 1, StatusCode::OnTime),
            Err(OracleError::IndexMismatch { index: 1, .. })
        ));
        assert!(f.engine.request(&key).unwrap().responders.is_empty());
    }

    #[test]
    fn unregistered_oracle_rejected() {
        let mut f = fixture(3, 3);
        let key = open(&mut f, 7, 1_000);
        assert!(matches!(
            respond(&mut f, 50, &key, 7, StatusCode::OnTime),
            Err(OracleError::NotRegistered(_))
        ));
    }

    #[test]
    fn repeat_is_noop_and_change_is_conflict() {
        let mut f = fixture(3, 3);
        let key = open(&mut f, 7, 1_000);
        respond(&mut f, 0, &key, 7, StatusCode::LateWeather).unwrap();
        assert_eq!(
            respond(&mut f, 0, &key, 7, StatusCode::LateWeather).unwrap(),
            ResponseOutcome::Duplicate
        );
        assert!(matches!(
            respond(&mut f, 0, &key, 7, StatusCode::OnTime),
            Err(OracleError::ConflictingResponse {
                previous: StatusCode::LateWeather,
                submitted: StatusCode::OnTime,
                ..
            })
        ));
        let request = f.engine.request(&key).unwrap();
        assert_eq!(request.count_for(StatusCode::LateWeather), 1);
        assert_eq!(request.count_for(StatusCode::OnTime), 0);
    }

    #[test]
    fn split_votes_do_not_finalize() {
        let mut f = fixture(6, 6);
        let key = open(&mut f, 7, 1_000);
        for (n, code) in [
            (0, StatusCode::OnTime),
            (1, StatusCode::LateAirline),
            (2, StatusCode::OnTime),
            (3, StatusCode::LateAirline),
        ] {
            respond(&mut f, n, &key, 7, code).unwrap();
        }
        assert!(f.engine.request(&key).unwrap().is_open());
        assert_eq!(f.flights.get_status(&f.flight), Ok(StatusCode::Unknown));
        assert_eq!(
            respond(&mut f, 4, &key, 7, StatusCode::OnTime).unwrap(),
            ResponseOutcome::Finalized {
                status: StatusCode::OnTime
            }
        );
    }

    #[test]
    fn open_request_expires_when_timeout_set() {
        let mut f = fixture(3, 3);
        f.params.request_timeout_secs = Some(600);
        f.engine = ConsensusEngine::new(&f.params);
        let key = open(&mut f, 7, 1_000);
        assert_eq!(f.engine.open_requests(Timestamp::new(1_500)).count(), 1);
        assert_eq!(f.engine.open_requests(Timestamp::new(1_600)).count(), 0);
        // respond() submits at t = 2000, past the 600 s window.
        assert!(matches!(
            respond(&mut f, 0, &key, 7, StatusCode::OnTime),
            Err(OracleError::StaleRequest(_))
        ));
        let in_time = f.engine.submit_response(
            &f.oracles,
            &mut f.flights,
            oracle(0),
            &key,
            7,
            StatusCode::OnTime,
            Timestamp::new(1_500),
        );
        assert!(in_time.is_ok());
    }

    #[test]
    fn requery_opens_new_request_and_may_change_status() {
        let mut f = fixture(3, 3);
        let first = open(&mut f, 7, 1_000);
        for n in 0..3 {
            respond(&mut f, n, &first, 7, StatusCode::LateTechnical).unwrap();
        }
        let second = open(&mut f, 7, 5_000);
        assert_ne!(first, second);
        for n in 0..3 {
            respond(&mut f, n, &second, 7, StatusCode::OnTime).unwrap();
        }
        assert_eq!(f.flights.get_status(&f.flight), Ok(StatusCode::OnTime));
        assert_eq!(
            f.engine.request(&first).unwrap().finalized,
            Some(StatusCode::LateTechnical)
        );
    }
}
