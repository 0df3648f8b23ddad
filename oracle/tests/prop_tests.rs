use proptest::prelude::*;
use std::collections::BTreeMap;

use surety_flights::FlightRegistry;
use surety_governance::AccountLedger;
use surety_nullables::NullRandom;
use surety_oracle::{ConsensusEngine, OracleEvent, OracleRegistry, ResponseOutcome};
use surety_types::{Address, FlightKey, ProtocolParams, StatusCode, Timestamp};

fn any_status() -> impl Strategy<Value = StatusCode> {
    prop::sample::select(StatusCode::ALL.to_vec())
}

/// Feed `votes` (oracle number, code) in order and return the final status.
fn run(votes: &[(u32, StatusCode)]) -> (Option<StatusCode>, StatusCode, usize) {
    let params = ProtocolParams::default();
    let airline = Address::from_index(1);
    let mut ledger = AccountLedger::new(params.minimum_funding);
    ledger.register_candidate(airline).unwrap();
    ledger.fund(&airline, params.minimum_funding).unwrap();
    let mut flights = FlightRegistry::new();
    let flight = FlightKey::new(airline, "ND1309");
    flights.register_flight(&ledger, flight.clone()).unwrap();

    // Every oracle and every request lands on index 7.
    let rng = NullRandom::leading_bytes(&[7]);
    let mut oracles = OracleRegistry::new(&params);
    for (n, _) in votes {
        oracles
            .register(&rng, Address::from_index(100 + n), params.oracle_registration_fee)
            .unwrap();
    }

    let mut engine = ConsensusEngine::new(&params);
    let key = engine
        .request_status(&flights, &rng, airline, flight.clone(), Timestamp::new(1_000))
        .unwrap();
    for (n, code) in votes {
        let outcome = engine
            .submit_response(
                &oracles,
                &mut flights,
                Address::from_index(100 + n),
                &key,
                7,
                *code,
                Timestamp::new(1_001),
            )
            .unwrap();
        assert!(!matches!(outcome, ResponseOutcome::Duplicate));
    }

    let finals = engine
        .drain_events()
        .into_iter()
        .filter(|e| matches!(e, OracleEvent::FinalStatus { .. }))
        .count();
    let finalized = engine.request(&key).unwrap().finalized;
    (finalized, flights.get_status(&flight).unwrap(), finals)
}

/// The first code to collect three votes in this order.
fn first_to_quorum(votes: &[(u32, StatusCode)]) -> Option<StatusCode> {
    let mut counts: BTreeMap<StatusCode, u32> = BTreeMap::new();
    for (_, code) in votes {
        let count = counts.entry(*code).or_default();
        *count += 1;
        if *count == 3 {
            return Some(*code);
        }
    }
    None
}

fn numbered(codes: Vec<StatusCode>) -> Vec<(u32, StatusCode)> {
    codes.into_iter().enumerate().map(|(n, c)| (n as u32, c)).collect()
}

proptest! {
    /// The flight settles on whichever code reaches quorum first, exactly once.
    #[test]
    fn first_code_to_quorum_wins(
        votes in prop::collection::vec(any_status(), 0..15)
            .prop_map(numbered)
            .prop_flat_map(|v| Just(v).prop_shuffle())
    ) {
        let expected = first_to_quorum(&votes);
        let (finalized, status, finals) = run(&votes);
        prop_assert_eq!(finalized, expected);
        prop_assert_eq!(status, expected.unwrap_or(StatusCode::Unknown));
        prop_assert_eq!(finals, usize::from(expected.is_some()));
    }

    /// With a single code able to reach quorum, arrival order does not matter.
    #[test]
    fn sole_majority_is_order_independent(
        winner in any_status(),
        extra in 0usize..4,
        others in prop::collection::vec(any_status(), 0..8),
        seed in any::<u64>(),
    ) {
        let mut codes = vec![winner; 3 + extra];
        let mut seen: BTreeMap<StatusCode, u32> = BTreeMap::new();
        for code in others.into_iter().filter(|c| *c != winner) {
            let count = seen.entry(code).or_default();
            if *count < 2 {
                *count += 1;
                codes.push(code);
            }
        }
        let votes = numbered(codes);

        let mut rotated = votes.clone();
        let len = rotated.len();
        rotated.rotate_left((seed as usize) % len);
        rotated.reverse();

        let (a, _, _) = run(&votes);
        let (b, status, _) = run(&rotated);
        prop_assert_eq!(a, Some(winner));
        prop_assert_eq!(b, Some(winner));
        prop_assert_eq!(status, winner);
    }
}
