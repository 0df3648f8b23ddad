use proptest::prelude::*;
use std::sync::Arc;

use surety_nullables::{NullBank, NullClock, NullRandom};
use surety_node::{NodeConfig, NodeError, SuretyNode};
use surety_types::{Address, FlightKey, StatusCode, Wei};

#[derive(Clone, Debug)]
enum Op {
    Register(u32),
    Fund(u32, u128),
    Flight(u32),
    Oracle(u32),
    Purchase(u32, u128),
    Withdraw(u32),
}

fn any_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (1u32..10).prop_map(Op::Register),
        (1u32..10, 0u128..50).prop_map(|(a, e)| Op::Fund(a, e)),
        (1u32..10).prop_map(Op::Flight),
        (0u32..10).prop_map(Op::Oracle),
        (0u32..10, 1u128..1_000).prop_map(|(p, w)| Op::Purchase(p, w)),
        (0u32..10).prop_map(Op::Withdraw),
    ]
}

fn node() -> SuretyNode {
    let config = NodeConfig {
        owner: Address::from_index(999),
        ..NodeConfig::default()
    };
    SuretyNode::new(
        config,
        Arc::new(NullRandom::leading_bytes(&[7])),
        Arc::new(NullClock::new(1_000)),
        Arc::new(NullBank::new()),
    )
    .unwrap()
}

fn apply(node: &SuretyNode, op: &Op) -> Result<(), NodeError> {
    let airline = Address::from_index(1);
    let flight = FlightKey::new(airline, "ND1309");
    match op {
        Op::Register(n) => node.request_registration(airline, Address::from_index(*n)).map(drop),
        Op::Fund(n, ether) => node
            .fund(airline, Address::from_index(*n), Wei::from_ether(*ether))
            .map(drop),
        Op::Flight(n) => node.register_flight(Address::from_index(*n), "ND1309").map(drop),
        Op::Oracle(n) => node
            .register_oracle(Address::from_index(100 + n), Wei::from_ether(1))
            .map(drop),
        Op::Purchase(p, wei) => node
            .purchase(Address::from_index(1_000 + p), flight, Wei::new(*wei))
            .map(drop),
        Op::Withdraw(p) => node.withdraw(Address::from_index(1_000 + p)).map(drop),
    }
}

proptest! {
    /// While paused, every mutating call fails and the state stays byte-identical.
    #[test]
    fn paused_registry_is_frozen(
        setup in prop::collection::vec(any_op(), 0..20),
        attempts in prop::collection::vec(any_op(), 1..20),
    ) {
        let node = node();
        for op in &setup {
            let _ = apply(&node, op);
        }
        node.set_operating_status(Address::from_index(999), false).unwrap();
        let before = node.snapshot().unwrap();

        for op in &attempts {
            prop_assert!(matches!(apply(&node, op), Err(NodeError::SystemNotOperational)));
        }
        prop_assert_eq!(node.snapshot().unwrap(), before);
    }

    /// Rejected calls leave the state exactly as it was.
    #[test]
    fn rejected_calls_change_nothing(ops in prop::collection::vec(any_op(), 1..40)) {
        let node = node();
        for op in &ops {
            let before = node.snapshot().unwrap();
            if apply(&node, op).is_err() {
                prop_assert_eq!(node.snapshot().unwrap(), before);
            }
        }
        prop_assert_eq!(
            node.flight_status(&FlightKey::new(Address::from_index(1), "ND1309"))
                .unwrap_or(StatusCode::Unknown),
            StatusCode::Unknown
        );
    }
}
