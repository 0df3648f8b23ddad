//! Scripted end-to-end run used by `surety-daemon simulate`.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::info;

use surety_governance::Admission;
use surety_node::{SuretyEvent, SuretyNode};
use surety_oracle::OracleEvent;
use surety_types::{Address, FlightKey, RequestKey, StatusCode, Wei};

use crate::simulator::OracleSimulator;

/// First address handed to simulated passengers.
const PASSENGER_ADDRESS_BASE: u32 = 20_000;

pub struct ScenarioOptions {
    pub airlines: u32,
    pub oracles: u32,
    pub flights_per_airline: u32,
    pub passengers: u32,
    pub premium: Wei,
    pub settle_timeout: Duration,
}

#[derive(Debug, Serialize)]
pub struct FlightReport {
    pub flight: String,
    pub status: Option<StatusCode>,
    pub label: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ScenarioReport {
    pub funded_airlines: u32,
    pub oracles: usize,
    pub flights: Vec<FlightReport>,
    pub payouts: BTreeMap<Address, Wei>,
}

/// Admit and fund airlines until `target` are funded, collecting votes from
/// every funded airline once the registry requires them.
fn onboard_airlines(node: &SuretyNode, target: u32, funding: Wei) -> anyhow::Result<Vec<Address>> {
    let genesis = node
        .config()
        .genesis_airline
        .context("simulation needs a genesis airline")?;
    node.fund(genesis, genesis, funding)?;
    let mut funded = vec![genesis];

    let mut next = 1;
    while (funded.len() as u32) < target {
        let candidate = Address::from_index(genesis_offset(genesis) + next);
        next += 1;
        if node.is_registered(&candidate) {
            continue;
        }
        for sponsor in &funded {
            if let Admission::Admitted { votes } = node.request_registration(*sponsor, candidate)? {
                info!(%candidate, votes, "airline admitted");
                break;
            }
        }
        if !node.is_registered(&candidate) {
            bail!("{candidate} was not admitted by {} sponsors", funded.len());
        }
        node.fund(candidate, candidate, funding)?;
        funded.push(candidate);
    }
    Ok(funded)
}

fn genesis_offset(genesis: Address) -> u32 {
    let b = genesis.as_bytes();
    u32::from_be_bytes([b[16], b[17], b[18], b[19]])
}

/// Wait for a final status on every request, or give up at the deadline.
async fn await_settlement(
    events: &mut broadcast::Receiver<SuretyEvent>,
    mut pending: Vec<RequestKey>,
    deadline: Duration,
) -> BTreeMap<RequestKey, StatusCode> {
    let mut settled = BTreeMap::new();
    let wait = async {
        while !pending.is_empty() {
            match events.recv().await {
                Ok(SuretyEvent::Oracle {
                    event: OracleEvent::FinalStatus { key, status },
                }) => {
                    pending.retain(|k| *k != key);
                    settled.insert(key, status);
                }
                Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => {}
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    };
    if tokio::time::timeout(deadline, wait).await.is_err() {
        info!("settlement deadline reached with requests still open");
    }
    settled
}

pub async fn run(node: Arc<SuretyNode>, opts: ScenarioOptions) -> anyhow::Result<ScenarioReport> {
    let params = node.params();
    let airlines = onboard_airlines(&node, opts.airlines.max(1), params.minimum_funding)?;

    let seed = node.config().rng_seed;
    let simulator = OracleSimulator::register(
        node.clone(),
        opts.oracles,
        params.oracle_registration_fee,
        seed.wrapping_add(1),
    )?;
    let oracle_count = simulator.oracles().len();
    let (stop_tx, stop_rx) = broadcast::channel(1);
    let sim_task = tokio::spawn(simulator.run(node.subscribe(), stop_rx));

    let mut flights: Vec<FlightKey> = Vec::new();
    for (a, airline) in airlines.iter().enumerate() {
        for f in 0..opts.flights_per_airline {
            flights.push(node.register_flight(*airline, format!("SU{:02}{:02}", a, f))?);
        }
    }

    let passengers: Vec<Address> = (0..opts.passengers)
        .map(|p| Address::from_index(PASSENGER_ADDRESS_BASE + p))
        .collect();
    for flight in &flights {
        for passenger in &passengers {
            node.purchase(*passenger, flight.clone(), opts.premium)?;
        }
    }

    let mut events = node.subscribe();
    let requester = passengers
        .first()
        .or(airlines.first())
        .copied()
        .context("nobody to request flight status")?;
    let mut keys = Vec::with_capacity(flights.len());
    for flight in &flights {
        keys.push(node.request_status(requester, flight.clone())?);
    }
    let settled = await_settlement(&mut events, keys.clone(), opts.settle_timeout).await;
    info!(settled = settled.len(), total = flights.len(), "status requests finished");

    let _ = stop_tx.send(());
    sim_task.await.context("oracle simulator task failed")?;

    let mut payouts = BTreeMap::new();
    for passenger in &passengers {
        if !node.credit_of(passenger).is_zero() {
            payouts.insert(*passenger, node.withdraw(*passenger)?);
        }
    }

    let flights = keys
        .iter()
        .map(|key| {
            let status = settled.get(key).copied();
            FlightReport {
                flight: key.flight.to_string(),
                status,
                label: status.map_or("unresolved", StatusCode::label),
            }
        })
        .collect();

    Ok(ScenarioReport {
        funded_airlines: node.funded_count(),
        oracles: oracle_count,
        flights,
        payouts,
    })
}
