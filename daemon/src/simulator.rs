//! Oracle simulator.
//!
//! Registers a pool of oracles, listens for opened status requests and has
//! every oracle holding the requested index report one randomly chosen
//! status code for that request.

use std::sync::Arc;

use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, info, warn};

use surety_node::{NodeError, SuretyEvent, SuretyNode};
use surety_oracle::OracleEvent;
use surety_types::{Address, RequestKey, StatusCode, Wei};
use surety_vrf::{draw_index, HashChainRandom, VrfProvider};

/// First address handed to simulated oracles.
pub const ORACLE_ADDRESS_BASE: u32 = 10_000;

pub struct OracleSimulator {
    node: Arc<SuretyNode>,
    oracles: Vec<(Address, [u8; 3])>,
    rng: HashChainRandom,
}

impl OracleSimulator {
    /// Register `count` oracles, paying `fee` for each.
    pub fn register(node: Arc<SuretyNode>, count: u32, fee: Wei, seed: u64) -> Result<Self, NodeError> {
        let mut oracles = Vec::with_capacity(count as usize);
        for n in 0..count {
            let address = Address::from_index(ORACLE_ADDRESS_BASE + n);
            let indexes = node.register_oracle(address, fee)?;
            debug!(oracle = %address, ?indexes, "simulated oracle registered");
            oracles.push((address, indexes));
        }
        info!(count, "oracle simulator ready");
        Ok(Self {
            node,
            oracles,
            rng: HashChainRandom::from_u64(seed),
        })
    }

    pub fn oracles(&self) -> &[(Address, [u8; 3])] {
        &self.oracles
    }

    /// The status this simulated world reports for a request.
    fn observe(&self, key: &RequestKey) -> Result<StatusCode, NodeError> {
        let pick = draw_index(
            &self.rng as &dyn VrfProvider,
            key.to_string().as_bytes(),
            StatusCode::ALL.len() as u8,
        )?;
        Ok(StatusCode::ALL[usize::from(pick)])
    }

    /// Answer one opened request. Returns the number of responses accepted.
    pub fn answer(&self, key: &RequestKey, index: u8) -> Result<u32, NodeError> {
        let status = self.observe(key)?;
        let mut accepted = 0;
        for (oracle, indexes) in self.oracles.iter().filter(|(_, ix)| ix.contains(&index)) {
            match self.node.submit_response(*oracle, key, index, status) {
                Ok(outcome) => {
                    accepted += 1;
                    debug!(%oracle, ?indexes, %status, ?outcome, "simulated response");
                }
                Err(e) => warn!(%oracle, error = %e, "simulated response rejected"),
            }
        }
        Ok(accepted)
    }

    /// Consume events until the channel closes or `shutdown` fires.
    pub async fn run(
        self,
        mut events: broadcast::Receiver<SuretyEvent>,
        mut shutdown: broadcast::Receiver<()>,
    ) {
        loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    info!("oracle simulator stopping");
                    return;
                }
                received = events.recv() => match received {
                    Ok(SuretyEvent::Oracle {
                        event: OracleEvent::RequestOpened { key, index, .. },
                    }) => {
                        if let Err(e) = self.answer(&key, index) {
                            warn!(request = %key, error = %e, "could not answer request");
                        }
                    }
                    Ok(_) => {}
                    Err(RecvError::Lagged(n)) => {
                        warn!(skipped = n, "oracle simulator lagged behind the event feed");
                    }
                    Err(RecvError::Closed) => return,
                },
            }
        }
    }
}
