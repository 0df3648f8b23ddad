//! Every ledger the registry owns, kept together so one lock covers them.

use serde::{Deserialize, Serialize};

use surety_flights::FlightRegistry;
use surety_governance::{AccountLedger, AirlineGovernance};
use surety_insurance::InsuranceLedger;
use surety_oracle::{ConsensusEngine, OracleRegistry};
use surety_types::{Address, ProtocolParams};

use crate::NodeError;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RegistryState {
    pub params: ProtocolParams,
    pub operational: bool,
    pub accounts: AccountLedger,
    pub governance: AirlineGovernance,
    pub flights: FlightRegistry,
    pub oracles: OracleRegistry,
    pub consensus: ConsensusEngine,
    pub insurance: InsuranceLedger,
}

impl RegistryState {
    /// Fresh, operational state with the genesis airline (if any) registered.
    pub fn genesis(params: ProtocolParams, genesis_airline: Option<Address>) -> Result<Self, NodeError> {
        let mut accounts = AccountLedger::new(params.minimum_funding);
        if let Some(airline) = genesis_airline {
            accounts.register_candidate(airline)?;
        }
        Ok(Self {
            operational: true,
            governance: AirlineGovernance::new(params.governance_threshold),
            flights: FlightRegistry::new(),
            oracles: OracleRegistry::new(&params),
            consensus: ConsensusEngine::new(&params),
            insurance: InsuranceLedger::new(&params),
            accounts,
            params,
        })
    }

    pub fn ensure_operational(&self) -> Result<(), NodeError> {
        if self.operational {
            Ok(())
        } else {
            Err(NodeError::SystemNotOperational)
        }
    }
}
