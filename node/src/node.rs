//! The registry node: wires every ledger together behind a single lock.
//!
//! Each public operation takes the lock once, runs to completion against all
//! ledgers and publishes its events before releasing it, so operations are
//! applied in one global order. The only work done outside the lock is the
//! payout transfer, which happens after the passenger's credit is zeroed.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use surety_governance::{Admission, FundingReceipt};
use surety_insurance::{CreditSummary, InsurancePolicy, PayoutSink};
use surety_oracle::{OracleError, OracleEvent, OracleRequest, ResponseOutcome, INDEXES_PER_ORACLE};
use surety_types::{
    Address, Clock, FlightKey, ProtocolParams, RequestKey, StatusCode, SystemClock, Timestamp, Wei,
};
use surety_vrf::{HashChainRandom, VrfProvider};

use crate::config::NodeConfig;
use crate::error::NodeError;
use crate::event::{EventBus, SuretyEvent};
use crate::metrics::SuretyMetrics;
use crate::payout::BalanceBook;
use crate::snapshot;
use crate::state::RegistryState;
use crate::tracing_spans;

/// A running flight surety registry.
pub struct SuretyNode {
    config: NodeConfig,
    state: Mutex<RegistryState>,
    rng: Arc<dyn VrfProvider>,
    clock: Arc<dyn Clock>,
    bank: Arc<dyn PayoutSink>,
    events: EventBus,
    metrics: Option<SuretyMetrics>,
}

impl SuretyNode {
    /// Build a node around injected randomness, time and payout sink.
    pub fn new(
        config: NodeConfig,
        rng: Arc<dyn VrfProvider>,
        clock: Arc<dyn Clock>,
        bank: Arc<dyn PayoutSink>,
    ) -> Result<Self, NodeError> {
        config.validate()?;
        let state = RegistryState::genesis(config.params.clone(), config.genesis_airline)?;
        let metrics = if config.enable_metrics {
            Some(SuretyMetrics::new()?)
        } else {
            None
        };
        info!(
            owner = %config.owner,
            genesis = ?config.genesis_airline.map(|a| a.to_string()),
            rng = rng.name(),
            "registry node initialised"
        );
        Ok(Self {
            events: EventBus::new(config.event_capacity),
            state: Mutex::new(state),
            rng,
            clock,
            bank,
            metrics,
            config,
        })
    }

    /// Build a node with the hash-chain RNG seeded from config, wall-clock
    /// time and an in-memory [`BalanceBook`].
    pub fn from_config(config: NodeConfig) -> Result<Self, NodeError> {
        let rng = Arc::new(HashChainRandom::from_u64(config.rng_seed));
        Self::new(config, rng, Arc::new(SystemClock), Arc::new(BalanceBook::new()))
    }

    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, f: impl FnOnce(&SuretyMetrics)) {
        if let Some(metrics) = &self.metrics {
            f(metrics);
        }
    }

    fn publish_oracle_events(&self, state: &mut RegistryState, now: Timestamp) {
        for event in state.consensus.drain_events() {
            self.events.publish(SuretyEvent::Oracle { event });
        }
        let open = state.consensus.open_requests(now).count();
        self.record(|m| m.open_requests.set(open as i64));
    }

    // ── Airlines ───────────────────────────────────────────────────────

    /// `sponsor` asks for `candidate` to be admitted.
    pub fn request_registration(
        &self,
        sponsor: Address,
        candidate: Address,
    ) -> Result<Admission, NodeError> {
        let _span =
            tracing_spans::registration_span(&candidate.to_string(), &sponsor.to_string()).entered();
        let mut guard = self.lock();
        let state = &mut *guard;
        state.ensure_operational()?;

        let admission = state
            .governance
            .request_registration(&mut state.accounts, candidate, sponsor)?;
        match admission {
            Admission::Admitted { votes } => {
                self.record(|m| m.airlines_admitted.inc());
                self.events.publish(SuretyEvent::AirlineRegistered {
                    airline: candidate,
                    sponsor,
                    votes,
                });
            }
            Admission::Pending { votes, required } => {
                self.record(|m| m.registration_votes.inc());
                self.events.publish(SuretyEvent::RegistrationVote {
                    candidate,
                    sponsor,
                    votes,
                    required,
                });
            }
        }
        Ok(admission)
    }

    /// Deposit `amount` for a registered airline.
    pub fn fund(&self, funder: Address, airline: Address, amount: Wei) -> Result<FundingReceipt, NodeError> {
        let _span = tracing_spans::funding_span(&airline.to_string()).entered();
        let mut state = self.lock();
        state.ensure_operational()?;

        let receipt = state.accounts.fund(&airline, amount)?;
        debug!(%funder, %airline, %amount, total = %receipt.total, "funding deposited");
        let funded = state.accounts.funded_count();
        self.record(|m| m.funded_airlines.set(i64::from(funded)));
        self.events.publish(SuretyEvent::AirlineFunded {
            airline,
            total: receipt.total,
        });
        Ok(receipt)
    }

    // ── Flights ────────────────────────────────────────────────────────

    pub fn register_flight(
        &self,
        airline: Address,
        flight_number: impl Into<String>,
    ) -> Result<FlightKey, NodeError> {
        let flight = FlightKey::new(airline, flight_number);
        let mut guard = self.lock();
        let state = &mut *guard;
        state.ensure_operational()?;

        state.flights.register_flight(&state.accounts, flight.clone())?;
        self.record(|m| m.flights_registered.inc());
        self.events.publish(SuretyEvent::FlightRegistered {
            flight: flight.clone(),
        });
        Ok(flight)
    }

    // ── Oracles ────────────────────────────────────────────────────────

    pub fn register_oracle(
        &self,
        oracle: Address,
        fee: Wei,
    ) -> Result<[u8; INDEXES_PER_ORACLE], NodeError> {
        let mut state = self.lock();
        state.ensure_operational()?;

        let indexes = state.oracles.register(self.rng.as_ref(), oracle, fee)?;
        self.record(|m| m.oracles_registered.inc());
        self.events
            .publish(SuretyEvent::OracleRegistered { oracle, indexes });
        Ok(indexes)
    }

    /// Open (or reuse) a status request for a flight.
    pub fn request_status(&self, requester: Address, flight: FlightKey) -> Result<RequestKey, NodeError> {
        let _span = tracing_spans::status_request_span(&flight.to_string()).entered();
        let now = self.clock.now();
        let mut guard = self.lock();
        let state = &mut *guard;
        state.ensure_operational()?;

        let key = state.consensus.request_status(
            &state.flights,
            self.rng.as_ref(),
            requester,
            flight,
            now,
        )?;
        self.record(|m| m.status_requests.inc());
        self.publish_oracle_events(state, now);
        Ok(key)
    }

    /// Record an oracle's answer. Reaching quorum with an airline-caused
    /// delay credits the flight's policies in the same step.
    pub fn submit_response(
        &self,
        oracle: Address,
        key: &RequestKey,
        index: u8,
        status: StatusCode,
    ) -> Result<ResponseOutcome, NodeError> {
        let _span =
            tracing_spans::oracle_response_span(&key.to_string(), &oracle.to_string()).entered();
        let now = self.clock.now();
        let mut guard = self.lock();
        let state = &mut *guard;
        state.ensure_operational()?;

        let outcome = match state.consensus.submit_response(
            &state.oracles,
            &mut state.flights,
            oracle,
            key,
            index,
            status,
            now,
        ) {
            Ok(outcome) => outcome,
            Err(e) => {
                if matches!(
                    e,
                    OracleError::IndexMismatch { .. }
                        | OracleError::ConflictingResponse { .. }
                        | OracleError::StaleRequest(_)
                ) {
                    self.record(|m| m.oracle_rejections.inc());
                }
                return Err(e.into());
            }
        };
        if outcome != ResponseOutcome::Duplicate {
            self.record(|m| m.oracle_responses.inc());
        }
        self.publish_oracle_events(state, now);

        if let ResponseOutcome::Finalized { status } = outcome {
            self.record(|m| m.finalizations.inc());
            if status.is_airline_fault() {
                match state.insurance.credit_if_eligible(&state.flights, &key.flight) {
                    Ok(summary) => self.publish_credit(&key.flight, summary),
                    Err(e) => warn!(flight = %key.flight, error = %e, "automatic crediting failed"),
                }
            }
        }
        Ok(outcome)
    }

    // ── Insurance ──────────────────────────────────────────────────────

    /// Buy insurance on a flight. Returns the passenger's total premium on it.
    pub fn purchase(&self, passenger: Address, flight: FlightKey, amount: Wei) -> Result<Wei, NodeError> {
        let _span = tracing_spans::insurance_span("purchase", &passenger.to_string()).entered();
        let mut guard = self.lock();
        let state = &mut *guard;
        state.ensure_operational()?;

        let total = state
            .insurance
            .purchase(&state.flights, passenger, flight.clone(), amount)?;
        self.record(|m| m.policies_purchased.inc());
        self.events.publish(SuretyEvent::PolicyPurchased {
            passenger,
            flight,
            premium: total,
        });
        Ok(total)
    }

    /// Credit a flight's policies if it settled as an airline-caused delay.
    pub fn credit_if_eligible(&self, flight: &FlightKey) -> Result<CreditSummary, NodeError> {
        let mut guard = self.lock();
        let state = &mut *guard;
        state.ensure_operational()?;

        let summary = state.insurance.credit_if_eligible(&state.flights, flight)?;
        self.publish_credit(flight, summary);
        Ok(summary)
    }

    fn publish_credit(&self, flight: &FlightKey, summary: CreditSummary) {
        if summary.policies > 0 {
            self.events.publish(SuretyEvent::InsureesCredited {
                flight: flight.clone(),
                policies: summary.policies,
                total: summary.total,
            });
        }
    }

    /// Pay out all of a passenger's credit.
    ///
    /// The credit is zeroed under the lock; the transfer runs after the
    /// lock is released. A transfer that re-enters the node finds no credit,
    /// and a failed transfer puts the credit back.
    pub fn withdraw(&self, passenger: Address) -> Result<Wei, NodeError> {
        let _span = tracing_spans::insurance_span("withdraw", &passenger.to_string()).entered();
        let withdrawal = {
            let mut state = self.lock();
            state.ensure_operational()?;
            state.insurance.withdraw(&passenger)?
        };

        if let Err(e) = self.bank.transfer(&passenger, withdrawal.amount) {
            self.lock().insurance.revert_withdrawal(&withdrawal);
            self.record(|m| m.payout_failures.inc());
            return Err(NodeError::Transfer(e.to_string()));
        }

        info!(%passenger, amount = %withdrawal.amount, "payout withdrawn");
        self.record(|m| m.payouts.inc());
        self.events.publish(SuretyEvent::PayoutWithdrawn {
            passenger,
            amount: withdrawal.amount,
        });
        Ok(withdrawal.amount)
    }

    // ── Administration ─────────────────────────────────────────────────

    /// Pause or resume every mutating operation. Owner only.
    pub fn set_operating_status(&self, caller: Address, operational: bool) -> Result<(), NodeError> {
        if caller != self.config.owner {
            return Err(NodeError::Unauthorized(caller));
        }
        let mut state = self.lock();
        if state.operational != operational {
            state.operational = operational;
            warn!(operational, "operating status changed");
            self.events
                .publish(SuretyEvent::OperatingStatusChanged { operational });
        }
        Ok(())
    }

    pub fn is_operational(&self) -> bool {
        self.lock().operational
    }

    /// Export the complete ledger state.
    pub fn snapshot(&self) -> Result<Vec<u8>, NodeError> {
        snapshot::encode(&self.lock())
    }

    /// Replace the ledger state with a snapshot. Owner only.
    ///
    /// The snapshot's parameters replace the running ones; read them back
    /// through [`Self::params`].
    pub fn restore(&self, caller: Address, bytes: &[u8]) -> Result<(), NodeError> {
        if caller != self.config.owner {
            return Err(NodeError::Unauthorized(caller));
        }
        let restored = snapshot::decode(bytes)?;
        let funded = restored.accounts.funded_count();
        let open = restored.consensus.open_requests(self.clock.now()).count();
        *self.lock() = restored;
        self.record(|m| {
            m.funded_airlines.set(i64::from(funded));
            m.open_requests.set(open as i64);
        });
        info!(funded, open, "registry state restored from snapshot");
        Ok(())
    }

    // ── Reads ──────────────────────────────────────────────────────────

    /// Parameters currently in force.
    pub fn params(&self) -> ProtocolParams {
        self.lock().params.clone()
    }

    pub fn is_registered(&self, airline: &Address) -> bool {
        self.lock().accounts.is_registered(airline)
    }

    pub fn is_funded(&self, airline: &Address) -> bool {
        self.lock().accounts.is_funded(airline)
    }

    pub fn funded_count(&self) -> u32 {
        self.lock().accounts.funded_count()
    }

    pub fn funded_amount(&self, airline: &Address) -> Wei {
        self.lock().accounts.funded_amount(airline)
    }

    pub fn pending_votes(&self, candidate: &Address) -> u32 {
        self.lock().governance.pending_votes(candidate)
    }

    pub fn flight_status(&self, flight: &FlightKey) -> Result<StatusCode, NodeError> {
        Ok(self.lock().flights.get_status(flight)?)
    }

    pub fn indexes_of(&self, oracle: &Address) -> Result<[u8; INDEXES_PER_ORACLE], NodeError> {
        Ok(self.lock().oracles.indexes_of(oracle)?)
    }

    pub fn request(&self, key: &RequestKey) -> Option<OracleRequest> {
        self.lock().consensus.request(key).cloned()
    }

    pub fn policies_of(&self, passenger: &Address) -> Vec<InsurancePolicy> {
        self.lock().insurance.policies_of(passenger).cloned().collect()
    }

    pub fn credit_of(&self, passenger: &Address) -> Wei {
        self.lock().insurance.credit_of(passenger)
    }

    // ── Plumbing ───────────────────────────────────────────────────────

    /// Receive every event published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<SuretyEvent> {
        self.events.subscribe()
    }

    /// Only the oracle events, for external oracle processes.
    pub fn oracle_feed(event: &SuretyEvent) -> Option<&OracleEvent> {
        match event {
            SuretyEvent::Oracle { event } => Some(event),
            _ => None,
        }
    }

    /// Startup configuration. Its `params` are the genesis values; use
    /// [`Self::params`] for the ones in force.
    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    pub fn metrics(&self) -> Option<&SuretyMetrics> {
        self.metrics.as_ref()
    }
}
