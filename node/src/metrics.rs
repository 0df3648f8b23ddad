//! Prometheus metrics for the registry node.
//!
//! [`SuretyMetrics`] owns a dedicated [`Registry`] that an exporter can
//! encode into the Prometheus text exposition format.

use prometheus::{Encoder, IntCounter, IntGauge, Opts, Registry, TextEncoder};

use crate::NodeError;

pub struct SuretyMetrics {
    /// The Prometheus registry that owns every metric below.
    pub registry: Registry,

    // ── Counters ────────────────────────────────────────────────────────
    pub airlines_admitted: IntCounter,
    pub registration_votes: IntCounter,
    pub flights_registered: IntCounter,
    pub oracles_registered: IntCounter,
    pub status_requests: IntCounter,
    pub oracle_responses: IntCounter,
    /// Responses rejected for a protocol violation (index, conflict, stale).
    pub oracle_rejections: IntCounter,
    pub finalizations: IntCounter,
    pub policies_purchased: IntCounter,
    pub payouts: IntCounter,
    pub payout_failures: IntCounter,

    // ── Gauges ──────────────────────────────────────────────────────────
    pub funded_airlines: IntGauge,
    pub open_requests: IntGauge,
}

fn counter(registry: &Registry, name: &str, help: &str) -> Result<IntCounter, NodeError> {
    let metric = IntCounter::with_opts(Opts::new(name, help))?;
    registry.register(Box::new(metric.clone()))?;
    Ok(metric)
}

fn gauge(registry: &Registry, name: &str, help: &str) -> Result<IntGauge, NodeError> {
    let metric = IntGauge::with_opts(Opts::new(name, help))?;
    registry.register(Box::new(metric.clone()))?;
    Ok(metric)
}

impl SuretyMetrics {
    /// Create a fresh set of metrics, all registered under a new [`Registry`].
    pub fn new() -> Result<Self, NodeError> {
        let registry = Registry::new();
        let r = &registry;
        Ok(Self {
            airlines_admitted: counter(r, "surety_airlines_admitted_total", "Airlines admitted to the registry")?,
            registration_votes: counter(r, "surety_registration_votes_total", "Registration votes recorded")?,
            flights_registered: counter(r, "surety_flights_registered_total", "Flights registered")?,
            oracles_registered: counter(r, "surety_oracles_registered_total", "Oracles registered")?,
            status_requests: counter(r, "surety_status_requests_total", "Flight status requests opened")?,
            oracle_responses: counter(r, "surety_oracle_responses_total", "Oracle responses accepted")?,
            oracle_rejections: counter(r, "surety_oracle_rejections_total", "Oracle responses rejected")?,
            finalizations: counter(r, "surety_finalizations_total", "Requests that reached quorum")?,
            policies_purchased: counter(r, "surety_policies_purchased_total", "Policy purchases")?,
            payouts: counter(r, "surety_payouts_total", "Successful payout withdrawals")?,
            payout_failures: counter(r, "surety_payout_failures_total", "Payout transfers that failed and were reverted")?,
            funded_airlines: gauge(r, "surety_funded_airlines", "Current number of funded airlines")?,
            open_requests: gauge(r, "surety_open_requests", "Oracle requests still waiting for quorum")?,
            registry,
        })
    }

    /// Encode every metric in the text exposition format.
    pub fn encode(&self) -> Result<String, NodeError> {
        let mut buf = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buf)?;
        String::from_utf8(buf).map_err(|e| prometheus::Error::Msg(e.to_string()).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registers_and_encodes() {
        let metrics = SuretyMetrics::new().unwrap();
        metrics.finalizations.inc();
        metrics.funded_airlines.set(4);
        let text = metrics.encode().unwrap();
        assert!(text.contains("surety_finalizations_total 1"));
        assert!(text.contains("surety_funded_airlines 4"));
    }

    #[test]
    fn instances_do_not_share_registries() {
        let a = SuretyMetrics::new().unwrap();
        let b = SuretyMetrics::new().unwrap();
        a.payouts.inc();
        assert_eq!(b.payouts.get(), 0);
    }
}
