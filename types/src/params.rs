//! Protocol parameters governing funding, oracle consensus and insurance.

use crate::amount::Wei;
use serde::{Deserialize, Serialize};

/// All tunable constants of the registry.
///
/// Defaults reproduce the reference deployment. Loadable from the `[params]`
/// table of the node configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtocolParams {
    // ── Airlines ─────────────────────────────────────────────────────────
    /// Minimum deposit (per funding call) for an airline to count as funded.
    pub minimum_funding: Wei,

    /// Once this many airlines are funded, admission requires a vote.
    pub governance_threshold: u32,

    // ── Oracles ──────────────────────────────────────────────────────────
    /// Fee an oracle pays to register.
    pub oracle_registration_fee: Wei,

    /// Size of the index space oracles and requests draw from (`0..space`).
    pub oracle_index_space: u8,

    /// Number of concurring oracles needed to finalize a status.
    pub min_responses: u32,

    /// Open requests older than this reject responses. `None` keeps them open forever.
    pub request_timeout_secs: Option<u64>,

    // ── Insurance ────────────────────────────────────────────────────────
    /// Maximum premium a passenger may pay per flight.
    pub max_premium: Wei,

    /// Payout = premium × numerator / denominator.
    pub payout_numerator: u32,
    pub payout_denominator: u32,
}

impl ProtocolParams {
    /// Vote quorum for a pending airline: `ceil(funded_count / 2)`.
    pub fn vote_quorum(funded_count: u32) -> u32 {
        funded_count.div_ceil(2)
    }

    /// Payout owed for a premium, or `None` on overflow.
    pub fn payout_for(&self, premium: Wei) -> Option<Wei> {
        premium.mul_ratio(
            u128::from(self.payout_numerator),
            u128::from(self.payout_denominator),
        )
    }
}

impl Default for ProtocolParams {
    fn default() -> Self {
        Self {
            minimum_funding: Wei::from_ether(10),
            governance_threshold: 5,

            oracle_registration_fee: Wei::from_ether(1),
            oracle_index_space: 10,
            min_responses: 3,
            request_timeout_secs: None,

            max_premium: Wei::from_ether(1),
            payout_numerator: 3,
            payout_denominator: 2,
        }
    }
}
