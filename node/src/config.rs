//! Node configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::Path;

use surety_types::{Address, ProtocolParams};

use crate::logging::LogFormat;
use crate::NodeError;

/// Configuration for a registry node.
///
/// Can be loaded from a TOML file via [`NodeConfig::from_toml_file`] or
/// built programmatically (e.g. for tests). Every field has a default.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Administrative principal allowed to pause the registry.
    #[serde(default)]
    pub owner: Address,

    /// Airline registered (unfunded) when the node starts.
    #[serde(default = "default_genesis_airline")]
    pub genesis_airline: Option<Address>,

    /// Seed for the hash-chain randomness source.
    #[serde(default)]
    pub rng_seed: u64,

    /// Capacity of the outbound event channel. Slow subscribers lag
    /// instead of blocking the registry.
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,

    /// Log format: "human" or "json".
    #[serde(default)]
    pub log_format: LogFormat,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Whether to collect Prometheus metrics.
    #[serde(default)]
    pub enable_metrics: bool,

    #[serde(default)]
    pub params: ProtocolParams,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_genesis_airline() -> Option<Address> {
    Some(Address::from_index(1))
}

fn default_event_capacity() -> usize {
    1024
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl NodeConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, NodeError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            NodeError::Config(format!("{}: {e}", path.as_ref().display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, NodeError> {
        let config: Self = toml::from_str(s).map_err(|e| NodeError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, NodeError> {
        toml::to_string_pretty(self).map_err(|e| NodeError::Config(e.to_string()))
    }

    /// Reject parameter combinations the registry cannot run with.
    pub fn validate(&self) -> Result<(), NodeError> {
        let p = &self.params;
        if p.oracle_index_space < 3 {
            return Err(NodeError::Config(
                "oracle_index_space must leave room for three distinct indexes".into(),
            ));
        }
        if p.min_responses == 0 {
            return Err(NodeError::Config("min_responses must be at least 1".into()));
        }
        if p.payout_denominator == 0 {
            return Err(NodeError::Config("payout_denominator must not be zero".into()));
        }
        if self.event_capacity == 0 {
            return Err(NodeError::Config("event_capacity must not be zero".into()));
        }
        Ok(())
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            owner: Address::default(),
            genesis_airline: default_genesis_airline(),
            rng_seed: 0,
            event_capacity: default_event_capacity(),
            log_format: LogFormat::default(),
            log_level: default_log_level(),
            enable_metrics: false,
            params: ProtocolParams::default(),
        }
    }
}
