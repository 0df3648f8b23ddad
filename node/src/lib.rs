//! Flight surety registry node.
//!
//! The node is the single coordinator that:
//! - Admits and funds airlines
//! - Registers flights
//! - Registers oracles and runs flight-status consensus
//! - Sells policies and pays out credits
//! - Publishes every state change on a broadcast channel
//!
//! All ledgers live behind one lock, so concurrent callers are applied in a
//! single global order.

pub mod config;
pub mod error;
pub mod event;
pub mod logging;
pub mod metrics;
pub mod node;
pub mod payout;
pub mod snapshot;
pub mod state;
pub mod tracing_spans;

pub use config::NodeConfig;
pub use error::NodeError;
pub use event::{EventBus, SuretyEvent};
pub use logging::{init_logging, LogFormat};
pub use metrics::SuretyMetrics;
pub use node::SuretyNode;
pub use payout::BalanceBook;
pub use state::RegistryState;
