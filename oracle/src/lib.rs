//! Oracle-based flight-status consensus.
//!
//! Two-phase process:
//! 1. **Registration**: an oracle pays the registration fee and is assigned
//!    three distinct random indexes from a small index space.
//! 2. **Consensus**: a status request for a flight names one random index.
//!    Only oracles holding that index may answer. The first status code
//!    reported by `min_responses` distinct oracles becomes the flight's
//!    status, exactly once per request.
//!
//! Oracles cannot tell ahead of time which flights they will be asked about,
//! which makes collusion harder. The randomness source is injected; see
//! `surety_vrf` for its limits.

pub mod engine;
pub mod error;
pub mod event;
pub mod registry;
pub mod request;

pub use engine::{ConsensusEngine, ResponseOutcome};
pub use error::OracleError;
pub use event::OracleEvent;
pub use registry::{Oracle, OracleRegistry, INDEXES_PER_ORACLE};
pub use request::OracleRequest;
