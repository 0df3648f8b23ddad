//! Flight registry.
//!
//! Funded airlines register flights; each flight carries the status code last
//! finalized by oracle consensus (`Unknown` until then).

pub mod error;
pub mod registry;

pub use error::FlightError;
pub use registry::{Flight, FlightRegistry};
