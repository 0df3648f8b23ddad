//! Fundamental types for the flight surety registry.
//!
//! This crate defines the types shared across every other crate in the workspace:
//! account addresses, wei amounts, timestamps, flight keys, status codes and the
//! protocol parameters that drive governance, oracle consensus and insurance.

pub mod address;
pub mod amount;
pub mod error;
pub mod flight;
pub mod params;
pub mod time;

pub use address::Address;
pub use amount::Wei;
pub use error::TypesError;
pub use flight::{FlightKey, RequestKey, StatusCode};
pub use params::ProtocolParams;
pub use time::{Clock, SystemClock, Timestamp};
