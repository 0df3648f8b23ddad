//! Airline admission for the flight surety registry.
//!
//! Two pieces:
//! - [`AccountLedger`] owns every airline record and the funded-airline count.
//! - [`AirlineGovernance`] decides whether a sponsored candidate is admitted
//!   directly or has to collect votes from funded airlines.
//!
//! Key principle: once `governance_threshold` airlines are funded, no single
//! airline can grow the registry on its own. A candidate then needs
//! `ceil(funded / 2)` distinct funded sponsors, counted against the funded
//! total at the moment each vote arrives.

pub mod airline;
pub mod engine;
pub mod error;
pub mod vote;

pub use airline::{AccountLedger, Airline, FundingReceipt};
pub use engine::{Admission, AirlineGovernance};
pub use error::GovernanceError;
pub use vote::RegistrationVote;
