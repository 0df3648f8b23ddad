//! Flight-delay insurance.
//!
//! Passengers buy a policy on a registered flight while its status is still
//! unknown. When oracle consensus settles the flight as late because of the
//! airline, every policy on it is credited once with premium × multiplier.
//! Passengers withdraw their credit through a [`PayoutSink`].
//!
//! Withdrawal zeroes the credit before any transfer happens, so a transfer
//! that re-enters the ledger finds nothing left to withdraw.

pub mod error;
pub mod ledger;
pub mod payout;
pub mod policy;

pub use error::InsuranceError;
pub use ledger::{CreditSummary, InsuranceLedger, Withdrawal};
pub use payout::PayoutSink;
pub use policy::InsurancePolicy;
