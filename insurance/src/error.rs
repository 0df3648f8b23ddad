use surety_types::{Address, FlightKey, Wei};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InsuranceError {
    #[error("flight {0} is not open for insurance")]
    Unauthorized(FlightKey),

    #[error("premium of {requested} exceeds the cap of {cap}")]
    AmountExceedsCap { requested: Wei, cap: Wei },

    #[error("premium must be greater than zero")]
    ZeroPremium,

    #[error("passenger {0} has no credit to withdraw")]
    NoCredit(Address),

    #[error("payout for {0} overflows")]
    PayoutOverflow(FlightKey),

    #[error("transfer to {to} failed: {reason}")]
    TransferFailed { to: Address, reason: String },
}
