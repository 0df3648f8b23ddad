use surety_types::{Address, FlightKey, TypesError};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FlightError {
    #[error("airline {0} is not funded")]
    Unauthorized(Address),

    #[error("flight {0} is already registered")]
    DuplicateFlight(FlightKey),

    #[error("flight {0} not found")]
    NotFound(FlightKey),

    #[error(transparent)]
    Invalid(#[from] TypesError),
}
