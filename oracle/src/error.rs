use surety_flights::FlightError;
use surety_types::{Address, RequestKey, StatusCode, Wei};
use surety_vrf::VrfError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("insufficient registration fee: provided {provided}, required {required}")]
    InsufficientFee { provided: Wei, required: Wei },

    #[error("oracle {0} is already registered")]
    AlreadyRegistered(Address),

    #[error("oracle {0} is not registered")]
    NotRegistered(Address),

    #[error("request {0} is unknown or expired")]
    StaleRequest(RequestKey),

    #[error("oracle {oracle} may not answer with index {index}")]
    IndexMismatch { oracle: Address, index: u8 },

    #[error("oracle {oracle} already reported {previous}, cannot report {submitted}")]
    ConflictingResponse {
        oracle: Address,
        previous: StatusCode,
        submitted: StatusCode,
    },

    #[error(transparent)]
    Flight(#[from] FlightError),

    #[error("randomness error: {0}")]
    Randomness(#[from] VrfError),
}
