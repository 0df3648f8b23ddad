use surety_types::{Address, Wei};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GovernanceError {
    #[error("airline {0} is already registered")]
    AlreadyRegistered(Address),

    #[error("airline {0} is not registered")]
    NotRegistered(Address),

    #[error("insufficient funding: provided {provided}, minimum {minimum}")]
    InsufficientFunding { provided: Wei, minimum: Wei },

    #[error("{0} is not a funded airline")]
    Unauthorized(Address),

    #[error("airline {voter} has already voted for {candidate}")]
    DuplicateVote { voter: Address, candidate: Address },

    #[error("funded amount of {0} would overflow")]
    FundingOverflow(Address),
}
