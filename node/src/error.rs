use surety_types::Address;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("governance error: {0}")]
    Governance(#[from] surety_governance::GovernanceError),

    #[error("flight error: {0}")]
    Flight(#[from] surety_flights::FlightError),

    #[error("oracle error: {0}")]
    Oracle(#[from] surety_oracle::OracleError),

    #[error("insurance error: {0}")]
    Insurance(#[from] surety_insurance::InsuranceError),

    #[error("randomness error: {0}")]
    Randomness(#[from] surety_vrf::VrfError),

    #[error("invalid value: {0}")]
    Types(#[from] surety_types::TypesError),

    #[error("registry is not operational")]
    SystemNotOperational,

    #[error("{0} is not allowed to do this")]
    Unauthorized(Address),

    #[error("config error: {0}")]
    Config(String),

    #[error("snapshot error: {0}")]
    Snapshot(String),

    #[error("payout transfer failed: {0}")]
    Transfer(String),

    #[error("metrics error: {0}")]
    Metrics(#[from] prometheus::Error),
}
