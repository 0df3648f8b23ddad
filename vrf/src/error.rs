use thiserror::Error;

#[derive(Debug, Error)]
pub enum VrfError {
    #[error("provider not available: {0}")]
    Unavailable(String),

    #[error("cannot draw {count} distinct indexes from a space of {space}")]
    InsufficientSpace { space: u8, count: u8 },

    #[error("{0}")]
    Other(String),
}
