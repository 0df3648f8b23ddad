//! Errors raised while parsing or converting fundamental types.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypesError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid amount: {0:?}")]
    InvalidAmount(String),

    #[error("invalid status code: {0}")]
    InvalidStatusCode(u8),

    #[error("invalid flight number: {0:?}")]
    InvalidFlightNumber(String),
}
