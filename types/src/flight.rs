//! Flight identifiers and the oracle status-code enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::address::Address;
use crate::error::TypesError;
use crate::time::Timestamp;

/// Maximum length in bytes of a flight number.
pub const MAX_FLIGHT_NUMBER_LEN: usize = 32;

/// Flight status as reported by oracles.
///
/// The numeric values are fixed and must not change: oracles and clients
/// exchange the raw `u8`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum StatusCode {
    #[default]
    Unknown = 0,
    OnTime = 10,
    LateAirline = 20,
    LateWeather = 30,
    LateTechnical = 40,
    LateOther = 50,
}

impl StatusCode {
    /// Every status code, in ascending numeric order.
    pub const ALL: [StatusCode; 6] = [
        StatusCode::Unknown,
        StatusCode::OnTime,
        StatusCode::LateAirline,
        StatusCode::LateWeather,
        StatusCode::LateTechnical,
        StatusCode::LateOther,
    ];

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Any of the `Late*` codes.
    pub fn is_delayed(self) -> bool {
        matches!(
            self,
            StatusCode::LateAirline
                | StatusCode::LateWeather
                | StatusCode::LateTechnical
                | StatusCode::LateOther
        )
    }

    /// Only a delay caused by the airline triggers insurance payouts.
    pub fn is_airline_fault(self) -> bool {
        self == StatusCode::LateAirline
    }

    pub fn label(self) -> &'static str {
        match self {
            StatusCode::Unknown => "Unknown",
            StatusCode::OnTime => "On time",
            StatusCode::LateAirline => "Late airline",
            StatusCode::LateWeather => "Late weather",
            StatusCode::LateTechnical => "Late technical",
            StatusCode::LateOther => "Late other",
        }
    }
}

impl TryFrom<u8> for StatusCode {
    type Error = TypesError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        StatusCode::ALL
            .into_iter()
            .find(|code| code.as_u8() == value)
            .ok_or(TypesError::InvalidStatusCode(value))
    }
}

impl From<StatusCode> for u8 {
    fn from(code: StatusCode) -> u8 {
        code.as_u8()
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.label(), self.as_u8())
    }
}

/// Identifies a flight: the operating airline plus its flight number.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FlightKey {
    pub airline: Address,
    pub flight_number: String,
}

impl FlightKey {
    pub fn new(airline: Address, flight_number: impl Into<String>) -> Self {
        Self {
            airline,
            flight_number: flight_number.into(),
        }
    }

    /// A flight number must be non-blank and at most [`MAX_FLIGHT_NUMBER_LEN`] bytes.
    pub fn validate(&self) -> Result<(), TypesError> {
        let number = &self.flight_number;
        if number.trim().is_empty() || number.len() > MAX_FLIGHT_NUMBER_LEN {
            return Err(TypesError::InvalidFlightNumber(number.clone()));
        }
        Ok(())
    }
}

impl fmt::Display for FlightKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.airline, self.flight_number)
    }
}

/// Identifies one oracle status request: the flight plus the time it was opened.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RequestKey {
    pub flight: FlightKey,
    pub timestamp: Timestamp,
}

impl RequestKey {
    pub fn new(flight: FlightKey, timestamp: Timestamp) -> Self {
        Self { flight, timestamp }
    }
}

impl fmt::Display for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.flight, self.timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_are_bit_exact() {
        let raw: Vec<u8> = StatusCode::ALL.iter().map(|c| c.as_u8()).collect();
        assert_eq!(raw, vec![0, 10, 20, 30, 40, 50]);
    }

    #[test]
    fn unknown_raw_code_rejected() {
        assert_eq!(
            StatusCode::try_from(15),
            Err(TypesError::InvalidStatusCode(15))
        );
        assert_eq!(StatusCode::try_from(20), Ok(StatusCode::LateAirline));
    }

    #[test]
    fn only_late_airline_is_airline_fault() {
        for code in StatusCode::ALL {
            assert_eq!(code.is_airline_fault(), code == StatusCode::LateAirline);
        }
        assert!(!StatusCode::OnTime.is_delayed());
        assert!(!StatusCode::Unknown.is_delayed());
        assert!(StatusCode::LateWeather.is_delayed());
    }

    #[test]
    fn blank_flight_number_invalid() {
        let airline = Address::from_index(1);
        assert!(FlightKey::new(airline, "  ").validate().is_err());
        assert!(FlightKey::new(airline, "x".repeat(33)).validate().is_err());
        assert!(FlightKey::new(airline, "ND1309").validate().is_ok());
    }
}
