//! Pre-built [`tracing::Span`] constructors for registry operations.
//!
//! Consistent span names and field sets make it easy to filter and
//! correlate logs for one airline, flight or request.

use tracing::{info_span, Span};

/// Span covering an airline registration request.
pub fn registration_span(candidate: &str, sponsor: &str) -> Span {
    info_span!("airline_registration", candidate = %candidate, sponsor = %sponsor)
}

/// Span covering an airline funding deposit.
pub fn funding_span(airline: &str) -> Span {
    info_span!("airline_funding", airline = %airline)
}

/// Span covering a flight-status request.
pub fn status_request_span(flight: &str) -> Span {
    info_span!("status_request", flight = %flight)
}

/// Span covering a single oracle response.
pub fn oracle_response_span(request: &str, oracle: &str) -> Span {
    info_span!("oracle_response", request = %request, oracle = %oracle)
}

/// Span covering a policy purchase or payout withdrawal.
pub fn insurance_span(action: &str, passenger: &str) -> Span {
    info_span!("insurance", action = %action, passenger = %passenger)
}
