//! Wei amount type.
//!
//! Amounts are fixed-point integers (u128) to avoid floating-point errors.
//! The smallest unit is 1 wei; 1 ether is 10^18 wei. Serialized forms carry
//! the decimal string so that formats without 128-bit integers (TOML) work.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::{Add, Sub};
use std::str::FromStr;

use crate::error::TypesError;

/// Number of wei in one ether.
pub const ETHER: u128 = 1_000_000_000_000_000_000;

/// An amount of value, stored as raw wei.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Wei(u128);

impl Wei {
    pub const ZERO: Self = Self(0);

    pub fn new(raw: u128) -> Self {
        Self(raw)
    }

    /// Construct from whole ether units.
    pub fn from_ether(ether: u128) -> Self {
        Self(ether.saturating_mul(ETHER))
    }

    pub fn raw(&self) -> u128 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    pub fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    pub fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }

    /// Multiply by `numerator / denominator`, rounding down.
    ///
    /// Returns `None` on overflow or a zero denominator.
    pub fn mul_ratio(self, numerator: u128, denominator: u128) -> Option<Self> {
        if denominator == 0 {
            return None;
        }
        self.0
            .checked_mul(numerator)
            .map(|scaled| Self(scaled / denominator))
    }
}

impl Add for Wei {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Wei {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl fmt::Display for Wei {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} wei", self.0)
    }
}

/// Accepts `"<n>"` or `"<n> wei"` (raw units) and `"<n> ether"`.
impl FromStr for Wei {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || TypesError::InvalidAmount(s.to_string());
        let trimmed = s.trim();
        let (digits, scale) = if let Some(n) = trimmed.strip_suffix("ether") {
            (n.trim_end(), ETHER)
        } else if let Some(n) = trimmed.strip_suffix("wei") {
            (n.trim_end(), 1)
        } else {
            (trimmed, 1)
        };
        let value: u128 = digits.parse().map_err(|_| invalid())?;
        value.checked_mul(scale).map(Self).ok_or_else(invalid)
    }
}

impl Serialize for Wei {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Wei {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ether_conversion() {
        assert_eq!(Wei::from_ether(10).raw(), 10 * ETHER);
    }

    #[test]
    fn one_and_a_half_multiplier() {
        let premium = Wei::from_ether(1);
        assert_eq!(premium.mul_ratio(3, 2), Some(Wei::new(ETHER + ETHER / 2)));
    }

    #[test]
    fn mul_ratio_rejects_zero_denominator() {
        assert_eq!(Wei::new(5).mul_ratio(3, 0), None);
    }

    #[test]
    fn parses_ether_and_wei_suffixes() {
        assert_eq!("10 ether".parse::<Wei>().unwrap(), Wei::from_ether(10));
        assert_eq!("42 wei".parse::<Wei>().unwrap(), Wei::new(42));
        assert_eq!("42".parse::<Wei>().unwrap(), Wei::new(42));
        assert!("ten ether".parse::<Wei>().is_err());
    }

    #[test]
    fn mul_ratio_overflow_is_none() {
        assert_eq!(Wei::new(u128::MAX).mul_ratio(3, 2), None);
    }
}
