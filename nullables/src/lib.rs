//! Nullable infrastructure for deterministic testing.
//!
//! Everything the registry reaches outside itself for (wall-clock time,
//! randomness, value transfer) sits behind a trait. This crate provides
//! test-friendly implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Never touch the network or a real bank
//!
//! Usage: swap real implementations for nullables in tests.

pub mod bank;
pub mod clock;
pub mod random;

pub use bank::NullBank;
pub use clock::NullClock;
pub use random::NullRandom;
