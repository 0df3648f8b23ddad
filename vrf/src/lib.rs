//! Randomness for oracle index assignment and status-request dispatch.
//!
//! Everything that needs randomness takes a [`VrfProvider`] so tests can
//! supply deterministic sequences. The bundled [`HashChainRandom`] is the
//! weak generator the registry has always used: it is predictable to anyone
//! who knows the seed and must not be mistaken for a verifiable beacon.

pub mod error;
pub mod hash_chain;
pub mod index;

pub use error::VrfError;
pub use hash_chain::HashChainRandom;
pub use index::{draw_distinct_indexes, draw_index};

/// Trait for providing randomness.
pub trait VrfProvider: Send + Sync {
    /// Get randomness for a given context (e.g. the flight being queried).
    fn get_randomness(&self, context: &[u8]) -> Result<RandomOutput, VrfError>;

    /// Verify that a randomness output was correctly generated.
    fn verify(&self, context: &[u8], output: &RandomOutput) -> Result<bool, VrfError>;

    /// Human-readable name of this provider.
    fn name(&self) -> &str;
}

/// The output of a provider: a random value with an optional proof.
#[derive(Clone, Debug)]
pub struct RandomOutput {
    /// The random bytes (32 bytes).
    pub value: [u8; 32],
    /// Proof that the value was correctly generated (empty for weak providers).
    pub proof: Vec<u8>,
    /// Draw counter.
    pub round: u64,
}
