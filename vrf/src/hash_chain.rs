//! Seeded Blake2b hash chain: the registry's weak randomness source.

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::{RandomOutput, VrfError, VrfProvider};

type Blake2b256 = Blake2b<U32>;

/// Weak pseudo-random generator: `Blake2b(seed || round || context)`.
///
/// Every call advances `round`. Outputs can be recomputed (and therefore
/// verified, or predicted) by anyone holding the seed.
pub struct HashChainRandom {
    seed: [u8; 32],
    round: AtomicU64,
}

impl HashChainRandom {
    pub fn new(seed: [u8; 32]) -> Self {
        Self {
            seed,
            round: AtomicU64::new(0),
        }
    }

    /// Derive the 32-byte seed from an integer.
    pub fn from_u64(seed: u64) -> Self {
        let mut bytes = [0u8; 32];
        bytes[..8].copy_from_slice(&seed.to_be_bytes());
        Self::new(bytes)
    }

    fn compute(&self, round: u64, context: &[u8]) -> [u8; 32] {
        let mut hasher = Blake2b256::new();
        hasher.update(self.seed);
        hasher.update(round.to_be_bytes());
        hasher.update(context);
        let digest = hasher.finalize();
        let mut output = [0u8; 32];
        output.copy_from_slice(&digest);
        output
    }
}

impl VrfProvider for HashChainRandom {
    fn get_randomness(&self, context: &[u8]) -> Result<RandomOutput, VrfError> {
        let round = self.round.fetch_add(1, Ordering::Relaxed);
        Ok(RandomOutput {
            value: self.compute(round, context),
            proof: Vec::new(),
            round,
        })
    }

    fn verify(&self, context: &[u8], output: &RandomOutput) -> Result<bool, VrfError> {
        Ok(self.compute(output.round, context) == output.value)
    }

    fn name(&self) -> &str {
        "hash-chain"
    }
}
