//! Nullable random: deterministic randomness for testing.

use std::sync::atomic::{AtomicUsize, Ordering};
use surety_vrf::{RandomOutput, VrfError, VrfProvider};

/// A deterministic randomness provider for testing.
///
/// Returns pre-configured values in order, cycling when it runs out.
pub struct NullRandom {
    outputs: Vec<[u8; 32]>,
    index: AtomicUsize,
}

impl NullRandom {
    /// Create with a sequence of deterministic random values.
    pub fn new(outputs: Vec<[u8; 32]>) -> Self {
        Self {
            outputs,
            index: AtomicUsize::new(0),
        }
    }

    /// Create with a single value that will be returned for every call.
    pub fn constant(value: [u8; 32]) -> Self {
        Self::new(vec![value])
    }

    /// One output per byte: that byte first, zeros after.
    ///
    /// Index draws take the leading byte, so `leading_bytes(&[7])` makes
    /// every request land on index 7 and every oracle hold `[7, 1, 2]`.
    pub fn leading_bytes(bytes: &[u8]) -> Self {
        Self::new(
            bytes
                .iter()
                .map(|b| {
                    let mut value = [0u8; 32];
                    value[0] = *b;
                    value
                })
                .collect(),
        )
    }

    /// Number of outputs handed out so far.
    pub fn calls(&self) -> usize {
        self.index.load(Ordering::SeqCst)
    }
}

impl VrfProvider for NullRandom {
    fn get_randomness(&self, _context: &[u8]) -> Result<RandomOutput, VrfError> {
        if self.outputs.is_empty() {
            return Err(VrfError::Unavailable("no scripted outputs".into()));
        }
        let n = self.index.fetch_add(1, Ordering::SeqCst);
        let current = n % self.outputs.len();
        Ok(RandomOutput {
            value: self.outputs[current],
            proof: Vec::new(),
            round: n as u64,
        })
    }

    fn verify(&self, _context: &[u8], _output: &RandomOutput) -> Result<bool, VrfError> {
        Ok(true) // Always valid in test mode
    }

    fn name(&self) -> &str {
        "null-random"
    }
}
