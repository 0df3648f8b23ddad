//! Drawing oracle indexes from a bounded space.

use tracing::trace;

use crate::{VrfError, VrfProvider};

/// Draw a single index in `0..space` from the first byte of one output.
pub fn draw_index(provider: &dyn VrfProvider, context: &[u8], space: u8) -> Result<u8, VrfError> {
    if space == 0 {
        return Err(VrfError::InsufficientSpace { space, count: 1 });
    }
    let output = provider.get_randomness(context)?;
    let index = output.value[0] % space;
    trace!(provider = provider.name(), round = output.round, index, "drew index");
    Ok(index)
}

/// Draw `count` distinct indexes in `0..space`, in draw order.
///
/// Uses a partial Fisher–Yates shuffle over the space, one random byte per
/// position, so it terminates even for a provider that repeats itself.
pub fn draw_distinct_indexes(
    provider: &dyn VrfProvider,
    context: &[u8],
    space: u8,
    count: u8,
) -> Result<Vec<u8>, VrfError> {
    if count > space {
        return Err(VrfError::InsufficientSpace { space, count });
    }
    let mut pool: Vec<u8> = (0..space).collect();
    let mut bytes: Vec<u8> = Vec::new();
    for i in 0..usize::from(count) {
        if bytes.is_empty() {
            bytes = provider.get_randomness(context)?.value.to_vec();
            bytes.reverse();
        }
        let r = usize::from(bytes.pop().unwrap_or_default());
        let j = i + r % (pool.len() - i);
        pool.swap(i, j);
    }
    pool.truncate(usize::from(count));
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{HashChainRandom, RandomOutput};
    use std::collections::HashSet;

    struct ConstantVrf([u8; 32]);

    impl VrfProvider for ConstantVrf {
        fn get_randomness(&self, _context: &[u8]) -> Result<RandomOutput, VrfError> {
            Ok(RandomOutput {
                value: self.0,
                proof: vec![],
                round: 0,
            })
        }
        fn verify(&self, _context: &[u8], _output: &RandomOutput) -> Result<bool, VrfError> {
            Ok(true)
        }
        fn name(&self) -> &str {
            "constant"
        }
    }

    struct FailingVrf;

    impl VrfProvider for FailingVrf {
        fn get_randomness(&self, _context: &[u8]) -> Result<RandomOutput, VrfError> {
            Err(VrfError::Unavailable("test".into()))
        }
        fn verify(&self, _context: &[u8], _output: &RandomOutput) -> Result<bool, VrfError> {
            Ok(false)
        }
        fn name(&self) -> &str {
            "failing"
        }
    }

    #[test]
    fn index_stays_in_space() {
        let rng = HashChainRandom::from_u64(11);
        for _ in 0..200 {
            assert!(draw_index(&rng, b"ctx", 10).unwrap() < 10);
        }
    }

    #[test]
    fn index_comes_from_first_byte() {
        let mut value = [0u8; 32];
        value[0] = 17;
        assert_eq!(draw_index(&ConstantVrf(value), b"ctx", 10).unwrap(), 7);
    }

    #[test]
    fn distinct_indexes_are_distinct_and_bounded() {
        let rng = HashChainRandom::from_u64(5);
        for _ in 0..100 {
            let drawn = draw_distinct_indexes(&rng, b"oracle", 10, 3).unwrap();
            assert_eq!(drawn.len(), 3);
            let unique: HashSet<u8> = drawn.iter().copied().collect();
            assert_eq!(unique.len(), 3);
            assert!(drawn.iter().all(|i| *i < 10));
        }
    }

    #[test]
    fn constant_provider_still_yields_distinct_indexes() {
        let vrf = ConstantVrf([0u8; 32]);
        let drawn = draw_distinct_indexes(&vrf, b"oracle", 10, 3).unwrap();
        assert_eq!(drawn, vec![0, 1, 2]);
    }

    #[test]
    fn whole_space_is_a_permutation() {
        let rng = HashChainRandom::from_u64(9);
        let mut drawn = draw_distinct_indexes(&rng, b"oracle", 10, 10).unwrap();
        drawn.sort_unstable();
        assert_eq!(drawn, (0..10).collect::<Vec<u8>>());
    }

    #[test]
    fn count_larger_than_space_rejected() {
        let rng = HashChainRandom::from_u64(1);
        assert!(matches!(
            draw_distinct_indexes(&rng, b"oracle", 2, 3),
            Err(VrfError::InsufficientSpace { space: 2, count: 3 })
        ));
        assert!(draw_index(&rng, b"ctx", 0).is_err());
    }

    #[test]
    fn provider_failure_propagates() {
        assert!(draw_index(&FailingVrf, b"ctx", 10).is_err());
        assert!(draw_distinct_indexes(&FailingVrf, b"ctx", 10, 3).is_err());
    }
}
