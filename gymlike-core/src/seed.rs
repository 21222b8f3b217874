//! Random seeds shared between environments and the training stack.
use log::debug;
use rand::{rngs::StdRng, RngCore, SeedableRng};

/// Derived seeds are kept below this value so that they fit simulators taking 32-bit seeds.
pub const MAX_SEED: u64 = (1 << 32) - 1;

/// Derives a new seed from `seed`.
///
/// The derivation is deterministic and the derived seed never equals `seed`, so that
/// components seeded one after another with the returned value get decorrelated
/// random streams.
pub fn derive_seed(seed: u64) -> u64 {
    let mut rng = StdRng::seed_from_u64(seed);
    let derived = rng.next_u64() % MAX_SEED;
    if derived == seed {
        (derived + 1) % MAX_SEED
    } else {
        derived
    }
}

/// Random state shared with the rest of the training stack.
///
/// A context is created by the caller and handed to every component that needs
/// to be seeded, instead of mutating process-wide state. Components seeded with
/// different contexts do not interfere with each other.
pub struct SeedContext {
    rng: StdRng,
    seed: Option<u64>,
}

impl Default for SeedContext {
    fn default() -> Self {
        Self {
            rng: StdRng::from_entropy(),
            seed: None,
        }
    }
}

impl SeedContext {
    /// Creates a context seeded with `seed`.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed: Some(seed),
        }
    }

    /// Reseeds the random state.
    pub fn manual_seed(&mut self, seed: u64) {
        debug!("SeedContext::manual_seed({})", seed);
        self.rng = StdRng::seed_from_u64(seed);
        self.seed = Some(seed);
    }

    /// The last seed given to the context, if any.
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Random number generator of the context.
    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_derive_seed() {
        for seed in [0u64, 1, 5, 42, 1988, MAX_SEED - 1].iter() {
            let derived = derive_seed(*seed);
            assert_eq!(derived, derive_seed(*seed));
            assert_ne!(derived, *seed);
            assert!(derived < MAX_SEED);
        }
    }

    #[test]
    fn test_manual_seed() {
        let mut a = SeedContext::default();
        let mut b = SeedContext::new(3);
        a.manual_seed(7);
        b.manual_seed(7);
        assert_eq!(a.seed(), Some(7));
        assert_eq!(a.rng().gen::<u64>(), b.rng().gen::<u64>());
    }
}
