/// Thin wrapper over the concrete RNG the sampling substrate is built on
///: callers never see `rand_pcg` directly, only the
/// handful of operations samplers need, and `split()` gives each worker
/// (or each sampler clone) its own independent deterministic stream.
use rand::{Rng as _, SeedableRng};
use rand_pcg::Pcg32;

#[derive(Debug, Clone)]
pub struct Rng {
    state: Pcg32,
}

impl Rng {
    pub fn new(seed: u64) -> Self {
        Rng {
            state: Pcg32::seed_from_u64(seed),
        }
    }

    /// Uniform float in `[0, 1)`.
    pub fn uniform_float(&mut self) -> f32 {
        // `gen::<f32>()` already samples `[0, 1)`; reached through the
        // explicit method name so the one conversion point is obvious.
        self.state.gen::<f32>()
    }

    /// Uniform integer in `[0, limit)`. `limit` must be nonzero.
    pub fn uniform_uint32(&mut self, limit: u32) -> u32 {
        debug_assert!(limit > 0);
        self.state.gen_range(0..limit)
    }

    /// A raw, full-range 32-bit draw - used for low-discrepancy scramble
    /// values, where any bit pattern (including all-ones) is valid.
    pub fn next_u32(&mut self) -> u32 {
        self.state.gen()
    }

    /// Derives an independent child stream, seeded from a value drawn out
    /// of `self`. Deterministic: the same parent state always splits into
    /// the same child state.
    pub fn split(&mut self) -> Rng {
        let seed: u64 = self.state.gen();
        Rng::new(seed)
    }
}
