//! Legacy-compatible pseudo-random generator
//!
//! A 32-bit rotate-and-add generator. Every piece of randomness in the
//! simulation, cosmetic or gameplay, draws from one instance of this, so
//! its update formula is a replay-compatibility contract: the exact
//! rotate-left-16 / add sequence below must never change.

/// Deterministic RNG state: two 32-bit words advanced per draw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rng {
    pub lo: u32,
    pub hi: u32,
}

impl Default for Rng {
    // Usable pre-seed state; hosts are expected to call seed() before init.
    fn default() -> Self {
        Self { lo: 0, hi: 1 }
    }
}

impl Rng {
    /// Reset the generator from a single seed
    ///
    /// A zero seed is special-cased onto fixed alternate constants rather
    /// than rejected; this keeps the legacy behavior where seeding with 0
    /// still yields a valid (and reproducible) stream.
    pub fn seed(&mut self, seed: u32) {
        let mut seed = seed;
        if seed == 0 {
            self.hi = 0x6000_9755;
            seed = 0xdead_beef;
        } else {
            self.hi = seed ^ 0xbead_29ba;
        }
        for _ in 0..0x20 {
            self.hi = self.hi.rotate_left(16).wrapping_add(seed);
            seed = seed.wrapping_add(self.hi);
        }
        self.lo = seed;
    }

    /// Next value in `[0, max)`; `max == 0` returns 0 without consuming state
    pub fn next(&mut self, max: u32) -> u32 {
        if max == 0 {
            return 0;
        }
        self.hi = self.hi.rotate_left(16).wrapping_add(self.lo);
        self.lo = self.lo.wrapping_add(self.hi);
        self.hi % max
    }

    /// Next float in `[0, max)`, quantized to 1/65536
    ///
    /// Downstream cosmetic motion depends on this exact quantization.
    pub fn rnd(&mut self, max: f32) -> f32 {
        let n = self.next((max * 65536.0) as u32);
        n as f32 / 65536.0
    }

    /// Fair-ish coin flip
    pub fn maybe(&mut self) -> bool {
        self.rnd(1.0) < 0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn seeded(seed: u32) -> Rng {
        let mut rng = Rng::default();
        rng.seed(seed);
        rng
    }

    #[test]
    fn test_reference_sequence_seed_1() {
        // Reference values from the legacy generator.
        let mut rng = seeded(1);
        assert_eq!(rng.lo, 0x4dfd_1d0f);
        assert_eq!(rng.hi, 0xfe02_db4e);
        let seq: Vec<u32> = (0..8).map(|_| rng.next(100)).collect();
        assert_eq!(seq, vec![21, 16, 26, 22, 34, 90, 84, 38]);
    }

    #[test]
    fn test_zero_seed_uses_alternate_constants() {
        let mut rng = seeded(0);
        assert_eq!(rng.lo, 0x42cf_adf8);
        assert_eq!(rng.hi, 0xd67c_e1e8);
        let seq: Vec<u32> = (0..5).map(|_| rng.next(1000)).collect();
        assert_eq!(seq, vec![308, 140, 396, 997, 419]);
    }

    #[test]
    fn test_next_zero_is_pure() {
        let mut rng = seeded(7);
        let before = rng;
        assert_eq!(rng.next(0), 0);
        assert_eq!(rng, before);
        // And a real draw afterwards still advances
        rng.next(10);
        assert_ne!(rng, before);
    }

    #[test]
    fn test_same_seed_same_stream() {
        let mut a = seeded(0xdead_beef);
        let mut b = seeded(0xdead_beef);
        for _ in 0..100 {
            assert_eq!(a.next(256), b.next(256));
        }
    }

    #[test]
    fn test_rnd_quantization() {
        let mut rng = seeded(42);
        for _ in 0..50 {
            let v = rng.rnd(1.0);
            // Every value is an exact multiple of 1/65536
            assert_eq!(v * 65536.0, (v * 65536.0).trunc());
        }
    }

    proptest! {
        #[test]
        fn prop_next_in_range(seed in any::<u32>(), max in 1u32..10_000) {
            let mut rng = seeded(seed);
            for _ in 0..20 {
                prop_assert!(rng.next(max) < max);
            }
        }

        #[test]
        fn prop_rnd_in_range(seed in any::<u32>(), max in 1u32..128) {
            let mut rng = seeded(seed);
            let max = max as f32;
            for _ in 0..20 {
                let v = rng.rnd(max);
                prop_assert!((0.0..max).contains(&v));
            }
        }
    }
}
