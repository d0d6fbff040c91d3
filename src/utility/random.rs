use rand::{Error, RngCore, SeedableRng};
#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// A fast xorshift128+ generator.
///
/// The seed is expanded with splitmix64 so the state is never all zero and nearby
/// seeds give unrelated streams. The same seed always produces the same sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[allow(missing_copy_implementations)]
pub struct Xorshift {
    s0: u64,
    s1: u64,
}

fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

impl Xorshift {
    /// Make a generator from a seed.
    pub fn new(seed: u64) -> Self {
        let mut state = seed;
        let s0 = splitmix64(&mut state);
        let s1 = splitmix64(&mut state);
        if s0 == 0 && s1 == 0 {
            Self { s0: 1, s1: 0 }
        } else {
            Self { s0, s1 }
        }
    }

    /// Uniform real in `[0, 1)` built from the top 53 bits of the next output.
    #[inline]
    pub fn uniform(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Derive an independent generator, advancing this one.
    pub fn split(&mut self) -> Self {
        Self::new(self.next_u64())
    }
}

impl RngCore for Xorshift {
    #[inline]
    fn next_u32(&mut self) -> u32 {
        (self.next_u64() >> 32) as u32
    }

    #[inline]
    fn next_u64(&mut self) -> u64 {
        let mut x = self.s0;
        let y = self.s1;
        self.s0 = y;
        x ^= x << 23;
        self.s1 = x ^ y ^ (x >> 17) ^ (y >> 26);
        self.s1.wrapping_add(y)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        let mut chunks = dest.chunks_exact_mut(8);
        for chunk in &mut chunks {
            chunk.copy_from_slice(&self.next_u64().to_le_bytes());
        }
        let rest = chunks.into_remainder();
        if !rest.is_empty() {
            let bytes = self.next_u64().to_le_bytes();
            let n = rest.len();
            rest.copy_from_slice(&bytes[..n]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl SeedableRng for Xorshift {
    type Seed = [u8; 8];

    fn from_seed(seed: Self::Seed) -> Self {
        Self::new(u64::from_le_bytes(seed))
    }

    fn seed_from_u64(state: u64) -> Self {
        Self::new(state)
    }
}

#[cfg(test)]
mod random_tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn reproducible() {
        let mut a = Xorshift::new(42);
        let mut b = Xorshift::seed_from_u64(42);
        let xs = (0..100).map(|_| a.next_u64()).collect::<Vec<_>>();
        let ys = (0..100).map(|_| b.next_u64()).collect::<Vec<_>>();
        assert_eq!(xs, ys);
        let mut c = Xorshift::new(43);
        assert_ne!(xs[0], c.next_u64());
    }

    #[test]
    fn zero_seed_is_usable() {
        let mut rng = Xorshift::new(0);
        let xs = (0..10).map(|_| rng.next_u64()).collect::<Vec<_>>();
        assert!(xs.iter().any(|x| *x != 0));
    }

    #[test]
    fn uniform_in_unit_interval() {
        let mut rng = Xorshift::new(7);
        let n = 100_000;
        let mut total = 0.0;
        for _ in 0..n {
            let u = rng.uniform();
            assert!((0.0..1.0).contains(&u));
            total += u;
        }
        let mean = total / n as f64;
        assert!((mean - 0.5).abs() < 0.01, "{}", mean);
        let g: f64 = rng.gen();
        assert!((0.0..1.0).contains(&g));
    }
}
