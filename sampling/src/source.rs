use rand_chacha::{ChaCha8Rng, rand_core::SeedableRng};
use rand_core::RngCore;
use rand_distr::{Distribution, Normal, NormalError};

const MAXF64: f64 = 9007199254740992.0;

/// Deterministic pseudorandom source for reproducible vector contents.
pub struct Source {
    source: ChaCha8Rng,
}

impl Source {
    pub fn new(seed: [u8; 32]) -> Source {
        Source {
            source: ChaCha8Rng::from_seed(seed),
        }
    }

    pub fn branch(&mut self) -> ([u8; 32], Self) {
        let seed: [u8; 32] = self.new_seed();
        (seed, Source::new(seed))
    }

    pub fn new_seed(&mut self) -> [u8; 32] {
        let mut seed: [u8; 32] = [0u8; 32];
        self.fill_bytes(&mut seed);
        seed
    }

    #[inline(always)]
    pub fn next_f64(&mut self, min: f64, max: f64) -> f64 {
        min + ((self.next_u64() << 11 >> 11) as f64) / MAXF64 * (max - min)
    }

    #[inline(always)]
    pub fn next_f32(&mut self, min: f32, max: f32) -> f32 {
        self.next_f64(min as f64, max as f64) as f32
    }

    #[inline(always)]
    pub fn next_u16(&mut self) -> u16 {
        (self.next_u32() >> 16) as u16
    }

    /// Fills `data` with values drawn uniformly from `[min, max)`.
    pub fn fill_uniform_f32(&mut self, data: &mut [f32], min: f32, max: f32) {
        data.iter_mut().for_each(|x| *x = self.next_f32(min, max));
    }

    /// Fills `data` with samples of `N(0, sigma^2)`. Fails without touching
    /// `data` if `sigma` is negative or not finite.
    pub fn fill_normal_f32(&mut self, data: &mut [f32], sigma: f64) -> Result<(), NormalError> {
        let normal: Normal<f64> = Normal::new(0.0, sigma)?;
        data.iter_mut().for_each(|x| *x = normal.sample(self) as f32);
        Ok(())
    }

    pub fn fill_u16(&mut self, data: &mut [u16]) {
        data.iter_mut().for_each(|x| *x = self.next_u16());
    }
}

impl RngCore for Source {
    #[inline(always)]
    fn next_u32(&mut self) -> u32 {
        self.source.next_u32()
    }

    #[inline(always)]
    fn next_u64(&mut self) -> u64 {
        self.source.next_u64()
    }

    #[inline(always)]
    fn fill_bytes(&mut self, bytes: &mut [u8]) {
        self.source.fill_bytes(bytes)
    }
}
