use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};

use crate::acquire::SampleSource;
use crate::error::Result;

/// Wraps any source and adds zero-mean Gaussian noise, in raw counts, to
/// every value it yields. Models converter and sensor noise.
pub struct NoisySource {
    inner: Box<dyn SampleSource>,
    rng: StdRng,
    dist: Normal<f32>,
    full_scale: u16,
}

impl NoisySource {
    /// # Arguments
    /// * `sigma_counts` - Noise standard deviation in raw counts
    /// * `seed` - Fixed seed for reproducible traces, or `None` for an
    ///   OS-seeded generator
    pub fn new(
        inner: Box<dyn SampleSource>,
        sigma_counts: f32,
        full_scale: u16,
        seed: Option<u64>,
    ) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => rand::make_rng(),
        };
        Self {
            inner,
            rng,
            // sigma is finite and non-negative by contract
            dist: Normal::new(0.0, sigma_counts.max(0.0)).unwrap(),
            full_scale,
        }
    }
}

impl SampleSource for NoisySource {
    fn read(&mut self) -> Result<Option<u16>> {
        let Some(value) = self.inner.read()? else {
            return Ok(None);
        };
        let noisy = value as f32 + self.dist.sample(&mut self.rng);
        Ok(Some(noisy.clamp(0.0, self.full_scale as f32) as u16))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ConstantSource(u16);

    impl SampleSource for ConstantSource {
        fn read(&mut self) -> Result<Option<u16>> {
            Ok(Some(self.0))
        }
    }

    #[test]
    fn test_noise_is_zero_mean() {
        let mut source = NoisySource::new(Box::new(ConstantSource(2000)), 20.0, 4095, Some(7));
        let n = 20_000;
        let mean: f64 = (0..n)
            .map(|_| source.read().unwrap().unwrap() as f64)
            .sum::<f64>()
            / n as f64;
        assert!((mean - 2000.0).abs() < 2.0, "mean {}", mean);
    }

    #[test]
    fn test_noise_stays_in_range() {
        let mut source = NoisySource::new(Box::new(ConstantSource(4090)), 500.0, 4095, Some(7));
        for _ in 0..10_000 {
            assert!(source.read().unwrap().unwrap() <= 4095);
        }
    }

    #[test]
    fn test_seeded_noise_is_reproducible() {
        let mut a = NoisySource::new(Box::new(ConstantSource(1000)), 10.0, 4095, Some(42));
        let mut b = NoisySource::new(Box::new(ConstantSource(1000)), 10.0, 4095, Some(42));
        for _ in 0..100 {
            assert_eq!(a.read().unwrap(), b.read().unwrap());
        }
    }
}
