/**
 * White noise sampling and the base noise buffer
 *
 * Each sample is `floor(u * r1 / r2 + r3)` with `u` a uniform integer in
 * 0-255 and `r1`, `r2`, `r3` uniform in [0, 1). Dividing by `r2` gives a
 * heavy upper tail: roughly a quarter of the samples clamp to white while
 * the rest are spread across the range. The same value goes into every channel.
 *
 * There is no spatial correlation between samples; structure only appears
 * once the octave stage blurs the buffer.
 */

use crate::pixel::{clamp_channel, Pixel};
use crate::raster::{Raster, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of one noise pixel per call
pub trait NoiseSampler {
    /// Draw the next pixel
    fn sample(&mut self) -> Pixel;
}

/// Grey white-noise sampler driven by any `rand` generator
#[derive(Debug, Clone)]
pub struct RandomColorSampler<R = StdRng> {
    rng: R,
}

impl RandomColorSampler<StdRng> {
    /// Sampler seeded from operating system entropy
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl Default for RandomColorSampler<StdRng> {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl<R: Rng> RandomColorSampler<R> {
    /// Sampler over a caller-supplied generator
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }

    /// Uniform draw in (0, 1). Zero is redrawn so it can be used as a divisor.
    fn nonzero_unit(&mut self) -> f64 {
        loop {
            let value: f64 = self.rng.gen();
            if value > 0.0 {
                return value;
            }
        }
    }
}

impl<R: Rng> NoiseSampler for RandomColorSampler<R> {
    fn sample(&mut self) -> Pixel {
        let r1: f64 = self.rng.gen();
        let r2 = self.nonzero_unit();
        let r3: f64 = self.rng.gen();
        let base = f64::from(self.rng.gen_range(0u8..=255));

        let raw = (base * r1 / r2 + r3).floor();
        // Saturating float->int cast; huge quotients simply clamp to white.
        Pixel::gray(clamp_channel(raw as i64))
    }
}

/// Sampler that always returns the same grey level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstantSampler(pub u8);

impl NoiseSampler for ConstantSampler {
    fn sample(&mut self) -> Pixel {
        Pixel::gray(self.0)
    }
}

/// Fill a `width`×`height` raster with independent samples, row by row
pub fn build_base_noise<S>(width: u32, height: u32, sampler: &mut S) -> Result<Raster>
where
    S: NoiseSampler + ?Sized,
{
    Raster::from_fn(width, height, |_, _| sampler.sample())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Generator that replays a fixed sequence of raw 64-bit words
    struct ScriptedRng {
        words: Vec<u64>,
        next: usize,
    }

    impl rand::RngCore for ScriptedRng {
        fn next_u32(&mut self) -> u32 {
            self.next_u64() as u32
        }

        fn next_u64(&mut self) -> u64 {
            let word = self.words[self.next % self.words.len()];
            self.next += 1;
            word
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            for chunk in dest.chunks_mut(8) {
                let bytes = self.next_u64().to_le_bytes();
                chunk.copy_from_slice(&bytes[..chunk.len()]);
            }
        }

        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> std::result::Result<(), rand::Error> {
            self.fill_bytes(dest);
            Ok(())
        }
    }

    #[test]
    fn test_samples_are_gray_and_in_range() {
        let mut sampler = RandomColorSampler::with_rng(StdRng::seed_from_u64(7));
        for _ in 0..10_000 {
            let pixel = sampler.sample();
            assert_eq!(pixel.r, pixel.g);
            assert_eq!(pixel.g, pixel.b);
        }
    }

    #[test]
    fn test_samples_cover_dark_and_white() {
        let mut sampler = RandomColorSampler::with_rng(StdRng::seed_from_u64(99));
        let values: Vec<u8> = (0..5_000).map(|_| sampler.sample().r).collect();

        assert!(values.iter().any(|&v| v == 255), "heavy tail should saturate");
        assert!(values.iter().any(|&v| v < 64), "small quotients should stay dark");
    }

    #[test]
    fn test_zero_divisor_is_redrawn() {
        // Words in draw order: r1, r2 (zero twice, then 0.5), r3, then u.
        // A `f64` draw uses the top 53 bits, so `1 << 63` is 0.5.
        let half = 1u64 << 63;
        let rng = ScriptedRng {
            words: vec![half, 0, 0, half, 0, 0],
            next: 0,
        };
        let mut sampler = RandomColorSampler::with_rng(rng);

        // u is drawn last; whatever value it takes, r1 / r2 == 1 and r3 == 0
        // so the sample is exactly u, never a division by zero.
        let pixel = sampler.sample();
        assert_eq!(pixel.r, pixel.b);
        assert_eq!(sampler.rng.next, 6);
    }

    #[test]
    fn test_constant_sampler() {
        let mut sampler = ConstantSampler(100);
        assert_eq!(sampler.sample(), Pixel::gray(100));
        assert_eq!(sampler.sample(), Pixel::gray(100));
    }

    #[test]
    fn test_build_base_noise() {
        let base = build_base_noise(8, 5, &mut ConstantSampler(17)).unwrap();
        assert_eq!(base.dimensions(), (8, 5));
        assert!(base.pixels().all(|p| p == Pixel::gray(17)));
    }

    #[test]
    fn test_build_base_noise_row_major() {
        struct Counter(u8);
        impl NoiseSampler for Counter {
            fn sample(&mut self) -> Pixel {
                self.0 += 1;
                Pixel::gray(self.0)
            }
        }

        let base = build_base_noise(3, 2, &mut Counter(0)).unwrap();
        assert_eq!(base.get(0, 0).unwrap(), Pixel::gray(1));
        assert_eq!(base.get(2, 0).unwrap(), Pixel::gray(3));
        assert_eq!(base.get(0, 1).unwrap(), Pixel::gray(4));
    }

    #[test]
    fn test_build_base_noise_rejects_empty() {
        assert!(build_base_noise(0, 3, &mut ConstantSampler(1)).is_err());
    }
}
