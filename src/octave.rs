/**
 * Octave layers: blur, amplify, blur again
 *
 * Blurring white noise with a Gaussian of sigma `r` keeps only features
 * larger than roughly `r` pixels but also flattens them towards the mean.
 * The amplify pass stretches the result around the midpoint (128) by
 * `r / 2`, so coarser octaves get proportionally more contrast back, and
 * the second blur smooths away the hard edges that clamping introduces.
 */

use crate::blur::{BlurError, BlurStrategy, GaussianBlur};
use crate::pixel::{Pixel, MIDPOINT};
use crate::raster::Raster;

/// A derived layer and the radius that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct OctaveLayer {
    /// Blur radius (Gaussian sigma) used for both blur passes
    pub radius: f32,
    /// Layer pixels, same dimensions as the base noise
    pub raster: Raster,
}

impl OctaveLayer {
    /// Tag a raster with its radius
    pub fn new(radius: f32, raster: Raster) -> Self {
        Self { radius, raster }
    }
}

/// Contrast stretch around the midpoint
///
/// `((v / 128 - 1) * amplitude + 1) * 128`, rounded and clamped, in every
/// channel. 128 is a fixed point and an amplitude of zero collapses
/// everything to 128.
pub fn amplify(value: u8, amplitude: f32) -> Pixel {
    let centered = (f32::from(value) / MIDPOINT - 1.0) * amplitude;
    Pixel::gray_from_f32((centered + 1.0) * MIDPOINT)
}

/// Produces one octave layer per radius from a shared base
#[derive(Debug, Clone, Copy, Default)]
pub struct BlurAmplifyStage {
    strategy: BlurStrategy,
}

impl BlurAmplifyStage {
    /// Stage with automatic blur strategy selection
    pub fn new() -> Self {
        Self::default()
    }

    /// Force a blur strategy for both passes
    pub fn with_strategy(strategy: BlurStrategy) -> Self {
        Self { strategy }
    }

    /// Derive the octave for `radius` without touching `base`
    pub fn process(&self, base: &Raster, radius: f32) -> Result<OctaveLayer, BlurError> {
        let blur = GaussianBlur::new(radius)?.with_strategy(self.strategy);
        let amplitude = radius / 2.0;

        let mut layer = blur.apply(base);
        layer.map_in_place(|pixel| amplify(pixel.r, amplitude));
        let layer = blur.apply(&layer);

        Ok(OctaveLayer::new(radius, layer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_amplify_midpoint_is_fixed() {
        for amplitude in [0.0, 0.5, 1.0, 5.0, 15.0, 1000.0] {
            assert_eq!(amplify(128, amplitude), Pixel::gray(128));
        }
    }

    #[test]
    fn test_amplify_zero_amplitude_collapses() {
        for value in 0..=255u8 {
            assert_eq!(amplify(value, 0.0), Pixel::gray(128));
        }
    }

    #[test]
    fn test_amplify_unit_amplitude_is_identity() {
        for value in 0..=255u8 {
            assert_eq!(amplify(value, 1.0), Pixel::gray(value));
        }
    }

    #[test]
    fn test_amplify_stretches_and_clamps() {
        // (96 / 128 - 1) * 2 = -0.5 -> 64
        assert_eq!(amplify(96, 2.0), Pixel::gray(64));
        // (160 / 128 - 1) * 2 = 0.5 -> 192
        assert_eq!(amplify(160, 2.0), Pixel::gray(192));
        assert_eq!(amplify(0, 10.0), Pixel::gray(0));
        assert_eq!(amplify(255, 10.0), Pixel::gray(255));
        // Half amplitude pulls towards the midpoint.
        assert_eq!(amplify(0, 0.5), Pixel::gray(64));
    }

    #[test]
    fn test_process_constant_field() {
        let base = Raster::filled(4, 4, Pixel::gray(100)).unwrap();
        let layer = BlurAmplifyStage::new().process(&base, 2.0).unwrap();

        assert_eq!(layer.radius, 2.0);
        // Amplitude 1.0 leaves 100 unchanged.
        assert!(layer.raster.pixels().all(|p| p == Pixel::gray(100)));

        let layer = BlurAmplifyStage::new().process(&base, 4.0).unwrap();
        // (100 / 128 - 1) * 2 + 1 = 0.5625 -> 72
        assert!(layer.raster.pixels().all(|p| p == Pixel::gray(72)));
    }

    #[test]
    fn test_process_leaves_base_untouched() {
        let mut rng = StdRng::seed_from_u64(4);
        let base = Raster::from_fn(12, 12, |_, _| Pixel::gray(rng.gen())).unwrap();
        let snapshot = base.clone();

        let layer = BlurAmplifyStage::new().process(&base, 3.0).unwrap();

        assert_eq!(base, snapshot);
        assert_eq!(layer.raster.dimensions(), base.dimensions());
    }

    #[test]
    fn test_process_rejects_bad_radius() {
        let base = Raster::filled(4, 4, Pixel::gray(1)).unwrap();
        assert!(matches!(
            BlurAmplifyStage::new().process(&base, 0.0),
            Err(BlurError::InvalidRadius(_))
        ));
        assert!(BlurAmplifyStage::new().process(&base, -2.0).is_err());
        assert!(BlurAmplifyStage::new().process(&base, 1e19).is_err());
    }

    #[test]
    fn test_larger_radius_is_smoother() {
        let mut rng = StdRng::seed_from_u64(12);
        let base = Raster::from_fn(48, 48, |_, _| Pixel::gray(rng.gen())).unwrap();

        let roughness = |raster: &Raster| -> u64 {
            let mut total = 0u64;
            for y in 0..raster.height() {
                for x in 1..raster.width() {
                    let a = raster.get(x - 1, y).unwrap().r;
                    let b = raster.get(x, y).unwrap().r;
                    total += u64::from(a.abs_diff(b));
                }
            }
            total
        };

        let stage = BlurAmplifyStage::with_strategy(BlurStrategy::Direct);
        let fine = stage.process(&base, 1.0).unwrap();
        let coarse = stage.process(&base, 4.0).unwrap();

        assert!(roughness(&coarse.raster) < roughness(&fine.raster));
        assert!(roughness(&fine.raster) < roughness(&base));
    }
}
