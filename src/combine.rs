/**
 * Layer combination
 *
 * Every octave contributes a signed offset `(layer / 128 - 1) * amount`
 * around its own midpoint. Offsets are accumulated pixel by pixel onto a
 * running value that starts black, and each step feeds its output into the
 * next, so the layers compound. The base noise only fixes the output size.
 */

use crate::octave::OctaveLayer;
use crate::pixel::{Pixel, MIDPOINT};
use crate::raster::{Raster, Result};

/// Blend amount used by the pipeline for every layer
pub const DEFAULT_BLEND_AMOUNT: f32 = 1.0;

/// `c1.r + (c2.r / 128 - 1) * amount`, rounded, clamped and replicated
pub fn add_noise(c1: Pixel, c2: Pixel, amount: f32) -> Pixel {
    let offset = (f32::from(c2.r) / MIDPOINT - 1.0) * amount;
    Pixel::gray_from_f32(f32::from(c1.r) + offset)
}

/// Folds an ordered sequence of octave layers into one raster
#[derive(Debug, Clone, Copy)]
pub struct LayerCombiner {
    amount: f32,
}

impl Default for LayerCombiner {
    fn default() -> Self {
        Self {
            amount: DEFAULT_BLEND_AMOUNT,
        }
    }
}

impl LayerCombiner {
    /// Combiner with blend amount 1
    pub fn new() -> Self {
        Self::default()
    }

    /// Combiner with a custom blend amount
    pub fn with_amount(amount: f32) -> Self {
        Self { amount }
    }

    /// Combine `layers` into a raster the size of `base`
    pub fn combine(&self, base: &Raster, layers: &[OctaveLayer]) -> Result<Raster> {
        self.combine_with(base, layers, |_, _, _| {})
    }

    /// Same as [`combine`](Self::combine), reporting every finished pixel in
    /// row-major order as it is written
    pub fn combine_with<F>(&self, base: &Raster, layers: &[OctaveLayer], mut on_pixel: F) -> Result<Raster>
    where
        F: FnMut(u32, u32, Pixel),
    {
        for layer in layers {
            base.ensure_same_dimensions(&layer.raster)?;
        }

        let (width, height) = base.dimensions();
        let mut combined = Raster::new(width, height)?;

        for y in 0..height {
            for x in 0..width {
                let mut acc = Pixel::BLACK;
                for layer in layers {
                    acc = add_noise(acc, layer.raster.get(x, y)?, self.amount);
                }
                combined.set(x, y, acc)?;
                on_pixel(x, y, acc);
            }
        }

        Ok(combined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::RasterError;

    fn layer(radius: f32, value: u8) -> OctaveLayer {
        OctaveLayer::new(radius, Raster::filled(3, 2, Pixel::gray(value)).unwrap())
    }

    #[test]
    fn test_add_noise_zero_amount_is_noop() {
        for c in [0u8, 1, 100, 128, 254, 255] {
            for c2 in [0u8, 64, 128, 255] {
                assert_eq!(add_noise(Pixel::gray(c), Pixel::gray(c2), 0.0), Pixel::gray(c));
            }
        }
    }

    #[test]
    fn test_add_noise_offsets() {
        // 255 / 128 - 1 = 0.9921875 -> +1
        assert_eq!(add_noise(Pixel::gray(10), Pixel::gray(255), 1.0), Pixel::gray(11));
        // 0 / 128 - 1 = -1
        assert_eq!(add_noise(Pixel::gray(10), Pixel::gray(0), 1.0), Pixel::gray(9));
        // Midpoint layer contributes nothing.
        assert_eq!(add_noise(Pixel::gray(10), Pixel::gray(128), 1.0), Pixel::gray(10));
        // Larger amounts scale the offset.
        assert_eq!(add_noise(Pixel::gray(100), Pixel::gray(0), 40.0), Pixel::gray(60));
    }

    #[test]
    fn test_add_noise_clamps() {
        assert_eq!(add_noise(Pixel::gray(0), Pixel::gray(0), 1.0), Pixel::gray(0));
        assert_eq!(add_noise(Pixel::gray(255), Pixel::gray(255), 1.0), Pixel::gray(255));
        assert_eq!(add_noise(Pixel::gray(200), Pixel::gray(255), 500.0), Pixel::gray(255));
    }

    #[test]
    fn test_add_noise_reads_red_channel() {
        let c1 = Pixel::new(50, 0, 0);
        let c2 = Pixel::new(0, 255, 255);
        assert_eq!(add_noise(c1, c2, 1.0), Pixel::gray(49));
    }

    #[test]
    fn test_combine_empty_is_black() {
        let base = Raster::filled(3, 2, Pixel::gray(200)).unwrap();
        let combined = LayerCombiner::new().combine(&base, &[]).unwrap();
        assert!(combined.pixels().all(|p| p == Pixel::BLACK));
        assert_eq!(combined.dimensions(), (3, 2));
    }

    #[test]
    fn test_combine_accumulates_across_layers() {
        let base = Raster::new(3, 2).unwrap();
        let layers = [layer(10.0, 255), layer(20.0, 255), layer(30.0, 255)];

        let combined = LayerCombiner::new().combine(&base, &layers).unwrap();

        // Each white layer adds one step; only the running fold reaches 3.
        assert!(combined.pixels().all(|p| p == Pixel::gray(3)));
    }

    #[test]
    fn test_combine_order_independent_without_clamping() {
        let base = Raster::new(3, 2).unwrap();
        let combiner = LayerCombiner::with_amount(20.0);
        let forward = [layer(1.0, 255), layer(2.0, 64), layer(3.0, 192)];
        let reversed = [layer(3.0, 192), layer(2.0, 64), layer(1.0, 255)];

        let a = combiner.combine(&base, &forward).unwrap();
        let b = combiner.combine(&base, &reversed).unwrap();

        // 255 -> +19.84 (20), 64 -> -10, 192 -> +10
        assert!(a.pixels().all(|p| p == Pixel::gray(20)));
        assert_eq!(a, b);
    }

    #[test]
    fn test_combine_with_streams_every_pixel() {
        let base = Raster::new(3, 2).unwrap();
        let layers = [layer(1.0, 0)];
        let mut seen = Vec::new();

        let combined = LayerCombiner::with_amount(-50.0)
            .combine_with(&base, &layers, |x, y, pixel| seen.push((x, y, pixel)))
            .unwrap();

        assert_eq!(seen.len(), 6);
        assert_eq!(seen[0], (0, 0, Pixel::gray(50)));
        assert_eq!(seen[5], (2, 1, Pixel::gray(50)));
        for (x, y, pixel) in seen {
            assert_eq!(combined.get(x, y).unwrap(), pixel);
        }
    }

    #[test]
    fn test_combine_rejects_mismatched_layer() {
        let base = Raster::new(4, 4).unwrap();
        let layers = [layer(1.0, 10)];
        assert!(matches!(
            LayerCombiner::new().combine(&base, &layers),
            Err(RasterError::DimensionMismatch { .. })
        ));
    }
}
