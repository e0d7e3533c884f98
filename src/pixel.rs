/**
 * Pixel type and the channel clamping shared by every stage
 *
 * All colour math in the pipeline happens in floating point and is pushed
 * back into the 0-255 range here before it is stored. Out-of-range values
 * are routine (amplification deliberately overshoots), so clamping is a
 * silent correction rather than an error.
 */

use image::Rgb;

/// Midpoint of the channel range, the fixed point of amplification
pub const MIDPOINT: f32 = 128.0;

/// RGB pixel with 8-bit channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Pixel {
    /// Red component (0-255)
    pub r: u8,
    /// Green component (0-255)
    pub g: u8,
    /// Blue component (0-255)
    pub b: u8,
}

impl Pixel {
    /// Black, the neutral start of layer accumulation
    pub const BLACK: Pixel = Pixel { r: 0, g: 0, b: 0 };

    /// Create a new pixel from RGB values
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Grey pixel with the same value in every channel
    pub fn gray(value: u8) -> Self {
        Self {
            r: value,
            g: value,
            b: value,
        }
    }

    /// Round a floating point value, clamp it and replicate it into all channels
    pub fn gray_from_f32(value: f32) -> Self {
        Self::gray(round_channel(value))
    }

    /// Channels as an array in RGB order
    pub fn channels(&self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

impl From<Rgb<u8>> for Pixel {
    fn from(rgb: Rgb<u8>) -> Self {
        let [r, g, b] = rgb.0;
        Self { r, g, b }
    }
}

impl From<Pixel> for Rgb<u8> {
    fn from(pixel: Pixel) -> Self {
        Rgb(pixel.channels())
    }
}

/// Clamp an integer channel value into 0-255
#[inline]
pub fn clamp_channel(value: i64) -> u8 {
    value.clamp(0, 255) as u8
}

/// Round to nearest and clamp into 0-255. NaN maps to 0.
#[inline]
pub fn round_channel(value: f32) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, 255.0) as u8
}
