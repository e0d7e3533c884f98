/**
 * Fixed-size RGB raster
 *
 * Thin owner around `image::RgbImage` with bounds-checked access. The
 * dimensions are set once at construction; there is no way to resize a
 * raster after the fact. Stages hand rasters to each other by value.
 */

use crate::pixel::Pixel;
use image::{ImageBuffer, RgbImage};
use std::path::Path;
use thiserror::Error;

/// Error types for raster access and image I/O
#[derive(Error, Debug)]
pub enum RasterError {
    /// Width or height is zero
    #[error("Raster width and height must be positive (got {width}×{height})")]
    InvalidDimensions {
        /// Requested width
        width: u32,
        /// Requested height
        height: u32,
    },

    /// Coordinates fall outside the raster
    #[error("Pixel ({x}, {y}) is outside the {width}×{height} raster")]
    OutOfBounds {
        /// Requested column
        x: u32,
        /// Requested row
        y: u32,
        /// Raster width
        width: u32,
        /// Raster height
        height: u32,
    },

    /// Two rasters that must share dimensions do not
    #[error("Raster dimensions differ: expected {expected:?}, found {found:?}")]
    DimensionMismatch {
        /// Dimensions of the reference raster
        expected: (u32, u32),
        /// Dimensions of the offending raster
        found: (u32, u32),
    },

    /// Failed to load or save an image
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Result type for raster operations
pub type Result<T> = std::result::Result<T, RasterError>;

/// Width×height grid of RGB pixels
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    image: RgbImage,
}

impl Raster {
    /// Create a black raster
    pub fn new(width: u32, height: u32) -> Result<Self> {
        Self::check_dimensions(width, height)?;
        Ok(Self {
            image: ImageBuffer::new(width, height),
        })
    }

    /// Create a raster filled with a single colour
    pub fn filled(width: u32, height: u32, pixel: Pixel) -> Result<Self> {
        Self::from_fn(width, height, |_, _| pixel)
    }

    /// Create a raster by evaluating `f` at every position in row-major order
    pub fn from_fn<F>(width: u32, height: u32, mut f: F) -> Result<Self>
    where
        F: FnMut(u32, u32) -> Pixel,
    {
        Self::check_dimensions(width, height)?;
        let mut image: RgbImage = ImageBuffer::new(width, height);
        for y in 0..height {
            for x in 0..width {
                image.put_pixel(x, y, f(x, y).into());
            }
        }
        Ok(Self { image })
    }

    /// Wrap an existing image buffer
    pub fn from_image(image: RgbImage) -> Result<Self> {
        let (width, height) = image.dimensions();
        Self::check_dimensions(width, height)?;
        Ok(Self { image })
    }

    /// Load a raster from disk, converting to RGB
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let image = image::open(path)?.to_rgb8();
        Self::from_image(image)
    }

    /// Save the raster; the format follows the file extension
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.image.save(path)?;
        Ok(())
    }

    fn check_dimensions(width: u32, height: u32) -> Result<()> {
        if width == 0 || height == 0 {
            return Err(RasterError::InvalidDimensions { width, height });
        }
        Ok(())
    }

    /// Raster width in pixels
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Raster height in pixels
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// `(width, height)`
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    #[inline]
    fn in_bounds(&self, x: u32, y: u32) -> Result<()> {
        let (width, height) = self.dimensions();
        if x >= width || y >= height {
            return Err(RasterError::OutOfBounds {
                x,
                y,
                width,
                height,
            });
        }
        Ok(())
    }

    /// Read the pixel at `(x, y)`
    pub fn get(&self, x: u32, y: u32) -> Result<Pixel> {
        self.in_bounds(x, y)?;
        Ok((*self.image.get_pixel(x, y)).into())
    }

    /// Overwrite the pixel at `(x, y)`
    pub fn set(&mut self, x: u32, y: u32, pixel: Pixel) -> Result<()> {
        self.in_bounds(x, y)?;
        self.image.put_pixel(x, y, pixel.into());
        Ok(())
    }

    /// Error unless `other` has the same dimensions as `self`
    pub fn ensure_same_dimensions(&self, other: &Raster) -> Result<()> {
        if self.dimensions() != other.dimensions() {
            return Err(RasterError::DimensionMismatch {
                expected: self.dimensions(),
                found: other.dimensions(),
            });
        }
        Ok(())
    }

    /// Iterate pixels in row-major order
    pub fn pixels(&self) -> impl Iterator<Item = Pixel> + '_ {
        self.image.pixels().map(|&rgb| rgb.into())
    }

    /// Apply `f` to every pixel in place
    pub fn map_in_place<F>(&mut self, mut f: F)
    where
        F: FnMut(Pixel) -> Pixel,
    {
        for rgb in self.image.pixels_mut() {
            *rgb = f((*rgb).into()).into();
        }
    }

    /// Interleaved RGB bytes, row-major
    pub fn as_raw(&self) -> &[u8] {
        self.image.as_raw()
    }

    /// Borrow the underlying image buffer
    pub fn as_image(&self) -> &RgbImage {
        &self.image
    }

    /// Give up the underlying image buffer
    pub fn into_image(self) -> RgbImage {
        self.image
    }
}
