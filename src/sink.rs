/**
 * Persistence of octave layers and the final texture
 *
 * Files are lossless PNGs named after what they hold:
 *
 *   <prefix>_blurred_radius_<r>.png   one per octave
 *   <prefix>_layered_combined.png     the combined texture
 */

use crate::raster::{Raster, RasterError};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Error types for persistence
#[derive(Error, Debug)]
pub enum SinkError {
    /// Output directory could not be created
    #[error("Failed to create output directory {path}: {source}")]
    CreateDir {
        /// Directory that was being created
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Encoding or writing the image failed
    #[error("Failed to save {path}: {source}")]
    Save {
        /// File that was being written
        path: PathBuf,
        /// Underlying raster error
        source: RasterError,
    },
}

/// Result type for sink operations
pub type Result<T> = std::result::Result<T, SinkError>;

/// Accepts finished rasters under a file name
pub trait PersistenceSink {
    /// Store `raster` as `filename`. Returns the path written, or `None`
    /// when the sink keeps nothing.
    fn persist(&mut self, raster: &Raster, filename: &str) -> Result<Option<PathBuf>>;
}

/// Writes PNG files into a directory
#[derive(Debug, Clone)]
pub struct PngSink {
    dir: PathBuf,
}

impl PngSink {
    /// Sink writing into `dir`, created on first use
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Target directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl PersistenceSink for PngSink {
    fn persist(&mut self, raster: &Raster, filename: &str) -> Result<Option<PathBuf>> {
        if !self.dir.as_os_str().is_empty() {
            std::fs::create_dir_all(&self.dir).map_err(|source| SinkError::CreateDir {
                path: self.dir.clone(),
                source,
            })?;
        }

        let path = self.dir.join(filename);
        raster.save(&path).map_err(|source| SinkError::Save {
            path: path.clone(),
            source,
        })?;

        info!("Saved {}", path.display());
        Ok(Some(path))
    }
}

/// Sink that keeps nothing, for runs that only display
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscardSink;

impl PersistenceSink for DiscardSink {
    fn persist(&mut self, _raster: &Raster, _filename: &str) -> Result<Option<PathBuf>> {
        Ok(None)
    }
}

/// `<prefix>_blurred_radius_<radius>.png`
pub fn layer_filename(prefix: &str, radius: f32) -> String {
    format!("{}_blurred_radius_{}.png", prefix, radius)
}

/// `<prefix>_layered_combined.png`
pub fn combined_filename(prefix: &str) -> String {
    format!("{}_layered_combined.png", prefix)
}
