//! Layered Noise Library
//!
//! Procedural grey-scale textures built by stacking "octaves" of blurred
//! white noise, each octave contributing structure at its own scale.
//!
//! # Features
//!
//! - Heavy-tailed white noise base buffer
//! - Separable Gaussian blur with clamp-to-edge borders, parallel across
//!   rows and columns, with an FFT path for wide kernels
//! - Per-octave contrast amplification proportional to the blur radius
//! - Running-accumulator combination of any number of octaves
//! - PNG output of every octave and the final texture
//! - Background synthesis with row-by-row streaming and cancellation
//! - Optional preview window (`display` feature)
//!
//! # Quick Start
//!
//! ```no_run
//! use layered_noise::{NoiseSynthesizer, SynthesisConfig};
//!
//! let config = SynthesisConfig {
//!     width: 256,
//!     height: 256,
//!     radii: vec![4.0, 8.0, 16.0],
//!     ..Default::default()
//! };
//!
//! let report = NoiseSynthesizer::new(config).unwrap().run(&mut ()).unwrap();
//! println!("{} octaves, {} files", report.layers.len(), report.saved.len());
//! ```
//!
//! # Algorithm
//!
//! 1. **Base**: every pixel gets `floor(u * r1 / r2 + r3)` clamped to
//!    0-255, with `u` uniform in 0-255 and `r1..r3` uniform in [0, 1)
//! 2. **Octave** (per radius `r`): Gaussian blur with sigma `r`, remap
//!    `v -> ((v / 128 - 1) * r / 2 + 1) * 128`, blur again
//! 3. **Combine**: starting from black, each octave adds
//!    `octave / 128 - 1` to the running value at every pixel
//!
//! All intermediate values are rounded and clamped to 0-255 before they
//! are stored.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

/// Separable Gaussian blur
pub mod blur;
/// Octave layer combination
pub mod combine;
/// Preview window
#[cfg(feature = "display")]
pub mod display;
/// Octave derivation
pub mod octave;
/// Synthesis pipeline and configuration
pub mod pipeline;
/// Pixel type and channel clamping
pub mod pixel;
/// Fixed-size RGB raster
pub mod raster;
/// White noise sampling
pub mod sampler;
/// PNG persistence
pub mod sink;
/// Background synthesis
pub mod worker;

// Re-export main types for convenience
pub use blur::{BlurError, BlurStrategy, GaussianBlur, MAX_RADIUS};
pub use combine::{add_noise, LayerCombiner};
#[cfg(feature = "display")]
pub use display::{DisplayConfig, DisplayContext, DisplayError};
pub use octave::{amplify, BlurAmplifyStage, OctaveLayer};
pub use pipeline::{
    synthesize, CancelToken, NoiseSynthesizer, PipelineError, SynthesisConfig, SynthesisObserver,
    SynthesisReport,
};
pub use pixel::Pixel;
pub use raster::{Raster, RasterError};
pub use sampler::{build_base_noise, ConstantSampler, NoiseSampler, RandomColorSampler};
pub use sink::{DiscardSink, PersistenceSink, PngSink, SinkError};
pub use worker::{spawn_synthesis, SynthesisEvent, SynthesisHandle};
