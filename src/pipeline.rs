/**
 * Layered noise synthesis pipeline
 *
 * 1. Fill a base raster with white noise
 * 2. For each configured radius derive an octave layer (blur, amplify,
 *    blur) and persist it
 * 3. Fold all octaves into the final texture, streaming its pixels to an
 *    observer, and persist it
 *
 * The base is built once and only read afterwards. Octaves are independent
 * of each other; only the final fold looks at all of them.
 *
 * Persistence failures do not stop the run. They are logged, collected in
 * the report and the in-memory texture is still produced.
 *
 * A `CancelToken` is checked before each octave and before combination, so
 * a caller on another thread can abort between stages. A stage that has
 * already started always runs to completion.
 */

use crate::blur::{is_valid_radius, BlurError, BlurStrategy, MAX_RADIUS};
use crate::combine::LayerCombiner;
use crate::octave::{BlurAmplifyStage, OctaveLayer};
use crate::pixel::Pixel;
use crate::raster::{Raster, RasterError};
use crate::sampler::{build_base_noise, NoiseSampler, RandomColorSampler};
use crate::sink::{combined_filename, layer_filename, DiscardSink, PersistenceSink, PngSink, SinkError};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{info, warn};

/// Configuration for a synthesis run
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisConfig {
    /// Width of the texture in pixels
    pub width: u32,
    /// Height of the texture in pixels
    pub height: u32,
    /// Blur radius of each octave, in output order
    pub radii: Vec<f32>,
    /// Directory receiving the PNG files
    pub output_dir: PathBuf,
    /// File name prefix for every saved image
    pub file_prefix: String,
    /// Write octaves and the final texture to disk
    pub persist: bool,
    /// Blur evaluation strategy
    pub blur_strategy: BlurStrategy,
    /// Show a progress bar
    pub verbose: bool,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            radii: vec![10.0, 20.0, 30.0],
            output_dir: PathBuf::from("."),
            file_prefix: String::from("noise"),
            persist: true,
            blur_strategy: BlurStrategy::Auto,
            verbose: false,
        }
    }
}

impl SynthesisConfig {
    /// Reject configurations that cannot produce a texture
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(PipelineError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        if self.radii.is_empty() {
            return Err(PipelineError::NoRadii);
        }
        if let Some(&radius) = self.radii.iter().find(|r| !is_valid_radius(**r)) {
            return Err(PipelineError::InvalidRadius(radius));
        }
        Ok(())
    }
}

/// Error types for the synthesis pipeline
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Width or height is zero
    #[error("Width and height must be positive (got {width}×{height})")]
    InvalidDimensions {
        /// Configured width
        width: u32,
        /// Configured height
        height: u32,
    },

    /// No octave radii configured
    #[error("At least one blur radius is required")]
    NoRadii,

    /// A radius is zero, negative, not finite or above `MAX_RADIUS`
    #[error("Blur radii must be in (0, {max}] (got {0})", max = MAX_RADIUS)]
    InvalidRadius(f32),

    /// Raster construction or access failed
    #[error(transparent)]
    Raster(#[from] RasterError),

    /// Blur construction failed
    #[error(transparent)]
    Blur(#[from] BlurError),

    /// The run was cancelled between stages
    #[error("Synthesis cancelled")]
    Cancelled,

    /// The worker thread could not be started
    #[error("Failed to spawn synthesis worker: {0}")]
    Spawn(#[source] std::io::Error),

    /// The worker thread panicked
    #[error("Synthesis worker panicked")]
    WorkerPanicked,
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Shared flag asking a running pipeline to stop at the next checkpoint
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Fresh, uncancelled token
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// Whether cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    fn checkpoint(&self) -> Result<()> {
        if self.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }
        Ok(())
    }
}

/// Receives intermediate results while the pipeline runs
pub trait SynthesisObserver {
    /// Base noise is complete
    fn base_ready(&mut self, _base: &Raster) {}

    /// One octave is complete
    fn layer_ready(&mut self, _layer: &OctaveLayer) {}

    /// One pixel of the final texture is final
    fn pixel(&mut self, _x: u32, _y: u32, _pixel: Pixel) {}

    /// The final texture is complete
    fn finished(&mut self, _combined: &Raster) {}
}

impl SynthesisObserver for () {}

/// Everything a run produced
#[derive(Debug)]
pub struct SynthesisReport {
    /// White noise the octaves were derived from
    pub base: Raster,
    /// Octaves in configured order
    pub layers: Vec<OctaveLayer>,
    /// Final texture
    pub combined: Raster,
    /// Files written successfully
    pub saved: Vec<PathBuf>,
    /// Files that could not be written
    pub persistence_errors: Vec<SinkError>,
}

/// Runs the full base → octaves → combination pipeline
pub struct NoiseSynthesizer {
    config: SynthesisConfig,
    stage: BlurAmplifyStage,
    combiner: LayerCombiner,
    cancel: CancelToken,
    progress: Option<ProgressBar>,
}

impl NoiseSynthesizer {
    /// Validate `config` and prepare a synthesizer
    pub fn new(config: SynthesisConfig) -> Result<Self> {
        config.validate()?;

        let progress = if config.verbose {
            let pb = ProgressBar::new(config.radii.len() as u64 + 2);
            if let Ok(style) =
                ProgressStyle::default_bar().template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
            {
                pb.set_style(style.progress_chars("##-"));
            }
            Some(pb)
        } else {
            None
        };

        Ok(Self {
            stage: BlurAmplifyStage::with_strategy(config.blur_strategy),
            combiner: LayerCombiner::new(),
            cancel: CancelToken::new(),
            progress,
            config,
        })
    }

    /// Use `cancel` as the cancellation flag
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Active configuration
    pub fn config(&self) -> &SynthesisConfig {
        &self.config
    }

    fn progress_message(&self, message: String) {
        if let Some(pb) = &self.progress {
            pb.set_message(message);
        }
    }

    fn progress_step(&self) {
        if let Some(pb) = &self.progress {
            pb.inc(1);
        }
    }

    /// Run with entropy-seeded white noise, saving per the configuration
    pub fn run(self, observer: &mut dyn SynthesisObserver) -> Result<SynthesisReport> {
        let mut sampler = RandomColorSampler::from_entropy();
        if self.config.persist {
            let mut sink = PngSink::new(&self.config.output_dir);
            self.run_with(&mut sampler, &mut sink, observer)
        } else {
            self.run_with(&mut sampler, &mut DiscardSink, observer)
        }
    }

    /// Run with an explicit sampler and sink
    pub fn run_with<S, K>(
        self,
        sampler: &mut S,
        sink: &mut K,
        observer: &mut dyn SynthesisObserver,
    ) -> Result<SynthesisReport>
    where
        S: NoiseSampler + ?Sized,
        K: PersistenceSink + ?Sized,
    {
        let SynthesisConfig {
            width,
            height,
            ref radii,
            ref file_prefix,
            ..
        } = self.config;

        let mut saved = Vec::new();
        let mut persistence_errors = Vec::new();
        let mut record = |result: std::result::Result<Option<PathBuf>, SinkError>| match result {
            Ok(Some(path)) => saved.push(path),
            Ok(None) => {}
            Err(err) => {
                warn!("{}", err);
                persistence_errors.push(err);
            }
        };

        self.cancel.checkpoint()?;
        self.progress_message(format!("Generating {}×{} base noise", width, height));
        let start = Instant::now();
        let base = build_base_noise(width, height, sampler)?;
        info!(
            "Done generating initial noise in {:.3}s",
            start.elapsed().as_secs_f32()
        );
        observer.base_ready(&base);
        self.progress_step();

        let mut layers = Vec::with_capacity(radii.len());
        for &radius in radii {
            self.cancel.checkpoint()?;
            self.progress_message(format!("Blurring and amplifying radius {}", radius));

            let start = Instant::now();
            let layer = self.stage.process(&base, radius)?;
            info!(
                "Done blurring and amplifying image with radius {} in {:.3}s",
                radius,
                start.elapsed().as_secs_f32()
            );

            record(sink.persist(&layer.raster, &layer_filename(file_prefix, radius)));
            observer.layer_ready(&layer);
            layers.push(layer);
            self.progress_step();
        }

        self.cancel.checkpoint()?;
        self.progress_message(format!("Layering {} octaves", layers.len()));
        let start = Instant::now();
        let combined = self
            .combiner
            .combine_with(&base, &layers, |x, y, pixel| observer.pixel(x, y, pixel))?;
        info!(
            "Done layering all images in {:.3}s",
            start.elapsed().as_secs_f32()
        );

        record(sink.persist(&combined, &combined_filename(file_prefix)));
        observer.finished(&combined);
        self.progress_step();

        if let Some(pb) = &self.progress {
            pb.finish_with_message("Layered noise complete");
        }

        Ok(SynthesisReport {
            base,
            layers,
            combined,
            saved,
            persistence_errors,
        })
    }
}

/**
 * Convenience function to synthesize a texture without saving anything
 */
pub fn synthesize(width: u32, height: u32, radii: &[f32]) -> Result<Raster> {
    let config = SynthesisConfig {
        width,
        height,
        radii: radii.to_vec(),
        persist: false,
        ..Default::default()
    };
    let report = NoiseSynthesizer::new(config)?.run(&mut ())?;
    Ok(report.combined)
}
