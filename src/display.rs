/**
 * On-screen preview of the combined texture
 *
 * The window, its frame buffer and frame pacing all live in one
 * `DisplayContext` owned by the main thread. Synthesis runs on a worker
 * (see `worker`) and the context only consumes its events, painting rows
 * of the final texture as they arrive.
 *
 * Escape or closing the window ends the loop. If synthesis is still running
 * at that point the worker is asked to cancel and the loop joins it; the
 * worker stops at its next checkpoint, so quitting during a long blur waits
 * for that blur to finish.
 */

use crate::pipeline::{PipelineError, SynthesisReport};
use crate::pixel::Pixel;
use crate::raster::Raster;
use crate::worker::{SynthesisEvent, SynthesisHandle};
use minifb::{Key, Window, WindowOptions};
use thiserror::Error;
use tracing::info;

/// Window settings
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayConfig {
    /// Window title
    pub title: String,
    /// Borderless, always-on-top window covering the texture
    pub fullscreen: bool,
    /// Frame rate cap for the event loop
    pub target_fps: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            title: String::from("Layered Noise"),
            fullscreen: false,
            target_fps: 60,
        }
    }
}

/// Error types for the preview window
#[derive(Error, Debug)]
pub enum DisplayError {
    /// Window creation or presentation failed
    #[error("Window error: {0}")]
    Window(#[from] minifb::Error),

    /// The synthesis worker failed
    #[error("Synthesis failed: {0}")]
    Pipeline(#[from] PipelineError),
}

/// Result type for display operations
pub type Result<T> = std::result::Result<T, DisplayError>;

/// `0RGB` word as expected by minifb
#[inline]
pub fn pack_rgb(pixel: Pixel) -> u32 {
    (u32::from(pixel.r) << 16) | (u32::from(pixel.g) << 8) | u32::from(pixel.b)
}

/// CPU-side copy of what the window shows
#[derive(Debug, Clone, PartialEq)]
pub struct FrameBuffer {
    width: usize,
    height: usize,
    data: Vec<u32>,
}

impl FrameBuffer {
    /// Black buffer of the given size
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0; width * height],
        }
    }

    /// Packed pixels, row-major
    pub fn data(&self) -> &[u32] {
        &self.data
    }

    /// Paint one row; pixels beyond the buffer are ignored
    pub fn put_row(&mut self, y: u32, pixels: &[Pixel]) {
        let y = y as usize;
        if y >= self.height {
            return;
        }
        let start = y * self.width;
        for (slot, &pixel) in self.data[start..start + self.width].iter_mut().zip(pixels) {
            *slot = pack_rgb(pixel);
        }
    }

    /// Paint a whole raster over the buffer
    pub fn put_raster(&mut self, raster: &Raster) {
        let width = (raster.width() as usize).min(self.width);
        for (y, row) in raster.as_raw().chunks(raster.width() as usize * 3).enumerate().take(self.height) {
            for (x, rgb) in row.chunks(3).enumerate().take(width) {
                self.data[y * self.width + x] = pack_rgb(Pixel::new(rgb[0], rgb[1], rgb[2]));
            }
        }
    }

    /// Apply a worker event; returns whether anything visible changed
    pub fn apply(&mut self, event: &SynthesisEvent) -> bool {
        match event {
            SynthesisEvent::Row { y, pixels } => {
                self.put_row(*y, pixels);
                true
            }
            SynthesisEvent::Finished(raster) => {
                self.put_raster(raster);
                true
            }
            SynthesisEvent::BaseReady => {
                info!("Base noise ready");
                false
            }
            SynthesisEvent::LayerReady { radius } => {
                info!("Octave with radius {} ready", radius);
                false
            }
        }
    }
}

/// Window plus frame buffer, created once at startup
pub struct DisplayContext {
    window: Window,
    frame: FrameBuffer,
}

impl DisplayContext {
    /// Open a window sized to the texture
    pub fn new(config: &DisplayConfig, width: u32, height: u32) -> Result<Self> {
        let options = WindowOptions {
            borderless: config.fullscreen,
            topmost: config.fullscreen,
            ..WindowOptions::default()
        };
        let mut window = Window::new(&config.title, width as usize, height as usize, options)?;
        window.set_target_fps(config.target_fps);

        Ok(Self {
            window,
            frame: FrameBuffer::new(width as usize, height as usize),
        })
    }

    fn should_quit(&self) -> bool {
        !self.window.is_open() || self.window.is_key_down(Key::Escape)
    }

    /// Show the texture while `handle` produces it, until the user quits
    ///
    /// Returns the report of a completed run, or `None` if the user quit
    /// before synthesis finished.
    pub fn run(mut self, handle: SynthesisHandle) -> Result<Option<SynthesisReport>> {
        while !self.should_quit() {
            for event in handle.events().try_iter() {
                self.frame.apply(&event);
            }
            self.window
                .update_with_buffer(self.frame.data(), self.frame.width, self.frame.height)?;
        }

        if !handle.is_finished() {
            info!("Quit requested, waiting for synthesis to reach a checkpoint");
            handle.cancel();
        }

        match handle.join() {
            Ok(report) => Ok(Some(report)),
            Err(PipelineError::Cancelled) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}
