/**
 * Background synthesis
 *
 * The pipeline runs on its own thread and talks to whoever drives the
 * display through a channel. Nothing is shared but the cancel flag: rows of
 * the final texture are copied into messages as soon as they are complete,
 * and a copy of the finished raster arrives in the last message.
 */

use crate::octave::OctaveLayer;
use crate::pipeline::{
    CancelToken, NoiseSynthesizer, PipelineError, Result, SynthesisConfig, SynthesisObserver,
    SynthesisReport,
};
use crate::pixel::Pixel;
use crate::raster::Raster;
use crossbeam::channel::{unbounded, Receiver, Sender};
use std::thread::{self, JoinHandle};
use tracing::debug;

/// Progress messages sent by the worker
#[derive(Debug, Clone, PartialEq)]
pub enum SynthesisEvent {
    /// Base noise is complete
    BaseReady,
    /// The octave for `radius` is complete
    LayerReady {
        /// Radius of the finished octave
        radius: f32,
    },
    /// Row `y` of the final texture is complete
    Row {
        /// Row index
        y: u32,
        /// Pixels left to right
        pixels: Vec<Pixel>,
    },
    /// The final texture is complete
    Finished(Raster),
}

/// Forwards pipeline callbacks into a channel, one message per finished row
struct ChannelObserver {
    tx: Sender<SynthesisEvent>,
    width: u32,
    row: Vec<Pixel>,
}

impl ChannelObserver {
    fn send(&self, event: SynthesisEvent) {
        // A closed receiver only means nobody is watching any more.
        if self.tx.send(event).is_err() {
            debug!("Synthesis event dropped, receiver closed");
        }
    }
}

impl SynthesisObserver for ChannelObserver {
    fn base_ready(&mut self, _base: &Raster) {
        self.send(SynthesisEvent::BaseReady);
    }

    fn layer_ready(&mut self, layer: &OctaveLayer) {
        self.send(SynthesisEvent::LayerReady {
            radius: layer.radius,
        });
    }

    fn pixel(&mut self, x: u32, y: u32, pixel: Pixel) {
        self.row.push(pixel);
        if x + 1 == self.width {
            let pixels = std::mem::replace(&mut self.row, Vec::with_capacity(self.width as usize));
            self.send(SynthesisEvent::Row { y, pixels });
        }
    }

    fn finished(&mut self, combined: &Raster) {
        self.send(SynthesisEvent::Finished(combined.clone()));
    }
}

/// A pipeline running on a background thread
pub struct SynthesisHandle {
    events: Receiver<SynthesisEvent>,
    cancel: CancelToken,
    thread: JoinHandle<Result<SynthesisReport>>,
}

impl SynthesisHandle {
    /// Messages from the worker, in production order
    pub fn events(&self) -> &Receiver<SynthesisEvent> {
        &self.events
    }

    /// Ask the worker to stop at its next checkpoint
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Whether the worker thread has exited
    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Wait for the worker and take its report
    pub fn join(self) -> Result<SynthesisReport> {
        self.thread.join().map_err(|_| PipelineError::WorkerPanicked)?
    }
}

/// Validate `config` and start the pipeline on a new thread
pub fn spawn_synthesis(config: SynthesisConfig) -> Result<SynthesisHandle> {
    let cancel = CancelToken::new();
    let synthesizer = NoiseSynthesizer::new(config)?.with_cancel_token(cancel.clone());
    let width = synthesizer.config().width;
    let (tx, events) = unbounded();

    let thread = thread::Builder::new()
        .name("noise-synthesis".into())
        .spawn(move || {
            let mut observer = ChannelObserver {
                tx,
                width,
                row: Vec::with_capacity(width as usize),
            };
            synthesizer.run(&mut observer)
        })
        .map_err(PipelineError::Spawn)?;

    Ok(SynthesisHandle {
        events,
        cancel,
        thread,
    })
}
