//! The control loop: acquire, run the pipeline, drive the actuator, repeat.
//!
//! The loop is single-threaded and blocking. Cancellation is a shared flag
//! checked once at the end of each iteration, so an iteration in progress
//! always completes and emits its command.
use crate::actuator::Actuator;
use crate::diagnostics::{fps_from_elapsed, DisplaySink, FrameReport};
use crate::error::AcquisitionError;
use crate::image::ImageView;
use crate::pipeline::LanePipeline;
use crate::source::FrameSource;
use crate::steering::SteeringCommand;
use log::{debug, info, warn};
use serde::Serialize;
use std::io::Read;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

const ESC: u8 = 0x1b;

/// Operator stop request shared between the loop and whoever may cancel it.
#[derive(Clone, Debug, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Whether a byte read from the operator console asks for a stop.
pub fn is_stop_key(byte: u8) -> bool {
    matches!(byte, b'q' | b'Q' | ESC)
}

/// Reads the operator console on a background thread and raises `stop` on
/// `q` or ESC. End of input leaves the flag untouched.
pub fn spawn_stdin_listener(stop: StopSignal) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for byte in stdin.lock().bytes() {
            match byte {
                Ok(b) if is_stop_key(b) => {
                    info!("stop requested from console");
                    stop.request();
                    return;
                }
                Ok(_) => {}
                Err(e) => {
                    debug!("console read failed: {e}");
                    return;
                }
            }
        }
    })
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    Cancelled,
    FrameLimit,
    SourceExhausted,
}

/// What a finished run did.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoopSummary {
    pub frames: u64,
    pub forward: u64,
    pub left: u64,
    pub right: u64,
    pub mean_fps: f64,
    pub exit: ExitReason,
}

#[derive(Default)]
struct Tally {
    frames: u64,
    forward: u64,
    left: u64,
    right: u64,
    busy_secs: f64,
}

impl Tally {
    fn record(&mut self, command: SteeringCommand, secs: f64) {
        self.frames += 1;
        self.busy_secs += secs;
        match command {
            SteeringCommand::Forward => self.forward += 1,
            SteeringCommand::Left => self.left += 1,
            SteeringCommand::Right => self.right += 1,
        }
    }

    fn finish(self, exit: ExitReason) -> LoopSummary {
        let mean_fps = if self.busy_secs > 0.0 {
            self.frames as f64 / self.busy_secs
        } else {
            0.0
        };
        LoopSummary {
            frames: self.frames,
            forward: self.forward,
            left: self.left,
            right: self.right,
            mean_fps,
            exit,
        }
    }
}

pub struct ControlLoop<S, A> {
    source: S,
    actuator: A,
    pipeline: LanePipeline,
    display: Option<Box<dyn DisplaySink>>,
    max_frames: Option<u64>,
}

impl<S: FrameSource, A: Actuator> ControlLoop<S, A> {
    /// The source must already be open.
    pub fn new(source: S, actuator: A, pipeline: LanePipeline) -> Self {
        Self {
            source,
            actuator,
            pipeline,
            display: None,
            max_frames: None,
        }
    }

    pub fn with_display(mut self, display: Box<dyn DisplaySink>) -> Self {
        self.display = Some(display);
        self
    }

    pub fn with_max_frames(mut self, max_frames: Option<u64>) -> Self {
        self.max_frames = max_frames;
        self
    }

    pub fn actuator(&self) -> &A {
        &self.actuator
    }

    pub fn into_parts(self) -> (S, A) {
        (self.source, self.actuator)
    }

    /// Runs until cancelled, the frame limit is reached or the source runs dry.
    ///
    /// A failed capture ends the loop with the error; the pipeline never runs
    /// on a missing frame.
    pub fn run(&mut self, stop: &StopSignal) -> Result<LoopSummary, AcquisitionError> {
        let (want_w, want_h) = self.pipeline.rectifier().output_size();
        let mut tally = Tally::default();
        let mut index: u64 = 0;

        loop {
            let started = Instant::now();
            let raw = match self.source.capture() {
                Ok(frame) => frame,
                Err(AcquisitionError::Exhausted(n)) => {
                    info!("frame source exhausted after {n} frames");
                    return Ok(tally.finish(ExitReason::SourceExhausted));
                }
                Err(e) => {
                    warn!("capture failed at frame {index}: {e}");
                    return Err(e);
                }
            };
            if raw.dimensions() != (want_w, want_h) {
                let err = AcquisitionError::Resolution {
                    got_w: raw.width(),
                    got_h: raw.height(),
                    want_w,
                    want_h,
                };
                warn!("capture failed at frame {index}: {err}");
                return Err(err);
            }

            let outcome = self.pipeline.process(raw);
            let command = outcome.decision.command;
            self.actuator.write(command.output_lines());

            let elapsed = started.elapsed();
            let fps = fps_from_elapsed(elapsed);
            let report = FrameReport::new(index, &outcome, elapsed.as_secs_f64() * 1e3, fps);
            info!(
                "frame {index}: lane end={} center={} deviation={} {} fps={fps:.1}",
                report.lane_end_activity,
                outcome.position.center,
                outcome.decision.deviation,
                command.status_text(),
            );
            if let Some(display) = self.display.as_mut() {
                if let Err(e) = display.show(&outcome, &report) {
                    warn!("display failed at frame {index}: {e}");
                }
            }
            tally.record(command, elapsed.as_secs_f64());
            index += 1;

            if self.max_frames.is_some_and(|max| index >= max) {
                return Ok(tally.finish(ExitReason::FrameLimit));
            }
            if stop.is_requested() {
                info!("stopping after {index} frames");
                return Ok(tally.finish(ExitReason::Cancelled));
            }
        }
    }
}
