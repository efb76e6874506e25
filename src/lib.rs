//! Camera-based lane following.
//!
//! Each frame is rectified into a top-down view, reduced to a binary mask of
//! lane paint, profiled column by column, and turned into one of three
//! discrete steering commands on four digital output lines.
//!
//! ```no_run
//! use lane_follower::prelude::*;
//!
//! # fn main() -> lane_follower::Result<()> {
//! let config = PipelineConfig::default();
//! let pipeline = LanePipeline::new(&config, FRAME_WIDTH, FRAME_HEIGHT)?;
//! let outcome = pipeline.process(RgbFrame::new(FRAME_WIDTH, FRAME_HEIGHT));
//! println!(
//!     "center={} deviation={} command={}",
//!     outcome.position.center, outcome.decision.deviation, outcome.decision.command
//! );
//! # Ok(())
//! # }
//! ```

// Stages, in pipeline order.
pub mod homography;
pub mod rectify;
pub mod edges;
pub mod mask;
pub mod histogram;
pub mod locator;
pub mod steering;

// Orchestration and the world around it.
pub mod actuator;
pub mod config;
pub mod control;
pub mod diagnostics;
pub mod error;
pub mod image;
pub mod pipeline;
pub mod source;

// --- High-level re-exports -------------------------------------------------

pub use crate::config::{load_config, RuntimeConfig};
pub use crate::control::{ControlLoop, ExitReason, LoopSummary, StopSignal};
pub use crate::error::{Error, Result};
pub use crate::pipeline::{FrameOutcome, LanePipeline, PipelineConfig};
pub use crate::steering::{OutputLines, SteeringCommand};

// --- Prelude ---------------------------------------------------------------

pub mod prelude {
    pub use crate::actuator::{Actuator, RecordingActuator};
    pub use crate::image::{GrayPlane, ImageView, RgbFrame, FRAME_HEIGHT, FRAME_WIDTH};
    pub use crate::locator::LanePosition;
    pub use crate::source::{CameraSettings, FrameSource};
    pub use crate::{
        ControlLoop, FrameOutcome, LanePipeline, PipelineConfig, SteeringCommand, StopSignal,
    };
}
