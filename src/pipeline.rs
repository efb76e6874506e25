//! The per-frame vision-to-decision pipeline.
//!
//! Stage order:
//! 1) rectify the raw frame into the top-down view,
//! 2) build the binary lane mask,
//! 3) profile the mask column by column,
//! 4) locate the left and right markings,
//! 5) turn the lane centre into a deviation and a steering command.
//!
//! Every stage takes the previous stage's output and returns a new owned
//! value, so an iteration never shares buffers with the next one.
use crate::diagnostics::TimingBreakdown;
use crate::error::GeometryError;
use crate::histogram::{ColumnProfiler, HistogramParams, HistogramProfile};
use crate::image::RgbFrame;
use crate::locator::{LaneLocator, LanePosition, LocatorParams};
use crate::mask::{LaneMask, LaneMaskBuilder, MaskParams};
use crate::rectify::{PerspectiveRectifier, RectificationGeometry};
use crate::steering::{SteeringDecision, SteeringEncoder, SteeringParams};
use log::debug;
use serde::{Deserialize, Serialize};

/// Parameters of all pipeline stages.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub geometry: RectificationGeometry,
    pub mask: MaskParams,
    pub histogram: HistogramParams,
    pub locator: LocatorParams,
    pub steering: SteeringParams,
}

/// Everything one iteration produced, owned by the caller.
#[derive(Clone, Debug)]
pub struct FrameOutcome {
    pub raw: RgbFrame,
    pub rectified: RgbFrame,
    pub mask: LaneMask,
    pub profile: HistogramProfile,
    pub position: LanePosition,
    pub decision: SteeringDecision,
    pub timing: TimingBreakdown,
}

pub struct LanePipeline {
    rectifier: PerspectiveRectifier,
    mask_builder: LaneMaskBuilder,
    profiler: ColumnProfiler,
    locator: LaneLocator,
    encoder: SteeringEncoder,
}

impl LanePipeline {
    /// Builds all stages; fails only on degenerate rectification geometry.
    pub fn new(config: &PipelineConfig, width: usize, height: usize) -> Result<Self, GeometryError> {
        Ok(Self {
            rectifier: PerspectiveRectifier::new(config.geometry.clone(), width, height)?,
            mask_builder: LaneMaskBuilder::new(config.mask.clone()),
            profiler: ColumnProfiler::new(config.histogram.clone()),
            locator: LaneLocator::new(config.locator.clone()),
            encoder: SteeringEncoder::new(config.steering.clone()),
        })
    }

    pub fn rectifier(&self) -> &PerspectiveRectifier {
        &self.rectifier
    }

    pub fn encoder(&self) -> &SteeringEncoder {
        &self.encoder
    }

    pub fn process(&self, raw: RgbFrame) -> FrameOutcome {
        let mut timing = TimingBreakdown::default();
        let rectified = timing.time("rectify", || self.rectifier.rectify(&raw));
        let mut outcome = self.process_rectified_timed(rectified, &mut timing);
        outcome.raw = raw;
        outcome.timing = timing;
        outcome
    }

    /// Runs the stages after rectification on an already top-down frame.
    ///
    /// The returned outcome carries an empty `raw` frame.
    pub fn process_rectified(&self, rectified: RgbFrame) -> FrameOutcome {
        let mut timing = TimingBreakdown::default();
        let mut outcome = self.process_rectified_timed(rectified, &mut timing);
        outcome.timing = timing;
        outcome
    }

    fn process_rectified_timed(
        &self,
        rectified: RgbFrame,
        timing: &mut TimingBreakdown,
    ) -> FrameOutcome {
        let mask = timing.time("mask", || self.mask_builder.build(&rectified));
        let profile = timing.time("histogram", || self.profiler.profile(&mask));
        let position = timing.time("locate", || self.locator.locate(&profile.lane));
        let decision = timing.time("steer", || self.encoder.decide(position.center));

        debug!(
            "stages: mask={} marked, lane=({}, {}) center={} deviation={}",
            mask.marked_count(),
            position.left,
            position.right,
            position.center,
            decision.deviation
        );

        FrameOutcome {
            raw: RgbFrame::new(0, 0),
            rectified,
            mask,
            profile,
            position,
            decision,
            timing: TimingBreakdown::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::{FRAME_HEIGHT, FRAME_WIDTH};
    use crate::steering::SteeringCommand;

    #[test]
    fn blank_frame_degrades_to_fallback_positions() {
        let pipeline =
            LanePipeline::new(&PipelineConfig::default(), FRAME_WIDTH, FRAME_HEIGHT).expect("ok");
        let out = pipeline.process(RgbFrame::new(FRAME_WIDTH, FRAME_HEIGHT));
        assert_eq!(out.position.left, 0);
        assert_eq!(out.position.right, 150);
        assert_eq!(out.position.center, 75);
        assert_eq!(out.decision.deviation, -85);
        assert_eq!(out.decision.command, SteeringCommand::Left);
        assert_eq!(out.profile.lane_end_activity(), 0);
    }

    #[test]
    fn timing_lists_every_stage_in_order() {
        let pipeline =
            LanePipeline::new(&PipelineConfig::default(), FRAME_WIDTH, FRAME_HEIGHT).expect("ok");
        let out = pipeline.process(RgbFrame::new(FRAME_WIDTH, FRAME_HEIGHT));
        let labels: Vec<&str> = out.timing.stages.iter().map(|s| s.label).collect();
        assert_eq!(labels, ["rectify", "mask", "histogram", "locate", "steer"]);
        assert_eq!(out.raw.as_slice().len(), FRAME_WIDTH * FRAME_HEIGHT);
    }

    #[test]
    fn degenerate_geometry_is_reported() {
        let config = PipelineConfig {
            geometry: RectificationGeometry {
                source: [[0.0, 0.0]; 4],
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(LanePipeline::new(&config, FRAME_WIDTH, FRAME_HEIGHT).is_err());
    }
}
