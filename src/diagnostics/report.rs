use super::timing::TimingBreakdown;
use crate::locator::LanePosition;
use crate::pipeline::FrameOutcome;
use crate::steering::SteeringCommand;
use serde::Serialize;

/// Serializable per-frame summary, the structured form of the per-frame log line.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameReport {
    pub frame_index: u64,
    pub position: LanePosition,
    pub deviation: i32,
    pub command: SteeringCommand,
    /// Binary value of the output lines.
    pub command_code: u8,
    pub status: String,
    pub lane_end_activity: u64,
    pub marked_pixels: usize,
    /// Iteration time from acquisition to command emission.
    pub elapsed_ms: f64,
    pub fps: f64,
    pub timing: TimingBreakdown,
}

impl FrameReport {
    pub fn new(frame_index: u64, outcome: &FrameOutcome, elapsed_ms: f64, fps: f64) -> Self {
        let command = outcome.decision.command;
        Self {
            frame_index,
            position: outcome.position,
            deviation: outcome.decision.deviation,
            command,
            command_code: command.code(),
            status: format!("Result = {}", command.status_text()),
            lane_end_activity: outcome.profile.lane_end_activity(),
            marked_pixels: outcome.mask.marked_count(),
            elapsed_ms,
            fps,
            timing: outcome.timing.clone(),
        }
    }
}
