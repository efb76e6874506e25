//! Deviation from the optical centre and the discrete steering policy.
//!
//! The policy is a pure function of the deviation. The comparisons are
//! `deviation > dead_band` for Right and `deviation < -dead_band` for Left,
//! so the boundary values `±dead_band` themselves steer Forward.
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SteeringCommand {
    Forward,
    Left,
    Right,
}

impl SteeringCommand {
    pub const ALL: [SteeringCommand; 3] = [Self::Forward, Self::Left, Self::Right];

    /// Line levels driven for this command. Lines 3 and 4 are reserved.
    pub fn output_lines(self) -> OutputLines {
        match self {
            SteeringCommand::Forward => OutputLines([false, false, false, false]),
            SteeringCommand::Right => OutputLines([true, false, false, false]),
            SteeringCommand::Left => OutputLines([false, true, false, false]),
        }
    }

    /// Numeric value of the line pattern (line 1 is bit 0).
    pub fn code(self) -> u8 {
        self.output_lines().code()
    }

    pub fn status_text(self) -> &'static str {
        match self {
            SteeringCommand::Forward => "Move Forward",
            SteeringCommand::Left => "Move Left",
            SteeringCommand::Right => "Move Right",
        }
    }
}

impl fmt::Display for SteeringCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SteeringCommand::Forward => "forward",
            SteeringCommand::Left => "left",
            SteeringCommand::Right => "right",
        };
        f.write_str(name)
    }
}

/// Levels of the four digital output lines, line 1 first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct OutputLines(pub [bool; 4]);

impl OutputLines {
    pub fn code(self) -> u8 {
        self.0
            .iter()
            .enumerate()
            .fold(0u8, |acc, (bit, &on)| acc | ((on as u8) << bit))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SteeringParams {
    /// Column of the vehicle's optical centre in the rectified frame.
    pub frame_center: i32,
    /// Half-width of the no-correction band, in columns.
    pub dead_band: i32,
}

impl Default for SteeringParams {
    fn default() -> Self {
        Self {
            frame_center: 160,
            dead_band: 15,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SteeringDecision {
    /// `lane_center - frame_center`; positive means the lane is to the right.
    pub deviation: i32,
    pub command: SteeringCommand,
}

/// Signed lateral offset of the lane centre from the optical centre.
#[inline]
pub fn deviation(lane_center: usize, frame_center: i32) -> i32 {
    lane_center as i32 - frame_center
}

pub fn classify(deviation: i32, dead_band: i32) -> SteeringCommand {
    if deviation > -dead_band && deviation < dead_band {
        SteeringCommand::Forward
    } else if deviation > dead_band {
        SteeringCommand::Right
    } else if deviation < -dead_band {
        SteeringCommand::Left
    } else {
        // Exactly on the dead-band boundary.
        SteeringCommand::Forward
    }
}

#[derive(Clone, Debug, Default)]
pub struct SteeringEncoder {
    params: SteeringParams,
}

impl SteeringEncoder {
    pub fn new(params: SteeringParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &SteeringParams {
        &self.params
    }

    pub fn decide(&self, lane_center: usize) -> SteeringDecision {
        let deviation = deviation(lane_center, self.params.frame_center);
        SteeringDecision {
            deviation,
            command: classify(deviation, self.params.dead_band),
        }
    }
}
