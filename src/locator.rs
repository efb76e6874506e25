//! Left/right lane positions from the steering-band histogram.
//!
//! The histogram is split at a fixed column; each half contributes the index
//! of its maximum. Ties go to the lowest index and an all-zero half resolves
//! to its first column, so a position always exists.
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LanePosition {
    /// Column of the left marking, in `[0, split)`.
    pub left: usize,
    /// Column of the right marking, in `[split, width)`.
    pub right: usize,
    /// Truncating midpoint `left + (right - left) / 2`.
    pub center: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocatorParams {
    /// First column belonging to the right half.
    pub split_column: usize,
}

impl Default for LocatorParams {
    fn default() -> Self {
        Self { split_column: 150 }
    }
}

#[derive(Clone, Debug, Default)]
pub struct LaneLocator {
    params: LocatorParams,
}

impl LaneLocator {
    pub fn new(params: LocatorParams) -> Self {
        Self { params }
    }

    pub fn split_column(&self) -> usize {
        self.params.split_column
    }

    pub fn locate(&self, lane_histogram: &[u32]) -> LanePosition {
        let split = self.params.split_column.min(lane_histogram.len());
        let (left_half, right_half) = lane_histogram.split_at(split);
        let left = first_argmax(left_half);
        let right = split + first_argmax(right_half);
        LanePosition {
            left,
            right,
            center: midpoint(left, right),
        }
    }
}

/// Index of the first maximum; 0 for an empty slice.
pub fn first_argmax(values: &[u32]) -> usize {
    let mut best_idx = 0;
    let mut best_val = 0;
    for (i, &v) in values.iter().enumerate() {
        if i == 0 || v > best_val {
            best_val = v;
            best_idx = i;
        }
    }
    best_idx
}

#[inline]
fn midpoint(left: usize, right: usize) -> usize {
    if right >= left {
        left + (right - left) / 2
    } else {
        right + (left - right) / 2
    }
}
