//! Column histograms of the lane mask.
//!
//! "Histogram" here is a per-column count of marked pixels, not a value
//! distribution. Two profiles are produced per frame:
//!
//! - the lane profile over a band near the bottom of the rectified frame
//!   (closest to the vehicle), which drives steering, and
//! - the lane-end profile over the full height, whose total is reported as
//!   the lane-end activity.
use crate::mask::{LaneMask, MARKED};
use crate::image::ImageView;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistogramParams {
    /// First row of the steering band.
    pub band_top: usize,
    /// Number of rows in the steering band.
    pub band_height: usize,
}

impl Default for HistogramParams {
    fn default() -> Self {
        Self {
            band_top: 120,
            band_height: 80,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistogramProfile {
    /// Marked pixels per column inside the steering band.
    pub lane: Vec<u32>,
    /// Marked pixels per column over the full frame height.
    pub lane_end: Vec<u32>,
}

impl HistogramProfile {
    /// Sum of the full-height profile.
    pub fn lane_end_activity(&self) -> u64 {
        self.lane_end.iter().map(|&v| v as u64).sum()
    }
}

#[derive(Clone, Debug, Default)]
pub struct ColumnProfiler {
    params: HistogramParams,
}

impl ColumnProfiler {
    pub fn new(params: HistogramParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &HistogramParams {
        &self.params
    }

    pub fn profile(&self, mask: &LaneMask) -> HistogramProfile {
        let plane = mask.as_plane();
        let band = self.params.band_top..self.params.band_top + self.params.band_height;
        HistogramProfile {
            lane: count_columns(plane, band),
            lane_end: count_columns(plane, 0..plane.height()),
        }
    }
}

fn count_columns<I: ImageView<Pixel = u8>>(plane: &I, rows: std::ops::Range<usize>) -> Vec<u32> {
    let mut counts = vec![0u32; plane.width()];
    for row in plane.rows_in(rows) {
        for (count, &v) in counts.iter_mut().zip(row) {
            if v == MARKED {
                *count += 1;
            }
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::GrayPlane;

    fn mask_with(w: usize, h: usize, marked: &[(usize, usize)]) -> LaneMask {
        let mut plane = GrayPlane::new(w, h);
        for &(x, y) in marked {
            plane.set(x, y, 255);
        }
        LaneMask::from_plane(plane)
    }

    #[test]
    fn counts_pixels_not_values() {
        let mask = mask_with(320, 240, &[(10, 130), (10, 131), (10, 199), (300, 150)]);
        let p = ColumnProfiler::default().profile(&mask);
        assert_eq!(p.lane.len(), 320);
        assert_eq!(p.lane[10], 3);
        assert_eq!(p.lane[300], 1);
        assert_eq!(p.lane.iter().sum::<u32>(), 4);
    }

    #[test]
    fn band_excludes_rows_outside() {
        let mask = mask_with(320, 240, &[(5, 119), (5, 200), (5, 0), (5, 239)]);
        let p = ColumnProfiler::default().profile(&mask);
        assert_eq!(p.lane[5], 0);
        assert_eq!(p.lane_end[5], 4);
        assert_eq!(p.lane_end_activity(), 4);
    }

    #[test]
    fn full_column_saturates_band_height() {
        let marked: Vec<(usize, usize)> = (0..240).map(|y| (42, y)).collect();
        let p = ColumnProfiler::default().profile(&mask_with(320, 240, &marked));
        assert_eq!(p.lane[42], 80);
        assert_eq!(p.lane_end[42], 240);
    }

    #[test]
    fn band_past_bottom_is_clipped() {
        let profiler = ColumnProfiler::new(HistogramParams {
            band_top: 230,
            band_height: 80,
        });
        let marked: Vec<(usize, usize)> = (0..240).map(|y| (7, y)).collect();
        let p = profiler.profile(&mask_with(320, 240, &marked));
        assert_eq!(p.lane[7], 10);
    }
}
