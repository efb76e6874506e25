//! Binary lane mask from a rectified colour frame.
//!
//! Two detectors are fused:
//!
//! - a brightness band (solid, bright paint against darker asphalt), and
//! - a strict Canny edge map (faded paint that still has a sharp border).
//!
//! The union is saturating, so the result stays strictly 0/255.
use crate::edges::canny;
use crate::image::{GrayPlane, ImageView, Rgb, RgbFrame};
use serde::{Deserialize, Serialize};

pub const MARKED: u8 = 255;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaskParams {
    /// Inclusive lower bound of the bright intensity band.
    pub intensity_low: u8,
    /// Inclusive upper bound of the bright intensity band.
    pub intensity_high: u8,
    /// Canny hysteresis thresholds on the L1 Sobel magnitude.
    pub canny_low: i32,
    pub canny_high: i32,
}

impl Default for MaskParams {
    fn default() -> Self {
        Self {
            intensity_low: 230,
            intensity_high: 255,
            canny_low: 900,
            canny_high: 900,
        }
    }
}

/// Mask whose pixels are either `MARKED` (lane paint) or 0 (background).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LaneMask(GrayPlane);

impl LaneMask {
    /// Binarizes `plane`: any non-zero pixel becomes `MARKED`.
    pub fn from_plane(mut plane: GrayPlane) -> Self {
        for v in plane.as_mut_slice() {
            if *v != 0 {
                *v = MARKED;
            }
        }
        Self(plane)
    }

    pub fn as_plane(&self) -> &GrayPlane {
        &self.0
    }

    pub fn into_plane(self) -> GrayPlane {
        self.0
    }

    #[inline]
    pub fn is_marked(&self, x: usize, y: usize) -> bool {
        self.0.get(x, y) == MARKED
    }

    pub fn marked_count(&self) -> usize {
        self.0.as_slice().iter().filter(|&&v| v == MARKED).count()
    }
}

/// Integer luma, `0.299 R + 0.587 G + 0.114 B` in 14-bit fixed point with rounding.
#[inline]
pub fn luma(px: Rgb) -> u8 {
    const R: u32 = 4899;
    const G: u32 = 9617;
    const B: u32 = 1868;
    ((px[0] as u32 * R + px[1] as u32 * G + px[2] as u32 * B + (1 << 13)) >> 14) as u8
}

pub fn to_intensity(frame: &RgbFrame) -> GrayPlane {
    frame.map(luma)
}

/// `MARKED` where `low <= v <= high`, 0 elsewhere.
pub fn in_range(gray: &GrayPlane, low: u8, high: u8) -> GrayPlane {
    gray.map(|v| if (low..=high).contains(&v) { MARKED } else { 0 })
}

#[derive(Clone, Debug, Default)]
pub struct LaneMaskBuilder {
    params: MaskParams,
}

impl LaneMaskBuilder {
    pub fn new(params: MaskParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &MaskParams {
        &self.params
    }

    pub fn build(&self, rectified: &RgbFrame) -> LaneMask {
        let gray = to_intensity(rectified);
        let bright = in_range(&gray, self.params.intensity_low, self.params.intensity_high);
        let edges = canny(&gray, self.params.canny_low, self.params.canny_high);
        let fused = match bright.zip_map(&edges, |a, b| a.saturating_add(b)) {
            Some(fused) => fused,
            // Both come from `gray`, so the sizes always agree.
            None => bright,
        };
        LaneMask::from_plane(fused)
    }
}
