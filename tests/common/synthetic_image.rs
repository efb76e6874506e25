use lane_follower::image::{GrayPlane, RgbFrame};
use lane_follower::mask::{LaneMask, MARKED};

/// Full-height bright stripes with graded shoulders (255, 170, 85) on black.
///
/// The shoulders keep the Sobel response under the default edge threshold,
/// so the lane mask marks exactly the stripe columns.
pub fn soft_stripes(width: usize, height: usize, columns: &[usize]) -> RgbFrame {
    assert!(width > 0 && height > 0, "image dimensions must be positive");
    RgbFrame::from_fn(width, height, |x, _| {
        let v = columns
            .iter()
            .map(|&c| match x.abs_diff(c) {
                0 => 255u8,
                1 => 170,
                2 => 85,
                _ => 0,
            })
            .max()
            .unwrap_or(0);
        [v, v, v]
    })
}

/// Full-height one-pixel white stripes on black, no shoulders.
pub fn hard_stripes(width: usize, height: usize, columns: &[usize]) -> RgbFrame {
    RgbFrame::from_fn(width, height, |x, _| {
        if columns.contains(&x) {
            [255; 3]
        } else {
            [0; 3]
        }
    })
}

/// Lane mask with the given columns marked on every row.
pub fn stripe_mask(width: usize, height: usize, columns: &[usize]) -> LaneMask {
    LaneMask::from_plane(GrayPlane::from_fn(width, height, |x, _| {
        if columns.contains(&x) {
            MARKED
        } else {
            0
        }
    }))
}
