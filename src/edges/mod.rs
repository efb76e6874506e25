//! Canny edge detection on 8-bit intensity images.
//!
//! Building blocks:
//!
//! - `grad`: 3×3 Sobel gradients with L1 magnitude.
//! - `nms`: direction-aligned non-maximum suppression, classifying local
//!   maxima as weak or strong against the two hysteresis thresholds.
//! - `canny`: hysteresis tracking that keeps strong pixels and every weak
//!   pixel 8-connected to one, producing a binary 0/255 edge map.
//!
//! With `low == high` there are no weak pixels and the detector reduces to
//! "thin local maxima above `high`", which is how the lane mask uses it.

pub mod grad;
pub mod nms;

pub use grad::{sobel_gradients, Grad};
pub use nms::{suppress, EdgeClass};

use crate::image::{GrayPlane, ImageView, Plane};

/// Binary Canny edge map (255 = edge).
pub fn canny(gray: &GrayPlane, low: i32, high: i32) -> GrayPlane {
    let (low, high) = if low > high { (high, low) } else { (low, high) };
    let grad = sobel_gradients(gray);
    let classes = suppress(&grad, low, high);
    hysteresis(&classes)
}

fn hysteresis(classes: &Plane<EdgeClass>) -> GrayPlane {
    let (w, h) = classes.dimensions();
    let mut out = GrayPlane::new(w, h);
    let mut stack: Vec<(usize, usize)> = Vec::new();

    for y in 0..h {
        for (x, &c) in classes.row(y).iter().enumerate() {
            if c == EdgeClass::Strong {
                out.set(x, y, 255);
                stack.push((x, y));
            }
        }
    }

    while let Some((x, y)) = stack.pop() {
        for ny in y.saturating_sub(1)..=(y + 1).min(h - 1) {
            for nx in x.saturating_sub(1)..=(x + 1).min(w - 1) {
                if classes.get(nx, ny) == EdgeClass::Weak && out.get(nx, ny) == 0 {
                    out.set(nx, ny, 255);
                    stack.push((nx, ny));
                }
            }
        }
    }

    out
}
