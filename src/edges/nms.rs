//! Non-maximum suppression on gradient magnitude with direction alignment.
//!
//! For each pixel the gradient direction is quantized to one of four
//! orientations (0°, 45°, 90°, 135°) and the magnitude is compared with the
//! two neighbours along it. Ties along an axis keep the first pixel of the
//! pair, so a symmetric ridge produces a single-pixel edge instead of none.
//!
//! Neighbours outside the image read as zero magnitude.
use crate::edges::grad::Grad;
use crate::image::{ImageView, ImageViewMut, Plane};

/// tan(22.5°) in 15-bit fixed point.
const TAN_22_5_Q15: i64 = 13573;

/// Classification of a pixel after suppression.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EdgeClass {
    /// Below `low` or not a local maximum.
    #[default]
    None,
    /// Local maximum with `low < mag <= high`; kept only if connected to a strong pixel.
    Weak,
    /// Local maximum with `mag > high`.
    Strong,
}

pub fn suppress(grad: &Grad, low: i32, high: i32) -> Plane<EdgeClass> {
    let (w, h) = grad.mag.dimensions();
    let mut out = Plane::<EdgeClass>::new(w, h);

    let mag_at = |x: i64, y: i64| -> i32 {
        if x < 0 || y < 0 || x >= w as i64 || y >= h as i64 {
            0
        } else {
            grad.mag.get(x as usize, y as usize)
        }
    };

    for y in 0..h {
        let gx_row = grad.gx.row(y);
        let gy_row = grad.gy.row(y);
        let mag_row = grad.mag.row(y);
        let out_row = out.row_mut(y);
        for x in 0..w {
            let m = mag_row[x];
            if m <= low {
                continue;
            }
            let (xi, yi) = (x as i64, y as i64);
            let gx = gx_row[x] as i64;
            let gy = gy_row[x] as i64;
            let ax = gx.abs();
            let ay = gy.abs();

            let keep = if ay * 32768 <= ax * TAN_22_5_Q15 {
                m > mag_at(xi - 1, yi) && m >= mag_at(xi + 1, yi)
            } else if ax * 32768 <= ay * TAN_22_5_Q15 {
                m > mag_at(xi, yi - 1) && m >= mag_at(xi, yi + 1)
            } else {
                // Gradient along a diagonal: same signs point down-right.
                let s = if (gx < 0) != (gy < 0) { -1 } else { 1 };
                m > mag_at(xi - s, yi - 1) && m > mag_at(xi + s, yi + 1)
            };

            if keep {
                out_row[x] = if m > high {
                    EdgeClass::Strong
                } else {
                    EdgeClass::Weak
                };
            }
        }
    }

    out
}
