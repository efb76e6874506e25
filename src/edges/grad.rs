//! 3×3 Sobel gradients on 8-bit intensity images.
//!
//! - Convolves the Sobel kernel pair with border replication.
//! - Works in integers: for 8-bit input `|gx|, |gy| <= 1020`.
//! - Magnitude is the L1 norm `|gx| + |gy|`, which is what the lane edge
//!   thresholds are expressed in.
//!
//! Complexity: O(W·H); memory: three i32 planes.
use crate::image::{GrayPlane, ImageView, ImageViewMut, Plane};

type Kernel3 = [[i32; 3]; 3];

const SOBEL_KERNEL_X: Kernel3 = [[-1, 0, 1], [-2, 0, 2], [-1, 0, 1]];
const SOBEL_KERNEL_Y: Kernel3 = [[-1, -2, -1], [0, 0, 0], [1, 2, 1]];

/// Per-pixel gradient buffers.
#[derive(Clone, Debug)]
pub struct Grad {
    /// Horizontal derivative (convolution with kernel X)
    pub gx: Plane<i32>,
    /// Vertical derivative (convolution with kernel Y)
    pub gy: Plane<i32>,
    /// L1 magnitude per pixel: `|gx| + |gy|`
    pub mag: Plane<i32>,
}

/// Compute Sobel gradients on a single-channel 8-bit image.
pub fn sobel_gradients(l: &GrayPlane) -> Grad {
    let (w, h) = l.dimensions();
    let mut gx = Plane::<i32>::new(w, h);
    let mut gy = Plane::<i32>::new(w, h);
    let mut mag = Plane::<i32>::new(w, h);

    if w == 0 || h == 0 {
        return Grad { gx, gy, mag };
    }

    for y in 0..h {
        let rows = [l.row(y.saturating_sub(1)), l.row(y), l.row((y + 1).min(h - 1))];
        let out_gx = gx.row_mut(y);
        let out_gy = gy.row_mut(y);
        let out_mag = mag.row_mut(y);
        for x in 0..w {
            let x_idx = [x.saturating_sub(1), x, (x + 1).min(w - 1)];

            let mut sum_x = 0;
            let mut sum_y = 0;
            for (ky, row) in rows.iter().enumerate() {
                let kx_row = &SOBEL_KERNEL_X[ky];
                let ky_row = &SOBEL_KERNEL_Y[ky];
                for (kx, &xx) in x_idx.iter().enumerate() {
                    let sample = row[xx] as i32;
                    sum_x += sample * kx_row[kx];
                    sum_y += sample * ky_row[kx];
                }
            }

            out_gx[x] = sum_x;
            out_gy[x] = sum_y;
            out_mag[x] = sum_x.abs() + sum_y.abs();
        }
    }

    Grad { gx, gy, mag }
}
