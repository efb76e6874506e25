//! Perspective rectification of raw camera frames into a top-down view.
//!
//! The homography and a per-pixel lookup table of source coordinates are
//! computed once at construction. Warping a frame is then a table walk with
//! bilinear sampling; rows are processed in parallel with rayon, which keeps
//! the output identical to a sequential pass.
//!
//! Border handling follows the constant-black convention: samples that fall
//! outside the raw frame contribute zero.
use crate::error::GeometryError;
use crate::homography::{Homography, Quad};
use crate::image::{ImageView, Rgb, RgbFrame};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Fixed source trapezoid (raw frame) and destination rectangle (rectified frame).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RectificationGeometry {
    /// Top-left, top-right, bottom-left, bottom-right in the raw frame.
    pub source: Quad,
    /// Matching corners in the rectified frame.
    pub destination: Quad,
}

impl Default for RectificationGeometry {
    fn default() -> Self {
        Self {
            source: [[26.0, 100.0], [294.0, 100.0], [0.0, 140.0], [320.0, 140.0]],
            destination: [[0.0, 0.0], [320.0, 0.0], [0.0, 240.0], [320.0, 240.0]],
        }
    }
}

impl RectificationGeometry {
    /// Edges of the source quadrilateral in drawing order (TL-TR, TR-BR, BR-BL, BL-TL).
    pub fn source_outline(&self) -> [([f64; 2], [f64; 2]); 4] {
        let s = &self.source;
        [(s[0], s[1]), (s[1], s[3]), (s[3], s[2]), (s[2], s[0])]
    }
}

pub struct PerspectiveRectifier {
    geometry: RectificationGeometry,
    forward: Homography,
    out_w: usize,
    out_h: usize,
    /// Raw-frame sample position for each rectified pixel, row-major.
    lut: Vec<Option<[f32; 2]>>,
}

impl PerspectiveRectifier {
    pub fn new(
        geometry: RectificationGeometry,
        out_w: usize,
        out_h: usize,
    ) -> Result<Self, GeometryError> {
        let forward = Homography::from_correspondences(&geometry.source, &geometry.destination)?;
        let inverse = forward.inverse().ok_or(GeometryError::Singular)?;

        let mut lut = Vec::with_capacity(out_w * out_h);
        for y in 0..out_h {
            for x in 0..out_w {
                lut.push(
                    inverse
                        .project(x as f64, y as f64)
                        .map(|[sx, sy]| [sx as f32, sy as f32]),
                );
            }
        }

        Ok(Self {
            geometry,
            forward,
            out_w,
            out_h,
            lut,
        })
    }

    pub fn geometry(&self) -> &RectificationGeometry {
        &self.geometry
    }

    /// Raw -> rectified transform.
    pub fn homography(&self) -> &Homography {
        &self.forward
    }

    pub fn output_size(&self) -> (usize, usize) {
        (self.out_w, self.out_h)
    }

    /// Resample `raw` into a new rectified frame.
    pub fn rectify(&self, raw: &RgbFrame) -> RgbFrame {
        let mut out = RgbFrame::new(self.out_w, self.out_h);
        if self.out_w == 0 || self.out_h == 0 {
            return out;
        }
        out.as_mut_slice()
            .par_chunks_mut(self.out_w)
            .zip(self.lut.par_chunks(self.out_w))
            .for_each(|(row, lut_row)| {
                for (dst, src) in row.iter_mut().zip(lut_row) {
                    if let Some([sx, sy]) = *src {
                        *dst = sample_bilinear(raw, sx, sy);
                    }
                }
            });
        out
    }
}

#[inline]
fn sample_bilinear(img: &RgbFrame, x: f32, y: f32) -> Rgb {
    let (w, h) = img.dimensions();
    if !(x > -1.0 && y > -1.0 && x < w as f32 && y < h as f32) {
        return [0; 3];
    }
    let x0f = x.floor();
    let y0f = y.floor();
    let fx = x - x0f;
    let fy = y - y0f;
    let (x0, y0) = (x0f as i64, y0f as i64);

    let tap = |xx: i64, yy: i64| -> [f32; 3] {
        if xx < 0 || yy < 0 || xx >= w as i64 || yy >= h as i64 {
            return [0.0; 3];
        }
        let p = img.get(xx as usize, yy as usize);
        [p[0] as f32, p[1] as f32, p[2] as f32]
    };

    let p00 = tap(x0, y0);
    let p10 = tap(x0 + 1, y0);
    let p01 = tap(x0, y0 + 1);
    let p11 = tap(x0 + 1, y0 + 1);
    let w00 = (1.0 - fx) * (1.0 - fy);
    let w10 = fx * (1.0 - fy);
    let w01 = (1.0 - fx) * fy;
    let w11 = fx * fy;

    let mut out = [0u8; 3];
    for (c, o) in out.iter_mut().enumerate() {
        let v = p00[c] * w00 + p10[c] * w10 + p01[c] * w01 + p11[c] * w11;
        *o = v.round().clamp(0.0, 255.0) as u8;
    }
    out
}
