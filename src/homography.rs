//! Planar projective transform from four point correspondences.
//!
//! The transform is solved the classic way: fix `h33 = 1` and solve the
//! resulting 8×8 linear system from the four `(x, y) -> (u, v)` pairs.
//! Degenerate inputs (non-finite points, three collinear points on either
//! side, singular system) are rejected up front.
use crate::error::GeometryError;
use nalgebra::{Matrix3, SMatrix, SVector, Vector3};

const EPS: f64 = 1e-9;
/// Minimum doubled triangle area (px²) for three points to count as non-collinear.
const COLLINEAR_AREA: f64 = 1e-6;

/// A point correspondence set: four points in each plane.
pub type Quad = [[f64; 2]; 4];

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Homography {
    m: Matrix3<f64>,
}

impl Homography {
    /// Solve the transform mapping each `src[i]` onto `dst[i]`.
    pub fn from_correspondences(src: &Quad, dst: &Quad) -> Result<Self, GeometryError> {
        check_quad(src, "source")?;
        check_quad(dst, "destination")?;

        let mut a = SMatrix::<f64, 8, 8>::zeros();
        let mut b = SVector::<f64, 8>::zeros();
        for i in 0..4 {
            let [x, y] = src[i];
            let [u, v] = dst[i];
            let r = 2 * i;
            // u = (h11 x + h12 y + h13) / (h31 x + h32 y + 1)
            a[(r, 0)] = x;
            a[(r, 1)] = y;
            a[(r, 2)] = 1.0;
            a[(r, 6)] = -u * x;
            a[(r, 7)] = -u * y;
            b[r] = u;
            // v = (h21 x + h22 y + h23) / (h31 x + h32 y + 1)
            a[(r + 1, 3)] = x;
            a[(r + 1, 4)] = y;
            a[(r + 1, 5)] = 1.0;
            a[(r + 1, 6)] = -v * x;
            a[(r + 1, 7)] = -v * y;
            b[r + 1] = v;
        }

        let h = a.lu().solve(&b).ok_or(GeometryError::Singular)?;
        if h.iter().any(|v| !v.is_finite()) {
            return Err(GeometryError::Singular);
        }
        let m = Matrix3::new(h[0], h[1], h[2], h[3], h[4], h[5], h[6], h[7], 1.0);
        if m.determinant().abs() <= EPS {
            return Err(GeometryError::Singular);
        }
        Ok(Self { m })
    }

    pub fn from_matrix(m: Matrix3<f64>) -> Self {
        Self { m }
    }

    pub fn matrix(&self) -> &Matrix3<f64> {
        &self.m
    }

    pub fn inverse(&self) -> Option<Self> {
        self.m.try_inverse().map(|m| Self { m })
    }

    /// Map one point; `None` when it lands on the line at infinity.
    #[inline]
    pub fn project(&self, x: f64, y: f64) -> Option<[f64; 2]> {
        let v = self.m * Vector3::new(x, y, 1.0);
        let w = v[2];
        if !w.is_finite() || w.abs() <= EPS || !v[0].is_finite() || !v[1].is_finite() {
            return None;
        }
        Some([v[0] / w, v[1] / w])
    }
}

/// Map a batch of points, failing if any of them is not representable.
pub fn apply_homography_points(h: &Homography, pts: &[[f64; 2]]) -> Option<Vec<[f64; 2]>> {
    pts.iter().map(|p| h.project(p[0], p[1])).collect()
}

fn check_quad(pts: &Quad, which: &'static str) -> Result<(), GeometryError> {
    for (index, p) in pts.iter().enumerate() {
        if !p[0].is_finite() || !p[1].is_finite() {
            return Err(GeometryError::NonFinite { which, index });
        }
    }
    const TRIPLES: [(usize, usize, usize); 4] = [(0, 1, 2), (0, 1, 3), (0, 2, 3), (1, 2, 3)];
    for (a, b, c) in TRIPLES {
        if doubled_area(pts[a], pts[b], pts[c]).abs() < COLLINEAR_AREA {
            return Err(GeometryError::Collinear { which, a, b, c });
        }
    }
    Ok(())
}

fn doubled_area(a: [f64; 2], b: [f64; 2], c: [f64; 2]) -> f64 {
    (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0])
}
