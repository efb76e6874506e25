//! Owned raster in row-major layout (stride == width).
//!
//! One generic buffer backs every frame variant of the pipeline: colour
//! frames (`RgbFrame`), intensity and mask images (`GrayPlane`) and the
//! integer gradient planes used by the edge detector.
use super::traits::{ImageView, ImageViewMut};

/// One RGB sample, channel order R, G, B.
pub type Rgb = [u8; 3];

/// Colour frame as delivered by a frame source or produced by rectification.
pub type RgbFrame = Plane<Rgb>;

/// Single-channel 8-bit image (intensity or binary mask).
pub type GrayPlane = Plane<u8>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Plane<T> {
    w: usize,
    h: usize,
    data: Vec<T>,
}

impl<T: Copy + Default> Plane<T> {
    /// Zero (default) initialised buffer of size `w × h`.
    pub fn new(w: usize, h: usize) -> Self {
        Self::filled(w, h, T::default())
    }
}

impl<T: Copy> Plane<T> {
    pub fn filled(w: usize, h: usize, value: T) -> Self {
        Self {
            w,
            h,
            data: vec![value; w * h],
        }
    }

    /// Wraps `data`; `None` when its length is not `w * h`.
    pub fn from_vec(w: usize, h: usize, data: Vec<T>) -> Option<Self> {
        (data.len() == w * h).then_some(Self { w, h, data })
    }

    pub fn from_fn(w: usize, h: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut data = Vec::with_capacity(w * h);
        for y in 0..h {
            for x in 0..w {
                data.push(f(x, y));
            }
        }
        Self { w, h, data }
    }

    #[inline]
    pub fn idx(&self, x: usize, y: usize) -> usize {
        y * self.w + x
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, v: T) {
        let i = self.idx(x, y);
        self.data[i] = v;
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// Per-pixel conversion into a new plane of the same size.
    pub fn map<U: Copy>(&self, f: impl Fn(T) -> U) -> Plane<U> {
        Plane {
            w: self.w,
            h: self.h,
            data: self.data.iter().map(|&v| f(v)).collect(),
        }
    }

    /// Combines two planes of identical size pixel by pixel.
    ///
    /// Returns `None` when the sizes differ.
    pub fn zip_map<U: Copy, V: Copy>(
        &self,
        other: &Plane<U>,
        f: impl Fn(T, U) -> V,
    ) -> Option<Plane<V>> {
        if self.w != other.w || self.h != other.h {
            return None;
        }
        Some(Plane {
            w: self.w,
            h: self.h,
            data: self
                .data
                .iter()
                .zip(other.data.iter())
                .map(|(&a, &b)| f(a, b))
                .collect(),
        })
    }
}

impl RgbFrame {
    /// Interleaved `RGBRGB...` bytes.
    pub fn to_interleaved(&self) -> Vec<u8> {
        self.data.iter().flat_map(|px| px.iter().copied()).collect()
    }

    pub fn from_interleaved(w: usize, h: usize, bytes: &[u8]) -> Option<Self> {
        if bytes.len() != w * h * 3 {
            return None;
        }
        let data = bytes.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect();
        Some(Self { w, h, data })
    }
}

impl GrayPlane {
    /// Replicates the single channel into an RGB frame (for overlays).
    pub fn to_rgb(&self) -> RgbFrame {
        self.map(|v| [v, v, v])
    }
}

impl<T: Copy> ImageView for Plane<T> {
    type Pixel = T;

    #[inline]
    fn width(&self) -> usize {
        self.w
    }
    #[inline]
    fn height(&self) -> usize {
        self.h
    }
    #[inline]
    fn row(&self, y: usize) -> &[T] {
        let start = y * self.w;
        &self.data[start..start + self.w]
    }
}

impl<T: Copy> ImageViewMut for Plane<T> {
    #[inline]
    fn row_mut(&mut self, y: usize) -> &mut [T] {
        let start = y * self.w;
        &mut self.data[start..start + self.w]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_vec_checks_length() {
        assert!(GrayPlane::from_vec(4, 2, vec![0; 8]).is_some());
        assert!(GrayPlane::from_vec(4, 2, vec![0; 7]).is_none());
    }

    #[test]
    fn interleaved_layout_is_rgb_order() {
        let mut frame = RgbFrame::new(2, 1);
        frame.set(1, 0, [10, 20, 30]);
        assert_eq!(frame.to_interleaved(), vec![0, 0, 0, 10, 20, 30]);
        let back = RgbFrame::from_interleaved(2, 1, &frame.to_interleaved()).expect("size");
        assert_eq!(back, frame);
    }

    #[test]
    fn rows_in_clips_to_height() {
        let plane = GrayPlane::from_fn(3, 4, |_, y| y as u8);
        let firsts: Vec<u8> = plane.rows_in(2..10).map(|r| r[0]).collect();
        assert_eq!(firsts, vec![2, 3]);
        assert_eq!(plane.rows_in(5..9).count(), 0);
    }

    #[test]
    fn zip_map_rejects_size_mismatch() {
        let a = GrayPlane::new(2, 2);
        let b = GrayPlane::new(3, 2);
        assert!(a.zip_map(&b, |x, y| x.max(y)).is_none());
    }
}
