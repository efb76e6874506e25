//! Annotations drawn on copies of the pipeline frames for display.
//!
//! Nothing here feeds back into the control path: every function takes the
//! source frame by reference and returns a new annotated frame.
use crate::image::{GrayPlane, ImageView, ImageViewMut, Rgb, RgbFrame};
use crate::locator::LanePosition;
use crate::rectify::RectificationGeometry;

pub const RED: Rgb = [255, 0, 0];
pub const GREEN: Rgb = [0, 255, 0];
pub const BLUE: Rgb = [0, 0, 255];

/// Bresenham line stamped with a square brush of side `thickness`.
pub fn draw_line(img: &mut RgbFrame, p0: [f64; 2], p1: [f64; 2], color: Rgb, thickness: u32) {
    let t = thickness.max(1) as i64;
    let lo = -(t - 1) / 2;
    let hi = t / 2;

    let (mut x0, mut y0) = (p0[0].round() as i64, p0[1].round() as i64);
    let (x1, y1) = (p1[0].round() as i64, p1[1].round() as i64);
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        for oy in lo..=hi {
            for ox in lo..=hi {
                img.put_clipped(x0 + ox, y0 + oy, color);
            }
        }
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

fn vertical_line(img: &mut RgbFrame, x: usize, height: usize, color: Rgb, thickness: u32) {
    let x = x as f64;
    draw_line(img, [x, 0.0], [x, height as f64], color, thickness);
}

/// Raw frame with the rectification trapezoid outlined in red.
pub fn annotate_raw(raw: &RgbFrame, geometry: &RectificationGeometry) -> RgbFrame {
    let mut out = raw.clone();
    for (a, b) in geometry.source_outline() {
        draw_line(&mut out, a, b, RED, 2);
    }
    out
}

/// Mask rendered in colour with lane boundaries, lane centre and frame centre.
pub fn annotate_mask(mask: &GrayPlane, position: &LanePosition, frame_center: i32) -> RgbFrame {
    let mut out = mask.to_rgb();
    let h = out.height();
    vertical_line(&mut out, position.left, h, GREEN, 2);
    vertical_line(&mut out, position.right, h, GREEN, 2);
    vertical_line(&mut out, position.center, h, GREEN, 3);
    if frame_center >= 0 {
        vertical_line(&mut out, frame_center as usize, h, BLUE, 3);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn horizontal_line_covers_endpoints() {
        let mut img = RgbFrame::new(10, 5);
        draw_line(&mut img, [1.0, 2.0], [8.0, 2.0], RED, 1);
        for x in 1..=8 {
            assert_eq!(img.get(x, 2), RED);
        }
        assert_eq!(img.get(0, 2), [0; 3]);
        assert_eq!(img.get(9, 2), [0; 3]);
        assert_eq!(img.get(4, 1), [0; 3]);
    }

    #[test]
    fn thickness_two_widens_towards_positive_side() {
        let mut img = RgbFrame::new(10, 10);
        draw_line(&mut img, [4.0, 0.0], [4.0, 9.0], GREEN, 2);
        assert_eq!(img.get(4, 5), GREEN);
        assert_eq!(img.get(5, 5), GREEN);
        assert_eq!(img.get(3, 5), [0; 3]);
    }

    #[test]
    fn lines_are_clipped_at_borders() {
        let mut img = RgbFrame::new(6, 6);
        draw_line(&mut img, [-5.0, -5.0], [10.0, 10.0], BLUE, 3);
        assert_eq!(img.get(0, 0), BLUE);
        assert_eq!(img.get(5, 5), BLUE);
    }

    #[test]
    fn annotating_leaves_input_untouched() {
        let raw = RgbFrame::new(320, 240);
        let annotated = annotate_raw(&raw, &RectificationGeometry::default());
        assert_eq!(raw, RgbFrame::new(320, 240));
        assert_eq!(annotated.get(160, 100), RED);
    }

    #[test]
    fn mask_annotation_marks_all_lines() {
        let mask = GrayPlane::new(320, 240);
        let pos = LanePosition {
            left: 40,
            right: 280,
            center: 160,
        };
        let out = annotate_mask(&mask, &pos, 150);
        assert_eq!(out.get(40, 100), GREEN);
        assert_eq!(out.get(280, 100), GREEN);
        assert_eq!(out.get(160, 100), GREEN);
        assert_eq!(out.get(150, 100), BLUE);
    }
}
