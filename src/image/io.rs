//! I/O helpers for frames and JSON.
//!
//! - `load_rgb_frame`: read a PNG/JPEG/BMP into an owned RGB frame, resized to
//!   the requested resolution when it differs.
//! - `save_rgb_png` / `save_gray_png`: write frames for inspection.
//! - `write_json_file`: pretty-print a serializable value to disk.
use super::{GrayPlane, ImageView, RgbFrame};
use crate::error::{AcquisitionError, IoError};
use image::imageops::{self, FilterType};
use image::{GrayImage, RgbImage};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Load an image from disk as an RGB frame of exactly `width × height`.
pub fn load_rgb_frame(
    path: &Path,
    width: usize,
    height: usize,
) -> Result<RgbFrame, AcquisitionError> {
    let mut img = image::open(path)
        .map_err(|source| AcquisitionError::Decode {
            path: path.to_path_buf(),
            source,
        })?
        .into_rgb8();
    if img.width() as usize != width || img.height() as usize != height {
        img = imageops::resize(&img, width as u32, height as u32, FilterType::Triangle);
    }
    let (w, h) = (img.width() as usize, img.height() as usize);
    RgbFrame::from_interleaved(w, h, img.as_raw()).ok_or(AcquisitionError::Resolution {
        got_w: w,
        got_h: h,
        want_w: width,
        want_h: height,
    })
}

/// Save an RGB frame as PNG, creating parent directories.
pub fn save_rgb_png(frame: &RgbFrame, path: &Path) -> Result<(), IoError> {
    ensure_parent_dir(path)?;
    let (w, h) = frame.dimensions();
    let out = RgbImage::from_raw(w as u32, h as u32, frame.to_interleaved())
        .ok_or(IoError::Buffer { w, h })?;
    out.save(path).map_err(|source| IoError::Encode {
        path: path.to_path_buf(),
        source,
    })
}

/// Save a single-channel plane (intensity or mask) as grayscale PNG.
pub fn save_gray_png(plane: &GrayPlane, path: &Path) -> Result<(), IoError> {
    ensure_parent_dir(path)?;
    let (w, h) = plane.dimensions();
    let out = GrayImage::from_raw(w as u32, h as u32, plane.as_slice().to_vec())
        .ok_or(IoError::Buffer { w, h })?;
    out.save(path).map_err(|source| IoError::Encode {
        path: path.to_path_buf(),
        source,
    })
}

/// Serialize a value as pretty JSON to `path`, creating parent directories.
pub fn write_json_file<T: Serialize>(path: &Path, value: &T) -> Result<(), IoError> {
    ensure_parent_dir(path)?;
    let json = serde_json::to_string_pretty(value).map_err(|source| IoError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, json).map_err(|source| IoError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn ensure_parent_dir(path: &Path) -> Result<(), IoError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|source| IoError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }
    Ok(())
}
