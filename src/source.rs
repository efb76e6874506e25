//! Frame acquisition.
//!
//! A `FrameSource` is opened once with the capture settings and then
//! delivers one colour frame per `capture` call, blocking until it is
//! available. Two sources work without camera hardware: a directory of still
//! images, and a synthetic road rendered through the rectification geometry.
use crate::error::AcquisitionError;
use crate::homography::Homography;
use crate::image::io::load_rgb_frame;
use crate::image::{RgbFrame, FRAME_HEIGHT, FRAME_WIDTH};
use crate::rectify::RectificationGeometry;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Capture settings applied when a source is opened.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    pub width: usize,
    pub height: usize,
    pub brightness: u8,
    pub contrast: u8,
    pub saturation: u8,
    pub gain: u8,
    /// Frame-rate hint; 0 lets the device choose.
    pub fps: u32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            width: FRAME_WIDTH,
            height: FRAME_HEIGHT,
            brightness: 50,
            contrast: 50,
            saturation: 50,
            gain: 50,
            fps: 0,
        }
    }
}

pub trait FrameSource {
    fn open(&mut self, settings: &CameraSettings) -> Result<(), AcquisitionError>;
    fn capture(&mut self) -> Result<RgbFrame, AcquisitionError>;
    /// Human-readable identifier, valid after `open`.
    fn id(&self) -> String;
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn open(&mut self, settings: &CameraSettings) -> Result<(), AcquisitionError> {
        (**self).open(settings)
    }
    fn capture(&mut self) -> Result<RgbFrame, AcquisitionError> {
        (**self).capture()
    }
    fn id(&self) -> String {
        (**self).id()
    }
}

const IMAGE_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "bmp"];

/// Replays the image files of a directory in file-name order.
#[derive(Debug)]
pub struct ImageSequenceSource {
    dir: PathBuf,
    files: Vec<PathBuf>,
    next: usize,
    settings: Option<CameraSettings>,
}

impl ImageSequenceSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            files: Vec::new(),
            next: 0,
            settings: None,
        }
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl FrameSource for ImageSequenceSource {
    fn open(&mut self, settings: &CameraSettings) -> Result<(), AcquisitionError> {
        let entries = fs::read_dir(&self.dir).map_err(|e| {
            AcquisitionError::Open(format!("cannot list {}: {e}", self.dir.display()))
        })?;
        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.extension()
                    .and_then(|ext| ext.to_str())
                    .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
                    .unwrap_or(false)
            })
            .collect();
        if files.is_empty() {
            return Err(AcquisitionError::Open(format!(
                "no image files in {}",
                self.dir.display()
            )));
        }
        files.sort();
        debug!("{} frames queued from {}", files.len(), self.dir.display());
        self.files = files;
        self.next = 0;
        self.settings = Some(settings.clone());
        Ok(())
    }

    fn capture(&mut self) -> Result<RgbFrame, AcquisitionError> {
        let settings = self.settings.as_ref().ok_or(AcquisitionError::NotOpen)?;
        let path = self
            .files
            .get(self.next)
            .ok_or(AcquisitionError::Exhausted(self.next as u64))?;
        let frame = load_rgb_frame(path, settings.width, settings.height)?;
        self.next += 1;
        Ok(frame)
    }

    fn id(&self) -> String {
        format!("images:{}", self.dir.display())
    }
}

/// Parameters of the synthetic road, expressed in rectified columns.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntheticRoadParams {
    pub left_column: f64,
    pub right_column: f64,
    /// Painted line width in rectified pixels.
    pub line_width: f64,
    /// Peak lateral drift of both lines, in rectified columns.
    pub drift_amplitude: f64,
    /// Frames per full drift cycle; 0 disables the drift.
    pub drift_period: u32,
    pub road_level: u8,
    pub paint_level: u8,
    pub background_level: u8,
}

impl Default for SyntheticRoadParams {
    fn default() -> Self {
        Self {
            left_column: 60.0,
            right_column: 260.0,
            line_width: 6.0,
            drift_amplitude: 40.0,
            drift_period: 240,
            road_level: 70,
            paint_level: 245,
            background_level: 25,
        }
    }
}

/// Renders a straight two-line road seen through the rectification geometry.
///
/// Each raw pixel is mapped into the rectified plane; pixels landing on a
/// painted line are bright, the rest of the ground quadrilateral is asphalt
/// and everything outside it is background.
#[derive(Debug)]
pub struct SyntheticRoadSource {
    params: SyntheticRoadParams,
    to_ground: Homography,
    ground_w: f64,
    ground_h: f64,
    frame: u64,
    size: Option<(usize, usize)>,
}

impl SyntheticRoadSource {
    pub fn new(
        params: SyntheticRoadParams,
        geometry: &RectificationGeometry,
    ) -> Result<Self, crate::error::GeometryError> {
        let to_ground = Homography::from_correspondences(&geometry.source, &geometry.destination)?;
        let xs = geometry.destination.iter().map(|p| p[0]);
        let ys = geometry.destination.iter().map(|p| p[1]);
        Ok(Self {
            params,
            to_ground,
            ground_w: xs.fold(0.0, f64::max),
            ground_h: ys.fold(0.0, f64::max),
            frame: 0,
            size: None,
        })
    }

    /// Lateral offset of both lines at frame `index`.
    pub fn drift(&self, index: u64) -> f64 {
        if self.params.drift_period == 0 {
            return 0.0;
        }
        let phase = (index % self.params.drift_period as u64) as f64
            / self.params.drift_period as f64;
        self.params.drift_amplitude * (phase * std::f64::consts::TAU).sin()
    }

    pub fn render(&self, index: u64, width: usize, height: usize) -> RgbFrame {
        let p = &self.params;
        let offset = self.drift(index);
        let half = p.line_width / 2.0;
        let lines = [p.left_column + offset, p.right_column + offset];
        RgbFrame::from_fn(width, height, |x, y| {
            let level = match self.to_ground.project(x as f64, y as f64) {
                Some([u, v]) if (0.0..self.ground_w).contains(&u) && (0.0..self.ground_h).contains(&v) => {
                    if lines.iter().any(|c| (u - c).abs() <= half) {
                        p.paint_level
                    } else {
                        p.road_level
                    }
                }
                _ => p.background_level,
            };
            [level, level, level]
        })
    }
}

impl FrameSource for SyntheticRoadSource {
    fn open(&mut self, settings: &CameraSettings) -> Result<(), AcquisitionError> {
        if settings.width == 0 || settings.height == 0 {
            return Err(AcquisitionError::Open(format!(
                "invalid resolution {}x{}",
                settings.width, settings.height
            )));
        }
        info!(
            "synthetic camera {}x{} brightness={} contrast={} saturation={} gain={} fps={}",
            settings.width,
            settings.height,
            settings.brightness,
            settings.contrast,
            settings.saturation,
            settings.gain,
            settings.fps
        );
        self.size = Some((settings.width, settings.height));
        self.frame = 0;
        Ok(())
    }

    fn capture(&mut self) -> Result<RgbFrame, AcquisitionError> {
        let (w, h) = self.size.ok_or(AcquisitionError::NotOpen)?;
        let frame = self.render(self.frame, w, h);
        self.frame += 1;
        Ok(frame)
    }

    fn id(&self) -> String {
        "synthetic-road".to_string()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceConfig {
    Synthetic(SyntheticRoadParams),
    Images { dir: PathBuf },
}

impl Default for SourceConfig {
    fn default() -> Self {
        SourceConfig::Synthetic(SyntheticRoadParams::default())
    }
}

impl SourceConfig {
    pub fn build(
        &self,
        geometry: &RectificationGeometry,
    ) -> Result<Box<dyn FrameSource>, crate::error::GeometryError> {
        Ok(match self {
            SourceConfig::Synthetic(params) => {
                Box::new(SyntheticRoadSource::new(params.clone(), geometry)?)
            }
            SourceConfig::Images { dir } => Box::new(ImageSequenceSource::new(dir)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::io::save_rgb_png;
    use crate::image::ImageView;

    #[test]
    fn capture_before_open_fails() {
        let mut src = ImageSequenceSource::new("/tmp");
        assert!(matches!(src.capture(), Err(AcquisitionError::NotOpen)));
    }

    #[test]
    fn empty_directory_cannot_open() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut src = ImageSequenceSource::new(dir.path());
        assert!(matches!(
            src.open(&CameraSettings::default()),
            Err(AcquisitionError::Open(_))
        ));
    }

    #[test]
    fn sequence_replays_in_name_order_then_exhausts() {
        let dir = tempfile::tempdir().expect("tempdir");
        for (name, level) in [("b.png", 20u8), ("a.png", 10u8)] {
            let frame = RgbFrame::filled(FRAME_WIDTH, FRAME_HEIGHT, [level; 3]);
            save_rgb_png(&frame, &dir.path().join(name)).expect("save");
        }
        fs::write(dir.path().join("notes.txt"), "ignored").expect("write");

        let mut src = ImageSequenceSource::new(dir.path());
        src.open(&CameraSettings::default()).expect("open");
        assert_eq!(src.len(), 2);
        assert_eq!(src.capture().expect("first").get(0, 0), [10; 3]);
        assert_eq!(src.capture().expect("second").get(0, 0), [20; 3]);
        assert!(matches!(src.capture(), Err(AcquisitionError::Exhausted(2))));
    }

    #[test]
    fn synthetic_road_paints_lines_inside_ground_quad() {
        let params = SyntheticRoadParams {
            drift_period: 0,
            ..Default::default()
        };
        let mut src =
            SyntheticRoadSource::new(params, &RectificationGeometry::default()).expect("geometry");
        src.open(&CameraSettings::default()).expect("open");
        let frame = src.capture().expect("frame");
        assert_eq!(frame.dimensions(), (FRAME_WIDTH, FRAME_HEIGHT));
        // Above the trapezoid is background.
        assert_eq!(frame.get(160, 20), [25; 3]);
        // Ground centre is asphalt.
        assert_eq!(frame.get(160, 130), [70; 3]);
        assert!(frame.as_slice().iter().any(|px| *px == [245; 3]));
    }

    #[test]
    fn drift_is_periodic() {
        let src = SyntheticRoadSource::new(
            SyntheticRoadParams::default(),
            &RectificationGeometry::default(),
        )
        .expect("geometry");
        assert!(src.drift(0).abs() < 1e-9);
        assert!((src.drift(60) - 40.0).abs() < 1e-9);
        assert!((src.drift(240) - src.drift(0)).abs() < 1e-9);
    }

    #[test]
    fn source_config_parses_tagged_kinds() {
        let cfg: SourceConfig =
            serde_json::from_str(r#"{"kind":"images","dir":"/data/run1"}"#).expect("parse");
        assert_eq!(
            cfg,
            SourceConfig::Images {
                dir: PathBuf::from("/data/run1")
            }
        );
        let cfg: SourceConfig =
            serde_json::from_str(r#"{"kind":"synthetic","line_width":3.0}"#).expect("parse");
        match cfg {
            SourceConfig::Synthetic(p) => assert_eq!(p.line_width, 3.0),
            other => panic!("unexpected {other:?}"),
        }
    }
}
