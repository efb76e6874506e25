//! Display side of the diagnostics: where annotated frames go.
//!
//! A sink is optional; the control loop logs sink failures and carries on.
use super::overlay::{annotate_mask, annotate_raw};
use super::report::FrameReport;
use crate::error::IoError;
use crate::image::io::{save_gray_png, save_rgb_png, write_json_file};
use crate::pipeline::FrameOutcome;
use crate::rectify::RectificationGeometry;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub trait DisplaySink {
    fn show(&mut self, outcome: &FrameOutcome, report: &FrameReport) -> Result<(), IoError>;
}

impl<D: DisplaySink + ?Sized> DisplaySink for Box<D> {
    fn show(&mut self, outcome: &FrameOutcome, report: &FrameReport) -> Result<(), IoError> {
        (**self).show(outcome, report)
    }
}

/// Writes the three views, the bare mask and the frame report to a directory
/// every `every` frames.
pub struct PngDumpSink {
    dir: PathBuf,
    every: u64,
    geometry: RectificationGeometry,
    frame_center: i32,
}

impl PngDumpSink {
    pub fn new(
        dir: impl Into<PathBuf>,
        every: u64,
        geometry: RectificationGeometry,
        frame_center: i32,
    ) -> Self {
        Self {
            dir: dir.into(),
            every: every.max(1),
            geometry,
            frame_center,
        }
    }

    fn path(&self, index: u64, view: &str, ext: &str) -> PathBuf {
        self.dir.join(format!("frame_{index:06}_{view}.{ext}"))
    }
}

impl DisplaySink for PngDumpSink {
    fn show(&mut self, outcome: &FrameOutcome, report: &FrameReport) -> Result<(), IoError> {
        let index = report.frame_index;
        if index % self.every != 0 {
            return Ok(());
        }
        let original = annotate_raw(&outcome.raw, &self.geometry);
        let final_view = annotate_mask(outcome.mask.as_plane(), &outcome.position, self.frame_center);
        save_rgb_png(&original, &self.path(index, "original", "png"))?;
        save_rgb_png(&outcome.rectified, &self.path(index, "perspective", "png"))?;
        save_rgb_png(&final_view, &self.path(index, "final", "png"))?;
        save_gray_png(outcome.mask.as_plane(), &self.path(index, "mask", "png"))?;
        write_json_file(&self.path(index, "report", "json"), report)
    }
}

/// Keeps the reports of every shown frame in memory.
#[derive(Debug, Default)]
pub struct CollectingSink {
    pub reports: Vec<FrameReport>,
}

impl DisplaySink for CollectingSink {
    fn show(&mut self, _outcome: &FrameOutcome, report: &FrameReport) -> Result<(), IoError> {
        self.reports.push(report.clone());
        Ok(())
    }
}

fn default_every() -> u64 {
    30
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticsConfig {
    /// Directory for PNG/JSON dumps; no dumps when absent.
    #[serde(default)]
    pub dump_dir: Option<PathBuf>,
    /// Dump one frame out of `every`.
    #[serde(default = "default_every")]
    pub every: u64,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            dump_dir: None,
            every: default_every(),
        }
    }
}

impl DiagnosticsConfig {
    pub fn build(
        &self,
        geometry: &RectificationGeometry,
        frame_center: i32,
    ) -> Option<Box<dyn DisplaySink>> {
        self.dump_dir.as_ref().map(|dir| {
            Box::new(PngDumpSink::new(dir, self.every, geometry.clone(), frame_center))
                as Box<dyn DisplaySink>
        })
    }
}
