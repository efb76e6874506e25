//! Runtime configuration loaded from a JSON file.
//!
//! Every section falls back to the nominal controller constants, so `{}` (or
//! no file at all) gives the default 320x240 lane follower.
use crate::actuator::ActuatorConfig;
use crate::diagnostics::DiagnosticsConfig;
use crate::error::ConfigError;
use crate::homography::Homography;
use crate::pipeline::PipelineConfig;
use crate::source::{CameraSettings, SourceConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub source: SourceConfig,
    pub camera: CameraSettings,
    /// Stage parameters: `geometry`, `mask`, `histogram`, `locator`, `steering`.
    #[serde(flatten)]
    pub pipeline: PipelineConfig,
    pub actuator: ActuatorConfig,
    pub diagnostics: DiagnosticsConfig,
    /// Stop after this many frames; runs until cancelled when absent.
    pub max_frames: Option<u64>,
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

impl RuntimeConfig {
    /// Checks cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let (w, h) = (self.camera.width, self.camera.height);
        if w == 0 || h == 0 {
            return Err(invalid("camera", format!("resolution {w}x{h} must be positive")));
        }

        let p = &self.pipeline;
        if p.mask.intensity_low > p.mask.intensity_high {
            return Err(invalid(
                "mask.intensity_low",
                format!("{} exceeds intensity_high {}", p.mask.intensity_low, p.mask.intensity_high),
            ));
        }
        if p.mask.canny_low < 0 || p.mask.canny_high < 0 {
            return Err(invalid("mask.canny_low", "Canny thresholds must be non-negative"));
        }
        if p.histogram.band_height == 0 {
            return Err(invalid("histogram.band_height", "band must span at least one row"));
        }
        if p.histogram.band_top >= h {
            return Err(invalid(
                "histogram.band_top",
                format!("row {} lies outside a frame of height {h}", p.histogram.band_top),
            ));
        }
        if p.locator.split_column == 0 || p.locator.split_column >= w {
            return Err(invalid(
                "locator.split_column",
                format!("column {} must lie inside (0, {w})", p.locator.split_column),
            ));
        }
        if p.steering.dead_band < 0 {
            return Err(invalid("steering.dead_band", "must be non-negative"));
        }
        if self.diagnostics.every == 0 {
            return Err(invalid("diagnostics.every", "must be positive"));
        }
        if self.max_frames == Some(0) {
            return Err(invalid("max_frames", "must be positive when set"));
        }
        Homography::from_correspondences(&p.geometry.source, &p.geometry.destination)?;
        Ok(())
    }
}

/// Reads, parses and validates a configuration file.
pub fn load_config(path: &Path) -> Result<RuntimeConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config: RuntimeConfig =
        serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    config.validate()?;
    Ok(config)
}
