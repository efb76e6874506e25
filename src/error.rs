//! Error taxonomy of the controller.
//!
//! Configuration and start-up acquisition errors are fatal. Degenerate lane
//! detections are not errors (see `locator`), and actuator writes never fail
//! from the caller's point of view.
use std::path::PathBuf;
use thiserror::Error;

/// Rectification geometry that does not define a projective transform.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("non-finite coordinate in {which} point {index}")]
    NonFinite { which: &'static str, index: usize },
    #[error("{which} points {a}, {b} and {c} are collinear")]
    Collinear {
        which: &'static str,
        a: usize,
        b: usize,
        c: usize,
    },
    #[error("perspective system is singular")]
    Singular,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid config value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
    #[error("degenerate rectification geometry: {0}")]
    Geometry(#[from] GeometryError),
}

#[derive(Debug, Error)]
pub enum AcquisitionError {
    #[error("failed to open frame source: {0}")]
    Open(String),
    #[error("frame source is not open")]
    NotOpen,
    #[error("capture failed: {0}")]
    Capture(String),
    #[error("failed to decode frame {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("frame is {got_w}x{got_h}, expected {want_w}x{want_h}")]
    Resolution {
        got_w: usize,
        got_h: usize,
        want_w: usize,
        want_h: usize,
    },
    #[error("frame source exhausted after {0} frames")]
    Exhausted(u64),
}

/// Failures of the diagnostics output (image and JSON dumps).
#[derive(Debug, Error)]
pub enum IoError {
    #[error("failed to create {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode image {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("failed to serialize JSON for {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("raster of {w}x{h} does not match its buffer")]
    Buffer { w: usize, h: usize },
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Acquisition(#[from] AcquisitionError),
    #[error(transparent)]
    Io(#[from] IoError),
}

impl From<GeometryError> for Error {
    fn from(err: GeometryError) -> Self {
        Error::Config(ConfigError::Geometry(err))
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
