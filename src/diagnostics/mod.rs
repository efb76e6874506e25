//! Observability for the control loop.
//!
//! None of this participates in control decisions:
//!
//! - `timing`: per-stage wall-clock trace and FPS derivation.
//! - `report`: the serializable per-frame summary.
//! - `overlay`: annotated copies of the raw and mask frames.
//! - `sink`: optional display targets receiving frames and reports.

pub mod overlay;
pub mod report;
pub mod sink;
pub mod timing;

pub use report::FrameReport;
pub use sink::{CollectingSink, DiagnosticsConfig, DisplaySink, PngDumpSink};
pub use timing::{fps_from_elapsed, StageTiming, TimingBreakdown};
