mod common;

use common::synthetic_image::soft_stripes;
use lane_follower::actuator::{read_gpio_value, RecordingActuator, SysfsGpioActuator};
use lane_follower::diagnostics::{CollectingSink, DiagnosticsConfig, PngDumpSink};
use lane_follower::image::io::save_rgb_png;
use lane_follower::image::{FRAME_HEIGHT, FRAME_WIDTH};
use lane_follower::rectify::RectificationGeometry;
use lane_follower::source::{
    CameraSettings, FrameSource, ImageSequenceSource, SourceConfig, SyntheticRoadParams,
};
use lane_follower::{
    ControlLoop, ExitReason, LanePipeline, OutputLines, PipelineConfig, SteeringCommand,
    StopSignal,
};
use std::fs;
use std::path::Path;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn identity_config() -> PipelineConfig {
    let corners = RectificationGeometry::default().destination;
    PipelineConfig {
        geometry: RectificationGeometry {
            source: corners,
            destination: corners,
        },
        ..Default::default()
    }
}

fn write_sequence(dir: &Path, stripes: &[[usize; 2]]) {
    for (i, cols) in stripes.iter().enumerate() {
        let frame = soft_stripes(FRAME_WIDTH, FRAME_HEIGHT, cols);
        save_rgb_png(&frame, &dir.join(format!("frame_{i:03}.png"))).expect("save");
    }
}

#[test]
fn image_sequence_emits_one_command_per_frame() {
    init_logging();
    let dir = tempfile::tempdir().expect("tempdir");
    write_sequence(dir.path(), &[[40, 280], [40, 220], [100, 280]]);

    let config = identity_config();
    let mut source = ImageSequenceSource::new(dir.path());
    source.open(&CameraSettings::default()).expect("open");
    let pipeline = LanePipeline::new(&config, FRAME_WIDTH, FRAME_HEIGHT).expect("pipeline");

    let mut ctl = ControlLoop::new(source, RecordingActuator::default(), pipeline)
        .with_display(Box::new(CollectingSink::default()));
    let summary = ctl.run(&StopSignal::new()).expect("run");

    assert_eq!(summary.exit, ExitReason::SourceExhausted);
    assert_eq!(summary.frames, 3);
    assert_eq!((summary.forward, summary.left, summary.right), (1, 1, 1));
    assert_eq!(
        ctl.actuator().history,
        vec![
            OutputLines([false, false, false, false]),
            OutputLines([false, true, false, false]),
            OutputLines([true, false, false, false]),
        ]
    );
    let codes: Vec<u8> = ctl.actuator().history.iter().map(|l| l.code()).collect();
    assert_eq!(codes, [0, 2, 1]);
}

#[test]
fn dump_sink_writes_views_and_report() {
    init_logging();
    let frames = tempfile::tempdir().expect("tempdir");
    let dumps = tempfile::tempdir().expect("tempdir");
    write_sequence(frames.path(), &[[40, 280], [40, 220]]);

    let config = identity_config();
    let mut source = ImageSequenceSource::new(frames.path());
    source.open(&CameraSettings::default()).expect("open");
    let pipeline = LanePipeline::new(&config, FRAME_WIDTH, FRAME_HEIGHT).expect("pipeline");
    let sink = PngDumpSink::new(dumps.path(), 1, config.geometry.clone(), 160);

    let mut ctl = ControlLoop::new(source, RecordingActuator::default(), pipeline)
        .with_display(Box::new(sink));
    ctl.run(&StopSignal::new()).expect("run");

    for view in ["original", "perspective", "final", "mask"] {
        let path = dumps.path().join(format!("frame_000001_{view}.png"));
        assert!(path.exists(), "missing {}", path.display());
    }
    let report = fs::read_to_string(dumps.path().join("frame_000001_report.json")).expect("report");
    let json: serde_json::Value = serde_json::from_str(&report).expect("json");
    assert_eq!(json["deviation"], -30);
    assert_eq!(json["command"], "Left");
    assert_eq!(json["commandCode"], 2);
    assert_eq!(json["status"], "Result = Move Left");
    assert_eq!(json["position"]["center"], 130);
}

#[test]
fn dump_interval_skips_frames() {
    let dumps = tempfile::tempdir().expect("tempdir");
    let diagnostics = DiagnosticsConfig {
        dump_dir: Some(dumps.path().to_path_buf()),
        every: 2,
    };
    let config = PipelineConfig::default();
    let display = diagnostics.build(&config.geometry, 160).expect("sink");
    let mut source = SourceConfig::Synthetic(SyntheticRoadParams::default())
        .build(&config.geometry)
        .expect("source");
    source.open(&CameraSettings::default()).expect("open");
    let pipeline = LanePipeline::new(&config, FRAME_WIDTH, FRAME_HEIGHT).expect("pipeline");

    let mut ctl = ControlLoop::new(source, RecordingActuator::default(), pipeline)
        .with_display(display)
        .with_max_frames(Some(3));
    let summary = ctl.run(&StopSignal::new()).expect("run");
    assert_eq!(summary.exit, ExitReason::FrameLimit);

    assert!(dumps.path().join("frame_000000_report.json").exists());
    assert!(!dumps.path().join("frame_000001_report.json").exists());
    assert!(dumps.path().join("frame_000002_report.json").exists());
}

#[test]
fn undrifted_synthetic_road_goes_straight() {
    init_logging();
    let config = PipelineConfig::default();
    let params = SyntheticRoadParams {
        drift_period: 0,
        ..Default::default()
    };
    let mut source = SourceConfig::Synthetic(params)
        .build(&config.geometry)
        .expect("source");
    source.open(&CameraSettings::default()).expect("open");
    let pipeline = LanePipeline::new(&config, FRAME_WIDTH, FRAME_HEIGHT).expect("pipeline");

    let mut ctl =
        ControlLoop::new(source, RecordingActuator::default(), pipeline).with_max_frames(Some(5));
    let summary = ctl.run(&StopSignal::new()).expect("run");
    assert_eq!(summary.frames, 5);
    assert_eq!(summary.forward, 5);
    assert!(summary.mean_fps > 0.0);
    assert_eq!(
        ctl.actuator().last(),
        Some(SteeringCommand::Forward.output_lines())
    );
}

#[test]
fn sysfs_actuator_drives_pin_files() {
    let root = tempfile::tempdir().expect("tempdir");
    let pins = [9, 25, 11, 8];
    for pin in pins {
        fs::create_dir_all(root.path().join(format!("gpio{pin}"))).expect("pin dir");
    }

    let config = identity_config();
    let dir = tempfile::tempdir().expect("tempdir");
    write_sequence(dir.path(), &[[40, 220]]);
    let mut source = ImageSequenceSource::new(dir.path());
    source.open(&CameraSettings::default()).expect("open");
    let pipeline = LanePipeline::new(&config, FRAME_WIDTH, FRAME_HEIGHT).expect("pipeline");
    let actuator = SysfsGpioActuator::new(root.path(), pins);

    let mut ctl = ControlLoop::new(source, actuator, pipeline);
    ctl.run(&StopSignal::new()).expect("run");

    let levels: Vec<Option<bool>> = pins
        .iter()
        .map(|&pin| read_gpio_value(root.path(), pin))
        .collect();
    assert_eq!(levels, [Some(false), Some(true), Some(false), Some(false)]);
    let direction =
        fs::read_to_string(root.path().join("gpio25").join("direction")).expect("direction");
    assert_eq!(direction, "out");
}
