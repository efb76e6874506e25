use lane_follower::config::{load_config, RuntimeConfig};
use lane_follower::control::{spawn_stdin_listener, ControlLoop, StopSignal};
use lane_follower::source::FrameSource;
use lane_follower::{LanePipeline, Result};
use log::info;
use std::env;
use std::path::PathBuf;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let config = match env::args().nth(1).map(PathBuf::from) {
        Some(path) => {
            info!("loading config {}", path.display());
            load_config(&path)?
        }
        None => {
            let config = RuntimeConfig::default();
            config.validate()?;
            config
        }
    };

    let pipeline = LanePipeline::new(
        &config.pipeline,
        config.camera.width,
        config.camera.height,
    )?;

    let mut source = config.source.build(&config.pipeline.geometry)?;
    source.open(&config.camera)?;
    info!("Camera ID = {}", source.id());

    let actuator = config.actuator.build();
    let mut control = ControlLoop::new(source, actuator, pipeline).with_max_frames(config.max_frames);
    if let Some(display) = config
        .diagnostics
        .build(&config.pipeline.geometry, config.pipeline.steering.frame_center)
    {
        control = control.with_display(display);
    }

    let stop = StopSignal::new();
    // Detached: the listener blocks on stdin and dies with the process.
    spawn_stdin_listener(stop.clone());
    info!("running; press q then Enter to stop");

    let summary = control.run(&stop)?;
    info!(
        "processed {} frames (forward={} left={} right={}) mean fps={:.1}, exit: {:?}",
        summary.frames, summary.forward, summary.left, summary.right, summary.mean_fps, summary.exit
    );
    Ok(())
}
