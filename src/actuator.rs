//! Digital output side of the controller.
//!
//! Writes are fire-and-forget: the trait has no error channel and a lost
//! write is simply superseded by the next frame's command.
use crate::steering::OutputLines;
use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub trait Actuator {
    fn write(&mut self, lines: OutputLines);
}

impl<A: Actuator + ?Sized> Actuator for Box<A> {
    fn write(&mut self, lines: OutputLines) {
        (**self).write(lines)
    }
}

impl<A: Actuator + ?Sized> Actuator for &mut A {
    fn write(&mut self, lines: OutputLines) {
        (**self).write(lines)
    }
}

/// Headless actuator: logs the line levels and nothing else.
#[derive(Debug, Default)]
pub struct LogActuator;

impl Actuator for LogActuator {
    fn write(&mut self, lines: OutputLines) {
        debug!("output lines {:?} (code {})", lines.0, lines.code());
    }
}

/// Keeps every written pattern in memory.
#[derive(Debug, Default)]
pub struct RecordingActuator {
    pub history: Vec<OutputLines>,
}

impl RecordingActuator {
    pub fn last(&self) -> Option<OutputLines> {
        self.history.last().copied()
    }
}

impl Actuator for RecordingActuator {
    fn write(&mut self, lines: OutputLines) {
        self.history.push(lines);
    }
}

/// BCM numbers of wiringPi pins 13, 6, 14 and 10.
pub const DEFAULT_GPIO_PINS: [u32; 4] = [9, 25, 11, 8];

fn default_gpio_pins() -> [u32; 4] {
    DEFAULT_GPIO_PINS
}

fn default_gpio_root() -> PathBuf {
    PathBuf::from("/sys/class/gpio")
}

/// GPIO lines driven through the sysfs interface.
#[derive(Debug)]
pub struct SysfsGpioActuator {
    root: PathBuf,
    pins: [u32; 4],
}

impl SysfsGpioActuator {
    /// Exports the pins and configures them as outputs.
    ///
    /// Setup problems are logged; the actuator stays usable and individual
    /// writes keep failing silently.
    pub fn new(root: impl Into<PathBuf>, pins: [u32; 4]) -> Self {
        let root = root.into();
        for pin in pins {
            let pin_dir = root.join(format!("gpio{pin}"));
            if !pin_dir.exists() {
                if let Err(err) = fs::write(root.join("export"), pin.to_string()) {
                    warn!("gpio{pin}: export failed: {err}");
                }
            }
            if let Err(err) = fs::write(pin_dir.join("direction"), "out") {
                warn!("gpio{pin}: setting direction failed: {err}");
            }
        }
        Self { root, pins }
    }

    pub fn pins(&self) -> [u32; 4] {
        self.pins
    }

    fn value_path(&self, pin: u32) -> PathBuf {
        self.root.join(format!("gpio{pin}")).join("value")
    }
}

impl Actuator for SysfsGpioActuator {
    fn write(&mut self, lines: OutputLines) {
        for (&pin, &on) in self.pins.iter().zip(lines.0.iter()) {
            let path = self.value_path(pin);
            if let Err(err) = fs::write(&path, if on { "1" } else { "0" }) {
                trace!("{}: write ignored: {err}", path.display());
            }
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActuatorConfig {
    #[default]
    Log,
    Sysfs {
        #[serde(default = "default_gpio_root")]
        root: PathBuf,
        #[serde(default = "default_gpio_pins")]
        pins: [u32; 4],
    },
}

impl ActuatorConfig {
    pub fn build(&self) -> Box<dyn Actuator> {
        match self {
            ActuatorConfig::Log => Box::new(LogActuator),
            ActuatorConfig::Sysfs { root, pins } => Box::new(SysfsGpioActuator::new(root, *pins)),
        }
    }
}

/// Reads back the level of a sysfs pin; `None` if unreadable.
pub fn read_gpio_value(root: &Path, pin: u32) -> Option<bool> {
    let raw = fs::read_to_string(root.join(format!("gpio{pin}")).join("value")).ok()?;
    match raw.trim() {
        "1" => Some(true),
        "0" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::steering::SteeringCommand;

    #[test]
    fn recording_actuator_keeps_order() {
        let mut act = RecordingActuator::default();
        act.write(SteeringCommand::Left.output_lines());
        act.write(SteeringCommand::Forward.output_lines());
        assert_eq!(act.history.len(), 2);
        assert_eq!(act.last(), Some(SteeringCommand::Forward.output_lines()));
    }

    #[test]
    fn sysfs_actuator_writes_pin_values() {
        let root = tempfile::tempdir().expect("tempdir");
        for pin in DEFAULT_GPIO_PINS {
            fs::create_dir_all(root.path().join(format!("gpio{pin}"))).expect("pin dir");
        }
        let mut act = SysfsGpioActuator::new(root.path(), DEFAULT_GPIO_PINS);
        act.write(SteeringCommand::Right.output_lines());
        assert_eq!(read_gpio_value(root.path(), 9), Some(true));
        assert_eq!(read_gpio_value(root.path(), 25), Some(false));
        act.write(SteeringCommand::Left.output_lines());
        assert_eq!(read_gpio_value(root.path(), 9), Some(false));
        assert_eq!(read_gpio_value(root.path(), 25), Some(true));
        assert_eq!(read_gpio_value(root.path(), 11), Some(false));
        assert_eq!(read_gpio_value(root.path(), 8), Some(false));
    }

    #[test]
    fn sysfs_write_failures_are_ignored() {
        let mut act = SysfsGpioActuator::new("/nonexistent/gpio", DEFAULT_GPIO_PINS);
        act.write(SteeringCommand::Right.output_lines());
    }

    #[test]
    fn config_fills_sysfs_defaults() {
        let cfg: ActuatorConfig = serde_json::from_str(r#"{"kind":"sysfs"}"#).expect("parse");
        assert_eq!(
            cfg,
            ActuatorConfig::Sysfs {
                root: PathBuf::from("/sys/class/gpio"),
                pins: DEFAULT_GPIO_PINS
            }
        );
        assert_eq!(ActuatorConfig::default(), ActuatorConfig::Log);
    }
}
