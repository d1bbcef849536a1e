//! Start-up configuration.
//!
//! Two sources feed a run:
//! - the setup record, a positional line-oriented text file describing the
//!   robot, the arena and the sensor placement;
//! - optional keyed JSON settings for the controller and the loop.
//!
//! Both are read once before the loop starts. Any error is fatal.

use std::fmt::Display;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use control::{PidConfig, SensorPair};
use mechanics::{DifferentialDriveConfig, WheelDrive};
use nalgebra::Vector2;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sensors::Polarity;
use simcore::{ArenaExtent, Pose, Rgb};

use crate::error::ConfigError;
use crate::io::ScriptStep;
use crate::simulation::DriveMode;

const FIELDS: [&str; 9] = [
    "robot width",
    "initial motor speed",
    "max motor speed",
    "wheel radius",
    "sensor count",
    "arena dimensions",
    "initial pose",
    "sensor offsets",
    "sensor colors",
];

/// The persisted robot, arena and sensor setup.
#[derive(Debug, Clone, PartialEq)]
pub struct SetupRecord {
    pub robot_width: f64,
    /// Initial speed of both motors, in rpm.
    pub initial_motor_speed: f64,
    /// Maximum motor speed, in rpm.
    pub max_motor_speed: f64,
    pub wheel_radius: f64,
    pub sensor_count: usize,
    pub arena: ArenaExtent,
    pub robot_start: Pose,
    pub sensor_offsets: Vec<Vector2<f64>>,
    pub sensor_colors: Vec<Rgb>,
}

struct Fields<'a> {
    lines: Vec<(usize, &'a str)>,
    next: usize,
}

impl<'a> Fields<'a> {
    fn new(text: &'a str) -> Self {
        let lines = text
            .lines()
            .enumerate()
            .map(|(i, l)| (i + 1, l.trim()))
            .filter(|(_, l)| !l.is_empty())
            .collect();
        Fields { lines, next: 0 }
    }

    fn take(&mut self) -> Result<(usize, &'static str, &'a str), ConfigError> {
        let field = FIELDS[self.next];
        let &(line, text) = self.lines.get(self.next).ok_or(ConfigError::MissingLine {
            line: self.next + 1,
            field,
            found: self.lines.len(),
        })?;
        self.next += 1;
        Ok((line, field, text))
    }

    fn scalar<T>(&mut self) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: Display,
    {
        let (line, field, text) = self.take()?;
        text.parse::<T>().map_err(|e| ConfigError::Parse {
            line,
            field,
            text: text.to_string(),
            reason: e.to_string(),
        })
    }

    /// Decodes a tuple/list literal. Parentheses are read as brackets.
    fn structured<T: DeserializeOwned>(&mut self) -> Result<T, ConfigError> {
        let (line, field, text) = self.take()?;
        let normalized = text.replace('(', "[").replace(')', "]");
        serde_json::from_str(&normalized).map_err(|e| ConfigError::Parse {
            line,
            field,
            text: text.to_string(),
            reason: e.to_string(),
        })
    }

    fn finish(&self) -> Result<(), ConfigError> {
        match self.lines.get(self.next) {
            Some(&(line, text)) => Err(ConfigError::ExtraLine {
                line,
                text: text.to_string(),
            }),
            None => Ok(()),
        }
    }
}

impl SetupRecord {
    /// Parses the nine positional lines of a setup record. Blank lines are skipped.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let mut fields = Fields::new(text);

        let robot_width: f64 = fields.scalar()?;
        let initial_motor_speed: f64 = fields.scalar()?;
        let max_motor_speed: f64 = fields.scalar()?;
        let wheel_radius: f64 = fields.scalar()?;
        let sensor_count: usize = fields.scalar()?;
        let [width, height]: [u32; 2] = fields.structured()?;
        let robot_start: [f64; 3] = fields.structured()?;
        let offsets: Vec<[f64; 2]> = fields.structured()?;
        let sensor_colors: Vec<Rgb> = fields.structured()?;
        fields.finish()?;

        let record = SetupRecord {
            robot_width,
            initial_motor_speed,
            max_motor_speed,
            wheel_radius,
            sensor_count,
            arena: ArenaExtent::new(width, height),
            robot_start: robot_start.into(),
            sensor_offsets: offsets.into_iter().map(|[x, y]| Vector2::new(x, y)).collect(),
            sensor_colors,
        };
        record.validate()?;
        Ok(record)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
        Self::parse(&text)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        fs::write(path, self.to_text()).map_err(|e| ConfigError::io(path, e))
    }

    /// Writes the record in the same positional format [`SetupRecord::parse`] reads.
    pub fn to_text(&self) -> String {
        let offsets = self
            .sensor_offsets
            .iter()
            .map(|o| format!("[{}, {}]", o.x, o.y))
            .collect::<Vec<_>>()
            .join(", ");
        let colors = self
            .sensor_colors
            .iter()
            .map(|c| format!("({}, {}, {})", c.r, c.g, c.b))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "{}\n{}\n{}\n{}\n{}\n({}, {})\n({}, {}, {})\n[{}]\n[{}]\n",
            self.robot_width,
            self.initial_motor_speed,
            self.max_motor_speed,
            self.wheel_radius,
            self.sensor_count,
            self.arena.width,
            self.arena.height,
            self.robot_start.x,
            self.robot_start.y,
            self.robot_start.heading,
            offsets,
            colors,
        )
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let positive = |name: &str, v: f64| {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(ConfigError::Invalid(format!("{name} must be positive, got {v}")))
            }
        };
        positive("robot width", self.robot_width)?;
        positive("wheel radius", self.wheel_radius)?;
        if !self.max_motor_speed.is_finite() || self.max_motor_speed < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "max motor speed must be non-negative, got {}",
                self.max_motor_speed
            )));
        }
        if self.arena.width == 0 || self.arena.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "arena must be non-empty, got {}x{}",
                self.arena.width, self.arena.height
            )));
        }
        if self.sensor_offsets.len() != self.sensor_count {
            return Err(ConfigError::Invalid(format!(
                "sensor count is {} but {} offsets are listed",
                self.sensor_count,
                self.sensor_offsets.len()
            )));
        }
        if self.sensor_colors.len() < self.sensor_count {
            return Err(ConfigError::Invalid(format!(
                "{} sensors but only {} colors",
                self.sensor_count,
                self.sensor_colors.len()
            )));
        }
        Ok(())
    }

    /// Drive configuration for the rpm-based motors this record describes.
    pub fn drive_config(&self) -> DifferentialDriveConfig {
        DifferentialDriveConfig {
            width: self.robot_width,
            drive: WheelDrive::Rpm {
                wheel_radius: self.wheel_radius,
            },
            max_speed: self.max_motor_speed,
            initial_speed: self.initial_motor_speed,
        }
    }
}

/// Controller and loop settings, read from an optional JSON document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimSettings {
    pub pid: PidConfig,
    pub polarity: Polarity,
    pub mode: DriveMode,
    /// Designated steering pair; picked around the array center when absent.
    pub sensor_pair: Option<SensorPair>,
    /// Clamp applied to controller-driven wheel speeds (None = unclamped).
    pub wheel_speed_limit: Option<f64>,
    /// Pacing period between ticks; 0 runs as fast as possible.
    pub tick_period_ms: u64,
    pub max_ticks: Option<u64>,
    pub out_of_bounds_delay_ms: u64,
    /// Tick-indexed manual commands replayed in manual mode.
    pub script: Vec<ScriptStep>,
}

impl Default for SimSettings {
    fn default() -> Self {
        SimSettings {
            pid: PidConfig::default(),
            polarity: Polarity::default(),
            mode: DriveMode::default(),
            sensor_pair: None,
            wheel_speed_limit: None,
            tick_period_ms: 10,
            max_ticks: None,
            out_of_bounds_delay_ms: 3500,
            script: Vec::new(),
        }
    }
}

impl SimSettings {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
        Self::from_json(&text)
    }
}
