//! Wheel actuators.
//!
//! An actuator stores its commanded speed in whatever unit its drive uses and
//! is the only place that converts to a linear surface speed. Everything
//! downstream of [`WheelActuator::linear_speed`] works in linear units.

use serde::{Deserialize, Serialize};
use simcore::SimError;
use std::f64::consts::PI;

/// How a wheel's commanded speed maps to ground speed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WheelDrive {
    /// Speed is a motor rate in rpm driving a wheel of the given radius.
    Rpm { wheel_radius: f64 },
    /// Speed is already a linear surface rate.
    Linear,
}

impl WheelDrive {
    pub fn linear_speed(&self, speed: f64) -> f64 {
        match *self {
            WheelDrive::Rpm { wheel_radius } => 2.0 * PI * wheel_radius * speed / 60.0,
            WheelDrive::Linear => speed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelActuator {
    drive: WheelDrive,
    max_speed: f64,
    speed: f64,
}

impl WheelActuator {
    pub fn new(drive: WheelDrive, max_speed: f64, initial_speed: f64) -> Result<Self, SimError> {
        if !max_speed.is_finite() || max_speed < 0.0 {
            return Err(SimError::invalid("max_speed", format!("must be finite and non-negative, got {max_speed}")));
        }
        if let WheelDrive::Rpm { wheel_radius } = drive {
            if !wheel_radius.is_finite() || wheel_radius <= 0.0 {
                return Err(SimError::invalid(
                    "wheel_radius",
                    format!("must be finite and positive, got {wheel_radius}"),
                ));
            }
        }
        Ok(WheelActuator {
            drive,
            max_speed,
            speed: initial_speed,
        })
    }

    pub fn rpm(max_rpm: f64, wheel_radius: f64, initial_rpm: f64) -> Result<Self, SimError> {
        Self::new(WheelDrive::Rpm { wheel_radius }, max_rpm, initial_rpm)
    }

    pub fn linear(max_speed: f64, initial_speed: f64) -> Result<Self, SimError> {
        Self::new(WheelDrive::Linear, max_speed, initial_speed)
    }

    /// Sets the commanded speed. Values are not clamped to `max_speed`.
    pub fn set_speed(&mut self, speed: f64) {
        self.speed = speed;
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn max_speed(&self) -> f64 {
        self.max_speed
    }

    /// Ground speed of the wheel surface for the current command.
    pub fn linear_speed(&self) -> f64 {
        self.drive.linear_speed(self.speed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rpm_conversion() {
        let wheel = WheelActuator::rpm(20000.0, 0.04, 60.0).unwrap();
        // one revolution per second
        assert_relative_eq!(wheel.linear_speed(), 2.0 * PI * 0.04, epsilon = 1e-12);
    }

    #[test]
    fn test_linear_drive_passes_through() {
        let mut wheel = WheelActuator::linear(37.8, 0.0).unwrap();
        wheel.set_speed(-12.5);
        assert_relative_eq!(wheel.linear_speed(), -12.5);
    }

    #[test]
    fn test_set_speed_is_not_clamped() {
        let mut wheel = WheelActuator::rpm(1000.0, 0.04, 0.0).unwrap();
        wheel.set_speed(1500.0);
        assert_relative_eq!(wheel.speed(), 1500.0);
    }

    #[test]
    fn test_rejects_bad_parameters() {
        assert!(WheelActuator::rpm(1000.0, 0.0, 0.0).is_err());
        assert!(WheelActuator::rpm(1000.0, -0.1, 0.0).is_err());
        assert!(WheelActuator::linear(-1.0, 0.0).is_err());
        assert!(WheelActuator::linear(f64::NAN, 0.0).is_err());
    }
}
