//! Steering error from a designated pair of line sensors.
//!
//! The error is `reading[right] - reading[left]`. With dark pixels reading 1,
//! a line under the left sensor yields -1. A positive-gain controller then
//! outputs a negative correction, and `left = max + correction`,
//! `right = max - correction` turns the robot back toward the line.

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};
use simcore::SimError;

/// Indices of the sensors left and right of the robot's forward axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorPair {
    pub left: usize,
    pub right: usize,
}

impl SensorPair {
    /// Validates a pair against an array of `count` sensors.
    pub fn new(left: usize, right: usize, count: usize) -> Result<Self, SimError> {
        if left == right {
            return Err(SimError::invalid("sensor_pair", format!("left and right are both sensor {left}")));
        }
        if left >= count || right >= count {
            return Err(SimError::invalid(
                "sensor_pair",
                format!("({left}, {right}) out of range for {count} sensors"),
            ));
        }
        Ok(SensorPair { left, right })
    }

    /// Picks the two sensors adjacent to the array center.
    ///
    /// For an odd count `n` these are `n/2 - 1` and `n/2 + 1`, straddling the
    /// middle sensor; for an even count, the middle two. The one with the
    /// larger robot-frame y offset (further left) becomes `left`.
    pub fn around_center(offsets: &[Vector2<f64>]) -> Result<Self, SimError> {
        let n = offsets.len();
        if n < 2 {
            return Err(SimError::invalid("sensor_count", format!("need at least 2 sensors to steer, got {n}")));
        }
        let (a, b) = if n % 2 == 1 {
            (n / 2 - 1, n / 2 + 1)
        } else {
            (n / 2 - 1, n / 2)
        };
        if offsets[a].y >= offsets[b].y {
            Ok(SensorPair { left: a, right: b })
        } else {
            Ok(SensorPair { left: b, right: a })
        }
    }

    /// Signed error for the given readings, or `None` if the pair is out of range.
    pub fn error(&self, readings: &[u8]) -> Option<f64> {
        let left = *readings.get(self.left)?;
        let right = *readings.get(self.right)?;
        Some(right as f64 - left as f64)
    }
}
