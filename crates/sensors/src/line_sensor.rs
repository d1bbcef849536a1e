//! Single-point line sensor.

use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};
use simcore::{MID_GRAY, MapProvider, Pose, SimError, is_darker, project_offset};

/// Which binary value a dark (line) pixel produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    /// Dark pixels read 1, light pixels read 0.
    #[default]
    DarkIsOne,
    /// Dark pixels read 0, light pixels read 1.
    DarkIsZero,
}

impl Polarity {
    pub fn reading(&self, dark: bool) -> u8 {
        match (self, dark) {
            (Polarity::DarkIsOne, true) | (Polarity::DarkIsZero, false) => 1,
            _ => 0,
        }
    }
}

/// A sensor mounted at a fixed offset in the robot frame.
///
/// The arena position is derived state: it is recomputed from the robot pose
/// and the offset on every update, never accumulated.
#[derive(Debug, Clone, PartialEq)]
pub struct LineSensor {
    offset: Vector2<f64>,
    position: Point2<f64>,
    data: u8,
}

impl LineSensor {
    pub fn new(offset: Vector2<f64>, robot_pose: &Pose) -> Self {
        LineSensor {
            offset,
            position: project_offset(robot_pose, offset),
            data: 0,
        }
    }

    pub fn offset(&self) -> Vector2<f64> {
        self.offset
    }

    pub fn position(&self) -> Point2<f64> {
        self.position
    }

    /// Last binary reading.
    pub fn data(&self) -> u8 {
        self.data
    }

    pub fn update_position(&mut self, robot_pose: &Pose) {
        self.position = project_offset(robot_pose, self.offset);
    }

    /// Samples the arena under the sensor and stores the binary reading.
    ///
    /// On an out-of-grid sample the previous reading is kept and the error returned.
    pub fn read_data(&mut self, map: &dyn MapProvider, polarity: Polarity) -> Result<u8, SimError> {
        let color = map.sample_point(self.position)?;
        self.data = polarity.reading(is_darker(color.channels(), MID_GRAY));
        Ok(self.data)
    }

    pub(crate) fn clear(&mut self) {
        self.data = 0;
    }
}
