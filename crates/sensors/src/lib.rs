//! Line sensors for the simulated robot.
//!
//! Each sensor is a single sample point fixed in the robot frame. Per tick the
//! array is reprojected from the robot pose and read against the arena,
//! producing one binary value per sensor.

pub mod array;
pub mod line_sensor;

pub use array::{DEFAULT_SENSOR_COLORS, SensorArray};
pub use line_sensor::{LineSensor, Polarity};
