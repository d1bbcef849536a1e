pub mod differential;
pub mod wheel;

pub use differential::{DifferentialDriveConfig, DifferentialRobot, MotionCommand, TurnStyle};
pub use wheel::{WheelActuator, WheelDrive};
