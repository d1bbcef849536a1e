use log::trace;
use serde::{Deserialize, Serialize};
use simcore::{MechanicsModel, Model, Pose, SimContext, SimError};
use std::f64::consts::TAU;

use crate::wheel::{WheelActuator, WheelDrive};

/// Physical configuration of a two-wheel differential drive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifferentialDriveConfig {
    /// Axle track: distance between the two wheel contact points.
    pub width: f64,
    pub drive: WheelDrive,
    /// Maximum commanded wheel speed, in the drive's unit.
    pub max_speed: f64,
    /// Speed both wheels start with, in the drive's unit.
    pub initial_speed: f64,
}

impl Default for DifferentialDriveConfig {
    fn default() -> Self {
        DifferentialDriveConfig {
            width: 0.1,
            drive: WheelDrive::Rpm { wheel_radius: 0.04 },
            max_speed: 20000.0,
            initial_speed: 10000.0,
        }
    }
}

/// How a turn preset splits speed between the wheels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnStyle {
    /// Wheels at opposite full speed; turns in place.
    Pivot,
    /// Inner wheel at half speed, outer at full; turns while advancing.
    Arc,
}

/// Discrete manual-drive commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionCommand {
    Forward,
    Backward,
    TurnLeft(TurnStyle),
    TurnRight(TurnStyle),
    Stop,
}

impl MotionCommand {
    /// (left, right) wheel speeds this command produces for the given top speed.
    pub fn wheel_speeds(&self, max_speed: f64) -> (f64, f64) {
        match self {
            MotionCommand::Forward => (max_speed, max_speed),
            MotionCommand::Backward => (-max_speed, -max_speed),
            MotionCommand::TurnLeft(TurnStyle::Pivot) => (-max_speed, max_speed),
            MotionCommand::TurnLeft(TurnStyle::Arc) => (max_speed / 2.0, max_speed),
            MotionCommand::TurnRight(TurnStyle::Pivot) => (max_speed, -max_speed),
            MotionCommand::TurnRight(TurnStyle::Arc) => (max_speed, max_speed / 2.0),
            MotionCommand::Stop => (0.0, 0.0),
        }
    }
}

/// Kinematic differential-drive robot.
#[derive(Debug, Clone)]
pub struct DifferentialRobot {
    config: DifferentialDriveConfig,
    initial_pose: Pose,
    pose: Pose,
    left: WheelActuator,
    right: WheelActuator,
}

impl DifferentialRobot {
    pub fn new(config: DifferentialDriveConfig, initial_pose: Pose) -> Result<Self, SimError> {
        if !config.width.is_finite() || config.width <= 0.0 {
            return Err(SimError::invalid("width", format!("must be finite and positive, got {}", config.width)));
        }
        let left = WheelActuator::new(config.drive, config.max_speed, config.initial_speed)?;
        let right = left;
        Ok(DifferentialRobot {
            config,
            initial_pose,
            pose: initial_pose,
            left,
            right,
        })
    }

    pub fn pose(&self) -> Pose {
        self.pose
    }

    pub fn max_speed(&self) -> f64 {
        self.config.max_speed
    }

    pub fn left(&self) -> &WheelActuator {
        &self.left
    }

    pub fn right(&self) -> &WheelActuator {
        &self.right
    }

    /// Overrides both wheel commands directly.
    pub fn set_wheel_speeds(&mut self, left: f64, right: f64) {
        self.left.set_speed(left);
        self.right.set_speed(right);
    }

    pub fn apply(&mut self, command: MotionCommand) {
        let (left, right) = command.wheel_speeds(self.config.max_speed);
        self.set_wheel_speeds(left, right);
    }

    /// Linear speed of the axle midpoint.
    pub fn forward_speed(&self) -> f64 {
        (self.left.linear_speed() + self.right.linear_speed()) / 2.0
    }

    /// Yaw rate in rad/s, positive counter-clockwise.
    pub fn angular_speed(&self) -> f64 {
        (self.right.linear_speed() - self.left.linear_speed()) / self.config.width
    }

    /// Integrates the pose over `dt` seconds at the current wheel speeds.
    ///
    /// Arena y grows downward, so forward motion along a positive heading
    /// decreases y. A heading outside (-2pi, 2pi) is reset to exactly zero.
    pub fn advance(&mut self, dt: f64) {
        let forward = self.forward_speed();
        let omega = self.angular_speed();
        let (sin, cos) = self.pose.heading.sin_cos();

        self.pose.x += forward * cos * dt;
        self.pose.y -= forward * sin * dt;
        self.pose.heading += omega * dt;

        if self.pose.heading >= TAU || self.pose.heading <= -TAU {
            trace!("heading {:.4} left (-2pi, 2pi), resetting to 0", self.pose.heading);
            self.pose.heading = 0.0;
        }
    }
}

impl Model for DifferentialRobot {
    fn reset(&mut self) {
        self.pose = self.initial_pose;
        self.set_wheel_speeds(self.config.initial_speed, self.config.initial_speed);
    }
}

impl MechanicsModel for DifferentialRobot {
    fn step_physics(&mut self, ctx: SimContext) {
        self.advance(ctx.dt);
    }

    fn pose(&self) -> Pose {
        self.pose
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use std::f64::consts::{FRAC_PI_2, PI};

    fn linear_robot(pose: Pose) -> DifferentialRobot {
        let config = DifferentialDriveConfig {
            width: 40.0,
            drive: WheelDrive::Linear,
            max_speed: 100.0,
            initial_speed: 0.0,
        };
        DifferentialRobot::new(config, pose).unwrap()
    }

    #[test]
    fn test_equal_speeds_translate_without_turning() {
        for &(speed, dt) in &[(50.0, 0.1), (-30.0, 0.5), (80.0, 0.0), (1e4, 2.0)] {
            let mut robot = linear_robot(Pose::new(100.0, 100.0, 0.3));
            robot.set_wheel_speeds(speed, speed);
            assert_abs_diff_eq!(robot.angular_speed(), 0.0);
            robot.advance(dt);
            assert_abs_diff_eq!(robot.pose().heading, 0.3, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_opposite_speeds_rotate_in_place() {
        for &(speed, dt) in &[(50.0, 0.1), (-20.0, 0.3), (7.5, 1.0)] {
            let mut robot = linear_robot(Pose::new(200.0, 150.0, 1.0));
            robot.set_wheel_speeds(-speed, speed);
            assert_abs_diff_eq!(robot.forward_speed(), 0.0);
            robot.advance(dt);
            assert_abs_diff_eq!(robot.pose().x, 200.0, epsilon = 1e-12);
            assert_abs_diff_eq!(robot.pose().y, 150.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_forward_at_zero_heading_moves_along_x() {
        let mut robot = linear_robot(Pose::new(100.0, 100.0, 0.0));
        robot.apply(MotionCommand::Forward);
        robot.advance(0.5);
        assert_relative_eq!(robot.pose().x, 150.0);
        assert_relative_eq!(robot.pose().y, 100.0);
    }

    #[test]
    fn test_positive_heading_moves_up_the_screen() {
        let mut robot = linear_robot(Pose::new(100.0, 100.0, FRAC_PI_2));
        robot.apply(MotionCommand::Forward);
        robot.advance(1.0);
        assert_abs_diff_eq!(robot.pose().x, 100.0, epsilon = 1e-9);
        assert_abs_diff_eq!(robot.pose().y, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_heading_past_two_pi_resets_to_zero() {
        let mut robot = linear_robot(Pose::new(100.0, 100.0, TAU - 0.01));
        robot.set_wheel_speeds(-10.0, 10.0); // omega = 20 / 40 = 0.5 rad/s
        robot.advance(0.1);
        assert_eq!(robot.pose().heading, 0.0);
    }

    #[test]
    fn test_heading_past_negative_two_pi_resets_to_zero() {
        let mut robot = linear_robot(Pose::new(100.0, 100.0, -TAU + 0.01));
        robot.set_wheel_speeds(10.0, -10.0);
        robot.advance(0.1);
        assert_eq!(robot.pose().heading, 0.0);
    }

    #[test]
    fn test_heading_inside_range_is_not_wrapped() {
        let mut robot = linear_robot(Pose::new(100.0, 100.0, 1.5 * PI));
        robot.set_wheel_speeds(-10.0, 10.0);
        robot.advance(1.0);
        assert_relative_eq!(robot.pose().heading, 1.5 * PI + 0.5);
    }

    #[test]
    fn test_rpm_drive_matches_surface_speed() {
        let config = DifferentialDriveConfig {
            width: 0.1,
            drive: WheelDrive::Rpm { wheel_radius: 0.04 },
            max_speed: 20000.0,
            initial_speed: 10000.0,
        };
        let mut robot = DifferentialRobot::new(config, Pose::new(0.0, 0.0, 0.0)).unwrap();
        let expected = 2.0 * PI * 0.04 * 10000.0 / 60.0;
        assert_relative_eq!(robot.forward_speed(), expected);
        robot.advance(0.25);
        assert_relative_eq!(robot.pose().x, expected * 0.25);
    }

    #[test]
    fn test_turn_presets_are_distinct() {
        let max = 100.0;
        assert_eq!(MotionCommand::TurnLeft(TurnStyle::Pivot).wheel_speeds(max), (-100.0, 100.0));
        assert_eq!(MotionCommand::TurnLeft(TurnStyle::Arc).wheel_speeds(max), (50.0, 100.0));
        assert_eq!(MotionCommand::TurnRight(TurnStyle::Pivot).wheel_speeds(max), (100.0, -100.0));
        assert_eq!(MotionCommand::TurnRight(TurnStyle::Arc).wheel_speeds(max), (100.0, 50.0));
        assert_eq!(MotionCommand::Backward.wheel_speeds(max), (-100.0, -100.0));
        assert_eq!(MotionCommand::Stop.wheel_speeds(max), (0.0, 0.0));
    }

    #[test]
    fn test_commanded_speeds_stay_within_max() {
        let commands = [
            MotionCommand::Forward,
            MotionCommand::Backward,
            MotionCommand::TurnLeft(TurnStyle::Pivot),
            MotionCommand::TurnLeft(TurnStyle::Arc),
            MotionCommand::TurnRight(TurnStyle::Pivot),
            MotionCommand::TurnRight(TurnStyle::Arc),
            MotionCommand::Stop,
        ];
        for command in commands {
            let (l, r) = command.wheel_speeds(250.0);
            assert!(l.abs() <= 250.0 && r.abs() <= 250.0, "{command:?} exceeded max");
        }
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let mut robot = linear_robot(Pose::new(10.0, 20.0, 0.0));
        robot.apply(MotionCommand::Forward);
        robot.advance(1.0);
        robot.reset();
        assert_eq!(robot.pose(), Pose::new(10.0, 20.0, 0.0));
        assert_eq!(robot.left().speed(), 0.0);
    }

    #[test]
    fn test_step_physics_uses_context_dt() {
        let mut robot = linear_robot(Pose::new(0.0, 0.0, 0.0));
        robot.apply(MotionCommand::Forward);
        robot.step_physics(SimContext::new(0.2, 0.0));
        assert_relative_eq!(MechanicsModel::pose(&robot).x, 20.0);
    }

    #[test]
    fn test_rejects_non_positive_width() {
        let config = DifferentialDriveConfig { width: 0.0, ..Default::default() };
        assert!(DifferentialRobot::new(config, Pose::default()).is_err());
    }
}
