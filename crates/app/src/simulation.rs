//! One simulated robot on one arena, advanced tick by tick.

use control::{PidController, SensorPair};
use log::{debug, info, trace, warn};
use mechanics::{DifferentialRobot, MotionCommand};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use sensors::SensorArray;
use simcore::{
    ArenaExtent, ControlModel, MapProvider, MechanicsModel, Model, Pose, Rgb, SensorModel, SimContext, SimError,
};

use crate::config::{SetupRecord, SimSettings};
use crate::error::AppError;
use crate::io::Placement;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimStatus {
    Running,
    /// The robot or a sensor left the arena. Terminal.
    OutOfBounds,
    /// Quit or cancel was requested. Terminal.
    UserQuit,
}

impl SimStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SimStatus::Running)
    }
}

/// Who sets the wheel speeds each tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriveMode {
    /// The PID controller steers from the sensor pair.
    #[default]
    Autonomous,
    /// The last received [`MotionCommand`] drives the wheels.
    Manual,
}

/// Input observed at a tick boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlSignal {
    Quit,
    Cancel,
    Motion(MotionCommand),
}

/// What a display needs to draw one sensor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorView {
    pub position: Point2<f64>,
    pub data: u8,
    pub color: Rgb,
}

/// Snapshot emitted after every tick.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub tick: u64,
    /// Simulated seconds since the start of the run.
    pub t: f64,
    pub dt: f64,
    pub pose: Pose,
    pub sensors: Vec<SensorView>,
    pub error: f64,
    pub correction: f64,
    pub left_speed: f64,
    pub right_speed: f64,
    /// Top wheel speed, in the same unit as `left_speed` and `right_speed`.
    pub max_speed: f64,
    pub out_of_bounds: bool,
    pub status: SimStatus,
}

#[derive(Debug, Clone)]
pub struct Simulation {
    robot: DifferentialRobot,
    sensors: SensorArray,
    controller: PidController,
    pair: SensorPair,
    extent: ArenaExtent,
    mode: DriveMode,
    wheel_speed_limit: Option<f64>,
    manual_command: Option<MotionCommand>,
    status: SimStatus,
    tick: u64,
    t: f64,
    dt: f64,
    error: f64,
    correction: f64,
}

impl Simulation {
    /// Assembles a simulation and checks the initial placement against the arena.
    ///
    /// Without an explicit `pair` the two sensors around the array center steer.
    /// A placement already outside the arena starts in [`SimStatus::OutOfBounds`].
    pub fn new(
        robot: DifferentialRobot,
        sensors: SensorArray,
        controller: PidController,
        pair: Option<SensorPair>,
        extent: ArenaExtent,
    ) -> Result<Self, SimError> {
        let pair = match pair {
            Some(p) => SensorPair::new(p.left, p.right, sensors.len())?,
            None => SensorPair::around_center(&sensors.offsets())?,
        };
        debug!("steering from sensors {} (left) and {} (right)", pair.left, pair.right);

        let mut sim = Simulation {
            robot,
            sensors,
            controller,
            pair,
            extent,
            mode: DriveMode::default(),
            wheel_speed_limit: None,
            manual_command: None,
            status: SimStatus::Running,
            tick: 0,
            t: 0.0,
            dt: 0.0,
            error: 0.0,
            correction: 0.0,
        };
        sim.check_bounds();
        Ok(sim)
    }

    pub fn with_mode(mut self, mode: DriveMode) -> Self {
        self.mode = mode;
        self
    }

    /// Clamps controller-driven wheel speeds to `[-limit, limit]`.
    pub fn with_wheel_speed_limit(mut self, limit: Option<f64>) -> Self {
        self.wheel_speed_limit = limit.map(f64::abs);
        self
    }

    pub fn status(&self) -> SimStatus {
        self.status
    }

    pub fn mode(&self) -> DriveMode {
        self.mode
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn pose(&self) -> Pose {
        self.robot.pose()
    }

    pub fn robot(&self) -> &DifferentialRobot {
        &self.robot
    }

    pub fn sensors(&self) -> &SensorArray {
        &self.sensors
    }

    pub fn pair(&self) -> SensorPair {
        self.pair
    }

    pub fn extent(&self) -> ArenaExtent {
        self.extent
    }

    /// Applies one input signal. Motion commands only take effect in manual mode.
    pub fn handle_signal(&mut self, signal: ControlSignal) {
        if self.status.is_terminal() {
            return;
        }
        match signal {
            ControlSignal::Quit | ControlSignal::Cancel => {
                info!("quit requested at tick {}", self.tick);
                self.status = SimStatus::UserQuit;
            }
            ControlSignal::Motion(command) => match self.mode {
                DriveMode::Manual => self.manual_command = Some(command),
                DriveMode::Autonomous => debug!("ignoring {command:?} in autonomous mode"),
            },
        }
    }

    /// Runs one sense, control, move cycle of `dt` seconds.
    ///
    /// Terminal simulations are not advanced; the current frame is returned.
    pub fn tick(&mut self, dt: f64, map: &dyn MapProvider) -> Frame {
        if self.status.is_terminal() {
            return self.frame();
        }
        let ctx = SimContext::new(dt, self.t);
        self.dt = dt;

        if let Err(err) = self.sensors.step_sensor(ctx, map) {
            warn!("sensor read failed at tick {}: {err}", self.tick);
            self.status = SimStatus::OutOfBounds;
            return self.frame();
        }

        match self.mode {
            DriveMode::Autonomous => {
                // the pair is validated against the array at construction
                let error = self.pair.error(&self.sensors.readings()).unwrap_or(0.0);
                let correction = self.controller.step_control(ctx, error);
                let max = self.robot.max_speed();
                let (mut left, mut right) = (max + correction, max - correction);
                if let Some(limit) = self.wheel_speed_limit {
                    left = left.clamp(-limit, limit);
                    right = right.clamp(-limit, limit);
                }
                self.robot.set_wheel_speeds(left, right);
                self.error = error;
                self.correction = correction;
            }
            DriveMode::Manual => {
                if let Some(command) = self.manual_command {
                    self.robot.apply(command);
                }
            }
        }

        self.robot.step_physics(ctx);
        self.sensors.update_positions(&self.robot.pose());
        self.tick += 1;
        self.t += dt;
        self.check_bounds();

        let frame = self.frame();
        trace!(
            "tick {} pose=({:.2}, {:.2}, {:.3}) error={} correction={:.3}",
            frame.tick,
            frame.pose.x,
            frame.pose.y,
            frame.pose.heading,
            frame.error,
            frame.correction
        );
        frame
    }

    pub fn frame(&self) -> Frame {
        let pose = self.robot.pose();
        let sensors = self
            .sensors
            .iter()
            .zip(self.sensors.colors())
            .map(|(s, &color)| SensorView {
                position: s.position(),
                data: s.data(),
                color,
            })
            .collect();
        Frame {
            tick: self.tick,
            t: self.t,
            dt: self.dt,
            pose,
            sensors,
            error: self.error,
            correction: self.correction,
            left_speed: self.robot.left().speed(),
            right_speed: self.robot.right().speed(),
            max_speed: self.robot.left().max_speed(),
            out_of_bounds: self.status == SimStatus::OutOfBounds,
            status: self.status,
        }
    }

    fn check_bounds(&mut self) {
        let robot_at = self.robot.pose().position();
        if self
            .extent
            .any_out_of_bounds(std::iter::once(robot_at).chain(self.sensors.positions()))
        {
            warn!(
                "robot left the {}x{} arena at ({:.1}, {:.1})",
                self.extent.width, self.extent.height, robot_at.x, robot_at.y
            );
            self.status = SimStatus::OutOfBounds;
        }
    }
}

impl Model for Simulation {
    fn reset(&mut self) {
        self.robot.reset();
        self.sensors.reset();
        self.sensors.update_positions(&self.robot.pose());
        self.controller.reset();
        self.manual_command = None;
        self.status = SimStatus::Running;
        self.tick = 0;
        self.t = 0.0;
        self.dt = 0.0;
        self.error = 0.0;
        self.correction = 0.0;
        self.check_bounds();
    }
}

/// Builds a ready-to-run simulation from the setup record, a placement and the settings.
pub fn build_simulation(
    record: &SetupRecord,
    placement: &Placement,
    settings: &SimSettings,
) -> Result<Simulation, AppError> {
    let robot = DifferentialRobot::new(record.drive_config(), placement.pose)?;
    let sensors = SensorArray::new(&placement.sensor_offsets, &placement.pose, settings.polarity)
        .with_colors(&record.sensor_colors);
    let controller = PidController::new(settings.pid.clone());

    let sim = Simulation::new(robot, sensors, controller, settings.sensor_pair, record.arena)?
        .with_mode(settings.mode)
        .with_wheel_speed_limit(settings.wheel_speed_limit);
    info!(
        "robot placed at ({}, {}) heading {:.3} with {} sensors ({:?}), {:?} mode",
        placement.pose.x,
        placement.pose.y,
        placement.pose.heading,
        placement.sensor_offsets.len(),
        sim.sensors().polarity(),
        sim.mode()
    );
    Ok(sim)
}
