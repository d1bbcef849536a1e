//! Seams between the loop and the outside world: time, input, display and placement.

use std::thread;
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use mechanics::MotionCommand;
use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};
use simcore::{Pose, offset_from_absolute};

use crate::config::SetupRecord;
use crate::error::AppError;
use crate::simulation::{ControlSignal, Frame};

/// Monotonic time source for pacing and `dt`.
pub trait Clock {
    /// Time since an arbitrary fixed origin.
    fn now(&self) -> Duration;
    fn sleep(&mut self, duration: Duration);
}

/// Wall clock backed by [`Instant`].
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        SystemClock { origin: Instant::now() }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn sleep(&mut self, duration: Duration) {
        thread::sleep(duration);
    }
}

/// Clock that only moves when slept on or advanced by hand.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Duration,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&mut self, by: Duration) {
        self.now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now
    }

    fn sleep(&mut self, duration: Duration) {
        self.advance(duration);
    }
}

/// Source of quit and manual-drive signals, polled once per tick boundary.
pub trait InputSource {
    fn poll(&mut self, tick: u64) -> Vec<ControlSignal>;
}

/// Never produces any signal.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoInput;

impl InputSource for NoInput {
    fn poll(&mut self, _tick: u64) -> Vec<ControlSignal> {
        Vec::new()
    }
}

/// A manual command issued at a given tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptStep {
    pub at_tick: u64,
    pub command: MotionCommand,
}

/// Replays a fixed schedule of commands, optionally followed by a quit.
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    steps: Vec<ScriptStep>,
    next: usize,
    quit_at: Option<u64>,
}

impl ScriptedInput {
    pub fn new(mut steps: Vec<ScriptStep>) -> Self {
        steps.sort_by_key(|s| s.at_tick);
        ScriptedInput { steps, next: 0, quit_at: None }
    }

    pub fn quit_at(mut self, tick: u64) -> Self {
        self.quit_at = Some(tick);
        self
    }
}

impl InputSource for ScriptedInput {
    fn poll(&mut self, tick: u64) -> Vec<ControlSignal> {
        let mut signals = Vec::new();
        while let Some(step) = self.steps.get(self.next) {
            if step.at_tick > tick {
                break;
            }
            signals.push(ControlSignal::Motion(step.command));
            self.next += 1;
        }
        if self.quit_at.is_some_and(|q| tick >= q) {
            signals.push(ControlSignal::Quit);
        }
        signals
    }
}

/// Receives every frame the loop produces.
pub trait DisplaySink {
    fn present(&mut self, frame: &Frame);
    fn show_message(&mut self, message: &str);
}

/// Headless display that reports frames through `log`.
///
/// Every `every`-th frame is logged at info level, the rest at debug.
#[derive(Debug, Clone)]
pub struct LogSink {
    every: u64,
}

impl LogSink {
    pub fn new(every: u64) -> Self {
        LogSink { every: every.max(1) }
    }
}

impl Default for LogSink {
    fn default() -> Self {
        Self::new(100)
    }
}

impl DisplaySink for LogSink {
    fn present(&mut self, frame: &Frame) {
        let readings: String = frame
            .sensors
            .iter()
            .map(|s| char::from(b'0' + s.data.min(9)))
            .collect();
        if frame.tick % self.every == 0 {
            info!(
                "t={:.2}s tick {} at ({:.1}, {:.1}) heading {:.3} sensors [{}] correction {:.2}",
                frame.t,
                frame.tick,
                frame.pose.x,
                frame.pose.y,
                frame.pose.heading,
                readings,
                frame.correction
            );
        } else {
            debug!(
                "tick {} at ({:.1}, {:.1}) sensors [{}] wheels ({:.1}, {:.1}) of {:.1}",
                frame.tick,
                frame.pose.x,
                frame.pose.y,
                readings,
                frame.left_speed,
                frame.right_speed,
                frame.max_speed
            );
        }
    }

    fn show_message(&mut self, message: &str) {
        warn!("{message}");
    }
}

/// Where the robot starts and where its sensors are mounted.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub pose: Pose,
    pub sensor_offsets: Vec<Vector2<f64>>,
}

impl Placement {
    /// Placement from sensor locations picked in arena coordinates.
    pub fn from_sensor_positions(pose: Pose, positions: &[Point2<f64>]) -> Self {
        Placement {
            pose,
            sensor_offsets: positions.iter().map(|&p| offset_from_absolute(&pose, p)).collect(),
        }
    }
}

/// Decides the initial placement before the loop starts.
pub trait PlacementService {
    fn place(&mut self) -> Result<Placement, AppError>;
}

/// Returns a placement fixed up front, usually the one stored in the setup record.
#[derive(Debug, Clone)]
pub struct FixedPlacement {
    placement: Placement,
}

impl FixedPlacement {
    pub fn new(placement: Placement) -> Self {
        FixedPlacement { placement }
    }

    pub fn from_record(record: &SetupRecord) -> Self {
        Self::new(Placement {
            pose: record.robot_start,
            sensor_offsets: record.sensor_offsets.clone(),
        })
    }
}

impl PlacementService for FixedPlacement {
    fn place(&mut self) -> Result<Placement, AppError> {
        Ok(self.placement.clone())
    }
}
