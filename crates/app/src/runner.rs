//! The paced loop around a [`Simulation`].

use std::time::Duration;

use log::info;
use simcore::{MapProvider, Pose};

use crate::io::{Clock, DisplaySink, InputSource};
use crate::simulation::{SimStatus, Simulation};

/// How long the off-map message stays up before the loop halts.
pub const OUT_OF_BOUNDS_DELAY: Duration = Duration::from_millis(3500);
pub const OUT_OF_BOUNDS_MESSAGE: &str = "The robot went off the map!";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    pub status: SimStatus,
    pub ticks: u64,
    pub final_pose: Pose,
    /// Clock time from the start of the run, including the off-map delay.
    pub elapsed: Duration,
}

pub struct Runner<C, I, D> {
    clock: C,
    input: I,
    display: D,
    tick_period: Duration,
    max_ticks: Option<u64>,
    out_of_bounds_delay: Duration,
}

impl<C: Clock, I: InputSource, D: DisplaySink> Runner<C, I, D> {
    pub fn new(clock: C, input: I, display: D) -> Self {
        Runner {
            clock,
            input,
            display,
            tick_period: Duration::from_millis(10),
            max_ticks: None,
            out_of_bounds_delay: OUT_OF_BOUNDS_DELAY,
        }
    }

    /// Minimum spacing between tick starts. Zero disables pacing.
    pub fn tick_period(mut self, period: Duration) -> Self {
        self.tick_period = period;
        self
    }

    /// Stops a still-running simulation after this many ticks.
    pub fn max_ticks(mut self, ticks: Option<u64>) -> Self {
        self.max_ticks = ticks;
        self
    }

    pub fn out_of_bounds_delay(mut self, delay: Duration) -> Self {
        self.out_of_bounds_delay = delay;
        self
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    /// Ticks `sim` until it reaches a terminal state or the tick bound.
    ///
    /// `dt` for each tick is the difference between the whole-millisecond
    /// clock readings at this and the previous tick start.
    pub fn run(&mut self, sim: &mut Simulation, map: &dyn MapProvider) -> RunSummary {
        let started = self.clock.now();
        let mut last_ms = started.as_millis();

        while !sim.status().is_terminal() {
            if self.max_ticks.is_some_and(|max| sim.tick_count() >= max) {
                info!("stopping after {} ticks", sim.tick_count());
                break;
            }

            for signal in self.input.poll(sim.tick_count()) {
                sim.handle_signal(signal);
            }
            if sim.status().is_terminal() {
                break;
            }

            let now = self.clock.now();
            let now_ms = now.as_millis();
            let dt = now_ms.saturating_sub(last_ms) as f64 / 1000.0;
            last_ms = now_ms;

            let frame = sim.tick(dt, map);
            self.display.present(&frame);

            let deadline = now + self.tick_period;
            let after = self.clock.now();
            if deadline > after {
                self.clock.sleep(deadline - after);
            }
        }

        if sim.status() == SimStatus::OutOfBounds {
            self.display.show_message(OUT_OF_BOUNDS_MESSAGE);
            self.clock.sleep(self.out_of_bounds_delay);
        }

        let summary = RunSummary {
            status: sim.status(),
            ticks: sim.tick_count(),
            final_pose: sim.pose(),
            elapsed: self.clock.now().saturating_sub(started),
        };
        info!(
            "run ended {:?} after {} ticks at ({:.1}, {:.1})",
            summary.status, summary.ticks, summary.final_pose.x, summary.final_pose.y
        );
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::{ManualClock, NoInput};
    use crate::simulation::Frame;
    use approx::assert_relative_eq;
    use control::{PidConfig, PidController};
    use mechanics::{DifferentialDriveConfig, DifferentialRobot, WheelDrive};
    use nalgebra::Vector2;
    use sensors::{Polarity, SensorArray};
    use simcore::{ArenaExtent, ColorGrid, Rgb};

    #[derive(Default)]
    struct Recorder {
        frames: Vec<Frame>,
        messages: Vec<String>,
    }

    impl DisplaySink for Recorder {
        fn present(&mut self, frame: &Frame) {
            self.frames.push(frame.clone());
        }

        fn show_message(&mut self, message: &str) {
            self.messages.push(message.to_string());
        }
    }

    fn sim_at(x: f64) -> Simulation {
        let pose = Pose::new(x, 100.0, 0.0);
        let config = DifferentialDriveConfig {
            width: 10.0,
            drive: WheelDrive::Linear,
            max_speed: 100.0,
            initial_speed: 0.0,
        };
        let offsets = [Vector2::new(20.0, 10.0), Vector2::new(20.0, -10.0)];
        Simulation::new(
            DifferentialRobot::new(config, pose).unwrap(),
            SensorArray::new(&offsets, &pose, Polarity::DarkIsOne),
            PidController::new(PidConfig::default()),
            None,
            ArenaExtent::new(300, 200),
        )
        .unwrap()
    }

    #[test]
    fn test_dt_follows_clock_in_whole_milliseconds() {
        let map = ColorGrid::new(300, 200, Rgb::WHITE);
        let mut sim = sim_at(50.0);
        let mut runner = Runner::new(ManualClock::new(), NoInput, Recorder::default())
            .tick_period(Duration::from_millis(20))
            .max_ticks(Some(4));

        let summary = runner.run(&mut sim, &map);
        assert_eq!(summary.status, SimStatus::Running);
        assert_eq!(summary.ticks, 4);

        let dts: Vec<f64> = runner.display().frames.iter().map(|f| f.dt).collect();
        assert_eq!(dts, vec![0.0, 0.02, 0.02, 0.02]);
        assert_relative_eq!(summary.final_pose.x, 50.0 + 100.0 * 0.06, epsilon = 1e-9);
    }

    /// Oversleeps every request by a fixed amount.
    struct LateClock {
        now: Duration,
        overshoot: Duration,
    }

    impl Clock for LateClock {
        fn now(&self) -> Duration {
            self.now
        }

        fn sleep(&mut self, duration: Duration) {
            self.now += duration + self.overshoot;
        }
    }

    #[test]
    fn test_sub_millisecond_overshoot_does_not_accumulate() {
        let map = ColorGrid::new(300, 200, Rgb::WHITE);
        let mut sim = sim_at(50.0).with_mode(crate::simulation::DriveMode::Manual);
        let clock = LateClock {
            now: Duration::ZERO,
            overshoot: Duration::from_micros(600),
        };
        let mut runner = Runner::new(clock, NoInput, Recorder::default())
            .tick_period(Duration::from_millis(10))
            .max_ticks(Some(1000));

        let summary = runner.run(&mut sim, &map);
        assert_eq!(summary.ticks, 1000);

        let frames = &runner.display().frames;
        let sum_dt: f64 = frames.iter().map(|f| f.dt).sum();
        // the last tick started 999 periods after the first
        let last_start = Duration::from_micros(10_600) * 999;
        assert_relative_eq!(sum_dt, last_start.as_millis() as f64 / 1000.0, epsilon = 1e-9);
        assert_relative_eq!(frames.last().unwrap().t, sum_dt, epsilon = 1e-9);
        assert!(sum_dt > 10.5);
    }

    #[test]
    fn test_off_map_shows_message_and_waits() {
        let map = ColorGrid::new(300, 200, Rgb::WHITE);
        let mut sim = sim_at(250.0);
        let mut runner = Runner::new(ManualClock::new(), NoInput, Recorder::default())
            .tick_period(Duration::from_millis(100));

        let summary = runner.run(&mut sim, &map);
        assert_eq!(summary.status, SimStatus::OutOfBounds);
        assert_eq!(runner.display().messages, vec![OUT_OF_BOUNDS_MESSAGE.to_string()]);
        let frames = &runner.display().frames;
        assert!(frames.last().unwrap().out_of_bounds);
        assert_eq!(
            summary.elapsed,
            Duration::from_millis(100) * frames.len() as u32 + OUT_OF_BOUNDS_DELAY
        );
    }

    #[test]
    fn test_initial_off_map_never_ticks() {
        let map = ColorGrid::new(300, 200, Rgb::WHITE);
        let mut sim = sim_at(290.0);
        let mut runner = Runner::new(ManualClock::new(), NoInput, Recorder::default())
            .out_of_bounds_delay(Duration::from_millis(5));

        let summary = runner.run(&mut sim, &map);
        assert_eq!(summary.ticks, 0);
        assert!(runner.display().frames.is_empty());
        assert_eq!(runner.display().messages.len(), 1);
        assert_eq!(runner.clock().now(), Duration::from_millis(5));
    }
}
