//! PID (Proportional-Integral-Derivative) Controller
//!
//! The control law is a pure function over explicit state: callers pass the
//! accumulated integral and the previous error in and get the updated values
//! back. [`PidController`] bundles that state for tick-by-tick use.

use serde::{Deserialize, Serialize};
use simcore::{ControlModel, Model, SimContext};

/// Step used in place of a zero `dt`.
pub const DT_EPSILON: f64 = 1e-5;

/// Configuration for a PID controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PidConfig {
    /// Proportional gain
    pub kp: f64,
    /// Integral gain
    pub ki: f64,
    /// Derivative gain
    pub kd: f64,
    /// Clamp for the integral accumulator magnitude (None = unbounded)
    #[serde(default)]
    pub integral_limit: Option<f64>,
    /// Clamp for the output magnitude (None = unbounded)
    #[serde(default)]
    pub output_limit: Option<f64>,
}

impl Default for PidConfig {
    fn default() -> Self {
        Self {
            kp: 50.0,
            ki: 3.0,
            kd: 0.01,
            integral_limit: None,
            output_limit: None,
        }
    }
}

impl PidConfig {
    /// Create a PID controller configuration without limits
    pub fn pid(kp: f64, ki: f64, kd: f64) -> Self {
        Self { kp, ki, kd, integral_limit: None, output_limit: None }
    }

    /// Set integral anti-windup limit
    pub fn with_integral_limit(mut self, limit: f64) -> Self {
        self.integral_limit = Some(limit.abs());
        self
    }

    /// Set output saturation limit
    pub fn with_output_limit(mut self, limit: f64) -> Self {
        self.output_limit = Some(limit.abs());
        self
    }
}

/// One PID evaluation.
///
/// Returns `(output, integral)`. A zero `dt` is replaced by [`DT_EPSILON`]
/// for both the derivative and the integral terms. Without configured limits
/// the integral grows unbounded.
pub fn pid_step(config: &PidConfig, integral: f64, error: f64, last_error: f64, dt: f64) -> (f64, f64) {
    let dt = if dt == 0.0 { DT_EPSILON } else { dt };

    let p_term = config.kp * error;
    let d_term = config.kd * (error - last_error) / dt;

    let mut integral = integral + config.ki * error * dt;
    if let Some(limit) = config.integral_limit {
        integral = integral.clamp(-limit, limit);
    }

    let mut output = p_term + d_term + integral;
    if let Some(limit) = config.output_limit {
        output = output.clamp(-limit, limit);
    }

    (output, integral)
}

/// Controller state carried from one tick to the next.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ControllerState {
    pub integral: f64,
    pub last_error: f64,
}

impl ControllerState {
    /// Runs one step and returns the output with the state for the next tick.
    pub fn advance(self, config: &PidConfig, error: f64, dt: f64) -> (f64, ControllerState) {
        let (output, integral) = pid_step(config, self.integral, error, self.last_error, dt);
        (output, ControllerState { integral, last_error: error })
    }
}

/// PID Controller with state
#[derive(Debug, Clone)]
pub struct PidController {
    config: PidConfig,
    state: ControllerState,
}

impl PidController {
    /// Create a new controller with the given configuration
    pub fn new(config: PidConfig) -> Self {
        Self {
            config,
            state: ControllerState::default(),
        }
    }

    /// Update the controller with a new error and return the control output
    pub fn update(&mut self, error: f64, dt: f64) -> f64 {
        let (output, state) = self.state.advance(&self.config, error, dt);
        self.state = state;
        output
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    /// Get the current integral accumulator value
    pub fn integral(&self) -> f64 {
        self.state.integral
    }

}

impl Model for PidController {
    fn reset(&mut self) {
        self.state = ControllerState::default();
    }
}

impl ControlModel for PidController {
    fn step_control(&mut self, ctx: SimContext, error: f64) -> f64 {
        self.update(error, ctx.dt)
    }
}
