use crate::{MapProvider, Pose, SimError};

/// Timing for a single simulation step.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SimContext {
    /// Elapsed seconds since the previous step. May be zero or irregular.
    pub dt: f64,
    /// Simulated seconds since the run started.
    pub t: f64,
}

impl SimContext {
    pub fn new(dt: f64, t: f64) -> Self {
        SimContext { dt, t }
    }
}

pub trait Model {
    fn reset(&mut self);
}

/// Advances a body's pose from its current actuator state.
pub trait MechanicsModel: Model {
    fn step_physics(&mut self, ctx: SimContext);
    fn pose(&self) -> Pose;
}

/// Samples the arena at the current sensor positions.
pub trait SensorModel: Model {
    fn step_sensor(&mut self, ctx: SimContext, map: &dyn MapProvider) -> Result<(), SimError>;
}

/// Turns an error signal into an actuator correction.
pub trait ControlModel: Model {
    fn step_control(&mut self, ctx: SimContext, error: f64) -> f64;
}
