//! Line-follower simulation assembly.
//!
//! Loads the setup record and settings, places the robot, and runs the
//! sense, control, move loop against an arena until the robot leaves the
//! map or the user quits.

pub mod config;
pub mod error;
pub mod io;
pub mod runner;
pub mod simulation;
pub mod track;

pub use config::{SetupRecord, SimSettings};
pub use error::{AppError, ConfigError};
pub use io::{
    Clock, DisplaySink, FixedPlacement, InputSource, LogSink, ManualClock, NoInput, Placement, PlacementService,
    ScriptStep, ScriptedInput, SystemClock,
};
pub use runner::{OUT_OF_BOUNDS_DELAY, OUT_OF_BOUNDS_MESSAGE, RunSummary, Runner};
pub use simulation::{
    ControlSignal, DriveMode, Frame, SensorView, SimStatus, Simulation, build_simulation,
};
