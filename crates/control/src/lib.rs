//! Control systems for the line-following robot
//!
//! This crate provides:
//! - A PID controller over explicit, tick-threaded state
//! - Derivation of the steering error from a designated sensor pair

pub mod error_signal;
pub mod pid;

pub use error_signal::*;
pub use pid::*;
