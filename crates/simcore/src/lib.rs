//! Core types shared by every part of the line-follower simulation.
//!
//! This crate provides:
//! - Robot pose and simulation step context
//! - Model traits implemented by the robot, the sensor array and the controller
//! - Plane geometry helpers (rotation, frame projection, darkness comparison)
//! - The arena abstraction sensors sample from, plus arena bounds checks

pub mod arena;
pub mod error;
pub mod geometry;
pub mod traits;

pub use arena::*;
pub use error::*;
pub use geometry::*;
pub use traits::*;
