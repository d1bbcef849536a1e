//! Error types for simulation operations.

use thiserror::Error;

/// Errors raised by the simulation core.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    /// A point sample fell outside the arena pixel grid.
    #[error("sample at ({x}, {y}) is outside the {width}x{height} arena")]
    OutOfArena {
        /// Requested column.
        x: i64,
        /// Requested row.
        y: i64,
        /// Arena width in pixels.
        width: u32,
        /// Arena height in pixels.
        height: u32,
    },

    /// A physical or structural parameter is unusable (zero width, no sensors, ...).
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Why it was rejected.
        reason: String,
    },
}

impl SimError {
    /// Creates an invalid parameter error.
    pub fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}
