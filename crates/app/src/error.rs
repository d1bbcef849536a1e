//! Error types for start-up and configuration.

use std::path::PathBuf;

use simcore::SimError;
use thiserror::Error;

/// Errors raised while reading the setup record or the settings document.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read or written.
    #[error("cannot access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The record ended before every positional field was present.
    #[error("setup record has {found} lines; line {line} (`{field}`) is missing")]
    MissingLine {
        line: usize,
        field: &'static str,
        found: usize,
    },

    /// A positional field could not be decoded.
    #[error("line {line} (`{field}`): cannot parse {text:?}: {reason}")]
    Parse {
        line: usize,
        field: &'static str,
        text: String,
        reason: String,
    },

    /// Content after the last positional field.
    #[error("unexpected content on line {line}: {text:?}")]
    ExtraLine { line: usize, text: String },

    /// Fields decoded but are inconsistent with each other.
    #[error("invalid setup: {0}")]
    Invalid(String),

    /// The keyed settings document is malformed.
    #[error("invalid settings: {0}")]
    Settings(#[from] serde_json::Error),
}

impl ConfigError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Any failure that stops the simulator from starting.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Sim(#[from] SimError),
}
