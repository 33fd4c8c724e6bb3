//! Core domain errors.

use thiserror::Error;

/// Core domain errors for Hostrun.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Base configuration could not be loaded.
    #[error("Failed to load configuration from '{path}': {reason}")]
    ConfigLoad { path: String, reason: String },

    /// Unknown target selection mode.
    #[error("Unknown target selection mode: {0}")]
    InvalidSelection(String),
}
