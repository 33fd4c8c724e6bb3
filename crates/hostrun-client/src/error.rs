//! Error types for the dispatch client.

use thiserror::Error;

use crate::engine::EngineError;

/// Errors that can occur while dispatching a command.
#[derive(Debug, Error)]
pub enum ClientError {
    /// A call parameter failed validation.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A flattened descriptor map is missing a required field.
    #[error("Descriptor is missing required field '{0}'")]
    MissingField(&'static str),

    /// The asynchronous entry point is declared but not implemented.
    #[error("Asynchronous execution is not supported")]
    AsyncUnsupported,

    /// Failure raised by the execution engine, passed through unchanged.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// Failure from the core domain (configuration, selection parsing).
    #[error(transparent)]
    Core(#[from] hostrun_core::CoreError),
}
