//! Boundary to the execution engine collaborator.

use std::pin::Pin;

use async_trait::async_trait;
use thiserror::Error;
use tokio_stream::Stream;

use hostrun_core::{JobSpec, ReturnSet};

/// Errors surfaced by the execution engine.
///
/// The dispatcher never catches or reinterprets these; they propagate to
/// the caller unchanged.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A target could not be reached.
    #[error("Connection to target failed: {0}")]
    Connection(String),

    /// The remote invocation failed engine-side.
    #[error("Remote execution failed: {0}")]
    Execution(String),

    /// Local I/O failure while driving the engine.
    #[error("Engine I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Finite, single-pass sequence of per-target return records.
///
/// Each item may block until the engine has an outcome for some target.
/// Dropping the stream is the only way to stop early; cleanup after an
/// abandoned stream is the engine's concern.
pub type ReturnStream = Pin<Box<dyn Stream<Item = Result<ReturnSet, EngineError>> + Send>>;

/// The execution engine: connection setup, authentication, transport, and
/// remote process management all live behind this trait.
///
/// One job descriptor in, one lazy return sequence out. Per-target
/// concurrency is entirely the engine's business; the dispatcher performs
/// no buffering of its own.
#[async_trait]
pub trait ExecutionEngine: Send + Sync {
    /// Start the job and yield returns one record at a time.
    async fn run_iter(&self, job: JobSpec) -> Result<ReturnStream, EngineError>;
}
