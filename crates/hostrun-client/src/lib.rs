//! Dispatch client for Hostrun
//!
//! This crate is the trust boundary between callers (CLIs, API servers) and
//! the execution engine. It narrows an arbitrary, externally-supplied
//! override map down to a closed, type-checked, injection-filtered subset,
//! merges it with the client's base configuration without touching shared
//! state, and hands the resulting job descriptor to the engine.
//!
//! # Example
//!
//! ```rust,no_run
//! use hostrun_client::{CommandRequest, SshClient};
//! use hostrun_core::BaseConfig;
//! # use hostrun_client::{EngineError, ExecutionEngine, ReturnStream};
//! # use hostrun_core::JobSpec;
//! # struct Engine;
//! # #[async_trait::async_trait]
//! # impl ExecutionEngine for Engine {
//! #     async fn run_iter(&self, _job: JobSpec) -> Result<ReturnStream, EngineError> {
//! #         unimplemented!()
//! #     }
//! # }
//!
//! async fn ping_web_hosts() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = SshClient::new(BaseConfig::new(Default::default()), Engine);
//!
//!     let request = CommandRequest::new("web*", "test.ping");
//!     let returns = client.run(&request).await?;
//!
//!     for (host, outcome) in returns {
//!         println!("{host}: {outcome}");
//!     }
//!     Ok(())
//! }
//! ```

mod args;
mod client;
mod engine;
mod error;
mod request;
mod sanitize;

// Re-export main types
pub use args::condition_input;
pub use client::{PreparedJob, SshClient};
pub use engine::{EngineError, ExecutionEngine, ReturnStream};
pub use error::ClientError;
pub use request::CommandRequest;
pub use sanitize::{sanitize_overrides, FieldKind, ROSTER_FIELDS};
