//! Hostrun Core Domain Types
//!
//! This crate contains pure domain types with no dependencies on:
//! - Network/SSH transport
//! - Async runtime specifics
//! - Roster/configuration file parsing
//!
//! All types here describe one dispatched command: which hosts it targets,
//! what function runs there, and the merged configuration the execution
//! engine receives.

pub mod config;
pub mod error;
pub mod ids;
pub mod job;
pub mod ret;
pub mod target;

// Re-export commonly used types
pub use config::{BaseConfig, ConfigSource};
pub use error::CoreError;
pub use ids::JobId;
pub use job::JobSpec;
pub use ret::ReturnSet;
pub use target::TargetSelection;
