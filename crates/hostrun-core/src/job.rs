//! The job descriptor handed to the execution engine.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::ids::JobId;
use crate::target::TargetSelection;

/// A fully-resolved description of one dispatched command.
///
/// Built fresh per call by the dispatcher: base configuration deep-copied,
/// sanitized overrides merged on top, call parameters stamped in. Consumed
/// exactly once by the execution engine and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSpec {
    /// Optional caller-supplied job id; the engine generates one otherwise.
    pub jid: Option<JobId>,

    /// Target pattern, resolved engine-side according to `selection`.
    pub target: String,

    /// Matching strategy for the target pattern.
    pub selection: TargetSelection,

    /// Name of the function to execute on each resolved host.
    pub function: String,

    /// Full argument vector: function name followed by conditioned args.
    pub argv: Vec<Value>,

    /// Merged configuration: base settings overlaid with sanitized
    /// per-call overrides, timeout, and the custom-roster flag.
    pub opts: Map<String, Value>,
}

impl JobSpec {
    /// The conditioned arguments without the leading function name.
    pub fn fun_args(&self) -> &[Value] {
        self.argv.get(1..).unwrap_or(&[])
    }

    /// Configured timeout in seconds, if any.
    pub fn timeout_secs(&self) -> Option<u64> {
        self.opts.get("timeout").and_then(Value::as_u64)
    }
}
