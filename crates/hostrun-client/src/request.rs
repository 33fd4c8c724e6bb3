//! Typed call parameters for one dispatched command.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use hostrun_core::{JobId, TargetSelection};

/// Parameters for a single command dispatch.
///
/// Only `target` and `function` are required; everything else defaults to
/// absent. Arbitrary extra configuration rides in `overrides`, which is
/// sanitized against the roster allow-list before it can touch a job.
///
/// # Example
///
/// ```rust
/// use hostrun_client::CommandRequest;
/// use hostrun_core::TargetSelection;
/// use serde_json::json;
///
/// let request = CommandRequest::new("web1,web2", "pkg.install")
///     .with_selection(TargetSelection::List)
///     .with_args(vec![json!("vim")])
///     .with_timeout(30)
///     .with_override("ssh_user", json!("deploy"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommandRequest {
    /// Target pattern.
    pub target: String,

    /// Function to execute on each resolved host.
    pub function: String,

    /// Positional arguments for the function.
    #[serde(default)]
    pub args: Vec<Value>,

    /// Keyword arguments, folded into the argument vector at dispatch.
    #[serde(default)]
    pub kwargs: Map<String, Value>,

    /// Per-call timeout in seconds; `None` keeps the configured default.
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// How the target pattern is matched against hosts.
    #[serde(default)]
    pub selection: TargetSelection,

    /// Untrusted per-call configuration overrides.
    #[serde(default)]
    pub overrides: Map<String, Value>,

    /// Caller-supplied job id, if result records should be scoped to one.
    #[serde(default)]
    pub jid: Option<JobId>,
}

impl CommandRequest {
    /// Create a request with the required fields.
    pub fn new(target: impl Into<String>, function: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            function: function.into(),
            ..Self::default()
        }
    }

    /// Set the positional arguments.
    pub fn with_args(mut self, args: Vec<Value>) -> Self {
        self.args = args;
        self
    }

    /// Set the keyword arguments.
    pub fn with_kwargs(mut self, kwargs: Map<String, Value>) -> Self {
        self.kwargs = kwargs;
        self
    }

    /// Set the per-call timeout in seconds.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Set the target selection mode.
    pub fn with_selection(mut self, selection: TargetSelection) -> Self {
        self.selection = selection;
        self
    }

    /// Replace the override map wholesale.
    pub fn with_overrides(mut self, overrides: Map<String, Value>) -> Self {
        self.overrides = overrides;
        self
    }

    /// Add a single override entry.
    pub fn with_override(mut self, key: impl Into<String>, value: Value) -> Self {
        self.overrides.insert(key.into(), value);
        self
    }

    /// Pin the job id instead of letting the engine generate one.
    pub fn with_jid(mut self, jid: JobId) -> Self {
        self.jid = Some(jid);
        self
    }
}
