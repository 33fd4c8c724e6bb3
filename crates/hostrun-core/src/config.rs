//! Base configuration for a dispatch client.

use std::path::Path;

use serde_json::{Map, Value};

use crate::error::CoreError;

/// Key under which the custom-roster kill switch is carried in job options.
pub const DISABLE_CUSTOM_ROSTER_KEY: &str = "__disable_custom_roster";

/// Parsed base configuration held by a dispatch client.
///
/// Loaded once at client creation and read-only thereafter. Every job takes
/// its own deep copy of the settings before merging per-call overrides, so a
/// `BaseConfig` can be shared across concurrent calls without corruption.
#[derive(Debug, Clone, PartialEq)]
pub struct BaseConfig {
    settings: Map<String, Value>,
    disable_custom_roster: bool,
}

impl BaseConfig {
    /// Create a configuration from already-parsed settings.
    ///
    /// Custom roster selection is allowed by default; API-facing callers
    /// should disable it via [`BaseConfig::with_custom_roster_disabled`].
    pub fn new(settings: Map<String, Value>) -> Self {
        Self {
            settings,
            disable_custom_roster: false,
        }
    }

    /// Builder method to forbid caller-supplied roster customization.
    ///
    /// An API layer must never offer a custom roster, so servers construct
    /// their client with this flag set.
    pub fn with_custom_roster_disabled(mut self, disabled: bool) -> Self {
        self.disable_custom_roster = disabled;
        self
    }

    /// The stored settings map.
    pub fn settings(&self) -> &Map<String, Value> {
        &self.settings
    }

    /// Look up a single setting.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.settings.get(key)
    }

    /// Whether caller-supplied roster customization is forbidden.
    pub fn custom_roster_disabled(&self) -> bool {
        self.disable_custom_roster
    }

    /// Deep copy of the settings with the roster flag stamped in, ready for
    /// per-job mutation.
    pub fn job_opts(&self) -> Map<String, Value> {
        let mut opts = self.settings.clone();
        opts.insert(
            DISABLE_CUSTOM_ROSTER_KEY.to_owned(),
            Value::Bool(self.disable_custom_roster),
        );
        opts
    }
}

/// Boundary to the configuration-source collaborator.
///
/// Supplies a parsed configuration mapping for a file path. Parsing and file
/// format are entirely the collaborator's concern.
pub trait ConfigSource {
    /// Load and parse the configuration at `path`.
    fn load(&self, path: &Path) -> Result<Map<String, Value>, CoreError>;
}
