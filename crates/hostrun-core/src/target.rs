//! Target selection modes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Strategy used by the execution engine to resolve a target pattern to
/// concrete hosts.
///
/// The dispatcher never interprets the pattern itself; the mode is carried
/// on the job descriptor and resolved engine-side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetSelection {
    /// Shell-style glob matching on host ids (the default).
    #[default]
    Glob,
    /// Perl-compatible regular expression matching.
    Pcre,
    /// Explicit comma-separated list of host ids.
    List,
    /// Grain value matching.
    Grain,
    /// Grain value matching via regular expression.
    GrainPcre,
    /// Pillar value matching.
    Pillar,
    /// Predefined node group lookup.
    Nodegroup,
    /// Range cluster expression.
    Range,
    /// Compound expression combining other modes.
    Compound,
}

impl TargetSelection {
    /// Wire name of the selection mode as the engine expects it.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Glob => "glob",
            Self::Pcre => "pcre",
            Self::List => "list",
            Self::Grain => "grain",
            Self::GrainPcre => "grain_pcre",
            Self::Pillar => "pillar",
            Self::Nodegroup => "nodegroup",
            Self::Range => "range",
            Self::Compound => "compound",
        }
    }
}

impl fmt::Display for TargetSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TargetSelection {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "glob" => Ok(Self::Glob),
            "pcre" => Ok(Self::Pcre),
            "list" => Ok(Self::List),
            "grain" => Ok(Self::Grain),
            "grain_pcre" => Ok(Self::GrainPcre),
            "pillar" => Ok(Self::Pillar),
            "nodegroup" => Ok(Self::Nodegroup),
            "range" => Ok(Self::Range),
            "compound" => Ok(Self::Compound),
            other => Err(CoreError::InvalidSelection(other.to_owned())),
        }
    }
}
