//! Per-target return records.

use serde_json::{Map, Value};

/// One batch of returns from the execution engine: host id mapped to that
/// host's execution outcome (return value, retcode, success flag, jid, ...).
///
/// The dispatcher only routes and aggregates these records; their inner
/// shape belongs to the engine.
pub type ReturnSet = Map<String, Value>;
