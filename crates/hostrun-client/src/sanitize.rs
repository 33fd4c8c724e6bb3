//! Override sanitization - the security boundary of the dispatcher.
//!
//! Callers may attach an arbitrary map of per-call configuration overrides.
//! Only the fields enumerated in [`ROSTER_FIELDS`] ever reach a job
//! descriptor, each coerced to its expected type and screened for transport
//! proxy injection. Sanitization never fails: bad entries are dropped with a
//! warning and the call proceeds on base configuration alone.

use serde_json::{Map, Value};
use tracing::warn;

/// Substring that smuggles a proxy directive into the remote shell
/// invocation. Any string override carrying it is rejected outright.
const PROXY_DIRECTIVE: &str = "ProxyCommand";

/// Expected type of an allow-listed override field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// A single string value.
    Str,
    /// An integer value.
    Int,
    /// A boolean flag.
    Bool,
    /// A list of string-like values.
    List,
}

/// The closed allow-list of override fields a caller may influence.
///
/// This set is versioned with the system and is not caller-extensible;
/// anything outside it is silently discarded.
pub const ROSTER_FIELDS: [(&str, FieldKind); 15] = [
    ("host", FieldKind::Str),
    ("ssh_user", FieldKind::Str),
    ("ssh_passwd", FieldKind::Str),
    ("ssh_port", FieldKind::Int),
    ("ssh_sudo", FieldKind::Bool),
    ("ssh_sudo_user", FieldKind::Str),
    ("ssh_priv", FieldKind::Str),
    ("ssh_priv_passwd", FieldKind::Str),
    ("ssh_identities_only", FieldKind::Bool),
    ("ssh_remote_port_forwards", FieldKind::Str),
    ("ssh_options", FieldKind::List),
    ("roster_file", FieldKind::Str),
    ("rosters", FieldKind::List),
    ("ignore_host_keys", FieldKind::Bool),
    ("raw_shell", FieldKind::Bool),
];

/// Reduce a raw override map to its safe subset.
///
/// For every allow-listed field present in `raw`, the value is coerced to
/// the expected type and content-filtered:
///
/// - boolean and integer fields are accepted once coercion succeeds;
/// - string fields are dropped if they contain the proxy directive;
/// - list fields keep only elements free of the proxy directive.
///
/// Keys not on the allow-list are omitted without comment. The result is
/// a fixed point: sanitizing it again yields an identical map.
pub fn sanitize_overrides(raw: &Map<String, Value>) -> Map<String, Value> {
    let mut sane = Map::new();
    for (name, kind) in ROSTER_FIELDS {
        let Some(value) = raw.get(name) else {
            continue;
        };
        let Some(coerced) = coerce(kind, value) else {
            warn!(field = %name, "Unable to cast override to its expected type, dropping");
            continue;
        };
        match coerced {
            Value::String(ref s) if s.contains(PROXY_DIRECTIVE) => {
                warn!(field = %name, "Filtered unsafe override value");
            }
            Value::Array(items) => {
                let filtered: Vec<Value> = items
                    .into_iter()
                    .filter(|item| match item.as_str() {
                        Some(s) if s.contains(PROXY_DIRECTIVE) => {
                            warn!(field = %name, "Filtered unsafe override list element");
                            false
                        }
                        _ => true,
                    })
                    .collect();
                sane.insert(name.to_owned(), Value::Array(filtered));
            }
            other => {
                sane.insert(name.to_owned(), other);
            }
        }
    }
    sane
}

/// Coerce `value` to `kind`, or `None` when no sensible cast exists.
fn coerce(kind: FieldKind, value: &Value) -> Option<Value> {
    match kind {
        FieldKind::Int => coerce_int(value).map(Value::from),
        FieldKind::Bool => coerce_bool(value).map(Value::from),
        FieldKind::Str => coerce_str(value).map(Value::from),
        FieldKind::List => match value {
            Value::Array(items) => Some(Value::Array(items.clone())),
            _ => None,
        },
    }
}

fn coerce_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        Value::Bool(b) => Some(i64::from(*b)),
        _ => None,
    }
}

fn coerce_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn coerce_str(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
