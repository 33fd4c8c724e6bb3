//! Argument conditioning for the engine calling convention.

use serde_json::{Map, Value};

/// Marker key the engine uses to recognize a keyword-argument pack at the
/// end of an argument vector.
const KWARG_MARKER: &str = "__kwarg__";

/// Fold keyword arguments into the positional argument vector.
///
/// The engine's calling convention carries keyword arguments as one trailing
/// map tagged with `__kwarg__: true`. Empty keyword maps leave the
/// positional vector untouched.
pub fn condition_input(args: &[Value], kwargs: &Map<String, Value>) -> Vec<Value> {
    let mut argv = args.to_vec();
    if !kwargs.is_empty() {
        let mut pack = kwargs.clone();
        pack.insert(KWARG_MARKER.to_owned(), Value::Bool(true));
        argv.push(Value::Object(pack));
    }
    argv
}
