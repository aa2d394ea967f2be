//! Canonical Encoder (half of component B): a byte-exact, key-sorted
//! serialization of a JSON value, used as the input to signing and
//! verification.

use serde_json::Value;
use std::fmt::Write as _;

/// Produces the canonical form of `value`, as defined in spec §4.B:
/// objects have their keys sorted lexicographically and re-emitted with no
/// whitespace; arrays preserve element order; scalars use their standard
/// JSON encoding.
pub fn canonicalize(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            out.push('{');
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            for (i, key) in keys.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_json_string(key, out);
                out.push(':');
                write_canonical(&map[*key], out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        // Scalars: serde_json's own encoding already matches the required
        // form (no trailing `.0` for whole numbers, standard string escaping).
        Value::String(_) | Value::Number(_) | Value::Bool(_) | Value::Null => {
            let _ = write!(out, "{value}");
        }
    }
}

fn write_json_string(s: &str, out: &mut String) {
    // Delegate to serde_json for correct escaping of control characters and
    // non-ASCII (e.g. "é"); serde_json's Display for a bare string value
    // already produces a quoted, escaped JSON string literal.
    let _ = write!(out, "{}", Value::String(s.to_string()));
}

/// Returns `m` with the top-level `"signature"` key removed, per the
/// signing invariant in spec §3/§4.B. No-op if `m` is not an object or has
/// no `signature` key.
pub fn without_signature(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut map = map.clone();
            map.remove("signature");
            Value::Object(map)
        }
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests;
