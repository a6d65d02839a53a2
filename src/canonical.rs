//! Canonical text form of a JSON value.
//!
//! Two values have the same canonical form exactly when they are structurally
//! equal: object keys are sorted, arrays keep their order, and a float with an
//! integral value prints like the integer it equals (`1.0` and `1` agree).

use serde_json::{Number, Value};
use std::fmt::Write;

/// Canonical form of `value`.
pub fn canonical_string(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => write_number(n, out),
        Value::String(s) => {
            let _ = write!(out, "{s:?}");
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
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                let _ = write!(out, "{key:?}:");
                write_canonical(&map[key], out);
            }
            out.push('}');
        }
    }
}

fn write_number(n: &Number, out: &mut String) {
    if let Some(f) = n.as_f64()
        && !n.is_i64()
        && !n.is_u64()
        && f.fract() == 0.0
        && f.abs() < 9.007_199_254_740_992e15
    {
        let _ = write!(out, "{}", f as i64);
        return;
    }
    let _ = write!(out, "{n}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn object_key_order_is_irrelevant() {
        assert_eq!(
            canonical_string(&json!({"a": 1, "b": [1, 2]})),
            canonical_string(&json!({"b": [1, 2], "a": 1}))
        );
    }

    #[test]
    fn integral_floats_match_integers() {
        assert_eq!(canonical_string(&json!(1.0)), canonical_string(&json!(1)));
        assert_ne!(canonical_string(&json!(1.5)), canonical_string(&json!(1)));
    }

    #[test]
    fn strings_and_numbers_do_not_collide() {
        assert_ne!(canonical_string(&json!("1")), canonical_string(&json!(1)));
        assert_ne!(canonical_string(&json!([1, 2])), canonical_string(&json!([2, 1])));
    }
}
