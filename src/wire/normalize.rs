//! Schema deduplication: inline-once, link-afterwards.

use super::walk::visit_nodes_mut;
use super::{FORMAT_KEY, SCHEMA_KEY, Schema, format_hash, inline_schema, schema_index};
use log::{debug, warn};
use serde_json::Value;
use std::collections::HashMap;

/// Deduplicate the schemas of `payload` in place.
///
/// Nodes are visited depth-first. The first node carrying a given schema (by
/// [`format_hash`]) keeps `s` and receives the next schema index in `f`; every
/// later node with the same schema drops `s` and keeps only `f`.
///
/// Payloads that already contain links are accepted: a link is resolved against
/// the nearest earlier node that inlined the same index before renumbering.
/// Scalars are left untouched.
///
/// ```
/// use record_adapters::wire::normalize_formats;
/// use serde_json::json;
///
/// let schema = json!([{"n": "id", "t": "Число целое"}]);
/// let mut payload = json!({"d": [{"d": [1], "s": schema}, {"d": [2], "s": schema}], "s": [
///     {"n": "a", "t": "Запись"}, {"n": "b", "t": "Запись"}
/// ]});
/// normalize_formats(&mut payload);
/// assert_eq!(payload["f"], 0);
/// assert_eq!(payload["d"][0]["f"], 1);
/// assert_eq!(payload["d"][1], json!({"d": [2], "f": 1}));
/// ```
pub fn normalize_formats(payload: &mut Value) {
    let mut assigned: HashMap<String, usize> = HashMap::new();
    let mut incoming: HashMap<usize, Schema> = HashMap::new();

    visit_nodes_mut(payload, |node| {
        let schema = match inline_schema(node) {
            Some(schema) => {
                let schema = schema.clone();
                if let Some(index) = schema_index(node) {
                    incoming.insert(index, schema.clone());
                }
                schema
            }
            None => {
                let resolved = schema_index(node).and_then(|index| incoming.get(&index));
                let Some(schema) = resolved else {
                    warn!("normalize: link {:?} has no earlier inlined schema", node.get(FORMAT_KEY));
                    return;
                };
                schema.clone()
            }
        };

        let hash = format_hash(&schema);
        match assigned.get(&hash) {
            Some(&index) => {
                node.shift_remove(SCHEMA_KEY);
                node.insert(FORMAT_KEY.to_string(), Value::from(index));
            }
            None => {
                let index = assigned.len();
                assigned.insert(hash, index);
                node.insert(SCHEMA_KEY.to_string(), Value::Array(schema));
                node.insert(FORMAT_KEY.to_string(), Value::from(index));
            }
        }
    });

    debug!("normalize: {} distinct schema(s)", assigned.len());
}

/// Inline every linked schema of `payload` in place.
///
/// A node carrying only `f` takes the `s` of the nearest earlier node (in
/// traversal order) that inlined the same index. Resolved nodes lose their `f`,
/// so the result is the fully inlined form. Links that cannot be resolved are
/// left as they are. Scalars are left untouched.
pub fn denormalize_formats(payload: &mut Value) {
    let mut known: HashMap<usize, Schema> = HashMap::new();
    let mut unresolved = 0usize;

    visit_nodes_mut(payload, |node| {
        let Some(index) = schema_index(node) else {
            return;
        };
        if let Some(schema) = inline_schema(node) {
            known.insert(index, schema.clone());
            node.shift_remove(FORMAT_KEY);
        } else if let Some(schema) = known.get(&index) {
            node.insert(SCHEMA_KEY.to_string(), Value::Array(schema.clone()));
            node.shift_remove(FORMAT_KEY);
        } else {
            unresolved += 1;
        }
    });

    if unresolved > 0 {
        warn!("denormalize: {unresolved} link(s) without an earlier inlined schema");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scalars_are_ignored() {
        let mut v = json!(42);
        normalize_formats(&mut v);
        denormalize_formats(&mut v);
        assert_eq!(v, json!(42));
    }

    #[test]
    fn already_normalized_input_is_renumbered_consistently() {
        let mut v = json!({
            "d": [{"d": [1], "s": [{"n": "a", "t": "Строка"}], "f": 7}, {"d": [2], "f": 7}],
            "s": [{"n": "x", "t": "Запись"}, {"n": "y", "t": "Запись"}]
        });
        normalize_formats(&mut v);
        assert_eq!(v["d"][0]["f"], 1);
        assert_eq!(v["d"][1], json!({"d": [2], "f": 1}));
    }
}
