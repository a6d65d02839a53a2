//! Assertions for indexes and wire schemas.

use crate::canonical::canonical_string;
use crate::indexer::Indexer;
use crate::wire::walk::visit_nodes;
use crate::wire::{FORMAT_KEY, SCHEMA_KEY, format_hash, schema_names};
use serde_json::Value;

/// Positions of the rows whose `property` equals `value`, found by brute force.
///
/// Uses the same equality as [`Indexer`]: canonical form, absent counts as `null`.
///
/// # Example
///
/// ```
/// use record_adapters::testing::linear_scan;
/// use serde_json::json;
///
/// let rows = json!([{"id": 1}, {"id": 2}, {"id": 1.0}]);
/// assert_eq!(linear_scan(rows.as_array().unwrap(), "id", &json!(1)), vec![0, 2]);
/// ```
pub fn linear_scan(rows: &[Value], property: &str, value: &Value) -> Vec<usize> {
    let wanted = canonical_string(value);
    rows.iter()
        .enumerate()
        .filter(|(_, row)| canonical_string(row.get(property).unwrap_or(&Value::Null)) == wanted)
        .map(|(i, _)| i)
        .collect()
}

/// Assert that `index` agrees with [`linear_scan`] over `rows` for every value of
/// `property` present in `rows`, and for `null`.
///
/// # Panics
///
/// Panics on the first value whose positions differ.
pub fn assert_index_consistent(index: &mut Indexer<Value>, rows: &[Value], property: &str) {
    let mut candidates: Vec<Value> = rows
        .iter()
        .map(|row| row.get(property).cloned().unwrap_or(Value::Null))
        .collect();
    candidates.push(Value::Null);
    for value in &candidates {
        let expected = linear_scan(rows, property, value);
        let actual = index.get_indices_by_value(property, value);
        assert_eq!(
            actual, expected,
            "Index mismatch for {property} = {value}:\n  Expected: {expected:?}\n  Actual: {actual:?}\n  Rows: {rows:?}"
        );
        assert_eq!(
            index.get_index_by_value(property, value),
            expected.first().copied(),
            "First-position mismatch for {property} = {value}"
        );
    }
}

/// Assert that two wire schemas have the same structural identity.
///
/// # Panics
///
/// Panics if their [`format_hash`] differs.
pub fn assert_same_schema(actual: &[Value], expected: &[Value]) {
    assert_eq!(
        format_hash(actual),
        format_hash(expected),
        "Schema mismatch:\n  Expected fields: {:?}\n  Actual fields: {:?}\n  Expected: {expected:?}\n  Actual: {actual:?}",
        schema_names(expected),
        schema_names(actual)
    );
}

/// Assert that every node of `payload` carries its schema inline and no schema
/// index, as [`denormalize_formats`](crate::wire::denormalize_formats) leaves a
/// payload whose links all resolve.
///
/// # Panics
///
/// Panics on the first node with an `f` key or without an `s` key.
pub fn assert_fully_inlined(payload: &Value) {
    visit_nodes(payload, |node| {
        assert!(
            node.contains_key(SCHEMA_KEY) && !node.contains_key(FORMAT_KEY),
            "Node is not inlined: {node:?}\n  Payload: {payload}"
        );
    });
}
