//! Small datasets in each supported representation.

use crate::format::{Field, FieldType, Format};
use crate::model::RecordSet;
use serde_json::{Map, Value, json};

/// Three plain JSON rows; `id` 1 occurs at positions 0 and 2.
///
/// # Example
///
/// ```
/// use record_adapters::testing::sample_json_rows;
///
/// assert_eq!(sample_json_rows().as_array().map(Vec::len), Some(3));
/// ```
#[must_use]
pub fn sample_json_rows() -> Value {
    json!([
        {"id": 1, "name": "A"},
        {"id": 2, "name": "B"},
        {"id": 1, "name": "C"},
    ])
}

/// A fully inlined wire table with a nested record set per row.
///
/// The table schema declares `@id` as key. The first two `children` tables share
/// one schema, the third adds an array column, so normalizing yields three schema
/// indices (table, shared child, child with array) and one link.
#[must_use]
pub fn sample_sbis_table() -> Value {
    let child = json!([{"n": "id", "t": "Число целое"}]);
    let child_with_tags = json!([
        {"n": "id", "t": "Число целое"},
        {"n": "tags", "t": {"n": "Массив", "t": "Строка"}},
    ]);
    json!({
        "s": [
            {"n": "@id", "t": "Число целое"},
            {"n": "name", "t": "Строка"},
            {"n": "children", "t": "Выборка"},
        ],
        "d": [
            [1, "A", {"s": child, "d": [[10]]}],
            [2, "B", {"s": child, "d": [[20], [21]]}],
            [3, "C", {"s": child_with_tags, "d": [[30, ["x", "y"]]]}],
        ],
    })
}

/// The rows of [`sample_json_rows`] as a record set keyed by `id`.
///
/// # Panics
///
/// Never in practice; the rows match the format by construction.
#[must_use]
pub fn sample_record_set() -> RecordSet {
    let format = Format::from_fields([
        Field::new("id", FieldType::Integer).expect("non-empty name"),
        Field::new("name", FieldType::String).expect("non-empty name"),
    ])
    .expect("unique names");
    let rows: Vec<Map<String, Value>> = sample_json_rows()
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(|row| row.as_object().cloned())
        .collect();
    RecordSet::from_rows(format, rows)
        .expect("rows match the format")
        .with_key_field("id")
}
