use anyhow::Result;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use record_adapters::testing::sample_sbis_table;
use record_adapters::wire::{descriptor_to_field, field_to_descriptor};
use record_adapters::{Field, FieldType, denormalize_formats, format_hash, normalize_formats};
use serde_json::{Value, json};

fn schema_a() -> Value {
    json!([{"n": "id", "t": "Число целое"}, {"n": "name", "t": "Строка"}])
}

fn schema_b() -> Value {
    json!([{"n": "id", "t": "Число целое"}, {"n": "when", "t": "Дата"}])
}

fn record(schema: &Value, data: Value) -> Value {
    json!({"d": data, "s": schema})
}

#[test]
fn repeated_schemas_become_links() {
    let mut payload = json!({"items": [
        record(&schema_a(), json!([1, "a"])),
        record(&schema_a(), json!([2, "b"])),
        record(&schema_b(), json!([3, "2024-01-01"])),
        record(&schema_a(), json!([4, "d"])),
    ]});

    normalize_formats(&mut payload);

    let items = payload["items"].as_array().expect("items");
    let indices: Vec<Value> = items.iter().map(|item| item["f"].clone()).collect();
    assert_eq!(indices, vec![json!(0), json!(0), json!(1), json!(0)]);

    assert_eq!(items[0]["s"], schema_a());
    assert_eq!(items[1], json!({"d": [2, "b"], "f": 0}));
    assert_eq!(items[2]["s"], schema_b());
    assert_eq!(items[3], json!({"d": [4, "d"], "f": 0}));
}

#[test]
fn nested_tables_are_deduplicated_in_document_order() {
    let mut payload = sample_sbis_table();
    normalize_formats(&mut payload);

    assert_eq!(payload["f"], json!(0));
    assert_eq!(payload["d"][0][2]["f"], json!(1));
    assert!(payload["d"][0][2].get("s").is_some());
    assert_eq!(payload["d"][1][2], json!({"d": [[20], [21]], "f": 1}));
    assert_eq!(payload["d"][2][2]["f"], json!(2));
    assert!(payload["d"][2][2].get("s").is_some());
}

#[test]
fn denormalize_restores_the_inlined_form() {
    let original = sample_sbis_table();
    let mut payload = original.clone();

    normalize_formats(&mut payload);
    denormalize_formats(&mut payload);

    assert_eq!(payload, original);
}

#[test]
fn codec_ignores_non_objects() {
    for mut value in [json!(null), json!(3), json!("text"), json!([1, 2])] {
        let before = value.clone();
        normalize_formats(&mut value);
        denormalize_formats(&mut value);
        assert_eq!(value, before);
    }
}

#[test]
fn unresolved_links_are_left_alone() {
    let mut payload = json!([{"d": [1], "f": 5}]);
    denormalize_formats(&mut payload);
    assert_eq!(payload, json!([{"d": [1], "f": 5}]));
}

#[test]
fn hash_sees_array_element_types() -> Result<()> {
    let strings = [field_to_descriptor(&Field::new(
        "tags",
        FieldType::Array(Box::new(FieldType::String)),
    )?)];
    let ints = [field_to_descriptor(&Field::new(
        "tags",
        FieldType::Array(Box::new(FieldType::Integer)),
    )?)];
    assert_ne!(format_hash(&strings), format_hash(&ints));
    Ok(())
}

#[test]
fn hash_sees_flags_dictionaries() {
    let first = [json!({"n": "mode", "t": {"n": "Флаги", "s": {"0": "read", "1": "write"}}})];
    let second = [json!({"n": "mode", "t": {"n": "Флаги", "s": {"0": "read", "1": "exec"}}})];
    assert_ne!(format_hash(&first), format_hash(&second));
}

#[test]
fn hash_ignores_descriptor_key_order() {
    let first = [json!({"n": "id", "t": "Число целое"})];
    let second = [json!({"t": "Число целое", "n": "id"})];
    assert_eq!(format_hash(&first), format_hash(&second));
}

#[test]
fn schemas_differing_only_in_element_type_get_distinct_indices() -> Result<()> {
    let tags = |kind: FieldType| -> Result<Value> {
        Ok(json!([field_to_descriptor(&Field::new("tags", FieldType::Array(Box::new(kind)))?)]))
    };
    let mut payload = json!([
        record(&tags(FieldType::String)?, json!([["a"]])),
        record(&tags(FieldType::Integer)?, json!([[1]])),
    ]);

    normalize_formats(&mut payload);

    assert_eq!(payload[0]["f"], json!(0));
    assert_eq!(payload[1]["f"], json!(1));
    assert!(payload[1].get("s").is_some());
    Ok(())
}

#[test]
fn descriptors_round_trip_through_fields() -> Result<()> {
    let descriptor = json!({"n": "state", "t": {"n": "Перечисляемое", "s": {"0": "new", "1": "done"}}});
    let field = descriptor_to_field(&descriptor)?;
    assert!(matches!(field.field_type(), FieldType::Enum(dict) if dict.len() == 2));
    assert_eq!(field_to_descriptor(&field), descriptor);

    let err = descriptor_to_field(&json!({"n": "x", "t": "Нечто"})).unwrap_err();
    assert_eq!(err.kind(), record_adapters::ErrorKind::InvalidArgument);
    Ok(())
}

fn pool() -> Vec<Value> {
    vec![
        schema_a(),
        schema_b(),
        json!([{"n": "tags", "t": {"n": "Массив", "t": "Строка"}}]),
    ]
}

fn build_payload(rows: &[(usize, i64, Option<usize>)]) -> Value {
    let schemas = pool();
    let data: Vec<Value> = rows
        .iter()
        .map(|&(schema, value, child)| {
            let inner = match child {
                Some(c) => record(&schemas[c], json!([value])),
                None => Value::Null,
            };
            json!([value, record(&schemas[schema], json!([value, inner]))])
        })
        .collect();
    json!({
        "s": [{"n": "@id", "t": "Число целое"}, {"n": "item", "t": "Запись"}],
        "d": data,
    })
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        rng_seed: proptest::test_runner::RngSeed::Fixed(0),
        failure_persistence: None,
        .. ProptestConfig::default()
    })]

    #[test]
    fn normalize_then_denormalize_is_identity(
        rows in proptest::collection::vec((0..3usize, any::<i64>(), proptest::option::of(0..3usize)), 0..16)
    ) {
        let original = build_payload(&rows);
        let mut payload = original.clone();

        normalize_formats(&mut payload);
        denormalize_formats(&mut payload);

        prop_assert_eq!(payload, original);
    }

    #[test]
    fn every_schema_is_inlined_exactly_once(
        rows in proptest::collection::vec((0..3usize, any::<i64>(), proptest::option::of(0..3usize)), 1..16)
    ) {
        let mut payload = build_payload(&rows);
        normalize_formats(&mut payload);

        let mut inlined = 0usize;
        let mut seen = std::collections::BTreeSet::new();
        for row in payload["d"].as_array().into_iter().flatten() {
            let item = &row[1];
            if item.get("s").is_some() {
                inlined += 1;
            }
            seen.insert(item["f"].as_u64());
            let inner = &item["d"][1];
            if inner.is_object() {
                if inner.get("s").is_some() {
                    inlined += 1;
                }
                seen.insert(inner["f"].as_u64());
            }
        }
        // the table schema is index 0 and differs from every pooled schema
        prop_assert_eq!(payload["f"].as_u64(), Some(0));
        prop_assert_eq!(inlined, seen.len());
    }
}
