use anyhow::Result;
use pretty_assertions::assert_eq;
use record_adapters::testing::sample_json_rows;
use record_adapters::{
    Adapter, AdapterConfig, DataHolder, ErrorKind, Field, FieldDeclaration, FieldType,
    JsonAdapter, RecordAdapter, Shared, TableAdapter,
};
use serde_json::json;

fn table_over(rows: serde_json::Value) -> (Shared<serde_json::Value>, record_adapters::JsonTable) {
    let raw = Shared::new(rows);
    let table = JsonAdapter::new().for_table(Some(raw.clone()));
    (raw, table)
}

#[test]
fn add_field_backfills_every_row() -> Result<()> {
    let (raw, mut table) = table_over(sample_json_rows());
    let foo = Field::from_declaration(&FieldDeclaration::new("foo", "string").default_value("abc"))?;

    table.add_field(foo, Some(0))?;

    for i in 0..3 {
        assert_eq!(table.at(i).map(|row| row["foo"].clone()), Some(json!("abc")));
    }
    assert_eq!(table.format("foo")?.name(), "foo");
    assert_eq!(table.fields(), vec!["foo", "id", "name"]);
    assert_eq!(raw.borrow()[1]["foo"], json!("abc"));
    Ok(())
}

#[test]
fn add_existing_field_only_fills_gaps() -> Result<()> {
    let (_, mut table) = table_over(json!([{"id": 1, "x": 5}, {"id": 2}]));
    table.add_field(Field::new("x", FieldType::Integer)?.with_default(9), None)?;
    assert_eq!(table.at(0).map(|r| r["x"].clone()), Some(json!(5)));
    assert_eq!(table.at(1).map(|r| r["x"].clone()), Some(json!(9)));
    assert_eq!(table.fields(), vec!["x", "id"]);
    Ok(())
}

#[test]
fn removing_a_missing_field_changes_nothing() {
    let (_, mut table) = table_over(sample_json_rows());
    let before = table.fields().len();

    let err = table.remove_field("Some").unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Reference);
    assert_eq!(table.fields().len(), before);
}

#[test]
fn fields_are_the_union_of_row_keys() {
    let (_, table) = table_over(json!([{"a": 1}, {"b": 2}, {"a": 3, "c": 4}]));
    assert_eq!(table.fields(), vec!["a", "b", "c"]);
}

#[test]
fn field_sampling_stops_after_quiet_rows() {
    let rows = json!([{"a": 1}, {"a": 2}, {"a": 3, "b": 4}]);
    let config = AdapterConfig {
        field_sample_window: 1,
        ..AdapterConfig::default()
    };
    let bounded = JsonAdapter::with_config(config).for_table(Some(Shared::new(rows.clone())));
    assert_eq!(bounded.fields(), vec!["a"]);

    let (_, full) = table_over(rows);
    assert_eq!(full.fields(), vec!["a", "b"]);
}

#[test]
fn positional_operations_check_bounds() -> Result<()> {
    let (_, mut table) = table_over(sample_json_rows());

    assert_eq!(table.at(3), None);
    assert_eq!(table.add(json!({"id": 9}), Some(4)).unwrap_err().kind(), ErrorKind::Range);
    assert_eq!(table.remove(3).unwrap_err().kind(), ErrorKind::Range);
    assert_eq!(table.replace(json!({}), 3).unwrap_err().kind(), ErrorKind::Range);
    assert_eq!(table.add(json!(5), None).unwrap_err().kind(), ErrorKind::InvalidArgument);

    table.add(json!({"id": 0}), Some(0))?;
    table.add(json!({"id": 4}), None)?;
    assert_eq!(table.count(), 5);
    assert_eq!(table.at(0), Some(json!({"id": 0})));
    assert_eq!(table.at(4), Some(json!({"id": 4})));
    Ok(())
}

#[test]
fn move_keeps_relative_order() -> Result<()> {
    let (raw, mut table) = table_over(json!([{"id": 1}, {"id": 2}, {"id": 3}, {"id": 4}]));

    table.move_row(0, 2)?;
    assert_eq!(*raw.borrow(), json!([{"id": 2}, {"id": 3}, {"id": 1}, {"id": 4}]));

    table.move_row(1, 1)?;
    assert_eq!(*raw.borrow(), json!([{"id": 2}, {"id": 3}, {"id": 1}, {"id": 4}]));

    table.move_row(3, 0)?;
    assert_eq!(*raw.borrow(), json!([{"id": 4}, {"id": 2}, {"id": 3}, {"id": 1}]));
    Ok(())
}

#[test]
fn merge_copies_values_and_drops_the_source() -> Result<()> {
    let (raw, mut table) = table_over(json!([
        {"id": 1, "name": "A"},
        {"id": 2, "name": "B", "extra": true},
    ]));

    table.merge(0, 1, "id")?;

    assert_eq!(*raw.borrow(), json!([{"id": 1, "name": "B", "extra": true}]));
    Ok(())
}

#[test]
fn copy_inserts_the_duplicate_after_the_row() -> Result<()> {
    let (raw, mut table) = table_over(sample_json_rows());
    let duplicate = table.copy(1)?;
    assert_eq!(duplicate, json!({"id": 2, "name": "B"}));
    assert_eq!(table.count(), 4);
    assert_eq!(raw.borrow()[2], duplicate);
    Ok(())
}

#[test]
fn clear_keeps_the_container() {
    let (raw, mut table) = table_over(sample_json_rows());
    table.clear();
    assert!(Shared::ptr_eq(table.data(), &raw));
    assert_eq!(*raw.borrow(), json!([]));
}

#[test]
fn format_is_inferred_for_undeclared_columns() -> Result<()> {
    let (_, table) = table_over(json!([{"n": null, "v": 1.5}, {"n": 3}]));
    assert_eq!(table.format("n")?.field_type(), &FieldType::Integer);
    assert_eq!(table.format("v")?.field_type(), &FieldType::Real);
    assert_eq!(table.format("missing").unwrap_err().kind(), ErrorKind::Reference);
    Ok(())
}

#[test]
fn remove_field_at_uses_field_order() -> Result<()> {
    let (raw, mut table) = table_over(json!([{"a": 1, "b": 2}]));
    table.remove_field_at(1)?;
    assert_eq!(*raw.borrow(), json!([{"a": 1}]));
    assert_eq!(table.remove_field_at(5).unwrap_err().kind(), ErrorKind::Range);
    Ok(())
}

#[test]
fn record_get_and_set() -> Result<()> {
    let raw = Shared::new(json!({"id": 1}));
    let mut record = JsonAdapter::new().for_record(Some(raw.clone()), None);

    assert_eq!(record.get("id"), Some(json!(1)));
    assert_eq!(record.get("missing"), None);
    assert_eq!(record.get(""), None);

    record.set("name", json!("A"))?;
    assert_eq!(*raw.borrow(), json!({"id": 1, "name": "A"}));
    assert_eq!(record.set("", json!(0)).unwrap_err().kind(), ErrorKind::Reference);

    assert!(record.has("name"));
    record.remove_field("name")?;
    assert!(!record.has("name"));
    assert_eq!(record.remove_field("name").unwrap_err().kind(), ErrorKind::Reference);
    Ok(())
}

#[test]
fn record_add_field_respects_existing_values() -> Result<()> {
    let raw = Shared::new(json!({"id": 1}));
    let mut record = JsonAdapter::new().for_record(Some(raw.clone()), None);

    record.add_field(Field::new("id", FieldType::Integer)?.with_default(7), None)?;
    record.add_field(Field::new("qty", FieldType::Integer)?, None)?;

    assert_eq!(*raw.borrow(), json!({"id": 1, "qty": 0}));
    assert_eq!(record.fields(), vec!["id", "qty"]);
    Ok(())
}

#[test]
fn facade_properties_and_serialization() -> Result<()> {
    let adapter = JsonAdapter::new();
    let mut data = json!({"rows": [], "meta": {"total": 3}});

    assert_eq!(adapter.key_field(&data), None);
    assert_eq!(adapter.get_property(&data, "meta.total"), Some(json!(3)));
    assert_eq!(adapter.get_property(&data, "meta.missing.deep"), None);

    adapter.set_property(&mut data, "meta.page.size", json!(25))?;
    assert_eq!(data["meta"]["page"]["size"], json!(25));

    let text = adapter.serialize(&data)?;
    assert_eq!(serde_json::from_str::<serde_json::Value>(&text)?, data);
    Ok(())
}

#[test]
fn properties_on_a_row_array_never_replace_the_rows() -> Result<()> {
    let adapter = JsonAdapter::new();
    let mut rows = sample_json_rows();

    let err = adapter.set_property(&mut rows, "total", json!(2)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    let err = adapter.set_property(&mut rows, "7.name", json!("Q")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Range);
    assert_eq!(rows, sample_json_rows());

    adapter.set_property(&mut rows, "1.name", json!("Q"))?;
    assert_eq!(rows[1], json!({"id": 2, "name": "Q"}));
    assert_eq!(adapter.get_property(&rows, "1.name"), Some(json!("Q")));
    Ok(())
}
