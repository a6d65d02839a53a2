use anyhow::Result;
use pretty_assertions::assert_eq;
use record_adapters::testing::sample_record_set;
use record_adapters::{
    Adapter, DataHolder, ErrorKind, Field, FieldDeclaration, FieldType, Format, Record,
    RecordAdapter, RecordSet, RecordSetAdapter, Shared, TableAdapter,
};
use serde_json::{Map, Value, json};

fn names(set: &Shared<RecordSet>) -> Vec<Value> {
    set.borrow()
        .records()
        .iter()
        .map(|r| r.get("name").cloned().unwrap_or(Value::Null))
        .collect()
}

#[test]
fn key_field_comes_from_the_set() {
    let adapter = RecordSetAdapter::new();
    assert_eq!(adapter.key_field(&sample_record_set()), Some("id".to_string()));
    assert_eq!(adapter.key_field(&RecordSet::default()), None);
}

#[test]
fn add_field_backfills_every_record() -> Result<()> {
    let raw = Shared::new(sample_record_set());
    let mut table = RecordSetAdapter::new().for_table(Some(raw.clone()));
    let foo = Field::from_declaration(&FieldDeclaration::new("foo", "string").default_value("abc"))?;

    table.add_field(foo, Some(0))?;

    assert_eq!(table.fields(), vec!["foo", "id", "name"]);
    for record in raw.borrow().records() {
        assert_eq!(record.get("foo"), Some(&json!("abc")));
        assert_eq!(record.fields(), vec!["foo", "id", "name"]);
    }
    assert_eq!(table.format("foo")?.name(), "foo");
    Ok(())
}

#[test]
fn removing_a_missing_field_changes_nothing() {
    let mut table = RecordSetAdapter::new().for_table(Some(Shared::new(sample_record_set())));
    let before = table.fields().len();

    let err = table.remove_field("Some").unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Reference);
    assert_eq!(table.fields().len(), before);
}

#[test]
fn positional_field_removal_is_unsupported() {
    let mut table = RecordSetAdapter::new().for_table(Some(Shared::new(sample_record_set())));
    assert_eq!(table.remove_field_at(0).unwrap_err().kind(), ErrorKind::Unsupported);

    let mut record = RecordSetAdapter::new().for_record(None, None);
    assert_eq!(record.remove_field_at(0).unwrap_err().kind(), ErrorKind::Unsupported);
}

#[test]
fn added_records_are_aligned_to_the_set_format() -> Result<()> {
    let raw = Shared::new(sample_record_set());
    let mut table = RecordSetAdapter::new().for_table(Some(raw.clone()));

    let foreign = Record::from_values(
        Format::from_fields([
            Field::new("name", FieldType::String)?,
            Field::new("color", FieldType::String)?,
        ])?,
        Map::from_iter([("name".to_string(), json!("D"))]),
    )?;
    table.add(foreign, Some(1))?;

    let added = table.at(1).expect("inserted record");
    assert_eq!(added.fields(), vec!["id", "name"]);
    assert_eq!(added.get("id"), Some(&json!(0)));
    assert_eq!(added.get("name"), Some(&json!("D")));
    assert_eq!(names(&raw), vec![json!("A"), json!("D"), json!("B"), json!("C")]);

    assert_eq!(table.add(Record::default(), Some(9)).unwrap_err().kind(), ErrorKind::Range);
    Ok(())
}

#[test]
fn row_operations() -> Result<()> {
    let raw = Shared::new(sample_record_set());
    let mut table = RecordSetAdapter::new().for_table(Some(raw.clone()));

    table.move_row(2, 0)?;
    assert_eq!(names(&raw), vec![json!("C"), json!("A"), json!("B")]);

    let duplicate = table.copy(1)?;
    assert_eq!(duplicate.get("name"), Some(&json!("A")));
    assert_eq!(names(&raw), vec![json!("C"), json!("A"), json!("A"), json!("B")]);

    table.remove(1)?;
    table.merge(0, 2, "id")?;
    assert_eq!(table.count(), 2);
    let merged = table.at(0).expect("merged record");
    assert_eq!(merged.get("id"), Some(&json!(1)));
    assert_eq!(merged.get("name"), Some(&json!("B")));

    assert_eq!(table.remove(5).unwrap_err().kind(), ErrorKind::Range);
    table.clear();
    assert!(Shared::ptr_eq(table.data(), &raw));
    assert_eq!(table.count(), 0);
    Ok(())
}

#[test]
fn record_follows_its_format() -> Result<()> {
    let set = Shared::new(sample_record_set());
    let adapter = RecordSetAdapter::new();
    let mut record = adapter.for_record(None, Some(set));

    assert_eq!(record.fields(), vec!["id", "name"]);
    assert_eq!(record.get("id"), Some(json!(0)));

    record.set("name", json!("Z"))?;
    assert_eq!(record.get("name"), Some(json!("Z")));
    assert_eq!(record.set("nope", json!(1)).unwrap_err().kind(), ErrorKind::Reference);
    assert_eq!(record.set("", json!(1)).unwrap_err().kind(), ErrorKind::Reference);
    assert_eq!(record.get(""), None);

    record.add_field(Field::new("qty", FieldType::Integer)?, Some(1))?;
    assert_eq!(record.fields(), vec!["id", "qty", "name"]);
    record.remove_field("id")?;
    assert_eq!(record.fields(), vec!["qty", "name"]);
    assert_eq!(record.format("qty")?.field_type(), &FieldType::Integer);
    Ok(())
}

#[test]
fn metadata_is_the_property_channel() -> Result<()> {
    let adapter = RecordSetAdapter::new();
    let mut set = sample_record_set();

    adapter.set_property(&mut set, "page.total", json!(42))?;

    assert_eq!(adapter.get_property(&set, "page.total"), Some(json!(42)));
    assert_eq!(adapter.get_property(&set, "page"), Some(json!({"total": 42})));
    assert_eq!(adapter.get_property(&set, "missing.path"), None);
    Ok(())
}

#[test]
fn serialize_round_trips() -> Result<()> {
    let adapter = RecordSetAdapter::new();
    let mut set = sample_record_set();
    adapter.set_property(&mut set, "more", json!(true))?;

    let text = adapter.serialize(&set)?;
    let back: RecordSet = serde_json::from_str(&text)?;

    assert_eq!(back, set);
    Ok(())
}
