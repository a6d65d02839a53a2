use anyhow::Result;
use pretty_assertions::assert_eq;
use record_adapters::testing::{sample_json_rows, sample_record_set, sample_sbis_table};
use record_adapters::{
    Adapter, CowAdapter, DataHolder, JsonAdapter, RecordAdapter, RecordSetAdapter, SbisAdapter,
    Shared, TableAdapter, normalize_formats,
};
use serde_json::json;

#[test]
fn first_write_copies_exactly_once() -> Result<()> {
    let raw = Shared::new(json!({"id": 1, "name": "A"}));
    let cow = CowAdapter::new(JsonAdapter::new());
    let mut record = cow.for_record(Some(raw.clone()), None);

    assert!(!record.is_copied());
    assert!(Shared::ptr_eq(record.data(), &raw));

    record.set("name", json!("B"))?;
    assert!(record.is_copied());
    assert!(!Shared::ptr_eq(record.data(), &raw));
    let after_first = record.data().clone();

    record.set("name", json!("C"))?;
    assert!(Shared::ptr_eq(record.data(), &after_first));

    assert_eq!(*raw.borrow(), json!({"id": 1, "name": "A"}));
    assert!(Shared::ptr_eq(record.original().data(), &raw));
    assert_eq!(record.get("name"), Some(json!("C")));
    Ok(())
}

#[test]
fn reads_do_not_copy() {
    let raw = Shared::new(sample_json_rows());
    let cow = CowAdapter::new(JsonAdapter::new());
    let table = cow.for_table(Some(raw.clone()));

    assert_eq!(table.count(), 3);
    assert_eq!(table.fields(), vec!["id", "name"]);
    assert_eq!(table.at(1), Some(json!({"id": 2, "name": "B"})));

    assert!(!table.is_copied());
    assert!(Shared::ptr_eq(table.data(), &raw));
}

#[test]
fn wrappers_over_one_container_stay_isolated() -> Result<()> {
    let raw = Shared::new(sample_json_rows());
    let cow = CowAdapter::new(JsonAdapter::new());
    let mut left = cow.for_table(Some(raw.clone()));
    let mut right = cow.for_table(Some(raw.clone()));

    left.remove(0)?;
    right.add(json!({"id": 4, "name": "D"}), None)?;

    assert_eq!(left.count(), 2);
    assert_eq!(right.count(), 4);
    assert_eq!(raw.borrow().as_array().map(Vec::len), Some(3));
    Ok(())
}

#[test]
fn failed_write_still_leaves_the_original_untouched() {
    let raw = Shared::new(sample_json_rows());
    let mut table = CowAdapter::new(JsonAdapter::new()).for_table(Some(raw.clone()));

    assert!(table.remove(10).is_err());

    assert_eq!(*raw.borrow(), sample_json_rows());
}

#[test]
fn wire_copy_is_self_contained() -> Result<()> {
    let mut payload = sample_sbis_table();
    normalize_formats(&mut payload);
    let root = Shared::new(payload);
    let nested = Shared::new(root.borrow()["d"][1][2].clone());
    let controller = std::rc::Rc::new(record_adapters::FormatController::new(root.clone()));

    let mut table = record_adapters::cow::CowTable::new(
        SbisAdapter::new().for_table_in(nested.clone(), controller),
    );
    table.add(json!([22]), None)?;

    let copy = table.data().borrow().clone();
    assert_eq!(copy.get("f"), None);
    assert_eq!(copy["s"], json!([{"n": "id", "t": "Число целое"}]));
    assert_eq!(copy["d"], json!([[20], [21], [22]]));
    assert_eq!(table.fields(), vec!["id"]);
    assert_eq!(*nested.borrow(), json!({"d": [[20], [21]], "f": 1}));
    Ok(())
}

#[test]
fn record_set_copy_uses_the_model_clone() -> Result<()> {
    let raw = Shared::new(sample_record_set());
    let cow = CowAdapter::new(RecordSetAdapter::new());
    let mut table = cow.for_table(Some(raw.clone()));

    table.clear();

    assert_eq!(table.count(), 0);
    assert_eq!(raw.borrow().len(), 3);
    assert_eq!(cow.key_field(&raw.borrow()), Some("id".to_string()));
    Ok(())
}

#[test]
fn rebinding_starts_a_fresh_wrapper() -> Result<()> {
    let first = Shared::new(json!({"a": 1}));
    let second = Shared::new(json!({"a": 2}));
    let cow = CowAdapter::new(JsonAdapter::new());
    let mut record = cow.for_record(Some(first), None);
    record.set("a", json!(10))?;

    let rebound = record.rebind(second.clone());

    assert!(!rebound.is_copied());
    assert!(Shared::ptr_eq(rebound.data(), &second));
    assert_eq!(rebound.get("a"), Some(json!(2)));
    Ok(())
}
