//! Adapters over the in-memory [`RecordSet`] / [`Record`] model.
//!
//! These are wrappers around already structured data: rows are [`Record`]s that
//! carry their own format, so column edits go through the model and positional
//! column removal is not offered.

use super::{
    Adapter, Cloneable, DataHolder, RecordAdapter, TableAdapter, move_item, to_json_string,
};
use crate::config::AdapterConfig;
use crate::error::{AdapterError, Result, check_insert_position, check_position};
use crate::format::Field;
use crate::model::{Record, RecordSet};
use crate::shared::Shared;
use serde_json::Value;

/// Facade for in-memory record sets.
#[derive(Clone, Debug, Default)]
pub struct RecordSetAdapter {
    config: AdapterConfig,
}

impl RecordSetAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: AdapterConfig) -> Self {
        Self { config }
    }
}

impl Adapter for RecordSetAdapter {
    type TableData = RecordSet;
    type RecordData = Record;
    type Table = RecordSetTable;
    type Record = RecordSetRecord;

    fn for_table(&self, data: Option<Shared<RecordSet>>) -> RecordSetTable {
        RecordSetTable {
            data: data.unwrap_or_default(),
        }
    }

    /// Without `data`, the record starts out with the table's format.
    fn for_record(
        &self,
        data: Option<Shared<Record>>,
        table: Option<Shared<RecordSet>>,
    ) -> RecordSetRecord {
        let data = data.unwrap_or_else(|| {
            let format = table
                .map(|t| t.borrow().format().clone())
                .unwrap_or_default();
            Shared::new(Record::new(format))
        });
        RecordSetRecord { data }
    }

    fn key_field(&self, data: &RecordSet) -> Option<String> {
        data.key_field().map(str::to_string)
    }

    /// Reads from the record set metadata.
    fn get_property(&self, data: &RecordSet, path: &str) -> Option<Value> {
        let (head, rest) = match path.split_once('.') {
            Some((head, rest)) => (head, Some(rest)),
            None => (path, None),
        };
        let value = data.metadata().get(head)?;
        match rest {
            Some(rest) => super::get_property(value, rest),
            None => Some(value.clone()),
        }
    }

    /// Writes into the record set metadata.
    fn set_property(&self, data: &mut RecordSet, path: &str, value: Value) -> Result<()> {
        let mut root = Value::Object(std::mem::take(data.metadata_mut()));
        let result = super::set_property(&mut root, path, value);
        if let Value::Object(map) = root {
            *data.metadata_mut() = map;
        }
        result
    }

    fn serialize(&self, data: &RecordSet) -> Result<String> {
        to_json_string(data, self.config.pretty)
    }
}

/// Table view over a [`RecordSet`].
#[derive(Debug)]
pub struct RecordSetTable {
    data: Shared<RecordSet>,
}

impl DataHolder for RecordSetTable {
    type Data = RecordSet;

    fn data(&self) -> &Shared<RecordSet> {
        &self.data
    }

    fn rebind(&self, data: Shared<RecordSet>) -> Self {
        Self { data }
    }

    fn as_cloneable(&self) -> Option<&dyn Cloneable<RecordSet>> {
        Some(self)
    }
}

impl Cloneable<RecordSet> for RecordSetTable {
    fn clone_data(&self) -> RecordSet {
        self.data.snapshot()
    }
}

impl TableAdapter for RecordSetTable {
    type Row = Record;

    fn fields(&self) -> Vec<String> {
        self.data.borrow().format().names()
    }

    fn count(&self) -> usize {
        self.data.borrow().len()
    }

    fn at(&self, index: usize) -> Option<Record> {
        self.data.borrow().at(index).cloned()
    }

    fn add(&mut self, row: Record, at: Option<usize>) -> Result<()> {
        let mut set = self.data.borrow_mut();
        let at = at.unwrap_or(set.len());
        check_insert_position(at, set.len())?;
        let aligned = set.align(&row);
        set.records_mut().insert(at, aligned);
        Ok(())
    }

    fn remove(&mut self, at: usize) -> Result<()> {
        let mut set = self.data.borrow_mut();
        check_position(at, set.len())?;
        set.records_mut().remove(at);
        Ok(())
    }

    fn replace(&mut self, row: Record, at: usize) -> Result<()> {
        let mut set = self.data.borrow_mut();
        check_position(at, set.len())?;
        let aligned = set.align(&row);
        set.records_mut()[at] = aligned;
        Ok(())
    }

    fn move_row(&mut self, from: usize, to: usize) -> Result<()> {
        move_item(self.data.borrow_mut().records_mut(), from, to)
    }

    fn merge(&mut self, target: usize, source: usize, key_field: &str) -> Result<()> {
        let mut set = self.data.borrow_mut();
        check_position(target, set.len())?;
        check_position(source, set.len())?;
        if target == source {
            return Ok(());
        }
        let donor = set.records()[source].clone();
        for name in set.format().names() {
            if name == key_field {
                continue;
            }
            if let Some(value) = donor.get(&name) {
                set.set_value(target, &name, value.clone())?;
            }
        }
        set.records_mut().remove(source);
        Ok(())
    }

    fn copy(&mut self, at: usize) -> Result<Record> {
        let mut set = self.data.borrow_mut();
        check_position(at, set.len())?;
        let clone = set.records()[at].clone();
        set.records_mut().insert(at + 1, clone.clone());
        Ok(clone)
    }

    fn clear(&mut self) {
        self.data.borrow_mut().records_mut().clear();
    }

    fn format(&self, name: &str) -> Result<Field> {
        self.data
            .borrow()
            .format()
            .get(name)
            .cloned()
            .ok_or_else(|| AdapterError::reference(format!("field '{name}' does not exist")))
    }

    fn add_field(&mut self, field: Field, at: Option<usize>) -> Result<()> {
        let mut set = self.data.borrow_mut();
        if set.format().index_of(field.name()).is_none() {
            set.format_mut().add(field.clone(), at)?;
        }
        let position = set.format().index_of(field.name());
        for record in set.records_mut() {
            let at = position.filter(|_| !record.has(field.name()));
            record.add_field(field.clone(), at)?;
        }
        Ok(())
    }

    fn remove_field(&mut self, name: &str) -> Result<()> {
        let mut set = self.data.borrow_mut();
        set.format_mut().remove(name)?;
        for record in set.records_mut() {
            if record.has(name) {
                record.remove_field(name)?;
            }
        }
        Ok(())
    }

    fn remove_field_at(&mut self, _index: usize) -> Result<()> {
        Err(AdapterError::unsupported(
            "record set adapter cannot remove a field by position",
        ))
    }
}

/// Record view over a [`Record`].
#[derive(Debug)]
pub struct RecordSetRecord {
    data: Shared<Record>,
}

impl DataHolder for RecordSetRecord {
    type Data = Record;

    fn data(&self) -> &Shared<Record> {
        &self.data
    }

    fn rebind(&self, data: Shared<Record>) -> Self {
        Self { data }
    }

    fn as_cloneable(&self) -> Option<&dyn Cloneable<Record>> {
        Some(self)
    }
}

impl Cloneable<Record> for RecordSetRecord {
    fn clone_data(&self) -> Record {
        self.data.snapshot()
    }
}

impl RecordAdapter for RecordSetRecord {
    fn fields(&self) -> Vec<String> {
        self.data.borrow().fields()
    }

    fn has(&self, name: &str) -> bool {
        self.data.borrow().has(name)
    }

    fn get(&self, name: &str) -> Option<Value> {
        self.data.borrow().get(name).cloned()
    }

    fn set(&mut self, name: &str, value: Value) -> Result<()> {
        self.data.borrow_mut().set(name, value)
    }

    fn clear(&mut self) {
        self.data.borrow_mut().clear();
    }

    fn format(&self, name: &str) -> Result<Field> {
        self.data
            .borrow()
            .format()
            .get(name)
            .cloned()
            .ok_or_else(|| AdapterError::reference(format!("field '{name}' does not exist")))
    }

    fn add_field(&mut self, field: Field, at: Option<usize>) -> Result<()> {
        self.data.borrow_mut().add_field(field, at)
    }

    fn remove_field(&mut self, name: &str) -> Result<()> {
        self.data.borrow_mut().remove_field(name).map(|_| ())
    }

    fn remove_field_at(&mut self, _index: usize) -> Result<()> {
        Err(AdapterError::unsupported(
            "record adapter cannot remove a field by position",
        ))
    }
}
