//! Adapters over plain JSON: a table is an array of objects, a record is an object.
//!
//! JSON carries no schema, so the column set of a table is whatever is declared
//! through [`TableAdapter::add_field`] followed by the union of keys observed in
//! the rows. Types of undeclared columns are inferred from their values.

use super::{Adapter, DataHolder, RecordAdapter, TableAdapter, move_item, to_json_string};
use crate::config::AdapterConfig;
use crate::error::{AdapterError, Result, check_insert_position, check_position};
use crate::format::{Field, FieldType, Format};
use crate::shared::Shared;
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Facade for plain JSON data.
#[derive(Clone, Debug, Default)]
pub struct JsonAdapter {
    config: AdapterConfig,
}

impl JsonAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: AdapterConfig) -> Self {
        Self { config }
    }
}

impl Adapter for JsonAdapter {
    type TableData = Value;
    type RecordData = Value;
    type Table = JsonTable;
    type Record = JsonRecord;

    fn for_table(&self, data: Option<Shared<Value>>) -> JsonTable {
        let data = data.unwrap_or_else(|| Shared::new(Value::Array(Vec::new())));
        JsonTable {
            data,
            declared: Format::new(),
            config: self.config.clone(),
        }
    }

    fn for_record(&self, data: Option<Shared<Value>>, _table: Option<Shared<Value>>) -> JsonRecord {
        let data = data.unwrap_or_else(|| Shared::new(Value::Object(Map::new())));
        JsonRecord {
            data,
            declared: Format::new(),
        }
    }

    /// Plain JSON has no implicit key.
    fn key_field(&self, _data: &Value) -> Option<String> {
        None
    }

    fn get_property(&self, data: &Value, path: &str) -> Option<Value> {
        super::get_property(data, path)
    }

    fn set_property(&self, data: &mut Value, path: &str, value: Value) -> Result<()> {
        super::set_property(data, path, value)
    }

    fn serialize(&self, data: &Value) -> Result<String> {
        to_json_string(data, self.config.pretty)
    }
}

/// Table view over a JSON array of objects.
#[derive(Debug)]
pub struct JsonTable {
    data: Shared<Value>,
    declared: Format,
    config: AdapterConfig,
}

impl JsonTable {
    fn with_rows<R>(&self, f: impl FnOnce(&[Value]) -> R) -> R {
        let data = self.data.borrow();
        match data.as_array() {
            Some(rows) => f(rows),
            None => f(&[]),
        }
    }

    fn with_rows_mut<R>(&self, f: impl FnOnce(&mut Vec<Value>) -> R) -> R {
        let mut data = self.data.borrow_mut();
        if let Some(rows) = data.as_array_mut() {
            return f(rows);
        }
        let mut rows = Vec::new();
        let out = f(&mut rows);
        *data = Value::Array(rows);
        out
    }

    fn observed_type(&self, name: &str) -> Option<FieldType> {
        self.with_rows(|rows| {
            let mut present = false;
            for row in rows {
                if let Some(value) = row.get(name) {
                    present = true;
                    if !value.is_null() {
                        return Some(FieldType::infer(value));
                    }
                }
            }
            present.then_some(FieldType::String)
        })
    }
}

fn expect_object(row: &Value) -> Result<()> {
    if row.is_object() {
        Ok(())
    } else {
        Err(AdapterError::invalid_argument(format!(
            "JSON table rows must be objects, got {row}"
        )))
    }
}

impl DataHolder for JsonTable {
    type Data = Value;

    fn data(&self) -> &Shared<Value> {
        &self.data
    }

    fn rebind(&self, data: Shared<Value>) -> Self {
        Self {
            data,
            declared: self.declared.clone(),
            config: self.config.clone(),
        }
    }
}

impl TableAdapter for JsonTable {
    type Row = Value;

    fn fields(&self) -> Vec<String> {
        let mut names = self.declared.names();
        let mut seen: HashSet<String> = names.iter().cloned().collect();
        let window = self.config.field_sample_window;
        self.with_rows(|rows| {
            let mut quiet = 0usize;
            for row in rows {
                let Some(map) = row.as_object() else {
                    continue;
                };
                let mut grew = false;
                for key in map.keys() {
                    if seen.insert(key.clone()) {
                        names.push(key.clone());
                        grew = true;
                    }
                }
                if grew {
                    quiet = 0;
                } else {
                    quiet += 1;
                    if window > 0 && quiet >= window {
                        break;
                    }
                }
            }
        });
        names
    }

    fn count(&self) -> usize {
        self.with_rows(<[Value]>::len)
    }

    fn at(&self, index: usize) -> Option<Value> {
        self.with_rows(|rows| rows.get(index).cloned())
    }

    fn add(&mut self, row: Value, at: Option<usize>) -> Result<()> {
        expect_object(&row)?;
        self.with_rows_mut(|rows| {
            let at = at.unwrap_or(rows.len());
            check_insert_position(at, rows.len())?;
            rows.insert(at, row);
            Ok(())
        })
    }

    fn remove(&mut self, at: usize) -> Result<()> {
        self.with_rows_mut(|rows| {
            check_position(at, rows.len())?;
            rows.remove(at);
            Ok(())
        })
    }

    fn replace(&mut self, row: Value, at: usize) -> Result<()> {
        expect_object(&row)?;
        self.with_rows_mut(|rows| {
            check_position(at, rows.len())?;
            rows[at] = row;
            Ok(())
        })
    }

    fn move_row(&mut self, from: usize, to: usize) -> Result<()> {
        self.with_rows_mut(|rows| move_item(rows, from, to))
    }

    fn merge(&mut self, target: usize, source: usize, key_field: &str) -> Result<()> {
        self.with_rows_mut(|rows| {
            check_position(target, rows.len())?;
            check_position(source, rows.len())?;
            if target == source {
                return Ok(());
            }
            if let Some(donor) = rows[source].as_object().cloned()
                && let Some(acceptor) = rows[target].as_object_mut()
            {
                for (name, value) in donor {
                    if name != key_field {
                        acceptor.insert(name, value);
                    }
                }
            }
            rows.remove(source);
            Ok(())
        })
    }

    fn copy(&mut self, at: usize) -> Result<Value> {
        self.with_rows_mut(|rows| {
            check_position(at, rows.len())?;
            let clone = rows[at].clone();
            rows.insert(at + 1, clone.clone());
            Ok(clone)
        })
    }

    fn clear(&mut self) {
        self.with_rows_mut(Vec::clear);
    }

    fn format(&self, name: &str) -> Result<Field> {
        if let Some(field) = self.declared.get(name) {
            return Ok(field.clone());
        }
        let ty = self
            .observed_type(name)
            .ok_or_else(|| AdapterError::reference(format!("field '{name}' does not exist")))?;
        Field::new(name, ty)
    }

    fn add_field(&mut self, field: Field, at: Option<usize>) -> Result<()> {
        if let Some(at) = at {
            check_insert_position(at, self.fields().len())?;
        }
        let name = field.name().to_string();
        let default = field.default_value().clone();
        if self.declared.index_of(&name).is_none() {
            let at = at.map(|a| a.min(self.declared.len()));
            self.declared.add(field, at)?;
        }
        self.with_rows_mut(|rows| {
            for row in rows.iter_mut() {
                if let Some(map) = row.as_object_mut()
                    && !map.contains_key(&name)
                {
                    map.insert(name.clone(), default.clone());
                }
            }
        });
        Ok(())
    }

    fn remove_field(&mut self, name: &str) -> Result<()> {
        if !self.fields().iter().any(|f| f == name) {
            return Err(AdapterError::reference(format!("field '{name}' does not exist")));
        }
        if self.declared.index_of(name).is_some() {
            self.declared.remove(name)?;
        }
        self.with_rows_mut(|rows| {
            for row in rows.iter_mut() {
                if let Some(map) = row.as_object_mut() {
                    map.shift_remove(name);
                }
            }
        });
        Ok(())
    }

    fn remove_field_at(&mut self, index: usize) -> Result<()> {
        let names = self.fields();
        check_position(index, names.len())?;
        self.remove_field(&names[index])
    }
}

/// Record view over a JSON object.
#[derive(Debug)]
pub struct JsonRecord {
    data: Shared<Value>,
    declared: Format,
}

impl JsonRecord {
    fn with_object_mut<R>(&self, f: impl FnOnce(&mut Map<String, Value>) -> R) -> R {
        let mut data = self.data.borrow_mut();
        if let Some(map) = data.as_object_mut() {
            return f(map);
        }
        let mut map = Map::new();
        let out = f(&mut map);
        *data = Value::Object(map);
        out
    }
}

impl DataHolder for JsonRecord {
    type Data = Value;

    fn data(&self) -> &Shared<Value> {
        &self.data
    }

    fn rebind(&self, data: Shared<Value>) -> Self {
        Self {
            data,
            declared: self.declared.clone(),
        }
    }
}

impl RecordAdapter for JsonRecord {
    fn fields(&self) -> Vec<String> {
        let mut names = self.declared.names();
        if let Some(map) = self.data.borrow().as_object() {
            for key in map.keys() {
                if !names.contains(key) {
                    names.push(key.clone());
                }
            }
        }
        names
    }

    fn has(&self, name: &str) -> bool {
        self.declared.index_of(name).is_some()
            || self.data.borrow().as_object().is_some_and(|m| m.contains_key(name))
    }

    fn get(&self, name: &str) -> Option<Value> {
        if name.is_empty() {
            return None;
        }
        self.data.borrow().get(name).cloned()
    }

    fn set(&mut self, name: &str, value: Value) -> Result<()> {
        if name.is_empty() {
            return Err(AdapterError::reference("field name must not be empty"));
        }
        self.with_object_mut(|map| {
            map.insert(name.to_string(), value);
        });
        Ok(())
    }

    fn clear(&mut self) {
        self.declared.clear();
        self.with_object_mut(Map::clear);
    }

    fn format(&self, name: &str) -> Result<Field> {
        if let Some(field) = self.declared.get(name) {
            return Ok(field.clone());
        }
        let data = self.data.borrow();
        let value = data
            .get(name)
            .ok_or_else(|| AdapterError::reference(format!("field '{name}' does not exist")))?;
        Field::new(name, FieldType::infer(value))
    }

    fn add_field(&mut self, field: Field, at: Option<usize>) -> Result<()> {
        if let Some(at) = at {
            check_insert_position(at, self.fields().len())?;
        }
        let name = field.name().to_string();
        let default = field.default_value().clone();
        if self.declared.index_of(&name).is_none() {
            let at = at.map(|a| a.min(self.declared.len()));
            self.declared.add(field, at)?;
        }
        self.with_object_mut(|map| {
            map.entry(name).or_insert(default);
        });
        Ok(())
    }

    fn remove_field(&mut self, name: &str) -> Result<()> {
        if !self.has(name) {
            return Err(AdapterError::reference(format!("field '{name}' does not exist")));
        }
        if self.declared.index_of(name).is_some() {
            self.declared.remove(name)?;
        }
        self.with_object_mut(|map| {
            map.shift_remove(name);
        });
        Ok(())
    }

    fn remove_field_at(&mut self, index: usize) -> Result<()> {
        let names = self.fields();
        check_position(index, names.len())?;
        self.remove_field(&names[index])
    }
}
