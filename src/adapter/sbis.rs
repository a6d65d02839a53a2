//! Adapters over the SBIS wire format.
//!
//! A table is `{"d": [[...], ...], "s": [...]}`, a record `{"d": [...], "s": [...]}`.
//! Either may carry a link `f` instead of `s`; the link is resolved through the
//! [`FormatController`] of the payload the view was created over.
//!
//! A normalized payload lends a schema from one node to the nodes that link to
//! its index, so removing a row or editing a schema could strand those links.
//! Before the first edit a view therefore inlines every link under its node and
//! drops the indices; the edited node is fully inlined from then on.

use super::{
    Adapter, Cloneable, DataHolder, RecordAdapter, TableAdapter, move_item, to_json_string,
};
use crate::config::AdapterConfig;
use crate::error::{AdapterError, Result, check_insert_position, check_position};
use crate::format::{Field, FieldType};
use crate::shared::Shared;
use crate::wire::walk::{visit_nodes, visit_nodes_mut};
use crate::wire::{
    DATA_KEY, FORMAT_KEY, FormatController, SCHEMA_KEY, Schema, descriptor_name,
    descriptor_to_field, field_to_descriptor, inline_schema, schema_index, schema_names,
    schema_position,
};
use log::{debug, warn};
use serde_json::{Map, Value, json};
use std::rc::Rc;

/// Facade for wire-format data.
#[derive(Clone, Debug, Default)]
pub struct SbisAdapter {
    config: AdapterConfig,
}

impl SbisAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: AdapterConfig) -> Self {
        Self { config }
    }

    /// Table view over a node nested inside the payload `controller` is bound to,
    /// so links in `data` resolve against that payload.
    pub fn for_table_in(&self, data: Shared<Value>, controller: Rc<FormatController>) -> SbisTable {
        SbisTable {
            data,
            controller,
            config: self.config.clone(),
        }
    }

    /// Record view over a node nested inside the payload `controller` is bound to.
    pub fn for_record_in(
        &self,
        data: Shared<Value>,
        table: Option<Shared<Value>>,
        controller: Rc<FormatController>,
    ) -> SbisRecord {
        SbisRecord {
            data,
            table,
            controller,
        }
    }
}

fn empty_node() -> Value {
    json!({ DATA_KEY: [], SCHEMA_KEY: [] })
}

impl Adapter for SbisAdapter {
    type TableData = Value;
    type RecordData = Value;
    type Table = SbisTable;
    type Record = SbisRecord;

    fn for_table(&self, data: Option<Shared<Value>>) -> SbisTable {
        let data = data.unwrap_or_else(|| Shared::new(empty_node()));
        SbisTable {
            controller: Rc::new(FormatController::new(data.clone())),
            data,
            config: self.config.clone(),
        }
    }

    fn for_record(&self, data: Option<Shared<Value>>, table: Option<Shared<Value>>) -> SbisRecord {
        let data = data.unwrap_or_else(|| Shared::new(empty_node()));
        let root = table.clone().unwrap_or_else(|| data.clone());
        SbisRecord {
            data,
            table,
            controller: Rc::new(FormatController::new(root)),
        }
    }

    /// First field whose name starts with the key marker, else the first field.
    fn key_field(&self, data: &Value) -> Option<String> {
        let schema = data.get(SCHEMA_KEY)?.as_array()?;
        let marker = self.config.key_marker.as_str();
        schema
            .iter()
            .filter_map(descriptor_name)
            .find(|name| !marker.is_empty() && name.starts_with(marker))
            .or_else(|| schema.first().and_then(descriptor_name))
            .map(str::to_string)
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

/// Schema of `node`: inline, or resolved through `controller` when linked.
fn node_schema(node: &Shared<Value>, controller: &FormatController) -> Result<Option<Schema>> {
    let link = {
        let data = node.borrow();
        let Some(map) = data.as_object() else {
            return Ok(None);
        };
        if let Some(schema) = inline_schema(map) {
            return Ok(Some(schema.clone()));
        }
        schema_index(map)
    };
    match link {
        Some(index) => controller.get_format(Some(index)).map(Some),
        None => Ok(None),
    }
}

/// Make sure `node` holds its schema inline, so it can be edited.
fn materialize_schema(node: &Shared<Value>, schema: Schema) {
    let mut data = node.borrow_mut();
    if !data.is_object() {
        *data = empty_node();
    }
    if let Some(map) = data.as_object_mut() {
        map.insert(SCHEMA_KEY.to_string(), Value::Array(schema));
        map.shift_remove(FORMAT_KEY);
        map.entry(DATA_KEY.to_string())
            .or_insert_with(|| Value::Array(Vec::new()));
    }
}

/// Inline every link inside `value` that `controller` can resolve and drop the
/// index of every node whose schema is inline. Unresolvable links stay as they are.
fn detach_links(value: &mut Value, controller: &FormatController) {
    visit_nodes_mut(value, |node| {
        if inline_schema(node).is_none()
            && let Some(index) = schema_index(node)
        {
            match controller.get_format(Some(index)) {
                Ok(schema) => {
                    node.insert(SCHEMA_KEY.to_string(), Value::Array(schema));
                }
                Err(err) => {
                    warn!("sbis: cannot detach link {index}: {err}");
                    return;
                }
            }
        }
        if inline_schema(node).is_some() {
            node.shift_remove(FORMAT_KEY);
        }
    });
}

fn has_links(value: &Value) -> bool {
    let mut found = false;
    visit_nodes(value, |node| found |= node.contains_key(FORMAT_KEY));
    found
}

/// Make the node behind `data` self-contained before it is edited.
///
/// The controller keeps the schemas it resolved, so links held outside `data`
/// still resolve afterwards.
fn detach_node(data: &Shared<Value>, controller: &FormatController) {
    if !has_links(&data.borrow()) {
        return;
    }
    controller.scan_formats();
    let mut copy = data.snapshot();
    detach_links(&mut copy, controller);
    debug!("sbis: inlined schema links before edit");
    *data.borrow_mut() = copy;
}

/// Row values with every nested link inlined.
fn detached_values(values: Vec<Value>, controller: &FormatController) -> Value {
    let mut values = Value::Array(values);
    detach_links(&mut values, controller);
    values
}

/// Turn an incoming row into values ordered by `schema`.
///
/// Accepts a record node (matched by field name) or a bare value array (taken
/// positionally).
fn row_values(row: Value, schema: &[Value], controller: &FormatController) -> Result<Vec<Value>> {
    match row {
        Value::Array(values) => Ok(values),
        Value::Object(mut map) => {
            let row_schema = match inline_schema(&map) {
                Some(s) => Some(s.clone()),
                None => schema_index(&map).and_then(|i| controller.get_format(Some(i)).ok()),
            };
            let Some(Value::Array(values)) = map.shift_remove(DATA_KEY) else {
                return Err(AdapterError::invalid_argument("row node has no data array"));
            };
            let Some(row_schema) = row_schema else {
                return Ok(values);
            };
            Ok(schema_names(schema)
                .iter()
                .map(|name| {
                    schema_position(&row_schema, name)
                        .and_then(|i| values.get(i).cloned())
                        .unwrap_or(Value::Null)
                })
                .collect())
        }
        other => Err(AdapterError::invalid_argument(format!(
            "wire rows must be arrays or record nodes, got {other}"
        ))),
    }
}

fn field_of(schema: &[Value], name: &str) -> Result<Field> {
    let descriptor = schema_position(schema, name)
        .map(|i| &schema[i])
        .ok_or_else(|| AdapterError::reference(format!("field '{name}' does not exist")))?;
    descriptor_to_field(descriptor)
}

/// Table view over a wire-format record set.
#[derive(Debug)]
pub struct SbisTable {
    data: Shared<Value>,
    controller: Rc<FormatController>,
    config: AdapterConfig,
}

impl SbisTable {
    /// Controller resolving schema links for this table's payload.
    pub fn controller(&self) -> &FormatController {
        &self.controller
    }

    fn schema(&self) -> Result<Schema> {
        Ok(node_schema(&self.data, &self.controller)?.unwrap_or_default())
    }

    fn editable_schema(&self) -> Result<Schema> {
        self.detach();
        let schema = self.schema()?;
        materialize_schema(&self.data, schema.clone());
        Ok(schema)
    }

    fn detach(&self) {
        detach_node(&self.data, &self.controller);
    }

    fn set_schema(&self, schema: Schema) {
        materialize_schema(&self.data, schema);
    }

    fn with_rows<R>(&self, f: impl FnOnce(&[Value]) -> R) -> R {
        let data = self.data.borrow();
        match data.get(DATA_KEY).and_then(Value::as_array) {
            Some(rows) => f(rows),
            None => f(&[]),
        }
    }

    fn with_rows_mut<R>(&self, f: impl FnOnce(&mut Vec<Value>) -> R) -> R {
        let mut data = self.data.borrow_mut();
        if !data.is_object() {
            *data = empty_node();
        }
        let mut rows = match data.get_mut(DATA_KEY).map(Value::take) {
            Some(Value::Array(rows)) => rows,
            _ => Vec::new(),
        };
        let out = f(&mut rows);
        if let Some(map) = data.as_object_mut() {
            map.insert(DATA_KEY.to_string(), Value::Array(rows));
        }
        out
    }

    fn record_node(&self, row: Value) -> Value {
        let schema = self.schema().unwrap_or_else(|err| {
            warn!("sbis table: unresolved schema: {err}");
            Vec::new()
        });
        json!({ DATA_KEY: row, SCHEMA_KEY: schema })
    }
}

impl DataHolder for SbisTable {
    type Data = Value;

    fn data(&self) -> &Shared<Value> {
        &self.data
    }

    fn rebind(&self, data: Shared<Value>) -> Self {
        Self {
            controller: Rc::new(FormatController::new(data.clone())),
            data,
            config: self.config.clone(),
        }
    }

    fn as_cloneable(&self) -> Option<&dyn Cloneable<Value>> {
        Some(self)
    }
}

/// A copy of a table is self-contained: every link it carries, including its own
/// schema link, is inlined.
impl Cloneable<Value> for SbisTable {
    fn clone_data(&self) -> Value {
        let mut copy = self.data.snapshot();
        detach_links(&mut copy, &self.controller);
        copy
    }
}

impl TableAdapter for SbisTable {
    type Row = Value;

    fn fields(&self) -> Vec<String> {
        match self.schema() {
            Ok(schema) => schema_names(&schema),
            Err(err) => {
                warn!("sbis table: unresolved schema: {err}");
                Vec::new()
            }
        }
    }

    fn count(&self) -> usize {
        self.with_rows(<[Value]>::len)
    }

    fn at(&self, index: usize) -> Option<Value> {
        let row = self.with_rows(|rows| rows.get(index).cloned())?;
        Some(self.record_node(row))
    }

    fn add(&mut self, row: Value, at: Option<usize>) -> Result<()> {
        let len = self.count();
        let at = at.unwrap_or(len);
        check_insert_position(at, len)?;
        self.detach();

        let mut schema = self.schema()?;
        let adopted = match row.as_object().and_then(inline_schema) {
            Some(row_schema) if schema.is_empty() && len == 0 => Some(row_schema.clone()),
            _ => None,
        };
        if let Some(row_schema) = &adopted {
            schema = row_schema.clone();
        }
        let values = detached_values(row_values(row, &schema, &self.controller)?, &self.controller);
        if let Some(row_schema) = adopted {
            self.set_schema(row_schema);
        }
        self.with_rows_mut(|rows| rows.insert(at, values));
        Ok(())
    }

    fn remove(&mut self, at: usize) -> Result<()> {
        check_position(at, self.count())?;
        self.detach();
        self.with_rows_mut(|rows| {
            rows.remove(at);
        });
        Ok(())
    }

    fn replace(&mut self, row: Value, at: usize) -> Result<()> {
        check_position(at, self.count())?;
        self.detach();
        let schema = self.schema()?;
        let values = detached_values(row_values(row, &schema, &self.controller)?, &self.controller);
        self.with_rows_mut(|rows| rows[at] = values);
        Ok(())
    }

    fn move_row(&mut self, from: usize, to: usize) -> Result<()> {
        self.detach();
        self.with_rows_mut(|rows| move_item(rows, from, to))
    }

    fn merge(&mut self, target: usize, source: usize, key_field: &str) -> Result<()> {
        self.detach();
        let key = schema_position(&self.schema()?, key_field);
        self.with_rows_mut(|rows| {
            check_position(target, rows.len())?;
            check_position(source, rows.len())?;
            if target == source {
                return Ok(());
            }
            let donor = rows[source].as_array().cloned().unwrap_or_default();
            if let Some(acceptor) = rows[target].as_array_mut() {
                for (i, value) in donor.into_iter().enumerate() {
                    if Some(i) == key {
                        continue;
                    }
                    if i < acceptor.len() {
                        acceptor[i] = value;
                    } else {
                        acceptor.push(value);
                    }
                }
            }
            rows.remove(source);
            Ok(())
        })
    }

    fn copy(&mut self, at: usize) -> Result<Value> {
        self.detach();
        let row = self.with_rows_mut(|rows| {
            check_position(at, rows.len())?;
            let clone = rows[at].clone();
            rows.insert(at + 1, clone.clone());
            Ok::<_, AdapterError>(clone)
        })?;
        Ok(self.record_node(row))
    }

    fn clear(&mut self) {
        self.detach();
        self.with_rows_mut(Vec::clear);
    }

    fn format(&self, name: &str) -> Result<Field> {
        field_of(&self.schema()?, name)
    }

    fn add_field(&mut self, field: Field, at: Option<usize>) -> Result<()> {
        let mut schema = self.editable_schema()?;
        let default = field.default_value().clone();
        let position = match schema_position(&schema, field.name()) {
            Some(existing) => existing,
            None => {
                let at = at.unwrap_or(schema.len());
                check_insert_position(at, schema.len())?;
                schema.insert(at, field_to_descriptor(&field));
                self.set_schema(schema);
                self.with_rows_mut(|rows| {
                    for row in rows.iter_mut() {
                        if let Some(values) = row.as_array_mut()
                            && values.len() >= at
                        {
                            values.insert(at, default.clone());
                        }
                    }
                });
                at
            }
        };
        self.with_rows_mut(|rows| {
            for row in rows.iter_mut() {
                if let Some(values) = row.as_array_mut() {
                    while values.len() < position {
                        values.push(Value::Null);
                    }
                    if values.len() == position {
                        values.push(default.clone());
                    }
                }
            }
        });
        Ok(())
    }

    fn remove_field(&mut self, name: &str) -> Result<()> {
        let schema = self.schema()?;
        let index = schema_position(&schema, name)
            .ok_or_else(|| AdapterError::reference(format!("field '{name}' does not exist")))?;
        self.remove_field_at(index)
    }

    fn remove_field_at(&mut self, index: usize) -> Result<()> {
        let mut schema = self.editable_schema()?;
        check_position(index, schema.len())?;
        schema.remove(index);
        self.set_schema(schema);
        self.with_rows_mut(|rows| {
            for row in rows.iter_mut() {
                if let Some(values) = row.as_array_mut()
                    && index < values.len()
                {
                    values.remove(index);
                }
            }
        });
        Ok(())
    }
}

/// Record view over a wire-format record.
#[derive(Debug)]
pub struct SbisRecord {
    data: Shared<Value>,
    table: Option<Shared<Value>>,
    controller: Rc<FormatController>,
}

impl SbisRecord {
    /// Controller resolving schema links for this record's payload.
    pub fn controller(&self) -> &FormatController {
        &self.controller
    }

    fn schema(&self) -> Result<Schema> {
        if let Some(schema) = node_schema(&self.data, &self.controller)? {
            return Ok(schema);
        }
        match &self.table {
            Some(table) => Ok(node_schema(table, &self.controller)?.unwrap_or_default()),
            None => Ok(Vec::new()),
        }
    }

    fn schema_or_empty(&self) -> Schema {
        self.schema().unwrap_or_else(|err| {
            warn!("sbis record: unresolved schema: {err}");
            Vec::new()
        })
    }

    fn editable_schema(&self) -> Result<Schema> {
        self.detach();
        let schema = self.schema()?;
        materialize_schema(&self.data, schema.clone());
        Ok(schema)
    }

    fn detach(&self) {
        detach_node(&self.data, &self.controller);
    }

    fn with_values_mut<R>(&self, f: impl FnOnce(&mut Vec<Value>) -> R) -> R {
        let mut data = self.data.borrow_mut();
        if !data.is_object() {
            *data = empty_node();
        }
        let mut values = match data.get_mut(DATA_KEY).map(Value::take) {
            Some(Value::Array(values)) => values,
            _ => Vec::new(),
        };
        let out = f(&mut values);
        if let Some(map) = data.as_object_mut() {
            map.insert(DATA_KEY.to_string(), Value::Array(values));
        }
        out
    }

    /// Nested record values come back with their schema inlined.
    fn resolve_nested(&self, mut value: Value, ty: &FieldType) -> Value {
        if matches!(ty, FieldType::Record | FieldType::RecordSet)
            && let Some(map) = value.as_object_mut()
            && inline_schema(map).is_none()
            && let Some(index) = schema_index(map)
        {
            match self.controller.get_format(Some(index)) {
                Ok(schema) => {
                    map.insert(SCHEMA_KEY.to_string(), Value::Array(schema));
                    map.shift_remove(FORMAT_KEY);
                }
                Err(err) => warn!("sbis record: nested link {index}: {err}"),
            }
        }
        value
    }
}

impl DataHolder for SbisRecord {
    type Data = Value;

    fn data(&self) -> &Shared<Value> {
        &self.data
    }

    fn rebind(&self, data: Shared<Value>) -> Self {
        let root = self.table.clone().unwrap_or_else(|| data.clone());
        Self {
            data,
            table: self.table.clone(),
            controller: Rc::new(FormatController::new(root)),
        }
    }

    fn as_cloneable(&self) -> Option<&dyn Cloneable<Value>> {
        Some(self)
    }
}

/// A copy of a record carries its schema inline even when the original borrowed it
/// from its table or linked to it.
impl Cloneable<Value> for SbisRecord {
    fn clone_data(&self) -> Value {
        let schema = self.schema_or_empty();
        let mut copy = self.data.snapshot();
        if let Some(map) = copy.as_object_mut()
            && inline_schema(map).is_none()
        {
            map.insert(SCHEMA_KEY.to_string(), Value::Array(schema));
            map.shift_remove(FORMAT_KEY);
        }
        detach_links(&mut copy, &self.controller);
        copy
    }
}

impl RecordAdapter for SbisRecord {
    fn fields(&self) -> Vec<String> {
        schema_names(&self.schema_or_empty())
    }

    fn has(&self, name: &str) -> bool {
        schema_position(&self.schema_or_empty(), name).is_some()
    }

    fn get(&self, name: &str) -> Option<Value> {
        if name.is_empty() {
            return None;
        }
        let schema = self.schema_or_empty();
        let index = schema_position(&schema, name)?;
        let value = self
            .data
            .borrow()
            .get(DATA_KEY)
            .and_then(|d| d.get(index))
            .cloned()?;
        match descriptor_to_field(&schema[index]) {
            Ok(field) => Some(self.resolve_nested(value, field.field_type())),
            Err(_) => Some(value),
        }
    }

    fn set(&mut self, name: &str, mut value: Value) -> Result<()> {
        if name.is_empty() {
            return Err(AdapterError::reference("field name must not be empty"));
        }
        let index = schema_position(&self.schema()?, name)
            .ok_or_else(|| AdapterError::reference(format!("field '{name}' does not exist")))?;
        detach_links(&mut value, &self.controller);
        self.detach();
        self.with_values_mut(|values| {
            while values.len() <= index {
                values.push(Value::Null);
            }
            values[index] = value;
        });
        Ok(())
    }

    fn clear(&mut self) {
        let mut data = self.data.borrow_mut();
        let mut map = Map::new();
        map.insert(DATA_KEY.to_string(), Value::Array(Vec::new()));
        map.insert(SCHEMA_KEY.to_string(), Value::Array(Vec::new()));
        *data = Value::Object(map);
    }

    fn format(&self, name: &str) -> Result<Field> {
        field_of(&self.schema()?, name)
    }

    fn add_field(&mut self, field: Field, at: Option<usize>) -> Result<()> {
        let mut schema = self.editable_schema()?;
        let default = field.default_value().clone();
        let position = match schema_position(&schema, field.name()) {
            Some(existing) => existing,
            None => {
                let at = at.unwrap_or(schema.len());
                check_insert_position(at, schema.len())?;
                schema.insert(at, field_to_descriptor(&field));
                materialize_schema(&self.data, schema);
                self.with_values_mut(|values| {
                    if values.len() >= at {
                        values.insert(at, default.clone());
                    }
                });
                at
            }
        };
        self.with_values_mut(|values| {
            while values.len() < position {
                values.push(Value::Null);
            }
            if values.len() == position {
                values.push(default);
            }
        });
        Ok(())
    }

    fn remove_field(&mut self, name: &str) -> Result<()> {
        let index = schema_position(&self.schema()?, name)
            .ok_or_else(|| AdapterError::reference(format!("field '{name}' does not exist")))?;
        self.remove_field_at(index)
    }

    fn remove_field_at(&mut self, index: usize) -> Result<()> {
        let mut schema = self.editable_schema()?;
        check_position(index, schema.len())?;
        schema.remove(index);
        materialize_schema(&self.data, schema);
        self.with_values_mut(|values| {
            if index < values.len() {
                values.remove(index);
            }
        });
        Ok(())
    }
}
