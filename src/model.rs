//! In-memory record collection: [`Record`] and [`RecordSet`].
//!
//! A record is an explicit ordered map from field name to value paired with the
//! [`Format`] that declares those names. A record set is a format, its rows, an
//! optional key field and a free-form metadata object.

use crate::error::{AdapterError, Result, check_position};
use crate::format::{Field, Format};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One row with its own format.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Record {
    format: Format,
    values: Map<String, Value>,
}

impl Record {
    /// Create a record with every field set to its default value.
    pub fn new(format: Format) -> Self {
        let values = format
            .iter()
            .map(|f| (f.name().to_string(), f.default_value().clone()))
            .collect();
        Self { format, values }
    }

    /// Create a record from explicit values. Fields without a value take their default.
    ///
    /// # Errors
    /// Reference error if `values` names a field `format` does not declare.
    pub fn from_values(format: Format, mut values: Map<String, Value>) -> Result<Self> {
        if let Some(unknown) = values.keys().find(|k| format.index_of(k).is_none()) {
            return Err(AdapterError::reference(format!(
                "field '{unknown}' is not declared by the record format"
            )));
        }
        let values = format
            .iter()
            .map(|f| {
                let value = values
                    .remove(f.name())
                    .unwrap_or_else(|| f.default_value().clone());
                (f.name().to_string(), value)
            })
            .collect();
        Ok(Self { format, values })
    }

    pub fn format(&self) -> &Format {
        &self.format
    }

    pub fn fields(&self) -> Vec<String> {
        self.format.names()
    }

    pub fn has(&self, name: &str) -> bool {
        self.format.index_of(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// # Errors
    /// Reference error for an empty or undeclared name.
    pub fn set(&mut self, name: &str, value: Value) -> Result<()> {
        if name.is_empty() {
            return Err(AdapterError::reference("field name must not be empty"));
        }
        if !self.has(name) {
            return Err(AdapterError::reference(format!("field '{name}' does not exist")));
        }
        self.values.insert(name.to_string(), value);
        Ok(())
    }

    /// Add a column. An existing name only back-fills a missing value.
    pub fn add_field(&mut self, field: Field, at: Option<usize>) -> Result<()> {
        let name = field.name().to_string();
        let default = field.default_value().clone();
        if !self.has(&name) {
            self.format.add(field, at)?;
        }
        self.values.entry(name).or_insert(default);
        Ok(())
    }

    pub fn remove_field(&mut self, name: &str) -> Result<Field> {
        let field = self.format.remove(name)?;
        self.values.shift_remove(name);
        Ok(field)
    }

    pub fn remove_field_at(&mut self, at: usize) -> Result<Field> {
        let field = self.format.remove_at(at)?;
        self.values.shift_remove(field.name());
        Ok(field)
    }

    /// Drop every field and value.
    pub fn clear(&mut self) {
        self.format.clear();
        self.values.clear();
    }

    /// Values as a JSON object in format order.
    pub fn to_object(&self) -> Map<String, Value> {
        self.format
            .iter()
            .map(|f| {
                let value = self.values.get(f.name()).cloned().unwrap_or(Value::Null);
                (f.name().to_string(), value)
            })
            .collect()
    }
}

/// Ordered collection of records sharing one format.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(into = "RecordSetRepr", try_from = "RecordSetRepr")]
pub struct RecordSet {
    format: Format,
    records: Vec<Record>,
    key_field: Option<String>,
    metadata: Map<String, Value>,
}

impl RecordSet {
    pub fn new(format: Format) -> Self {
        Self {
            format,
            ..Self::default()
        }
    }

    /// Build a record set from JSON objects, one per row.
    pub fn from_rows(format: Format, rows: Vec<Map<String, Value>>) -> Result<Self> {
        let records = rows
            .into_iter()
            .map(|row| Record::from_values(format.clone(), row))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            format,
            records,
            ..Self::default()
        })
    }

    pub fn with_key_field(mut self, key_field: impl Into<String>) -> Self {
        self.key_field = Some(key_field.into());
        self
    }

    pub fn format(&self) -> &Format {
        &self.format
    }

    pub fn key_field(&self) -> Option<&str> {
        self.key_field.as_deref()
    }

    pub fn set_key_field(&mut self, key_field: Option<String>) {
        self.key_field = key_field;
    }

    pub fn metadata(&self) -> &Map<String, Value> {
        &self.metadata
    }

    pub fn metadata_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.metadata
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn at(&self, index: usize) -> Option<&Record> {
        self.records.get(index)
    }

    pub(crate) fn records_mut(&mut self) -> &mut Vec<Record> {
        &mut self.records
    }

    pub(crate) fn format_mut(&mut self) -> &mut Format {
        &mut self.format
    }

    /// Copy `record` onto this set's format. Names the set does not declare are
    /// dropped; names the record lacks take the field default.
    pub fn align(&self, record: &Record) -> Record {
        let values = self
            .format
            .iter()
            .map(|f| {
                let value = record
                    .get(f.name())
                    .cloned()
                    .unwrap_or_else(|| f.default_value().clone());
                (f.name().to_string(), value)
            })
            .collect();
        Record {
            format: self.format.clone(),
            values,
        }
    }

    /// Append a record, re-aligned to the set format.
    pub fn push(&mut self, record: &Record) {
        let aligned = self.align(record);
        self.records.push(aligned);
    }

    /// Set one value of one row.
    pub fn set_value(&mut self, at: usize, name: &str, value: Value) -> Result<()> {
        check_position(at, self.records.len())?;
        self.records[at].set(name, value)
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecordSetRepr {
    format: Format,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    key_field: Option<String>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    metadata: Map<String, Value>,
    rows: Vec<Map<String, Value>>,
}

impl From<RecordSet> for RecordSetRepr {
    fn from(set: RecordSet) -> Self {
        Self {
            rows: set.records.iter().map(Record::to_object).collect(),
            format: set.format,
            key_field: set.key_field,
            metadata: set.metadata,
        }
    }
}

impl TryFrom<RecordSetRepr> for RecordSet {
    type Error = AdapterError;

    fn try_from(repr: RecordSetRepr) -> Result<Self> {
        let mut set = RecordSet::from_rows(repr.format, repr.rows)?;
        set.key_field = repr.key_field;
        set.metadata = repr.metadata;
        Ok(set)
    }
}
