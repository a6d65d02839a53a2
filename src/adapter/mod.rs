//! Capability traits every raw representation implements, plus the three
//! adapter families.
//!
//! - [`Adapter`] is the facade: it builds table and record views over raw data and
//!   answers schema-free questions (key field, dotted-path properties, serialization).
//! - [`TableAdapter`] / [`RecordAdapter`] are the uniform row/table operation sets.
//! - [`DataHolder`] exposes the shared raw container a view works on, and
//!   [`Cloneable`] is the optional capability a view offers to copy its own data.
//!
//! Families: [`json`] (plain arrays/objects), [`sbis`] (the wire format) and
//! [`recordset`] (the in-memory [`RecordSet`](crate::model::RecordSet)).

pub mod json;
mod path;
pub mod recordset;
pub mod sbis;

pub use path::{get_property, set_property};

use crate::error::{Result, check_position};
use crate::format::Field;
use crate::shared::Shared;
use serde_json::Value;

/// Capability: produce a private copy of the raw data the adapter's own way.
pub trait Cloneable<D> {
    fn clone_data(&self) -> D;
}

/// Access to the raw container behind a view.
pub trait DataHolder: Sized {
    type Data: Clone;

    /// The container this view reads and writes.
    fn data(&self) -> &Shared<Self::Data>;

    /// A view of the same kind and configuration over another container.
    fn rebind(&self, data: Shared<Self::Data>) -> Self;

    /// The [`Cloneable`] capability, when this view has one.
    fn as_cloneable(&self) -> Option<&dyn Cloneable<Self::Data>> {
        None
    }
}

/// Row/table operations over one raw representation.
pub trait TableAdapter: DataHolder {
    /// What a single row looks like to callers of this adapter.
    type Row;

    /// Declared column names.
    fn fields(&self) -> Vec<String>;

    fn count(&self) -> usize;

    /// Row at `index`; `None` when out of range.
    fn at(&self, index: usize) -> Option<Self::Row>;

    /// Insert `row` at `at`, appending when `None`.
    ///
    /// # Errors
    /// Range error when `at > count()`.
    fn add(&mut self, row: Self::Row, at: Option<usize>) -> Result<()>;

    /// # Errors
    /// Range error when `at >= count()`.
    fn remove(&mut self, at: usize) -> Result<()>;

    /// # Errors
    /// Range error when `at >= count()`.
    fn replace(&mut self, row: Self::Row, at: usize) -> Result<()>;

    /// Move a row, keeping the relative order of every other row.
    fn move_row(&mut self, from: usize, to: usize) -> Result<()>;

    /// Copy the values of row `source` into row `target` (the target keeps its
    /// `key_field` value), then remove `source`.
    fn merge(&mut self, target: usize, source: usize, key_field: &str) -> Result<()>;

    /// Duplicate row `at` right after itself and return the duplicate.
    fn copy(&mut self, at: usize) -> Result<Self::Row>;

    /// Remove every row, mutating the container in place.
    fn clear(&mut self);

    /// # Errors
    /// Reference error when no column is called `name`.
    fn format(&self, name: &str) -> Result<Field>;

    /// Add a column and back-fill its default into rows lacking it. An existing
    /// name is not duplicated.
    fn add_field(&mut self, field: Field, at: Option<usize>) -> Result<()>;

    fn remove_field(&mut self, name: &str) -> Result<()>;

    fn remove_field_at(&mut self, index: usize) -> Result<()>;
}

/// Single-row operations over one raw representation.
pub trait RecordAdapter: DataHolder {
    fn fields(&self) -> Vec<String>;

    fn has(&self, name: &str) -> bool;

    /// Value of `name`; `None` for absent or empty names.
    fn get(&self, name: &str) -> Option<Value>;

    /// # Errors
    /// Reference error for an empty name.
    fn set(&mut self, name: &str, value: Value) -> Result<()>;

    fn clear(&mut self);

    fn format(&self, name: &str) -> Result<Field>;

    fn add_field(&mut self, field: Field, at: Option<usize>) -> Result<()>;

    fn remove_field(&mut self, name: &str) -> Result<()>;

    fn remove_field_at(&mut self, index: usize) -> Result<()>;
}

/// Facade over one raw representation.
pub trait Adapter {
    type TableData: Clone + Default;
    type RecordData: Clone + Default;
    type Table: TableAdapter<Data = Self::TableData>;
    type Record: RecordAdapter<Data = Self::RecordData>;

    /// Table view over `data` (a fresh empty container when `None`). Never copies.
    fn for_table(&self, data: Option<Shared<Self::TableData>>) -> Self::Table;

    /// Record view over `data`; `table` is the table the record belongs to, if any.
    fn for_record(
        &self,
        data: Option<Shared<Self::RecordData>>,
        table: Option<Shared<Self::TableData>>,
    ) -> Self::Record;

    /// Name of the key field, if the representation defines one.
    fn key_field(&self, data: &Self::TableData) -> Option<String>;

    /// Dotted-path read; absent paths yield `None`.
    fn get_property(&self, data: &Self::TableData, path: &str) -> Option<Value>;

    /// Dotted-path write, creating intermediate objects.
    fn set_property(&self, data: &mut Self::TableData, path: &str, value: Value) -> Result<()>;

    /// Round-trippable textual form.
    fn serialize(&self, data: &Self::TableData) -> Result<String>;
}

/// Move `items[from]` to position `to`.
pub(crate) fn move_item<T>(items: &mut Vec<T>, from: usize, to: usize) -> Result<()> {
    check_position(from, items.len())?;
    check_position(to, items.len())?;
    if from != to {
        let item = items.remove(from);
        items.insert(to, item);
    }
    Ok(())
}

pub(crate) fn to_json_string(value: &impl serde::Serialize, pretty: bool) -> Result<String> {
    let text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(text)
}
