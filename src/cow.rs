//! Copy-on-write wrappers.
//!
//! A wrapper starts out *shared*: every read goes to the wrapped adapter and
//! [`DataHolder::data`] is the original container itself. The first mutating call
//! makes a private copy of the container and rebinds a twin of the wrapped adapter
//! to it; that call and everything after it (reads included) work on the copy.
//! The original container is never written through a wrapper, and the copy is
//! made at most once per wrapper.
//!
//! The copy comes from the wrapped adapter's [`Cloneable`](crate::adapter::Cloneable)
//! capability when it has one, otherwise from `Clone` of the raw data.
//!
//! ```
//! use record_adapters::adapter::json::JsonAdapter;
//! use record_adapters::adapter::{Adapter, DataHolder, RecordAdapter};
//! use record_adapters::cow::CowAdapter;
//! use record_adapters::shared::Shared;
//! use serde_json::json;
//!
//! let raw = Shared::new(json!({"id": 1}));
//! let cow = CowAdapter::new(JsonAdapter::new());
//! let mut record = cow.for_record(Some(raw.clone()), None);
//! record.set("id", json!(2)).unwrap();
//!
//! assert_eq!(raw.snapshot(), json!({"id": 1}));
//! assert_eq!(record.get("id"), Some(json!(2)));
//! assert!(!Shared::ptr_eq(record.data(), &raw));
//! ```

use crate::adapter::{Adapter, Cloneable, DataHolder, RecordAdapter, TableAdapter};
use crate::error::Result;
use crate::format::Field;
use crate::shared::Shared;
use log::debug;
use serde_json::Value;

fn copy_data<H: DataHolder>(holder: &H) -> H::Data {
    match holder.as_cloneable() {
        Some(cloneable) => cloneable.clone_data(),
        None => holder.data().snapshot(),
    }
}

/// Facade whose table and record views are copy-on-write.
#[derive(Clone, Debug, Default)]
pub struct CowAdapter<A> {
    inner: A,
}

impl<A: Adapter> CowAdapter<A> {
    pub fn new(inner: A) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &A {
        &self.inner
    }
}

impl<A: Adapter> Adapter for CowAdapter<A> {
    type TableData = A::TableData;
    type RecordData = A::RecordData;
    type Table = CowTable<A::Table>;
    type Record = CowRecord<A::Record>;

    fn for_table(&self, data: Option<Shared<A::TableData>>) -> Self::Table {
        CowTable::new(self.inner.for_table(data))
    }

    fn for_record(
        &self,
        data: Option<Shared<A::RecordData>>,
        table: Option<Shared<A::TableData>>,
    ) -> Self::Record {
        CowRecord::new(self.inner.for_record(data, table))
    }

    fn key_field(&self, data: &A::TableData) -> Option<String> {
        self.inner.key_field(data)
    }

    fn get_property(&self, data: &A::TableData, path: &str) -> Option<Value> {
        self.inner.get_property(data, path)
    }

    fn set_property(&self, data: &mut A::TableData, path: &str, value: Value) -> Result<()> {
        self.inner.set_property(data, path, value)
    }

    fn serialize(&self, data: &A::TableData) -> Result<String> {
        self.inner.serialize(data)
    }
}

/// Copy-on-write table view.
#[derive(Debug)]
pub struct CowTable<T> {
    original: T,
    copy: Option<T>,
}

impl<T: TableAdapter> CowTable<T> {
    pub fn new(original: T) -> Self {
        Self {
            original,
            copy: None,
        }
    }

    /// The wrapped adapter, still bound to the untouched original container.
    pub fn original(&self) -> &T {
        &self.original
    }

    /// `true` once the first mutation produced the private copy.
    pub fn is_copied(&self) -> bool {
        self.copy.is_some()
    }

    fn active(&self) -> &T {
        self.copy.as_ref().unwrap_or(&self.original)
    }

    fn touch(&mut self) -> &mut T {
        let original = &self.original;
        self.copy.get_or_insert_with(|| {
            debug!("cow table: copying {} row(s) on first write", original.count());
            original.rebind(Shared::new(copy_data(original)))
        })
    }
}

impl<T: TableAdapter> DataHolder for CowTable<T> {
    type Data = T::Data;

    fn data(&self) -> &Shared<T::Data> {
        self.active().data()
    }

    fn rebind(&self, data: Shared<T::Data>) -> Self {
        Self::new(self.original.rebind(data))
    }

    fn as_cloneable(&self) -> Option<&dyn Cloneable<T::Data>> {
        self.active().as_cloneable()
    }
}

impl<T: TableAdapter> TableAdapter for CowTable<T> {
    type Row = T::Row;

    fn fields(&self) -> Vec<String> {
        self.active().fields()
    }

    fn count(&self) -> usize {
        self.active().count()
    }

    fn at(&self, index: usize) -> Option<T::Row> {
        self.active().at(index)
    }

    fn add(&mut self, row: T::Row, at: Option<usize>) -> Result<()> {
        self.touch().add(row, at)
    }

    fn remove(&mut self, at: usize) -> Result<()> {
        self.touch().remove(at)
    }

    fn replace(&mut self, row: T::Row, at: usize) -> Result<()> {
        self.touch().replace(row, at)
    }

    fn move_row(&mut self, from: usize, to: usize) -> Result<()> {
        self.touch().move_row(from, to)
    }

    fn merge(&mut self, target: usize, source: usize, key_field: &str) -> Result<()> {
        self.touch().merge(target, source, key_field)
    }

    fn copy(&mut self, at: usize) -> Result<T::Row> {
        self.touch().copy(at)
    }

    fn clear(&mut self) {
        self.touch().clear();
    }

    fn format(&self, name: &str) -> Result<Field> {
        self.active().format(name)
    }

    fn add_field(&mut self, field: Field, at: Option<usize>) -> Result<()> {
        self.touch().add_field(field, at)
    }

    fn remove_field(&mut self, name: &str) -> Result<()> {
        self.touch().remove_field(name)
    }

    fn remove_field_at(&mut self, index: usize) -> Result<()> {
        self.touch().remove_field_at(index)
    }
}

/// Copy-on-write record view.
#[derive(Debug)]
pub struct CowRecord<R> {
    original: R,
    copy: Option<R>,
}

impl<R: RecordAdapter> CowRecord<R> {
    pub fn new(original: R) -> Self {
        Self {
            original,
            copy: None,
        }
    }

    /// The wrapped adapter, still bound to the untouched original container.
    pub fn original(&self) -> &R {
        &self.original
    }

    pub fn is_copied(&self) -> bool {
        self.copy.is_some()
    }

    fn active(&self) -> &R {
        self.copy.as_ref().unwrap_or(&self.original)
    }

    fn touch(&mut self) -> &mut R {
        let original = &self.original;
        self.copy.get_or_insert_with(|| {
            debug!("cow record: copying on first write");
            original.rebind(Shared::new(copy_data(original)))
        })
    }
}

impl<R: RecordAdapter> DataHolder for CowRecord<R> {
    type Data = R::Data;

    fn data(&self) -> &Shared<R::Data> {
        self.active().data()
    }

    fn rebind(&self, data: Shared<R::Data>) -> Self {
        Self::new(self.original.rebind(data))
    }

    fn as_cloneable(&self) -> Option<&dyn Cloneable<R::Data>> {
        self.active().as_cloneable()
    }
}

impl<R: RecordAdapter> RecordAdapter for CowRecord<R> {
    fn fields(&self) -> Vec<String> {
        self.active().fields()
    }

    fn has(&self, name: &str) -> bool {
        self.active().has(name)
    }

    fn get(&self, name: &str) -> Option<Value> {
        self.active().get(name)
    }

    fn set(&mut self, name: &str, value: Value) -> Result<()> {
        self.touch().set(name, value)
    }

    fn clear(&mut self) {
        self.touch().clear();
    }

    fn format(&self, name: &str) -> Result<Field> {
        self.active().format(name)
    }

    fn add_field(&mut self, field: Field, at: Option<usize>) -> Result<()> {
        self.touch().add_field(field, at)
    }

    fn remove_field(&mut self, name: &str) -> Result<()> {
        self.touch().remove_field(name)
    }

    fn remove_field_at(&mut self, index: usize) -> Result<()> {
        self.touch().remove_field_at(index)
    }
}
