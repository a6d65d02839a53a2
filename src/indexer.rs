//! Secondary index: property value → row positions.
//!
//! An [`Indexer`] does not own the rows it indexes. It reads them through three
//! accessors supplied at construction (row count, row at position, property of a
//! row), so it works over any collection representation.
//!
//! The index for a property is built with one linear scan the first time that
//! property is queried and is then kept up to date incrementally: after the caller
//! mutates the underlying collection, it reports the change with
//! [`update_index`](Indexer::update_index), [`shift_index`](Indexer::shift_index)
//! or [`remove_from_index`](Indexer::remove_from_index). [`reset_index`](Indexer::reset_index)
//! drops everything and the next query rebuilds from scratch.
//!
//! Values are keyed by their canonical serialization, so arrays and objects match
//! by content and `1.0` matches `1`. A row without the property is indexed under
//! `null`.
//!
//! ```
//! use record_adapters::indexer::Indexer;
//! use record_adapters::shared::Shared;
//! use serde_json::json;
//!
//! let rows = Shared::new(json!([
//!     {"id": 1, "name": "A"},
//!     {"id": 2, "name": "B"},
//!     {"id": 1, "name": "C"},
//! ]));
//! let mut index = Indexer::for_json_rows(rows.clone());
//! assert_eq!(index.get_indices_by_value("id", &json!(1)), vec![0, 2]);
//!
//! rows.borrow_mut().as_array_mut().unwrap().remove(0);
//! index.remove_from_index(0, 1);
//! assert_eq!(index.get_indices_by_value("id", &json!(1)), vec![1]);
//! ```

use crate::canonical::canonical_string;
use crate::model::{Record, RecordSet};
use crate::shared::Shared;
use log::{debug, trace};
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};
use std::fmt;

type Positions = BTreeSet<usize>;
type ValueIndex = HashMap<String, Positions>;

/// Secondary index over an externally owned collection of `T`.
pub struct Indexer<T> {
    count: Box<dyn Fn() -> usize>,
    item_at: Box<dyn Fn(usize) -> Option<T>>,
    property_of: Box<dyn Fn(&T, &str) -> Option<Value>>,
    indices: HashMap<String, ValueIndex>,
}

impl<T> Indexer<T> {
    pub fn new(
        count: impl Fn() -> usize + 'static,
        item_at: impl Fn(usize) -> Option<T> + 'static,
        property_of: impl Fn(&T, &str) -> Option<Value> + 'static,
    ) -> Self {
        Self {
            count: Box::new(count),
            item_at: Box::new(item_at),
            property_of: Box::new(property_of),
            indices: HashMap::new(),
        }
    }

    /// First position whose `property` equals `value`.
    ///
    /// An empty property name never matches and does not trigger an index build.
    pub fn get_index_by_value(&mut self, property: &str, value: &Value) -> Option<usize> {
        if property.is_empty() {
            return None;
        }
        let key = canonical_string(value);
        self.index_for(property)
            .get(&key)
            .and_then(|positions| positions.first().copied())
    }

    /// Every position whose `property` equals `value`, ascending.
    pub fn get_indices_by_value(&mut self, property: &str, value: &Value) -> Vec<usize> {
        if property.is_empty() {
            return Vec::new();
        }
        let key = canonical_string(value);
        self.index_for(property)
            .get(&key)
            .map(|positions| positions.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Properties whose index is currently built.
    pub fn indexed_properties(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.indices.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Drop every built index.
    pub fn reset_index(&mut self) {
        self.indices.clear();
    }

    /// Re-read the `count` rows starting at `at` after their values changed in place.
    pub fn update_index(&mut self, at: usize, count: usize) {
        if count == 0 || self.indices.is_empty() {
            return;
        }
        let end = at.saturating_add(count);
        trace!("indexer: update rows {at}..{end}");
        let range = at..end;
        for index in self.indices.values_mut() {
            retain_positions(index, |p| !range.contains(&p));
        }
        let properties: Vec<String> = self.indices.keys().cloned().collect();
        for position in at..end.min((self.count)()) {
            let Some(item) = (self.item_at)(position) else {
                continue;
            };
            for property in &properties {
                let key = self.key_of(&item, property);
                if let Some(index) = self.indices.get_mut(property) {
                    index.entry(key).or_default().insert(position);
                }
            }
        }
    }

    /// Renumber positions in `at..at + count` by `offset`.
    ///
    /// Positions that would fall below zero are dropped.
    pub fn shift_index(&mut self, at: usize, count: usize, offset: isize) {
        if count == 0 || offset == 0 {
            return;
        }
        let end = at.saturating_add(count);
        trace!("indexer: shift rows {at}..{end} by {offset}");
        let range = at..end;
        for index in self.indices.values_mut() {
            for positions in index.values_mut() {
                let moved: Vec<usize> = positions.range(range.clone()).copied().collect();
                for position in &moved {
                    positions.remove(position);
                }
                positions.extend(moved.into_iter().filter_map(|p| p.checked_add_signed(offset)));
            }
            index.retain(|_, positions| !positions.is_empty());
        }
    }

    /// Forget the `count` rows starting at `at` and close the gap they leave.
    pub fn remove_from_index(&mut self, at: usize, count: usize) {
        if count == 0 {
            return;
        }
        let end = at.saturating_add(count);
        trace!("indexer: remove rows {at}..{end}");
        for index in self.indices.values_mut() {
            for positions in index.values_mut() {
                *positions = positions
                    .iter()
                    .filter_map(|&p| match p {
                        p if p < at => Some(p),
                        p if p < end => None,
                        p => Some(p - count),
                    })
                    .collect();
            }
            index.retain(|_, positions| !positions.is_empty());
        }
    }

    fn key_of(&self, item: &T, property: &str) -> String {
        let value = (self.property_of)(item, property).unwrap_or(Value::Null);
        canonical_string(&value)
    }

    fn index_for(&mut self, property: &str) -> &ValueIndex {
        if !self.indices.contains_key(property) {
            let index = self.build(property);
            self.indices.insert(property.to_string(), index);
        }
        &self.indices[property]
    }

    fn build(&self, property: &str) -> ValueIndex {
        let count = (self.count)();
        debug!("indexer: building index for '{property}' over {count} row(s)");
        let mut index = ValueIndex::new();
        for position in 0..count {
            if let Some(item) = (self.item_at)(position) {
                index
                    .entry(self.key_of(&item, property))
                    .or_default()
                    .insert(position);
            }
        }
        index
    }
}

fn retain_positions(index: &mut ValueIndex, keep: impl Fn(usize) -> bool) {
    for positions in index.values_mut() {
        positions.retain(|&p| keep(p));
    }
    index.retain(|_, positions| !positions.is_empty());
}

impl Indexer<Value> {
    /// Index the objects of a JSON array by their top-level keys.
    pub fn for_json_rows(rows: Shared<Value>) -> Self {
        let counted = rows.clone();
        Self::new(
            move || counted.borrow().as_array().map_or(0, Vec::len),
            move |at| rows.borrow().get(at).cloned(),
            |row, property| row.get(property).cloned(),
        )
    }
}

impl Indexer<Record> {
    /// Index the records of a [`RecordSet`] by field value.
    pub fn for_record_set(set: Shared<RecordSet>) -> Self {
        let counted = set.clone();
        Self::new(
            move || counted.borrow().len(),
            move |at| set.borrow().at(at).cloned(),
            |record, property| record.get(property).cloned(),
        )
    }
}

impl<T> fmt::Debug for Indexer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Indexer")
            .field("indexed_properties", &self.indexed_properties())
            .finish_non_exhaustive()
    }
}
