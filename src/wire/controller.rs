//! Per-payload schema cache.

use super::walk::visit_nodes;
use super::{Schema, inline_schema, schema_index};
use crate::error::{AdapterError, Result};
use crate::shared::Shared;
use log::debug;
use serde_json::Value;
use std::cell::RefCell;
use std::collections::BTreeMap;

/// Resolves schema indices of one payload to their inlined schemas.
///
/// A controller is bound to exactly one payload (usually the root of a table or
/// record tree) and is shared by every adapter created over that payload. The
/// cache fills lazily: a miss triggers a full scan of the payload.
#[derive(Debug)]
pub struct FormatController {
    payload: Shared<Value>,
    cache: RefCell<BTreeMap<usize, Schema>>,
}

impl FormatController {
    pub fn new(payload: Shared<Value>) -> Self {
        Self {
            payload,
            cache: RefCell::new(BTreeMap::new()),
        }
    }

    /// The payload this controller resolves against.
    pub fn payload(&self) -> &Shared<Value> {
        &self.payload
    }

    /// Schema for `index`.
    ///
    /// # Errors
    /// Reference error when `index` is `None`, or when no node of the payload
    /// inlines a schema with that index.
    pub fn get_format(&self, index: Option<usize>) -> Result<Schema> {
        let index = index.ok_or_else(|| AdapterError::reference("schema index is required"))?;
        if let Some(schema) = self.cache.borrow().get(&index) {
            return Ok(schema.clone());
        }
        self.scan_formats();
        self.cache
            .borrow()
            .get(&index)
            .cloned()
            .ok_or_else(|| AdapterError::reference(format!("schema index {index} does not exist")))
    }

    /// Scan the whole payload and cache every inlined schema index found.
    ///
    /// Indices already cached are kept as they are, so repeated scans are
    /// idempotent.
    pub fn scan_formats(&self) {
        let payload = self.payload.borrow();
        let mut cache = self.cache.borrow_mut();
        let before = cache.len();
        visit_nodes(&payload, |node| {
            if let (Some(index), Some(schema)) = (schema_index(node), inline_schema(node)) {
                cache.entry(index).or_insert_with(|| schema.clone());
            }
        });
        debug!(
            "format controller: scan cached {} new schema(s), {} total",
            cache.len() - before,
            cache.len()
        );
    }

    /// Cached schema indices in ascending order.
    pub fn cached_indices(&self) -> Vec<usize> {
        self.cache.borrow().keys().copied().collect()
    }

    /// Forget every cached schema.
    pub fn reset(&self) {
        self.cache.borrow_mut().clear();
    }
}
