//! # Record Adapters
//!
//! One row/table model over several physical representations, with a compact
//! wire format that deduplicates repeated row schemas.
//!
//! ## Key Features
//!
//! - **Uniform table/record API** - [`TableAdapter`] and [`RecordAdapter`] behave the
//!   same over plain JSON, the SBIS wire format and in-memory [`RecordSet`]s
//! - **Schema deduplication** - [`normalize_formats`] stores each distinct schema once
//!   and links later occurrences; [`denormalize_formats`] inlines them again
//! - **Per-payload schema cache** - [`FormatController`] resolves links lazily
//! - **Copy-on-write views** - [`CowAdapter`] shares the raw container until the first
//!   write, then copies it exactly once
//! - **Secondary index** - [`Indexer`] answers "which rows have P = V" with incremental
//!   maintenance instead of rebuilds
//! - **Payload files** - JSON and JSON Lines, gzip-aware (feature `compression-gzip`)
//!
//! ## Quick Start
//!
//! ```
//! use record_adapters::*;
//! use serde_json::json;
//! # fn main() -> record_adapters::Result<()> {
//!
//! let raw = Shared::new(json!({
//!     "s": [{"n": "@id", "t": "Число целое"}, {"n": "name", "t": "Строка"}],
//!     "d": [[1, "A"], [2, "B"]],
//! }));
//!
//! let adapter = SbisAdapter::new();
//! let mut table = adapter.for_table(Some(raw.clone()));
//! table.add_field(Field::new("qty", FieldType::Integer)?, None)?;
//!
//! assert_eq!(table.fields(), vec!["@id", "name", "qty"]);
//! assert_eq!(adapter.key_field(&raw.borrow()), Some("@id".to_string()));
//! # Ok(())
//! # }
//! ```
//!
//! ## Core Concepts
//!
//! ### Raw data and views
//!
//! Raw data lives in a [`Shared`] container. An [`Adapter`] builds table and record
//! *views* over it without copying; every mutation through a view is visible to
//! every other holder of the container. Wrap the adapter in [`CowAdapter`] when a
//! view must not write through.
//!
//! ### Wire format
//!
//! A wire record is `{"d": [...], "s": [...]}`; a wire table is the same with `d`
//! holding rows. See [`wire`] for the link form and the type names.
//!
//! ### Formats
//!
//! A [`Format`] is an ordered, name-unique list of [`Field`]s. Fields can be built
//! directly or from a declarative [`FieldDeclaration`].
//!
//! ## Logging
//!
//! The crate logs through the [`log`] facade and never installs a logger.
//!
//! ## Feature Flags
//!
//! - `compression-gzip` (default) - transparent gzip in [`io`]

pub mod adapter;
pub mod canonical;
pub mod config;
pub mod cow;
pub mod error;
pub mod format;
pub mod indexer;
pub mod io;
pub mod model;
pub mod shared;
pub mod testing;
pub mod wire;

pub use adapter::json::{JsonAdapter, JsonRecord, JsonTable};
pub use adapter::recordset::{RecordSetAdapter, RecordSetRecord, RecordSetTable};
pub use adapter::sbis::{SbisAdapter, SbisRecord, SbisTable};
pub use adapter::{Adapter, Cloneable, DataHolder, RecordAdapter, TableAdapter};
pub use config::AdapterConfig;
pub use cow::{CowAdapter, CowRecord, CowTable};
pub use error::{AdapterError, ErrorKind, Result};
pub use format::{Field, FieldDeclaration, FieldType, Format};
pub use indexer::Indexer;
pub use model::{Record, RecordSet};
pub use shared::Shared;
pub use wire::{FormatController, denormalize_formats, format_hash, normalize_formats};
