//! Helpers for testing code built on the adapters.
//!
//! - **Assertions**: [`assert_index_consistent`] checks an [`Indexer`](crate::indexer::Indexer)
//!   against [`linear_scan`]; [`assert_same_schema`] compares wire schemas by
//!   structural identity; [`assert_fully_inlined`] checks that no wire node is
//!   left linking to a schema index.
//! - **Fixtures**: small payloads in each representation ([`sample_json_rows`],
//!   [`sample_sbis_table`], [`sample_record_set`]).
//!
//! ```
//! use record_adapters::indexer::Indexer;
//! use record_adapters::shared::Shared;
//! use record_adapters::testing::*;
//!
//! let rows = Shared::new(sample_json_rows());
//! let mut index = Indexer::for_json_rows(rows.clone());
//! let snapshot = rows.snapshot();
//! assert_index_consistent(&mut index, snapshot.as_array().unwrap(), "id");
//! ```

pub mod assertions;
pub mod fixtures;

pub use assertions::*;
pub use fixtures::*;
