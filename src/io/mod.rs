//! File I/O for payloads.
//!
//! - [`read_payload`] / [`write_payload`]: a single JSON document, usually a wire
//!   table, optionally normalized on the way out.
//! - [`read_table`]: a wire table ready for [`SbisAdapter`](crate::adapter::sbis::SbisAdapter),
//!   with every schema inlined.
//! - [`jsonl`]: JSON Lines files as the row array of a plain JSON table.
//!
//! Gzip is handled transparently by [`compression`].

pub mod compression;
pub mod jsonl;
mod payload;

pub use jsonl::{read_json_rows, write_json_rows};
pub use payload::{WriteOptions, read_payload, read_table, write_payload};
