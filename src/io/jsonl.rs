//! JSON Lines files as plain JSON tables.
//!
//! One object per line on disk; in memory, the array of rows that
//! [`JsonAdapter`](crate::adapter::json::JsonAdapter) tables are bound to.

use super::compression::{auto_detect_reader, auto_detect_writer};
use crate::shared::Shared;
use anyhow::{Context, Result, bail};
use serde_json::Value;
use std::fs::{File, create_dir_all};
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

/// Read a JSONL file into a shared row array. Blank lines are skipped.
///
/// # Errors
/// Fails when the file cannot be read or a line is not a JSON object.
pub fn read_json_rows(path: impl AsRef<Path>) -> Result<Shared<Value>> {
    let path = path.as_ref();
    let f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let rdr = auto_detect_reader(f, path)
        .with_context(|| format!("setup decompression for {}", path.display()))?;
    let mut rows = Vec::new();
    for (i, line) in BufReader::new(rdr).lines().enumerate() {
        let line = line.with_context(|| format!("read line {} in {}", i + 1, path.display()))?;
        if line.trim().is_empty() {
            continue;
        }
        let row: Value = serde_json::from_str(&line)
            .with_context(|| format!("parse JSONL line {} in {}", i + 1, path.display()))?;
        if !row.is_object() {
            bail!("line {} in {} is not a JSON object", i + 1, path.display());
        }
        rows.push(row);
    }
    Ok(Shared::new(Value::Array(rows)))
}

/// Write the rows of a JSON table, one compact object per line.
///
/// # Returns
/// The number of rows written.
///
/// # Errors
/// Fails when `rows` is not an array or the file cannot be written.
pub fn write_json_rows(path: impl AsRef<Path>, rows: &Value) -> Result<usize> {
    let path = path.as_ref();
    let Some(rows) = rows.as_array() else {
        bail!("JSON table must be an array of rows");
    };
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        create_dir_all(parent).with_context(|| format!("mkdir -p {}", parent.display()))?;
    }
    let f = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let mut w = auto_detect_writer(f, path)
        .with_context(|| format!("setup compression for {}", path.display()))?;
    for (i, row) in rows.iter().enumerate() {
        serde_json::to_writer(&mut w, row)
            .with_context(|| format!("serialize row #{i} to {}", path.display()))?;
        w.write_all(b"\n")?;
    }
    w.flush()?;
    Ok(rows.len())
}
