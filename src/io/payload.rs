use super::compression::{auto_detect_reader, auto_detect_writer};
use crate::shared::Shared;
use crate::wire::{denormalize_formats, normalize_formats};
use anyhow::{Context, Result};
use serde_json::Value;
use std::borrow::Cow;
use std::fs::{File, create_dir_all};
use std::io::{BufReader, Write};
use std::path::Path;

/// How [`write_payload`] lays out the document.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WriteOptions {
    /// Deduplicate repeated schemas into links before writing.
    pub normalize: bool,
    /// Indent the output.
    pub pretty: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            normalize: true,
            pretty: false,
        }
    }
}

/// Read one JSON document.
///
/// # Errors
/// Fails when the file cannot be opened or decompressed, or is not valid JSON.
pub fn read_payload(path: impl AsRef<Path>) -> Result<Value> {
    let path = path.as_ref();
    let f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let rdr = auto_detect_reader(f, path)
        .with_context(|| format!("setup decompression for {}", path.display()))?;
    serde_json::from_reader(BufReader::new(rdr))
        .with_context(|| format!("parse JSON payload {}", path.display()))
}

/// Read a wire table and inline every linked schema.
///
/// # Errors
/// Same as [`read_payload`].
pub fn read_table(path: impl AsRef<Path>) -> Result<Shared<Value>> {
    let mut payload = read_payload(path)?;
    denormalize_formats(&mut payload);
    Ok(Shared::new(payload))
}

/// Write one JSON document, creating parent directories as needed.
///
/// `payload` itself is never modified; normalization works on a copy.
///
/// # Errors
/// Fails when the file or its directories cannot be created or written.
pub fn write_payload(path: impl AsRef<Path>, payload: &Value, options: WriteOptions) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        create_dir_all(parent).with_context(|| format!("mkdir -p {}", parent.display()))?;
    }

    let payload = if options.normalize {
        let mut copy = payload.clone();
        normalize_formats(&mut copy);
        Cow::Owned(copy)
    } else {
        Cow::Borrowed(payload)
    };

    let f = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let mut w = auto_detect_writer(f, path)
        .with_context(|| format!("setup compression for {}", path.display()))?;
    let written = if options.pretty {
        serde_json::to_writer_pretty(&mut w, payload.as_ref())
    } else {
        serde_json::to_writer(&mut w, payload.as_ref())
    };
    written.with_context(|| format!("serialize payload to {}", path.display()))?;
    w.flush()?;
    Ok(())
}
