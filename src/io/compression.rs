//! Transparent compression for payload files.
//!
//! A codec is picked by file extension first and, for readers only, by the magic
//! bytes at the start of the stream when the extension says nothing. Without the
//! `compression-gzip` feature there are no codecs and every stream passes through
//! unchanged (buffered).
//!
//! ```no_run
//! use record_adapters::io::compression::{auto_detect_reader, auto_detect_writer};
//! use std::fs::File;
//! # fn main() -> anyhow::Result<()> {
//! let reader = auto_detect_reader(File::open("orders.json.gz")?, "orders.json.gz")?;
//! let writer = auto_detect_writer(File::create("copy.json.gz")?, "copy.json.gz")?;
//! # Ok(())
//! # }
//! ```

use anyhow::{Context, Result};
use log::debug;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

/// A compression algorithm the payload readers and writers understand.
pub trait CompressionCodec: Send + Sync {
    /// Short name used in logs and error context (e.g. "gzip").
    fn name(&self) -> &str;

    /// Lowercase extensions with the leading dot.
    fn extensions(&self) -> &[&str];

    /// Signature at the start of a compressed stream, if the format has one.
    fn magic_bytes(&self) -> Option<&[u8]>;

    fn wrap_reader(&self, reader: Box<dyn Read>) -> std::io::Result<Box<dyn Read>>;

    fn wrap_writer(&self, writer: Box<dyn Write>) -> std::io::Result<Box<dyn Write>>;
}

static CODECS: &[&dyn CompressionCodec] = &[
    #[cfg(feature = "compression-gzip")]
    &GzipCodec,
];

/// Built-in codecs enabled by crate features.
pub fn codecs() -> &'static [&'static dyn CompressionCodec] {
    CODECS
}

/// Codec whose extension matches `path`, case-insensitively.
pub fn codec_for_path(path: impl AsRef<Path>) -> Option<&'static dyn CompressionCodec> {
    let name = path.as_ref().to_string_lossy().to_lowercase();
    CODECS
        .iter()
        .copied()
        .find(|codec| codec.extensions().iter().any(|ext| name.ends_with(ext)))
}

fn codec_for_magic<R: BufRead>(reader: &mut R) -> Option<&'static dyn CompressionCodec> {
    let head = reader.fill_buf().ok()?;
    if head.is_empty() {
        return None;
    }
    CODECS
        .iter()
        .copied()
        .find(|codec| codec.magic_bytes().is_some_and(|magic| head.starts_with(magic)))
}

/// Wrap `reader` with decompression when `path_hint` or the stream content calls for it.
///
/// # Errors
/// Fails when the detected codec cannot set up its decoder.
pub fn auto_detect_reader<R: Read + 'static>(
    reader: R,
    path_hint: impl AsRef<Path>,
) -> Result<Box<dyn Read>> {
    if let Some(codec) = codec_for_path(&path_hint) {
        debug!("reading {} with {} codec", path_hint.as_ref().display(), codec.name());
        return codec
            .wrap_reader(Box::new(reader))
            .with_context(|| format!("wrap reader with {} codec", codec.name()));
    }

    let mut buffered = BufReader::new(reader);
    if let Some(codec) = codec_for_magic(&mut buffered) {
        debug!(
            "reading {} with {} codec (magic bytes)",
            path_hint.as_ref().display(),
            codec.name()
        );
        return codec
            .wrap_reader(Box::new(buffered))
            .with_context(|| format!("wrap reader with {} codec", codec.name()));
    }
    Ok(Box::new(buffered))
}

/// Wrap `writer` with compression when the extension of `path_hint` names a codec.
///
/// # Errors
/// Fails when the codec cannot set up its encoder.
pub fn auto_detect_writer<W: Write + 'static>(
    writer: W,
    path_hint: impl AsRef<Path>,
) -> Result<Box<dyn Write>> {
    if let Some(codec) = codec_for_path(&path_hint) {
        return codec
            .wrap_writer(Box::new(writer))
            .with_context(|| format!("wrap writer with {} codec", codec.name()));
    }
    Ok(Box::new(BufWriter::new(writer)))
}

#[cfg(feature = "compression-gzip")]
struct GzipCodec;

#[cfg(feature = "compression-gzip")]
impl CompressionCodec for GzipCodec {
    fn name(&self) -> &str {
        "gzip"
    }

    fn extensions(&self) -> &[&str] {
        &[".gz", ".gzip"]
    }

    fn magic_bytes(&self) -> Option<&[u8]> {
        Some(&[0x1f, 0x8b])
    }

    fn wrap_reader(&self, reader: Box<dyn Read>) -> std::io::Result<Box<dyn Read>> {
        use flate2::read::GzDecoder;
        Ok(Box::new(GzDecoder::new(reader)))
    }

    fn wrap_writer(&self, writer: Box<dyn Write>) -> std::io::Result<Box<dyn Write>> {
        use flate2::Compression;
        use flate2::write::GzEncoder;
        Ok(Box::new(GzEncoder::new(writer, Compression::default())))
    }
}
