// File-level helpers for block compression.
//
// `compress_file()` / `decompress_file()` read a whole serialized block,
// run it through an engine's block path and write the result with buffered
// I/O. The `*_stream` variants do the same over any reader/writer pair.
// A SHA-256 of the written bytes is computed as they are written.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use sha2::Digest;

use crate::engine::{self, Engine};

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Statistics returned by the file and stream helpers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStats {
    /// Bytes read from the input.
    pub input_size: u64,
    /// Bytes written to the output.
    pub output_size: u64,
    /// SHA-256 of the written output.
    pub output_sha256: [u8; 32],
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Error type for file I/O operations.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// File open, read or write failure.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// The engine rejected the data.
    #[error("engine error: {0}")]
    Engine(#[from] engine::Error),
}

// ---------------------------------------------------------------------------
// Default buffer size
// ---------------------------------------------------------------------------

const BUF_SIZE: usize = 64 * 1024; // 64 KiB

// ---------------------------------------------------------------------------
// Streams
// ---------------------------------------------------------------------------

/// Read all of `reader`, compress it as one block and write the record.
pub fn compress_stream<R: Read, W: Write>(
    engine: &Engine,
    reader: R,
    writer: W,
) -> Result<FileStats, IoError> {
    transform_stream(reader, writer, |input| engine.compress_block(input))
}

/// Read a block record from `reader`, decompress it and write the block.
pub fn decompress_stream<R: Read, W: Write>(
    engine: &Engine,
    reader: R,
    writer: W,
) -> Result<FileStats, IoError> {
    transform_stream(reader, writer, |input| engine.decompress_block(input))
}

fn transform_stream<R, W, F>(mut reader: R, writer: W, transform: F) -> Result<FileStats, IoError>
where
    R: Read,
    W: Write,
    F: FnOnce(&[u8]) -> Result<Vec<u8>, engine::Error>,
{
    let mut input = Vec::new();
    reader.read_to_end(&mut input)?;

    let output = transform(&input)?;

    let mut hasher = sha2::Sha256::new();
    let mut out = HashingWriter {
        inner: writer,
        hasher: &mut hasher,
    };
    out.write_all(&output)?;
    out.flush()?;

    Ok(FileStats {
        input_size: input.len() as u64,
        output_size: output.len() as u64,
        output_sha256: hasher.finalize().into(),
    })
}

// ---------------------------------------------------------------------------
// Files
// ---------------------------------------------------------------------------

/// Compress the block stored at `input_path` into `output_path`.
pub fn compress_file(
    engine: &Engine,
    input_path: &Path,
    output_path: &Path,
) -> Result<FileStats, IoError> {
    let reader = BufReader::with_capacity(BUF_SIZE, File::open(input_path)?);
    let writer = BufWriter::with_capacity(BUF_SIZE, File::create(output_path)?);
    compress_stream(engine, reader, writer)
}

/// Decompress the block record at `input_path` into `output_path`.
pub fn decompress_file(
    engine: &Engine,
    input_path: &Path,
    output_path: &Path,
) -> Result<FileStats, IoError> {
    let reader = BufReader::with_capacity(BUF_SIZE, File::open(input_path)?);
    let writer = BufWriter::with_capacity(BUF_SIZE, File::create(output_path)?);
    decompress_stream(engine, reader, writer)
}

// ---------------------------------------------------------------------------
// Hashing writer
// ---------------------------------------------------------------------------

struct HashingWriter<'a, W: Write> {
    inner: W,
    hasher: &'a mut sha2::Sha256,
}

impl<W: Write> Write for HashingWriter<'_, W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.hasher.update(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
