//! Archive writer.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use malphas_core::{ArchiveStats, Error, Result};
use tracing::{debug, info};

use super::{ARCHIVE_END, BYTE_BITS, FILENAME_END, ONE_MORE_FILE, SYMBOL_BITS};
use crate::bitstream::{BitReader, BitWriter};
use crate::huffman::{CanonicalCode, Counter, Symbol};

/// Compresses a list of source files into one archive.
///
/// Each source is scanned twice: once to count symbol frequencies, once to
/// emit codewords. Files are processed strictly in input order and the
/// archive stream is owned exclusively by this instance for the duration of
/// [`compress`](Compressor::compress).
///
/// # Example
///
/// ```no_run
/// use malphas_huffman::Compressor;
///
/// let mut compressor = Compressor::new(
///     vec!["a.txt".into(), "b.txt".into()],
///     "result.arc",
/// );
/// compressor.compress()?;
/// println!(
///     "{} bytes in, {} bytes out",
///     compressor.stats().raw_bytes,
///     compressor.stats().archive_bytes,
/// );
/// # Ok::<(), malphas_core::Error>(())
/// ```
#[derive(Debug)]
pub struct Compressor {
    sources: Vec<PathBuf>,
    archive_path: PathBuf,
    stats: ArchiveStats,
}

impl Compressor {
    /// Create a compressor for the given sources and archive destination.
    pub fn new(sources: Vec<PathBuf>, archive_path: impl Into<PathBuf>) -> Self {
        Compressor {
            sources,
            archive_path: archive_path.into(),
            stats: ArchiveStats::new(),
        }
    }

    /// Append one more source file.
    pub fn add_source(&mut self, path: impl Into<PathBuf>) {
        self.sources.push(path.into());
    }

    /// The archive destination path.
    pub fn archive_path(&self) -> &Path {
        &self.archive_path
    }

    /// Byte totals from the last completed [`compress`](Compressor::compress).
    pub fn stats(&self) -> &ArchiveStats {
        &self.stats
    }

    /// Compress every source into the archive.
    ///
    /// Compression is all-or-nothing with respect to missing inputs: if a
    /// source cannot be opened the partially written archive is deleted and
    /// [`Error::SourceNotFound`] is returned. Other failures propagate
    /// unmodified.
    pub fn compress(&mut self) -> Result<()> {
        self.stats = ArchiveStats::new();

        let archive = File::create(&self.archive_path)?;
        let mut writer = BitWriter::new(archive);

        let total = self.sources.len();
        let mut raw_bytes = 0u64;
        for (index, source) in self.sources.iter().enumerate() {
            let more_files = index + 1 < total;
            match write_block(&mut writer, source, more_files) {
                Ok(content_bytes) => {
                    debug!(
                        source = %source.display(),
                        content_bytes,
                        "file block written"
                    );
                    raw_bytes += content_bytes;
                }
                Err(err @ Error::SourceNotFound { .. }) => {
                    drop(writer);
                    let _ = fs::remove_file(&self.archive_path);
                    return Err(err);
                }
                Err(err) => return Err(err),
            }
        }

        writer.complete()?;
        self.stats.raw_bytes = raw_bytes;
        self.stats.archive_bytes = writer.byte_count();
        info!(
            files = total,
            raw_bytes = self.stats.raw_bytes,
            archive_bytes = self.stats.archive_bytes,
            archive = %self.archive_path.display(),
            "archive written"
        );
        Ok(())
    }
}

/// Encode one source file as a block. Returns the number of content bytes
/// read from the source.
fn write_block<W: Write>(
    writer: &mut BitWriter<W>,
    source: &Path,
    more_files: bool,
) -> Result<u64> {
    let name = source_name(source)?;

    // Count pass: name bytes, content bytes, and one of each service
    // marker so every marker owns a codeword.
    let mut reader = BitReader::open(source)?;
    let mut counter = Counter::new();
    counter.record_bytes(name.as_bytes());
    counter.record_stream(&mut reader)?;
    counter.record(FILENAME_END);
    counter.record(ONE_MORE_FILE);
    counter.record(ARCHIVE_END);
    let content_bytes = reader.byte_count();

    let table = CanonicalCode::from_counter(&counter);

    // Header: alphabet size, canonical symbol order, code-length histogram.
    writer.write_bits(table.len() as u64, SYMBOL_BITS)?;
    for &symbol in table.order() {
        writer.write_bits(symbol as u64, SYMBOL_BITS)?;
    }
    for &count in table.length_counts() {
        writer.write_bits(count, SYMBOL_BITS)?;
    }

    // Name section.
    for &byte in name.as_bytes() {
        writer.write_code(symbol_code(&table, byte as Symbol)?)?;
    }
    writer.write_code(symbol_code(&table, FILENAME_END)?)?;

    // Content section: second pass over the source.
    reader.reset()?;
    while let Some(byte) = reader.read_bits(BYTE_BITS)? {
        writer.write_code(symbol_code(&table, byte as Symbol)?)?;
    }

    let terminator = if more_files { ONE_MORE_FILE } else { ARCHIVE_END };
    writer.write_code(symbol_code(&table, terminator)?)?;

    Ok(content_bytes)
}

/// Base name of a source path, as it will be stored in the archive.
fn source_name(source: &Path) -> Result<String> {
    source
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| {
            Error::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("source path \"{}\" has no file name", source.display()),
            ))
        })
}

/// Every symbol written was counted, so its codeword exists; a miss here is
/// a table-construction defect, not a user error.
fn symbol_code(table: &CanonicalCode, symbol: Symbol) -> Result<&crate::huffman::Code> {
    table
        .code(symbol)
        .ok_or_else(|| Error::io(format!("symbol {symbol} missing from canonical table")))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    fn write_source(dir: &TempDir, name: &str, contents: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_compress_reports_raw_and_archive_bytes() {
        let dir = TempDir::new().unwrap();
        let a = write_source(&dir, "a.txt", b"aaaa");
        let b = write_source(&dir, "b.txt", b"bbbb");
        let archive = dir.path().join("result.arc");

        let mut compressor = Compressor::new(vec![a, b], &archive);
        compressor.compress().unwrap();

        assert_eq!(compressor.stats().raw_bytes, 8);
        assert_eq!(
            compressor.stats().archive_bytes,
            fs::metadata(&archive).unwrap().len()
        );
    }

    #[test]
    fn test_missing_source_deletes_partial_archive() {
        let dir = TempDir::new().unwrap();
        let a = write_source(&dir, "a.txt", b"present");
        let missing = dir.path().join("missing.txt");
        let archive = dir.path().join("result.arc");

        let mut compressor = Compressor::new(vec![a, missing.clone()], &archive);
        let err = compressor.compress().unwrap_err();

        assert!(matches!(err, Error::SourceNotFound { ref path } if *path == missing));
        assert!(!archive.exists());
    }

    #[test]
    fn test_add_source() {
        let dir = TempDir::new().unwrap();
        let a = write_source(&dir, "a.txt", b"x");
        let b = write_source(&dir, "b.txt", b"y");
        let archive = dir.path().join("result.arc");

        let mut compressor = Compressor::new(vec![a], &archive);
        compressor.add_source(b);
        compressor.compress().unwrap();
        assert_eq!(compressor.stats().raw_bytes, 2);
    }

    #[test]
    fn test_empty_file_compresses() {
        let dir = TempDir::new().unwrap();
        let empty = write_source(&dir, "empty.bin", b"");
        let archive = dir.path().join("result.arc");

        let mut compressor = Compressor::new(vec![empty], &archive);
        compressor.compress().unwrap();

        assert_eq!(compressor.stats().raw_bytes, 0);
        assert!(compressor.stats().archive_bytes > 0);
    }

    #[test]
    fn test_header_starts_with_alphabet_size() {
        let dir = TempDir::new().unwrap();
        // Name "s" + content "zz": alphabet is {s, z, 256, 257, 258}.
        let source = write_source(&dir, "s", b"zz");
        let archive = dir.path().join("result.arc");

        Compressor::new(vec![source], &archive).compress().unwrap();

        let bytes = fs::read(&archive).unwrap();
        let mut reader = BitReader::new(std::io::Cursor::new(bytes));
        assert_eq!(reader.read_bits(SYMBOL_BITS).unwrap(), Some(5));
    }
}
