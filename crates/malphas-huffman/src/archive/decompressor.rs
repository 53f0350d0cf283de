//! Archive reader.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use malphas_core::{ArchiveEntry, Error, Result};
use tracing::{debug, info};

use super::{ARCHIVE_END, BYTE_BITS, FILENAME_END, ONE_MORE_FILE, SYMBOL_BITS};
use crate::bitstream::{BitReader, BitWriter};
use crate::huffman::{CanonicalCode, DecodeTrie, Symbol, MAX_SYMBOL};

/// Recovers the files stored in an archive.
///
/// Blocks are processed strictly in archive order; every structural
/// violation (a truncated header, a histogram that does not sum to the
/// alphabet size, a bit sequence matching no codeword, a missing
/// terminator) aborts with [`Error::ArchiveDamaged`] naming the violation.
/// A file already recovered before the violation stays on disk; the file
/// being decoded at that moment is left truncated.
///
/// # Example
///
/// ```no_run
/// use malphas_huffman::Decompressor;
///
/// let mut decompressor = Decompressor::new("result.arc");
/// decompressor.decompress()?;
/// for entry in decompressor.entries() {
///     println!("{}: {} bytes", entry.name, entry.size);
/// }
/// # Ok::<(), malphas_core::Error>(())
/// ```
#[derive(Debug)]
pub struct Decompressor {
    archive_path: PathBuf,
    output_dir: PathBuf,
    entries: Vec<ArchiveEntry>,
}

impl Decompressor {
    /// Create a decompressor for an archive. Recovered files are created in
    /// the current directory unless
    /// [`with_output_dir`](Decompressor::with_output_dir) redirects them.
    pub fn new(archive_path: impl Into<PathBuf>) -> Self {
        Decompressor {
            archive_path: archive_path.into(),
            output_dir: PathBuf::from("."),
            entries: Vec::new(),
        }
    }

    /// Create recovered files under `dir` instead of the current directory.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// The archive path.
    pub fn archive_path(&self) -> &Path {
        &self.archive_path
    }

    /// Files recovered by the last [`decompress`](Decompressor::decompress).
    pub fn entries(&self) -> &[ArchiveEntry] {
        &self.entries
    }

    /// Decompress every block of the archive.
    pub fn decompress(&mut self) -> Result<()> {
        self.entries.clear();
        let mut reader = BitReader::open(&self.archive_path)?;

        loop {
            let table = read_block_header(&mut reader)?;
            let mut trie = DecodeTrie::from_canonical(&table);

            let name = decode_name(&mut reader, &mut trie)?;
            let (size, terminator) =
                decode_content(&mut reader, &mut trie, &self.output_dir.join(&name))?;
            debug!(name = %name, size, "file block recovered");
            self.entries.push(ArchiveEntry::new(name, size));

            if terminator == ARCHIVE_END {
                break;
            }
        }

        info!(
            files = self.entries.len(),
            archive = %self.archive_path.display(),
            "archive decompressed"
        );
        Ok(())
    }
}

/// Read one block header and rebuild its canonical table.
fn read_block_header<R: Read>(reader: &mut BitReader<R>) -> Result<CanonicalCode> {
    let alphabet_size = reader
        .read_bits(SYMBOL_BITS)?
        .ok_or_else(|| Error::damaged("can't read alphabet size"))? as usize;

    let mut order = Vec::with_capacity(alphabet_size);
    for _ in 0..alphabet_size {
        let symbol = reader
            .read_bits(SYMBOL_BITS)?
            .ok_or_else(|| Error::damaged("can't read symbols order"))?;
        if symbol > MAX_SYMBOL as u64 {
            return Err(Error::damaged(format!(
                "symbol {symbol} outside the alphabet"
            )));
        }
        order.push(symbol as Symbol);
    }

    // Length counts keep coming until they account for every symbol;
    // anything short or over is a mismatch.
    let mut length_counts = Vec::new();
    let mut sum = 0u64;
    while sum < alphabet_size as u64 {
        let Some(count) = reader.read_bits(SYMBOL_BITS)? else {
            break;
        };
        sum += count;
        length_counts.push(count);
    }
    if sum != alphabet_size as u64 {
        return Err(Error::damaged("can't read code sizes count"));
    }

    CanonicalCode::from_parts(order, length_counts)
}

/// Decode the name section up to its terminator.
fn decode_name<R: Read>(reader: &mut BitReader<R>, trie: &mut DecodeTrie) -> Result<String> {
    let mut name = Vec::new();
    loop {
        let bit = reader
            .read_bit()?
            .ok_or_else(|| Error::damaged("can't read file name"))?;
        if !trie.step(bit) {
            return Err(Error::damaged("can't decode file name char code"));
        }
        let Some(symbol) = trie.current_symbol() else {
            continue;
        };
        trie.reset();

        match symbol {
            FILENAME_END => break,
            symbol if symbol <= u8::MAX as Symbol => name.push(symbol as u8),
            _ => {
                return Err(Error::damaged(
                    "terminator symbol inside the file name section",
                ))
            }
        }
    }
    validate_name(name)
}

/// Decode the content section into a freshly created file, returning its
/// size and the terminator that ended it.
fn decode_content<R: Read>(
    reader: &mut BitReader<R>,
    trie: &mut DecodeTrie,
    output_path: &Path,
) -> Result<(u64, Symbol)> {
    let mut writer = BitWriter::new(File::create(output_path)?);
    let mut size = 0u64;

    let terminator = loop {
        let bit = reader
            .read_bit()?
            .ok_or_else(|| Error::damaged("can't get information about next file"))?;
        if !trie.step(bit) {
            return Err(Error::damaged("can't decode content char code"));
        }
        let Some(symbol) = trie.current_symbol() else {
            continue;
        };
        trie.reset();

        match symbol {
            ONE_MORE_FILE | ARCHIVE_END => break symbol,
            symbol if symbol <= u8::MAX as Symbol => {
                writer.write_bits(symbol as u64, BYTE_BITS)?;
                size += 1;
            }
            _ => {
                return Err(Error::damaged(
                    "name terminator inside the content section",
                ))
            }
        }
    };

    writer.complete()?;
    Ok((size, terminator))
}

/// Decoded names come from untrusted bytes and become paths; only a plain
/// UTF-8 base name is allowed through.
fn validate_name(name: Vec<u8>) -> Result<String> {
    let name = String::from_utf8(name)
        .map_err(|_| Error::damaged("file name is not valid UTF-8"))?;
    if name.is_empty() {
        return Err(Error::damaged("empty file name"));
    }
    if name == "." || name == ".." {
        return Err(Error::damaged(format!("unsafe file name \"{name}\"")));
    }
    if name.contains(['/', '\\', '\0']) {
        return Err(Error::damaged(format!("unsafe file name \"{name}\"")));
    }
    Ok(name)
}
