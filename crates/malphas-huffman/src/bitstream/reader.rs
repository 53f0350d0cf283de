//! Buffered bit-level reader.

use std::fs::File;
use std::io::{ErrorKind, Read, Seek, SeekFrom};
use std::path::Path;

use malphas_core::{Error, Result};

use super::STREAM_BUFFER_SIZE;
use crate::huffman::Code;

/// Reads a byte stream one bit at a time, most significant bit first.
///
/// The reader refills an internal buffer in fixed-size chunks and keeps a
/// bit cursor into the current byte. End of stream is reported as `Ok(None)`
/// from the `read_*` methods; I/O failures propagate as [`Error::Io`].
#[derive(Debug)]
pub struct BitReader<R> {
    stream: R,
    buffer: [u8; STREAM_BUFFER_SIZE],
    /// Bytes currently valid in `buffer`.
    filled: usize,
    /// Index of the byte the bit cursor sits in.
    index: usize,
    /// Next bit to yield within the current byte, 7 = most significant.
    bit_pos: u8,
    /// Whole bytes consumed so far.
    byte_count: u64,
}

impl BitReader<File> {
    /// Open a file for bit-level reading.
    ///
    /// A missing file is reported as [`Error::SourceNotFound`]; any other
    /// open failure propagates as [`Error::Io`].
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match File::open(path) {
            Ok(file) => Ok(BitReader::new(file)),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                Err(Error::source_not_found(path))
            }
            Err(err) => Err(err.into()),
        }
    }
}

impl<R: Read> BitReader<R> {
    /// Wrap a byte stream.
    pub fn new(stream: R) -> Self {
        BitReader {
            stream,
            buffer: [0; STREAM_BUFFER_SIZE],
            filled: 0,
            index: 0,
            bit_pos: 7,
            byte_count: 0,
        }
    }

    /// Whole bytes consumed so far. A byte is counted once its last bit has
    /// been read, no matter how many separate reads crossed it.
    pub fn byte_count(&self) -> u64 {
        self.byte_count
    }

    /// Whether the stream is exhausted. Does not consume anything.
    pub fn at_end(&mut self) -> Result<bool> {
        Ok(!self.refill()?)
    }

    /// Read one bit. `Ok(None)` at end of stream.
    pub fn read_bit(&mut self) -> Result<Option<bool>> {
        if !self.refill()? {
            return Ok(None);
        }

        let bit = (self.buffer[self.index] >> self.bit_pos) & 1 == 1;
        if self.bit_pos == 0 {
            self.bit_pos = 7;
            self.index += 1;
            self.byte_count += 1;
        } else {
            self.bit_pos -= 1;
        }
        Ok(Some(bit))
    }

    /// Read `bit_count` bits into an unsigned integer, most significant bit
    /// first. `Ok(None)` if the stream ends before all bits are available;
    /// any bits consumed by the partial read are lost.
    ///
    /// `bit_count` must be at most 64.
    pub fn read_bits(&mut self, bit_count: usize) -> Result<Option<u64>> {
        debug_assert!(bit_count <= 64);

        let mut value = 0u64;
        for _ in 0..bit_count {
            match self.read_bit()? {
                Some(bit) => value = (value << 1) | bit as u64,
                None => return Ok(None),
            }
        }
        Ok(Some(value))
    }

    /// Read `bit_count` bits into a [`Code`], first bit read becoming the
    /// code's most significant bit. `Ok(None)` if the stream ends first.
    pub fn read_code(&mut self, bit_count: usize) -> Result<Option<Code>> {
        let mut code = Code::new();
        for _ in 0..bit_count {
            match self.read_bit()? {
                Some(bit) => code.push(bit),
                None => return Ok(None),
            }
        }
        Ok(Some(code))
    }

    /// Ensure at least one unread bit is buffered. Returns false at end of
    /// stream.
    fn refill(&mut self) -> Result<bool> {
        if self.index < self.filled {
            return Ok(true);
        }
        loop {
            match self.stream.read(&mut self.buffer) {
                Ok(0) => return Ok(false),
                Ok(n) => {
                    self.filled = n;
                    self.index = 0;
                    self.bit_pos = 7;
                    return Ok(true);
                }
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(err.into()),
            }
        }
    }
}

impl<R: Read + Seek> BitReader<R> {
    /// Rewind to the start of the stream and reset all counters.
    ///
    /// The compressor scans every source twice (count pass, encode pass);
    /// this is the seam between the two.
    pub fn reset(&mut self) -> Result<()> {
        self.stream.seek(SeekFrom::Start(0))?;
        self.filled = 0;
        self.index = 0;
        self.bit_pos = 7;
        self.byte_count = 0;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn test_read_single_bits() {
        // 0b10110000
        let mut reader = BitReader::new(Cursor::new(vec![0xB0]));

        let expected = [true, false, true, true, false, false, false, false];
        for &want in &expected {
            assert_eq!(reader.read_bit().unwrap(), Some(want));
        }
        assert_eq!(reader.read_bit().unwrap(), None);
        assert_eq!(reader.byte_count(), 1);
    }

    #[test]
    fn test_read_bits_msb_first() {
        let mut reader = BitReader::new(Cursor::new(b"0123".to_vec()));

        for expected in [b'0', b'1', b'2', b'3'] {
            assert_eq!(reader.read_bits(8).unwrap(), Some(expected as u64));
        }
        assert_eq!(reader.read_bits(8).unwrap(), None);
        assert_eq!(reader.byte_count(), 4);
    }

    #[test]
    fn test_read_bits_across_byte_boundary() {
        // 12 bits: 0xAB then high nibble of 0xCD
        let mut reader = BitReader::new(Cursor::new(vec![0xAB, 0xCD]));
        assert_eq!(reader.read_bits(12).unwrap(), Some(0xABC));
        assert_eq!(reader.byte_count(), 1);
        assert_eq!(reader.read_bits(4).unwrap(), Some(0xD));
        assert_eq!(reader.byte_count(), 2);
    }

    #[test]
    fn test_partial_read_at_end_returns_none() {
        let mut reader = BitReader::new(Cursor::new(vec![0xFF]));
        assert_eq!(reader.read_bits(3).unwrap(), Some(0b111));
        // Only 5 bits remain.
        assert_eq!(reader.read_bits(9).unwrap(), None);
    }

    #[test]
    fn test_at_end() {
        let mut reader = BitReader::new(Cursor::new(vec![0x80]));
        assert!(!reader.at_end().unwrap());
        for _ in 0..8 {
            reader.read_bit().unwrap();
        }
        assert!(reader.at_end().unwrap());
    }

    #[test]
    fn test_read_code_matches_written_order() {
        // 0b0100_0000: first bit read is the code's index 0.
        let mut reader = BitReader::new(Cursor::new(vec![0x40]));
        let code = reader.read_code(3).unwrap().unwrap();
        assert_eq!(code.len(), 3);
        assert!(!code.bit(0));
        assert!(code.bit(1));
        assert!(!code.bit(2));
    }

    #[test]
    fn test_reset_rewinds_and_clears_counts() {
        let mut reader = BitReader::new(Cursor::new(vec![0x12, 0x34]));
        assert_eq!(reader.read_bits(16).unwrap(), Some(0x1234));
        assert_eq!(reader.byte_count(), 2);

        reader.reset().unwrap();
        assert_eq!(reader.byte_count(), 0);
        assert_eq!(reader.read_bits(8).unwrap(), Some(0x12));
    }

    #[test]
    fn test_open_missing_file() {
        let err = BitReader::open("definitely/not/here.bin").unwrap_err();
        assert!(matches!(err, Error::SourceNotFound { .. }));
    }
}
