//! Bit-granularity stream I/O.
//!
//! Everything the archiver writes or reads goes through these two types:
//! [`BitWriter`] packs bits most-significant-first into bytes with no
//! alignment between fields, and [`BitReader`] consumes them the same way.
//! Both buffer fixed-size byte chunks internally and count whole bytes as
//! they cross byte boundaries, so the archiver can report exact sizes.

mod reader;
mod writer;

pub use reader::BitReader;
pub use writer::BitWriter;

/// Internal chunk size for both the reader and the writer.
pub(crate) const STREAM_BUFFER_SIZE: usize = 1024;
