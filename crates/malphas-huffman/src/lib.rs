//! # Malphas Huffman
//!
//! Single-stream file archiver built on per-file canonical Huffman coding.
//!
//! Each source file becomes one self-contained block: a 9-bit header
//! carrying the block's alphabet and code-length histogram, followed by the
//! Huffman-coded file name and content. Structural markers (name end, one
//! more file, archive end) travel inside the coded stream itself, so the
//! decoder needs nothing but the bit stream to walk the whole archive.
//!
//! ## Quick Start
//!
//! ```no_run
//! use malphas_huffman::{Compressor, Decompressor};
//!
//! // Pack two files into one archive.
//! let mut compressor = Compressor::new(
//!     vec!["a.txt".into(), "b.txt".into()],
//!     "result.arc",
//! );
//! compressor.compress()?;
//!
//! // Unpack them again.
//! let mut decompressor = Decompressor::new("result.arc");
//! decompressor.decompress()?;
//! for entry in decompressor.entries() {
//!     println!("{}: {} bytes", entry.name, entry.size);
//! }
//! # Ok::<(), malphas_core::Error>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      malphas-huffman                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  archive/           │  Compressor / Decompressor drivers    │
//! │  ├── compressor.rs  │  and the block wire format            │
//! │  └── decompressor.rs│                                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  huffman/           │  Counter -> HuffmanTree ->            │
//! │  ├── counter.rs     │  CanonicalCode -> DecodeTrie          │
//! │  ├── tree.rs        │  (codes reconstructible from the      │
//! │  ├── canonical.rs   │   symbol order + length histogram)    │
//! │  ├── trie.rs        │                                       │
//! │  └── code.rs        │                                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  bitstream/         │  MSB-first bit-packed reader/writer   │
//! │  heap.rs            │  binary min-heap for tree merging     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything is single-threaded and synchronous: files are processed one
//! at a time in input order, and the archive stream is owned by exactly one
//! driver at a time. Compression reads each source twice (count pass, then
//! encode pass); decompression is a single pass over the archive.

pub mod archive;
pub mod bitstream;
pub mod heap;
pub mod huffman;

pub use archive::{Compressor, Decompressor};
pub use malphas_core::{ArchiveEntry, ArchiveStats, Error, Result};
