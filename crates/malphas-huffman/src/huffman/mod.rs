//! Canonical Huffman coding.
//!
//! The pipeline runs in four stages, mirrored on both sides of the archive:
//!
//! - [`Counter`] tallies symbol frequencies over one file's encoding unit
//! - [`HuffmanTree`] merges the two least-frequent nodes until one remains
//! - [`CanonicalCode`] re-labels the tree's codewords into the canonical
//!   assignment, which is reconstructible from just the symbol order and a
//!   code-length histogram
//! - [`DecodeTrie`] turns a canonical table back into a binary trie the
//!   decoder traces bit by bit
//!
//! Symbols cover the 256 byte values plus three service markers the archive
//! layer embeds in the coded stream itself (see [`crate::archive`]).

mod canonical;
mod code;
mod counter;
mod tree;
mod trie;

pub use canonical::CanonicalCode;
pub use code::Code;
pub use counter::Counter;
pub use tree::HuffmanTree;
pub use trie::DecodeTrie;

/// A coded symbol: a literal byte (0-255) or a service marker (256-258).
pub type Symbol = u16;

/// Largest valid symbol value.
pub const MAX_SYMBOL: Symbol = 258;

/// Size of the symbol universe (literal bytes + service markers).
pub const SYMBOL_COUNT: usize = MAX_SYMBOL as usize + 1;
