//! # Malphas Core
//!
//! Shared foundation for the Malphas archiver: error types, recovered-file
//! records, and byte accounting.
//!
//! Malphas is named after the 39th demon of the Ars Goetia, a builder of
//! houses and high towers - fitting for a tool whose whole job is raising
//! one structure out of many files.
//!
//! ## Contents
//!
//! - [`Error`] / [`Result`] - the error surface shared by every crate
//! - [`ArchiveEntry`] - one recovered (name, size) record
//! - [`ArchiveStats`] - raw vs. archived byte totals with derived ratios

pub mod error;
pub mod stats;
pub mod types;

pub use error::{Error, Result};
pub use stats::ArchiveStats;
pub use types::ArchiveEntry;
