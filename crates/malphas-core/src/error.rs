//! Error types for archive operations.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result type alias for archive operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Archive error types.
#[derive(Debug, Error)]
pub enum Error {
    /// A source file given to the compressor cannot be opened.
    #[error("file \"{}\" not exists", .path.display())]
    SourceNotFound { path: PathBuf },

    /// The archive's structure is invalid: truncated header, inconsistent
    /// code-length histogram, an undecodable bit sequence, or a missing
    /// terminator. Decompression stops at the first violation.
    #[error("archive is damaged, can't decompress it ({reason})")]
    ArchiveDamaged { reason: String },

    /// I/O error from an underlying stream.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a missing-source error.
    pub fn source_not_found(path: impl AsRef<Path>) -> Self {
        Error::SourceNotFound {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Create an archive-damaged error with a specific reason.
    pub fn damaged(reason: impl Into<String>) -> Self {
        Error::ArchiveDamaged {
            reason: reason.into(),
        }
    }

    /// Create an I/O error with a custom message.
    pub fn io(message: impl Into<String>) -> Self {
        Error::Io(std::io::Error::other(message.into()))
    }

    /// Whether this error reports archive corruption.
    pub fn is_damage(&self) -> bool {
        matches!(self, Error::ArchiveDamaged { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_not_found_display() {
        let err = Error::source_not_found("missing.txt");
        assert_eq!(err.to_string(), "file \"missing.txt\" not exists");
    }

    #[test]
    fn test_damaged_display() {
        let err = Error::damaged("can't read file name");
        assert_eq!(
            err.to_string(),
            "archive is damaged, can't decompress it (can't read file name)"
        );
        assert!(err.is_damage());
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = Error::from(io);
        assert!(!err.is_damage());
        assert!(matches!(err, Error::Io(_)));
    }
}
