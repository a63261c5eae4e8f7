use std::io;
use thiserror::Error;

/// Errors that can occur while reading an Icon Archiver file.
#[derive(Error, Debug)]
pub enum ArchiveError {
    /// The file is not an Icon Archiver file (wrong or missing magic).
    #[error("not an Icon Archiver file: {0}")]
    UnsupportedFormat(&'static str),

    /// The file is an Icon Archiver file of a version this crate can't read.
    #[error("unsupported Icon Archiver version {0}")]
    UnsupportedVersion(u16),

    /// An icon record's payload could not be decompressed, or it is
    /// structurally inconsistent.
    #[error("decompression failed: {0}")]
    DecompressionFailed(String),

    /// An icon record decompressed to a different size than it declares.
    #[error("decompressed icon is {actual} bytes instead of {expected}")]
    SizeMismatch {
        /// The size declared by the record.
        expected: usize,
        /// The size actually produced.
        actual: usize,
    },

    /// A version 2 icon record that contains no icon types at all.
    #[error("icon record contains no icons")]
    EmptyIcon,

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl ArchiveError {
    /// Returns true if the error concerns the whole archive, rather than a
    /// single icon record that can be skipped.
    pub fn is_fatal(&self) -> bool {
        match *self {
            ArchiveError::UnsupportedFormat(_) |
            ArchiveError::UnsupportedVersion(_) |
            ArchiveError::Io(_) => true,
            ArchiveError::DecompressionFailed(_) |
            ArchiveError::SizeMismatch { .. } |
            ArchiveError::EmptyIcon => false,
        }
    }

    /// Wraps a codec-level error as a per-record decompression failure.
    pub(crate) fn corrupt(error: io::Error) -> ArchiveError {
        ArchiveError::DecompressionFailed(error.to_string())
    }
}
