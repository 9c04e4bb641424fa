//! Error types for the binary STL codec.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for codec operations.
pub type StlIoResult<T> = Result<T, StlIoError>;

/// Errors that can occur while decoding or encoding a binary STL file.
#[derive(Debug, Error)]
pub enum StlIoError {
    /// An empty path was supplied.
    #[error("STL path cannot be empty")]
    EmptyPath,

    /// Input file not found.
    #[error("STL file does not exist: {path}")]
    FileNotFound {
        /// Path that was not found.
        path: PathBuf,
    },

    /// Input file is too small to be a binary STL.
    #[error("file is {size} bytes, below the binary STL minimum of {minimum}")]
    FileTooSmall {
        /// Actual file size in bytes.
        size: u64,
        /// Minimum plausible binary STL size.
        minimum: u64,
    },

    /// A required fixed-size block could not be read in full.
    #[error("could not read the {section}: unexpected end of file")]
    ShortRead {
        /// Which block came up short ("file header" or "triangle count").
        section: &'static str,
    },

    /// A write was attempted on an already-finalized writer.
    ///
    /// This indicates caller misuse rather than an environmental failure.
    #[error("writer is already finalized")]
    Finalized,

    /// I/O error from the standard library.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error returned by [`StlReader::parse`](crate::StlReader::parse).
///
/// Keeps codec failures and listener failures distinct so a consumer's own
/// error type propagates out of the parse unmasked.
#[derive(Debug, Error)]
pub enum ParseError<E>
where
    E: std::error::Error + 'static,
{
    /// The decoder itself failed.
    #[error(transparent)]
    Codec(#[from] StlIoError),

    /// A listener callback failed.
    #[error(transparent)]
    Listener(E),
}
