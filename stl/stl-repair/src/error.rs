//! Error types for repair passes.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for repair operations.
pub type RepairResult<T> = Result<T, RepairError>;

/// Errors that can occur during a repair pass.
#[derive(Debug, Error)]
pub enum RepairError {
    /// A codec-level failure while reading the input or writing the output.
    #[error(transparent)]
    Codec(#[from] stl_io::StlIoError),

    /// A triangle or trailing-data event arrived before the output was
    /// opened. Indicates events delivered out of order.
    #[error("no output file opened for writing")]
    OutputNotOpen,

    /// The already-closed output could not be reopened or rewritten to
    /// patch the triangle count field.
    ///
    /// Reported distinctly from ordinary write failures because the main
    /// output has already been committed to disk when this happens.
    #[error("could not update the triangle count in {path}: {source}")]
    CountPatch {
        /// The output file that could not be patched.
        path: PathBuf,
        /// Underlying I/O failure.
        source: std::io::Error,
    },
}
