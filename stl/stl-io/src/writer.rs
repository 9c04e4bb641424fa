//! Incremental binary STL encoder.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::warn;

use crate::error::{StlIoError, StlIoResult};
use crate::layout::{StlHeader, TriangleData};

/// Incremental writer for one binary STL file.
///
/// Construction writes the header and the declared triangle count up front.
/// The count isn't strictly enforced against the records actually written —
/// callers may append non-record data at the end, and a wrong count can be
/// patched in place after the file is closed.
///
/// Dropping the writer finalizes it implicitly, so calling
/// [`finalize`](StlWriter::finalize) is optional on the happy path.
#[derive(Debug)]
pub struct StlWriter {
    /// `None` once finalized.
    file: Option<BufWriter<File>>,
}

impl StlWriter {
    /// Create (or truncate) the output file and write the header block and
    /// declared-count field.
    ///
    /// # Errors
    ///
    /// [`StlIoError::EmptyPath`] if `path` is empty; [`StlIoError::Io`] if
    /// the file cannot be created or the initial blocks cannot be written.
    pub fn create<P: AsRef<Path>>(
        path: P,
        header: &StlHeader,
        triangle_count: u32,
    ) -> StlIoResult<Self> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(StlIoError::EmptyPath);
        }

        // On a failed write the handle drops here and the partial file is
        // closed; no guard object needed.
        let mut file = BufWriter::new(File::create(path)?);
        file.write_all(header)?;
        file.write_all(&triangle_count.to_le_bytes())?;

        Ok(Self { file: Some(file) })
    }

    /// Append one triangle record: 48 geometry bytes, then the attribute
    /// byte count, no padding.
    ///
    /// # Errors
    ///
    /// [`StlIoError::Finalized`] if the writer is already finalized;
    /// [`StlIoError::Io`] on write failure.
    pub fn write_triangle(
        &mut self,
        geometry: &TriangleData,
        attribute_byte_count: u16,
    ) -> StlIoResult<()> {
        let file = self.file.as_mut().ok_or(StlIoError::Finalized)?;
        file.write_all(geometry)?;
        file.write_all(&attribute_byte_count.to_le_bytes())?;
        Ok(())
    }

    /// Flush and close the output. Later calls are no-ops.
    ///
    /// # Errors
    ///
    /// [`StlIoError::Io`] if the flush fails.
    pub fn finalize(&mut self) -> StlIoResult<()> {
        if let Some(mut file) = self.file.take() {
            file.flush()?;
        }
        Ok(())
    }

    /// Like [`finalize`](StlWriter::finalize), but writes `trailing` to the
    /// end of the file immediately before closing. Some exporters tack
    /// extra data onto the end of the file; this is the mechanism for
    /// reproducing that.
    ///
    /// No-op if the writer is already finalized.
    ///
    /// # Errors
    ///
    /// [`StlIoError::Io`] if the trailing write or flush fails.
    pub fn finalize_with_trailing(&mut self, trailing: &[u8]) -> StlIoResult<()> {
        if let Some(file) = self.file.as_mut() {
            if !trailing.is_empty() {
                file.write_all(trailing)?;
            }
        }
        self.finalize()
    }

    /// Whether the writer has been finalized.
    #[must_use]
    pub fn is_finalized(&self) -> bool {
        self.file.is_none()
    }
}

impl Drop for StlWriter {
    fn drop(&mut self) {
        if let Some(mut file) = self.file.take() {
            if let Err(err) = file.flush() {
                warn!("failed to flush STL output on drop: {err}");
            }
        }
    }
}
