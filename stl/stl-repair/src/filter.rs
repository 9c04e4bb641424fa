//! The stateful repair filter.

use std::fs::OpenOptions;
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use stl_io::layout::{COUNT_OFFSET, HEADER_LEN};
use stl_io::{ParseError, ParseFlow, StlHeader, StlListener, StlReader, StlWriter, TriangleData};

use crate::error::{RepairError, RepairResult};

/// Repair policies for one pass.
///
/// Every option is independent and defaults to off. With all options off,
/// the filter reproduces its input byte-for-byte.
///
/// # Example
///
/// ```
/// use stl_repair::RepairOptions;
///
/// let options = RepairOptions::default()
///     .with_zero_attribute_byte_counts(true)
///     .with_triangle_limit(10_000);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RepairOptions {
    /// Emit an all-zero header instead of copying the input's header.
    pub zero_header: bool,

    /// Force every triangle's attribute byte count to zero on output.
    pub zero_attribute_byte_counts: bool,

    /// After the pass, if the number of triangles actually written differs
    /// from the count declared up front, patch the count field in place.
    pub update_triangle_count: bool,

    /// Stop emitting triangle records once this many have been written.
    /// Records beyond the limit are silently dropped.
    pub triangle_limit: Option<u32>,

    /// Drop anomalous/trailing bytes instead of copying them to the output.
    pub clear_trailing_data: bool,
}

impl RepairOptions {
    /// Set whether the output header is zero-filled.
    #[must_use]
    pub fn with_zero_header(mut self, enabled: bool) -> Self {
        self.zero_header = enabled;
        self
    }

    /// Set whether attribute byte counts are forced to zero.
    #[must_use]
    pub fn with_zero_attribute_byte_counts(mut self, enabled: bool) -> Self {
        self.zero_attribute_byte_counts = enabled;
        self
    }

    /// Set whether the declared count is patched after the pass.
    #[must_use]
    pub fn with_update_triangle_count(mut self, enabled: bool) -> Self {
        self.update_triangle_count = enabled;
        self
    }

    /// Cap the number of triangle records written to the output.
    #[must_use]
    pub fn with_triangle_limit(mut self, limit: u32) -> Self {
        self.triangle_limit = Some(limit);
        self
    }

    /// Set whether anomalous/trailing bytes are dropped.
    #[must_use]
    pub fn with_clear_trailing_data(mut self, enabled: bool) -> Self {
        self.clear_trailing_data = enabled;
        self
    }
}

/// What one repair pass did, for reporting.
#[derive(Debug, Clone, Copy, Default)]
pub struct RepairSummary {
    /// Triangle count declared by the input file.
    pub declared: u32,
    /// Full records encountered within the declared count.
    pub seen: u32,
    /// Records actually written to the output.
    pub emitted: u32,
    /// Anomalous/trailing bytes carried over to the output.
    pub trailing_bytes: usize,
    /// Whether the output's count field was patched after close.
    pub count_patched: bool,
}

/// A [`StlListener`] that relays reader events into a corrected output file.
///
/// The filter owns exactly one [`StlWriter`], created when the declared
/// count event arrives and finalized at end-of-parse. Trailing data is
/// buffered in memory and emitted as the very last bytes of the output.
#[derive(Debug)]
pub struct RepairFilter {
    output_path: PathBuf,
    options: RepairOptions,
    /// Retained header; starts zero-filled so `zero_header` just keeps it.
    header: StlHeader,
    writer: Option<StlWriter>,
    declared: u32,
    seen: u32,
    emitted: u32,
    trailing: Vec<u8>,
    count_patched: bool,
}

impl RepairFilter {
    /// Create a filter that will write its corrected output to
    /// `output_path`.
    ///
    /// # Errors
    ///
    /// [`stl_io::StlIoError::EmptyPath`] (wrapped in
    /// [`RepairError::Codec`]) if the output path is empty. The output file
    /// itself is not created until the declared-count event arrives.
    pub fn new<P: Into<PathBuf>>(output_path: P, options: RepairOptions) -> RepairResult<Self> {
        let output_path = output_path.into();
        if output_path.as_os_str().is_empty() {
            return Err(stl_io::StlIoError::EmptyPath.into());
        }

        Ok(Self {
            output_path,
            options,
            header: [0u8; HEADER_LEN],
            writer: None,
            declared: 0,
            seen: 0,
            emitted: 0,
            trailing: Vec::new(),
            count_patched: false,
        })
    }

    /// Summary of the pass so far.
    #[must_use]
    pub fn summary(&self) -> RepairSummary {
        RepairSummary {
            declared: self.declared,
            seen: self.seen,
            emitted: self.emitted,
            trailing_bytes: self.trailing.len(),
            count_patched: self.count_patched,
        }
    }

    /// Overwrite the count field of the now-closed output in place.
    ///
    /// Opens a second, independent handle; sequenced strictly after the
    /// main writer's close.
    fn patch_triangle_count(&mut self) -> RepairResult<()> {
        let patch = |path: &Path, emitted: u32| -> std::io::Result<()> {
            let mut file = OpenOptions::new().read(true).write(true).open(path)?;
            file.seek(SeekFrom::Start(COUNT_OFFSET))?;
            file.write_all(&emitted.to_le_bytes())
        };

        patch(&self.output_path, self.emitted).map_err(|source| RepairError::CountPatch {
            path: self.output_path.clone(),
            source,
        })?;

        info!(
            declared = self.declared,
            emitted = self.emitted,
            "patched triangle count field"
        );
        self.count_patched = true;
        Ok(())
    }
}

impl StlListener for RepairFilter {
    type Error = RepairError;

    fn on_header(&mut self, header: &StlHeader) -> Result<ParseFlow, Self::Error> {
        if !self.options.zero_header {
            self.header = *header;
        }
        Ok(ParseFlow::Continue)
    }

    fn on_triangle_count(&mut self, count: u32) -> Result<ParseFlow, Self::Error> {
        // The declared count goes out as-is; it is provisional and may be
        // patched after the writer closes.
        self.writer = Some(StlWriter::create(&self.output_path, &self.header, count)?);
        self.declared = count;
        Ok(ParseFlow::Continue)
    }

    fn on_triangle(
        &mut self,
        geometry: &TriangleData,
        attribute_byte_count: u16,
    ) -> Result<ParseFlow, Self::Error> {
        self.seen += 1;

        if let Some(limit) = self.options.triangle_limit {
            if self.emitted >= limit {
                debug!(limit, "triangle limit reached, dropping record");
                return Ok(ParseFlow::Continue);
            }
        }

        let writer = self.writer.as_mut().ok_or(RepairError::OutputNotOpen)?;
        let attribute = if self.options.zero_attribute_byte_counts {
            0
        } else {
            attribute_byte_count
        };
        writer.write_triangle(geometry, attribute)?;
        self.emitted += 1;
        Ok(ParseFlow::Continue)
    }

    fn on_unknown_data(&mut self, data: &[u8]) -> Result<ParseFlow, Self::Error> {
        if self.writer.is_none() {
            return Err(RepairError::OutputNotOpen);
        }

        if self.options.clear_trailing_data {
            debug!(bytes = data.len(), "dropping anomalous data");
        } else {
            self.trailing.extend_from_slice(data);
        }
        Ok(ParseFlow::Continue)
    }

    fn on_end(&mut self) -> Result<(), Self::Error> {
        // The parse may have stopped or failed before the count event; in
        // that case there is nothing to finalize and the reader's own error
        // is the one that matters.
        let Some(writer) = self.writer.as_mut() else {
            return Ok(());
        };

        writer.finalize_with_trailing(&self.trailing)?;

        if self.options.update_triangle_count && self.emitted != self.declared {
            self.patch_triangle_count()?;
        }
        Ok(())
    }
}

/// Run one full repair pass: read `input`, filter, write `output`.
///
/// # Errors
///
/// Any codec failure on either file, or [`RepairError::CountPatch`] if the
/// post-pass count patch cannot be applied.
pub fn repair_file<P, Q>(input: P, output: Q, options: &RepairOptions) -> RepairResult<RepairSummary>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let mut reader = StlReader::open(input)?;
    let mut filter = RepairFilter::new(output.as_ref(), options.clone())?;

    reader.parse(&mut filter).map_err(|err| match err {
        ParseError::Codec(e) => RepairError::Codec(e),
        ParseError::Listener(e) => e,
    })?;

    Ok(filter.summary())
}
