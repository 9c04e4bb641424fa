//! Push-based binary STL decoder.

use std::fs::File;
use std::io::{BufReader, ErrorKind, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{ParseError, StlIoError, StlIoResult};
use crate::layout::{
    COUNT_LEN, COUNT_OFFSET, GEOMETRY_LEN, HEADER_LEN, MIN_BINARY_LEN, TRIANGLE_LEN,
};
use crate::listener::{ParseFlow, StlListener};

/// Streaming decoder for one binary STL file.
///
/// The reader exclusively owns its input handle. [`parse`](StlReader::parse)
/// rewinds to the start of the file each time, so a reader can drive more
/// than one pass.
#[derive(Debug)]
pub struct StlReader {
    file: BufReader<File>,
}

impl StlReader {
    /// Open a binary STL file for decoding.
    ///
    /// # Errors
    ///
    /// - [`StlIoError::EmptyPath`] if `path` is empty
    /// - [`StlIoError::FileNotFound`] if the file does not exist
    /// - [`StlIoError::FileTooSmall`] if the file is smaller than
    ///   [`MIN_BINARY_LEN`] (header + count + one full record)
    /// - [`StlIoError::Io`] for any other open failure
    pub fn open<P: AsRef<Path>>(path: P) -> StlIoResult<Self> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(StlIoError::EmptyPath);
        }

        let size = file_size(path)?;
        if size < MIN_BINARY_LEN {
            return Err(StlIoError::FileTooSmall {
                size,
                minimum: MIN_BINARY_LEN,
            });
        }

        let file = File::open(path)?;
        Ok(Self {
            file: BufReader::new(file),
        })
    }

    /// Decode the file, pushing events to `listener`.
    ///
    /// Event order: `on_begin`, `on_header`, `on_triangle_count`, then one
    /// `on_triangle` per full record within the declared count. Bytes that
    /// do not decode as a record — a trailing partial record, or full
    /// records beyond the declared count — arrive through
    /// `on_unknown_data`. Any callback may return [`ParseFlow::Stop`] to
    /// abandon decoding.
    ///
    /// `on_end` is invoked exactly once per call, on every exit path. When
    /// both the decode body and `on_end` fail, the body's error wins.
    ///
    /// # Errors
    ///
    /// [`ParseError::Codec`] if the header or count field cannot be read in
    /// full or the underlying stream fails; [`ParseError::Listener`] if a
    /// callback fails.
    pub fn parse<L: StlListener>(&mut self, listener: &mut L) -> Result<(), ParseError<L::Error>>
    where
        L::Error: std::error::Error + 'static,
    {
        let body = self.parse_events(listener);
        let end = listener.on_end().map_err(ParseError::Listener);
        // First error wins; on_end has already run either way.
        body.and(end)
    }

    fn parse_events<L: StlListener>(
        &mut self,
        listener: &mut L,
    ) -> Result<(), ParseError<L::Error>>
    where
        L::Error: std::error::Error + 'static,
    {
        self.file
            .seek(SeekFrom::Start(0))
            .map_err(StlIoError::from)?;

        if listener.on_begin().map_err(ParseError::Listener)?.is_stop() {
            return Ok(());
        }

        let mut header = [0u8; HEADER_LEN];
        read_exact_or(&mut self.file, &mut header, "file header")?;
        if listener
            .on_header(&header)
            .map_err(ParseError::Listener)?
            .is_stop()
        {
            return Ok(());
        }

        let mut count_bytes = [0u8; COUNT_LEN];
        read_exact_or(&mut self.file, &mut count_bytes, "triangle count")?;
        let declared_count = u32::from_le_bytes(count_bytes);
        debug!(declared_count, "decoded triangle count field");
        if listener
            .on_triangle_count(declared_count)
            .map_err(ParseError::Listener)?
            .is_stop()
        {
            return Ok(());
        }

        self.parse_triangles(listener, declared_count)
    }

    /// Record loop. A short read and an exhausted declared count both route
    /// to `on_unknown_data`; the single mechanism covers files with too
    /// few, too many, or fractionally-sized trailing records.
    fn parse_triangles<L: StlListener>(
        &mut self,
        listener: &mut L,
        declared_count: u32,
    ) -> Result<(), ParseError<L::Error>>
    where
        L::Error: std::error::Error + 'static,
    {
        let mut emitted: u32 = 0;
        let mut record = [0u8; TRIANGLE_LEN];

        loop {
            let got = read_full(&mut self.file, &mut record).map_err(StlIoError::from)?;

            let flow = if got == 0 {
                // Clean end of stream.
                return Ok(());
            } else if got < TRIANGLE_LEN {
                debug!(bytes = got, "trailing partial record");
                listener
                    .on_unknown_data(&record[..got])
                    .map_err(ParseError::Listener)?;
                // Nothing left to read after a short fill.
                return Ok(());
            } else if emitted >= declared_count {
                // Full record beyond the declared count. Once the count is
                // exhausted, nothing is re-interpreted as geometry.
                listener
                    .on_unknown_data(&record)
                    .map_err(ParseError::Listener)?
            } else {
                let mut geometry = [0u8; GEOMETRY_LEN];
                geometry.copy_from_slice(&record[..GEOMETRY_LEN]);
                let attribute_byte_count =
                    u16::from_le_bytes([record[GEOMETRY_LEN], record[GEOMETRY_LEN + 1]]);
                emitted += 1;
                listener
                    .on_triangle(&geometry, attribute_byte_count)
                    .map_err(ParseError::Listener)?
            };

            if flow.is_stop() {
                return Ok(());
            }
        }
    }
}

/// Read the declared triangle count field without a full parse.
///
/// # Errors
///
/// Same preconditions as [`StlReader::open`], plus
/// [`StlIoError::ShortRead`] if the count field is truncated.
pub fn read_declared_triangle_count<P: AsRef<Path>>(path: P) -> StlIoResult<u32> {
    let path = path.as_ref();
    if path.as_os_str().is_empty() {
        return Err(StlIoError::EmptyPath);
    }

    let mut file = File::open(path).map_err(|e| not_found_or_io(e, path))?;
    file.seek(SeekFrom::Start(COUNT_OFFSET))?;

    let mut count_bytes = [0u8; COUNT_LEN];
    let got = read_full(&mut file, &mut count_bytes)?;
    if got < COUNT_LEN {
        return Err(StlIoError::ShortRead {
            section: "triangle count",
        });
    }
    Ok(u32::from_le_bytes(count_bytes))
}

/// Number of full triangle records implied purely by the file's size,
/// ignoring the declared count field.
///
/// # Errors
///
/// [`StlIoError::EmptyPath`] / [`StlIoError::FileNotFound`] / [`StlIoError::Io`].
#[allow(clippy::cast_possible_truncation)]
// Truncation: a file large enough to overflow u32 records exceeds 200 GiB.
pub fn calculate_triangle_count<P: AsRef<Path>>(path: P) -> StlIoResult<u32> {
    let path = path.as_ref();
    if path.as_os_str().is_empty() {
        return Err(StlIoError::EmptyPath);
    }

    let size = file_size(path)?;
    let payload = size.saturating_sub((HEADER_LEN + COUNT_LEN) as u64);
    Ok((payload / TRIANGLE_LEN as u64) as u32)
}

/// Number of bytes beyond the records promised by the declared count.
///
/// Returns 0 when the declared count overshoots the actual file size.
///
/// # Errors
///
/// Same conditions as [`read_declared_triangle_count`].
pub fn extra_data_len<P: AsRef<Path>>(path: P) -> StlIoResult<u64> {
    let path = path.as_ref();
    let declared = u64::from(read_declared_triangle_count(path)?);
    let size = file_size(path)?;
    let expected = (HEADER_LEN + COUNT_LEN) as u64 + declared * TRIANGLE_LEN as u64;
    Ok(size.saturating_sub(expected))
}

fn file_size(path: &Path) -> StlIoResult<u64> {
    let metadata = std::fs::metadata(path).map_err(|e| not_found_or_io(e, path))?;
    Ok(metadata.len())
}

fn not_found_or_io(err: std::io::Error, path: &Path) -> StlIoError {
    if err.kind() == ErrorKind::NotFound {
        StlIoError::FileNotFound {
            path: PathBuf::from(path),
        }
    } else {
        StlIoError::Io(err)
    }
}

/// Fill `buf` as far as the stream allows. Returns the number of bytes
/// actually read, which is short only at end of stream.
pub(crate) fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

fn read_exact_or<R: Read, E>(
    reader: &mut R,
    buf: &mut [u8],
    section: &'static str,
) -> Result<(), ParseError<E>>
where
    E: std::error::Error + 'static,
{
    let got = read_full(reader, buf).map_err(StlIoError::from)?;
    if got < buf.len() {
        return Err(ParseError::Codec(StlIoError::ShortRead { section }));
    }
    Ok(())
}
