//! Coarse ASCII/binary dialect detection.

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{StlIoError, StlIoResult};
use crate::layout::MIN_BINARY_LEN;
use crate::reader::read_full;

/// Leading signature of the ASCII dialect.
const ASCII_SIGNATURE: &[u8; 5] = b"solid";

/// Result of the file-type sniff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StlFileType {
    /// Too small or otherwise implausible as either dialect.
    Unknown,
    /// Starts with the ASCII `solid` signature.
    Ascii,
    /// Plausible binary STL.
    Binary,
}

impl fmt::Display for StlFileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StlFileType::Unknown => "UNKNOWN",
            StlFileType::Ascii => "ASCII",
            StlFileType::Binary => "BINARY",
        };
        f.write_str(name)
    }
}

/// Heuristically determine an STL file's dialect.
///
/// A file opening with `solid` is classified ASCII — the most likely
/// candidate, though a misbehaving exporter can produce a binary file that
/// happens to start that way. Anything else large enough to hold at least
/// one record is classified binary.
///
/// # Errors
///
/// [`StlIoError::EmptyPath`] if `path` is empty;
/// [`StlIoError::FileNotFound`] / [`StlIoError::Io`] if it cannot be opened.
pub fn determine_file_type<P: AsRef<Path>>(path: P) -> StlIoResult<StlFileType> {
    let path = path.as_ref();
    if path.as_os_str().is_empty() {
        return Err(StlIoError::EmptyPath);
    }

    let metadata = std::fs::metadata(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            StlIoError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            StlIoError::Io(e)
        }
    })?;

    let mut file = File::open(path)?;
    let mut signature = [0u8; ASCII_SIGNATURE.len()];
    let got = read_full(&mut file, &mut signature)?;

    if got < signature.len() {
        // Way too small to be an STL file of either dialect.
        return Ok(StlFileType::Unknown);
    }

    if &signature == ASCII_SIGNATURE {
        return Ok(StlFileType::Ascii);
    }

    if metadata.len() < MIN_BINARY_LEN {
        return Ok(StlFileType::Unknown);
    }

    Ok(StlFileType::Binary)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::layout::{COUNT_LEN, HEADER_LEN, TRIANGLE_LEN};

    fn write_file(dir: &tempfile::TempDir, name: &str, bytes: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, bytes).unwrap();
        path
    }

    #[test]
    fn ascii_signature_wins_regardless_of_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "a.stl", b"solid teapot\nendsolid teapot\n");
        assert_eq!(determine_file_type(&path).unwrap(), StlFileType::Ascii);
    }

    #[test]
    fn plausible_binary_file_is_binary() {
        let dir = tempfile::tempdir().unwrap();
        let mut bytes = vec![0u8; HEADER_LEN + COUNT_LEN + TRIANGLE_LEN];
        bytes[0] = 0xFF;
        let path = write_file(&dir, "b.stl", &bytes);
        assert_eq!(determine_file_type(&path).unwrap(), StlFileType::Binary);
    }

    #[test]
    fn tiny_file_is_unknown() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "c.stl", b"sol");
        assert_eq!(determine_file_type(&path).unwrap(), StlFileType::Unknown);
    }

    #[test]
    fn undersized_non_ascii_file_is_unknown() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "d.stl", &[0xFFu8; 100]);
        assert_eq!(determine_file_type(&path).unwrap(), StlFileType::Unknown);
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = determine_file_type("/no/such/file.stl").unwrap_err();
        assert!(matches!(err, StlIoError::FileNotFound { .. }));
    }

    #[test]
    fn display_names_match_the_classic_tool() {
        assert_eq!(StlFileType::Ascii.to_string(), "ASCII");
        assert_eq!(StlFileType::Binary.to_string(), "BINARY");
        assert_eq!(StlFileType::Unknown.to_string(), "UNKNOWN");
    }
}
