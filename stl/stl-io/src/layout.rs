//! Fixed byte layout of the binary STL format.
//!
//! Pure layout contract shared by the reader and writer; no behavior.

/// Size of the opaque file header in bytes.
pub const HEADER_LEN: usize = 80;

/// Size of the declared triangle count field in bytes.
pub const COUNT_LEN: usize = 4;

/// Byte offset of the declared triangle count field.
///
/// The count sits immediately after the header, so this doubles as the seek
/// target for patching the field in place.
pub const COUNT_OFFSET: u64 = HEADER_LEN as u64;

/// Size of one triangle's geometry block (normal + 3 vertices) in bytes.
pub const GEOMETRY_LEN: usize = 48;

/// Size of the per-triangle attribute byte count field in bytes.
pub const ATTRIBUTE_LEN: usize = 2;

/// Size of one full triangle record (geometry + attribute field) in bytes.
pub const TRIANGLE_LEN: usize = GEOMETRY_LEN + ATTRIBUTE_LEN;

/// Smallest file that can plausibly be a binary STL: header, count field,
/// and one full triangle record.
pub const MIN_BINARY_LEN: u64 = (HEADER_LEN + COUNT_LEN + TRIANGLE_LEN) as u64;

/// The opaque 80-byte file header.
pub type StlHeader = [u8; HEADER_LEN];

/// One triangle's geometry, opaque to this crate.
pub type TriangleData = [u8; GEOMETRY_LEN];
