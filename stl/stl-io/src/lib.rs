//! Streaming codec for binary STL files.
//!
//! This crate decodes and encodes the fixed-layout binary STL format at the
//! record level. Triangles are treated as opaque 48-byte blobs plus a 16-bit
//! attribute byte count; nothing here interprets normals or vertices.
//!
//! # Binary Format
//!
//! ```text
//! UINT8[80]    – Header (opaque, often contains exporter info)
//! UINT32       – Declared triangle count
//! foreach triangle
//!     UINT8[48] – Geometry (normal + 3 vertices, opaque here)
//!     UINT16    – Attribute byte count
//! end
//! optional trailing bytes of unspecified length
//! ```
//!
//! All integers are little-endian.
//!
//! # Push-based decoding
//!
//! [`StlReader::parse`] walks the file once and pushes events to a
//! [`StlListener`]: begin, header, declared count, each triangle, any
//! anomalous byte run, end. A listener can stop the parse early by returning
//! [`ParseFlow::Stop`]; the end notification still fires exactly once on
//! every exit path.
//!
//! Anomalous data is not an error. Bytes that do not align to a full record,
//! or records beyond the declared count, arrive through
//! [`StlListener::on_unknown_data`] — exporters tack vendor payloads onto
//! the end of these files often enough that it has to be treated as normal
//! input.
//!
//! # Example
//!
//! ```no_run
//! use stl_io::{ParseFlow, StlListener, StlReader, TriangleData};
//! use std::convert::Infallible;
//!
//! struct Counter(u32);
//!
//! impl StlListener for Counter {
//!     type Error = Infallible;
//!
//!     fn on_triangle(
//!         &mut self,
//!         _geometry: &TriangleData,
//!         _attribute_byte_count: u16,
//!     ) -> Result<ParseFlow, Self::Error> {
//!         self.0 += 1;
//!         Ok(ParseFlow::Continue)
//!     }
//! }
//!
//! let mut reader = StlReader::open("model.stl").unwrap();
//! let mut counter = Counter(0);
//! reader.parse(&mut counter).unwrap();
//! println!("{} triangles present", counter.0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod error;
pub mod layout;
mod listener;
mod reader;
mod sniff;
mod writer;

pub use error::{ParseError, StlIoError, StlIoResult};
pub use layout::{StlHeader, TriangleData};
pub use listener::{ParseFlow, StlListener};
pub use reader::{
    calculate_triangle_count, extra_data_len, read_declared_triangle_count, StlReader,
};
pub use sniff::{determine_file_type, StlFileType};
pub use writer::StlWriter;
