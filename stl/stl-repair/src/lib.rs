//! Repair filter for binary STL files.
//!
//! [`RepairFilter`] consumes the event stream of an
//! [`StlReader`](stl_io::StlReader) and re-emits a corrected file through an
//! [`StlWriter`](stl_io::StlWriter) it owns, applying an orthogonal set of
//! [`RepairOptions`]. With every option off, the output reproduces the input
//! byte-for-byte.
//!
//! The declared triangle count can only be known to be wrong after the whole
//! file has been read, by which point it has already been written at offset
//! 80. Rather than buffer the entire output in memory to fix one 4-byte
//! field, the filter patches it through a second short-lived handle opened
//! strictly after the main writer has closed.
//!
//! # Example
//!
//! ```no_run
//! use stl_repair::{repair_file, RepairOptions};
//!
//! let options = RepairOptions::default()
//!     .with_zero_header(true)
//!     .with_update_triangle_count(true);
//!
//! let summary = repair_file("broken.stl", "fixed.stl", &options).unwrap();
//! println!("wrote {} triangles", summary.emitted);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod error;
mod filter;

pub use error::{RepairError, RepairResult};
pub use filter::{repair_file, RepairFilter, RepairOptions, RepairSummary};
