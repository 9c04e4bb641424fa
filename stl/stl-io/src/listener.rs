//! Push-based consumer interface for the reader.

use crate::layout::{StlHeader, TriangleData};

/// Control-flow signal returned from listener callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseFlow {
    /// Keep decoding.
    Continue,
    /// Stop decoding immediately. The end notification still fires.
    Stop,
}

impl ParseFlow {
    /// Returns `true` for [`ParseFlow::Stop`].
    #[must_use]
    pub fn is_stop(self) -> bool {
        matches!(self, ParseFlow::Stop)
    }
}

/// Consumer of [`StlReader`](crate::StlReader) decode events.
///
/// Every callback has a default "continue, do nothing" implementation, so
/// implementers only override the events they care about. Returning
/// [`ParseFlow::Stop`] from any callback abandons further decoding;
/// [`on_end`](StlListener::on_end) is still invoked exactly once per parse,
/// on every exit path.
pub trait StlListener {
    /// Error type produced by callbacks. Use [`std::convert::Infallible`]
    /// for listeners that cannot fail.
    type Error;

    /// Called when parsing begins, before any bytes are read.
    fn on_begin(&mut self) -> Result<ParseFlow, Self::Error> {
        Ok(ParseFlow::Continue)
    }

    /// Called when the 80-byte file header has been read.
    fn on_header(&mut self, header: &StlHeader) -> Result<ParseFlow, Self::Error> {
        let _ = header;
        Ok(ParseFlow::Continue)
    }

    /// Called when the declared triangle count has been read.
    ///
    /// The declared count is what the file claims, which may not match the
    /// number of records actually present.
    fn on_triangle_count(&mut self, count: u32) -> Result<ParseFlow, Self::Error> {
        let _ = count;
        Ok(ParseFlow::Continue)
    }

    /// Called for each full triangle record within the declared count.
    ///
    /// The geometry is an opaque 48-byte blob; the attribute byte count is
    /// the record's trailing 16-bit field.
    fn on_triangle(
        &mut self,
        geometry: &TriangleData,
        attribute_byte_count: u16,
    ) -> Result<ParseFlow, Self::Error> {
        let _ = (geometry, attribute_byte_count);
        Ok(ParseFlow::Continue)
    }

    /// Called for any byte run that does not decode as a triangle record.
    ///
    /// This covers both a trailing partial record and full records beyond
    /// the declared count. It is an ordinary event, not an error — some
    /// exporters append vendor-specific payloads.
    fn on_unknown_data(&mut self, data: &[u8]) -> Result<ParseFlow, Self::Error> {
        let _ = data;
        Ok(ParseFlow::Continue)
    }

    /// Called when parsing ends.
    ///
    /// Guaranteed to run exactly once per parse, even after an early stop
    /// or a propagated error.
    fn on_end(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}
