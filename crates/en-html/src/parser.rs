//! Parsing entry points
//!
//! Note exports are HTML documents written by the note application. They are
//! parsed leniently with html5ever, so malformed markup is repaired the way a
//! browser would repair it rather than rejected.

use html5ever::driver::ParseOpts;
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;

use crate::dom::Document;
use crate::sink::ScratchSink;

/// UTF-8 byte-order marker
const BOM: &[u8] = b"\xEF\xBB\xBF";

/// Parse error
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Invalid UTF-8 at byte {offset}")]
    InvalidUtf8 { offset: usize },
}

/// Result type for parsing
pub type ParseResult<T> = Result<T, ParseError>;

/// Parse an HTML document from a string
pub fn parse(source: &str) -> Document {
    let sink = parse_document(ScratchSink::new(), ParseOpts::default())
        .from_utf8()
        .one(source.as_bytes());
    sink.into_document()
}

/// Parse an HTML document from raw bytes
///
/// A leading byte-order marker is tolerated. Input that is not valid UTF-8
/// is rejected instead of being decoded lossily.
pub fn parse_bytes(bytes: &[u8]) -> ParseResult<Document> {
    let bytes = bytes.strip_prefix(BOM).unwrap_or(bytes);
    let source = std::str::from_utf8(bytes).map_err(|e| ParseError::InvalidUtf8 {
        offset: e.valid_up_to(),
    })?;
    Ok(parse(source))
}
