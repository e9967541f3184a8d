//! en-html: Parser for note-export HTML files
//!
//! This crate provides:
//! - An html5ever tree sink
//! - The owned document tree consumed by the converter
//! - Tag-kind classification
//!
//! # Example
//!
//! ```
//! use en_html::{parse, TagKind};
//!
//! let doc = parse("<html><body><h1>Trip</h1><div>Day one</div></body></html>");
//! let body = doc.body().unwrap();
//! assert_eq!(body.child_elements().next().unwrap().kind(), TagKind::Heading(1));
//! ```

pub mod dom;
pub mod parser;
pub mod sink;

// Re-export main types for convenient access
pub use dom::{Attribute, Document, Element, Node, TagKind};
pub use parser::{ParseError, ParseResult, parse, parse_bytes};

/// Serialize a document tree to pretty JSON (for debugging and snapshots)
#[cfg(feature = "json")]
pub fn to_json(doc: &Document) -> serde_json::Result<String> {
    serde_json::to_string_pretty(doc)
}
