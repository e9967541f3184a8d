//! en2md-core: Core library for converting note-export HTML to Markdown
//!
//! This crate provides:
//! - The style model and its decoding from inline CSS
//! - A formatter that turns styled text into Markdown markers
//! - The tree walker, with table, definition list, link and image handling
//! - A finalizer for whitespace and hard breaks
//! - Metadata extraction and frontmatter rendering
//!
//! The crate performs no I/O; [`Conversion`] carries the text together with
//! the notes and files it references.
//!
//! # Example
//!
//! ```
//! use en2md_core::{ConvertOptions, convert_html};
//!
//! let html = "<html><body><div><b>hi</b> <i>there</i></div></body></html>";
//! let conversion = convert_html(html, &ConvertOptions::default(), None).unwrap();
//! assert_eq!(conversion.text, "**hi** *there*\n");
//! ```

pub mod convert;
pub mod decode;
mod definitions;
pub mod diagnostics;
pub mod error;
pub mod escape;
pub mod finalize;
pub mod format;
pub mod links;
mod media;
pub mod metadata;
pub mod options;
pub mod spans;
pub mod style;
pub mod table;
mod walker;

pub use convert::{Conversion, convert, convert_document, convert_html};
pub use decode::{StyleContext, decode_style};
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
pub use error::{ConvertError, Result};
pub use escape::{escape, unescape};
pub use finalize::{count_code_blocks, finalize};
pub use format::Formatter;
pub use metadata::Metadata;
pub use options::{ConvertOptions, DefinitionStyle, HardBreak, ImageDialect, PreviewMode};
pub use spans::{Span, merge_spans};
pub use style::{Align, CodeMode, LinkTarget, Style};
