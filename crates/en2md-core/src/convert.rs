//! Note to Markdown conversion
//!
//! Entry points that run the whole pipeline over one note: metadata
//! extraction, tree walk, finalization and frontmatter.

use en_html::Document;

use crate::diagnostics::Diagnostics;
use crate::error::{ConvertError, Result};
use crate::finalize::finalize;
use crate::metadata::Metadata;
use crate::options::ConvertOptions;
use crate::walker::Walker;

/// Converted note and everything the driver needs to continue
#[derive(Debug, Clone)]
pub struct Conversion {
    /// Markdown output, frontmatter included
    pub text: String,
    pub metadata: Metadata,
    /// Decoded paths of linked notes, relative to the source note
    pub internal_links: Vec<String>,
    /// Decoded paths of local files to copy
    pub resources: Vec<String>,
    pub diagnostics: Diagnostics,
}

/// Convert a note export with default options
pub fn convert(html: &str) -> Result<Conversion> {
    convert_html(html, &ConvertOptions::default(), None)
}

/// Parse and convert a note export
pub fn convert_html(
    html: &str,
    options: &ConvertOptions,
    hints: Option<&[String]>,
) -> Result<Conversion> {
    convert_document(en_html::parse(html), options, hints)
}

/// Convert a parsed note export
///
/// `hints` lists the language of every fenced code block in order; a count
/// mismatch fails the conversion.
pub fn convert_document(
    mut doc: Document,
    options: &ConvertOptions,
    hints: Option<&[String]>,
) -> Result<Conversion> {
    if doc.body().is_none() {
        return Err(ConvertError::NoBody);
    }

    let metadata = Metadata::extract(&mut doc);
    let body = doc.body().ok_or(ConvertError::NoBody)?;

    let mut walker = Walker::new(options);
    let raw = walker.body(body);
    let body_text = finalize(&raw, options.hard_break, hints)?;

    let Walker {
        mut diagnostics,
        internal_links,
        resources,
        ..
    } = walker;

    let text = if options.frontmatter && !metadata.is_empty() {
        metadata.to_frontmatter(&mut diagnostics) + &body_text
    } else {
        body_text
    };

    Ok(Conversion {
        text,
        metadata,
        internal_links,
        resources,
        diagnostics,
    })
}
