//! Fatal conversion errors
//!
//! These abort the current document. Recoverable conditions are reported
//! through [`crate::Diagnostics`] instead.

/// Errors that abort the conversion of a document
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConvertError {
    #[error("No content found: the document has no body")]
    NoBody,

    #[error("Unknown image mode: {0} (expected html, markdown or embed)")]
    UnknownImageDialect(String),

    #[error("Unknown preview mode: {0} (expected no, link or image)")]
    UnknownPreviewMode(String),

    #[error("Unknown definition list style: {0} (expected markdown or html)")]
    UnknownDefinitionStyle(String),

    #[error("Unknown hard break marker: {0} (expected backslash or html)")]
    UnknownHardBreak(String),

    #[error("Code block count mismatch: {expected} language hints for {found} code blocks")]
    CodeHintMismatch { expected: usize, found: usize },
}

/// Result type for conversion
pub type Result<T> = std::result::Result<T, ConvertError>;
