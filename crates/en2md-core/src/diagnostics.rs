//! Recoverable conversion conditions
//!
//! The converter never aborts for these; each one is recorded and mirrored
//! to the `log` facade so the driver can decide how loudly to report them.

use serde::Serialize;

/// Kind of a recovered condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticKind {
    /// Element without a dispatch rule, passed through as text
    UnknownTag,
    /// Definition list not starting with a term
    InvalidDefinitionList,
    /// Anchor with an empty or placeholder target
    EmptyLink,
    /// Font family outside the known set
    UnknownFont,
    /// Code that is empty after cleaning
    EmptyCode,
    /// External link colored like an internal one
    UnresolvedInternalLink,
    /// Image pointing to a remote location
    ExternalImage,
    /// Date in the metadata table that does not match the export format
    InvalidDate,
    /// Linked italics without underline, underline added
    LinkInItalics,
}

impl DiagnosticKind {
    /// Whether this is informational rather than a degraded conversion
    pub fn is_info(self) -> bool {
        matches!(self, Self::LinkInItalics)
    }
}

/// A single recovered condition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
}

/// Diagnostics collected while converting one document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a condition and mirror it to the log
    pub fn push(&mut self, kind: DiagnosticKind, message: impl Into<String>) {
        let message = message.into();
        if kind.is_info() {
            log::debug!("{message}");
        } else {
            log::warn!("{message}");
        }
        self.items.push(Diagnostic { kind, message });
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.items.iter()
    }

    /// Number of recorded conditions of one kind
    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.items.iter().filter(|d| d.kind == kind).count()
    }

    /// Number of conditions that degraded the output
    pub fn warnings(&self) -> usize {
        self.items.iter().filter(|d| !d.kind.is_info()).count()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
