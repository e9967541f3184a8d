//! Span merger
//!
//! Consolidates a run of inline spans so that formatting shared by all of
//! them is emitted once around the whole run instead of around every
//! fragment.

use crate::format::Formatter;
use crate::style::{CodeMode, Style};

/// A contiguous run of inline text sharing one style
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub style: Style,
}

impl Span {
    pub fn new(text: impl Into<String>, style: Style) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }
}

/// Render a run of spans as one string
pub fn merge_spans(formatter: &mut Formatter<'_>, spans: &[Span]) -> String {
    let Some((first, rest)) = spans.split_first() else {
        return String::new();
    };
    if rest.is_empty() {
        return formatter.format(&first.text, &first.style);
    }

    if rest.iter().all(|s| s.style == first.style) {
        let text: String = spans.iter().map(|s| s.text.as_str()).collect();
        return formatter.format(&text, &first.style);
    }

    let mut base = rest
        .iter()
        .fold(first.style.clone(), |acc, s| acc.intersection(&s.style));
    let chunk: String = spans
        .iter()
        .map(|s| formatter.format(&s.text, &s.style.difference(&base)))
        .collect();

    // Inner fragments already carry literal markers
    if base.code.is_some() {
        base.code = Some(CodeMode::Raw);
    }
    formatter.format(&chunk, &base)
}
