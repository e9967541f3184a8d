//! Formatter: style to Markdown markers
//!
//! [`Formatter::format`] wraps a piece of already-escaped text in the markers
//! of a [`Style`]. Attributes are applied in a fixed order, innermost first:
//! abbreviation, superscript, subscript, underline, strikethrough, color,
//! italic, bold, highlight, alignment and finally the link.

use std::sync::LazyLock;

use percent_encoding::percent_decode_str;
use regex::Regex;

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::escape::unescape;
use crate::options::ConvertOptions;
use crate::style::{CodeMode, LinkTarget, Style};

static HEADING_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#+ ").expect("valid regex"));

const DEFAULT_COLORS: &[&str] = &["rgb(0,0,0)", "black", "#000", "#000000"];

/// Characters that make the compact `[[...]]` form ambiguous
const WIKILINK_UNSAFE: &[char] = &['/', '<', '*', '~', '`', '[', ']', '|'];

/// Whitespace as seen by the formatter (includes the non-breaking space)
pub fn is_ws(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0b' | '\x0c' | '\u{a0}')
}

/// Whether the text holds anything besides whitespace
pub fn has_content(s: &str) -> bool {
    s.chars().any(|c| !is_ws(c))
}

/// Clean the content of code: non-breaking spaces become spaces, the result
/// is trimmed and unescaped.
pub fn clean_code(s: &str) -> String {
    let s = s.replace("&nbsp;", " ").replace('\u{a0}', " ");
    unescape(s.trim())
}

/// Applies styles to text
pub struct Formatter<'a> {
    options: &'a ConvertOptions,
    diagnostics: &'a mut Diagnostics,
}

impl<'a> Formatter<'a> {
    pub fn new(options: &'a ConvertOptions, diagnostics: &'a mut Diagnostics) -> Self {
        Self {
            options,
            diagnostics,
        }
    }

    /// Wrap `text` in the markers of `style`
    pub fn format(&mut self, text: &str, style: &Style) -> String {
        if style.is_empty() || !has_content(text) {
            return text.to_string();
        }

        let core = text.trim_matches(is_ws);
        if core.len() != text.len() {
            // Markers must not open or close on whitespace
            let start = text.len() - text.trim_start_matches(is_ws).len();
            let end = start + core.len();
            let inner = self.format(core, style);
            return format!("{}{}{}", &text[..start], inner, &text[end..]);
        }

        if let Some(level) = style.heading {
            return heading(text, level);
        }

        if let Some(lang) = &style.codeblock {
            return format!("\n\n```{lang}\n{}\n```\n\n", clean_code(text));
        }

        let mut style = style.clone();
        let mut s = text.to_string();

        if let Some(mode) = style.code {
            s = clean_code(&s);
            if s.is_empty() {
                self.diagnostics
                    .push(DiagnosticKind::EmptyCode, "Empty code detected");
                return String::new();
            }
            s = match mode {
                CodeMode::Raw => format!("<code>{s}</code>"),
                CodeMode::Inline => inline_code(&s),
            };
        }

        if style.color.as_deref().is_some_and(is_default_color) {
            style.color = None;
        }

        let mut head = String::new();
        if let Some(m) = HEADING_PREFIX.find(&s) {
            head = m.as_str().to_string();
            s = s[m.end()..].to_string();
        }

        if style.link.is_some() && style.italic && !style.underline {
            style.underline = true;
            self.diagnostics.push(
                DiagnosticKind::LinkInItalics,
                format!("Link in italics without underline: {s}"),
            );
        }

        if let Some(title) = &style.abbr {
            s = format!("<abbr title=\"{title}\">{s}</abbr>");
        }
        if style.superscript {
            s = format!("<sup>{s}</sup>");
        }
        if style.subscript {
            s = format!("<sub>{s}</sub>");
        }
        if style.underline {
            s = format!("<u>{s}</u>");
        }
        if style.strikethrough {
            s = format!("~~{s}~~");
        }
        if let Some(color) = &style.color {
            s = format!("<span style=\"color: {color}\">{s}</span>");
        }
        if style.italic {
            s = emphasis(&s, "*", "_");
        }
        if style.bold {
            s = emphasis(&s, "**", "__");
        }
        if style.highlight.is_some() {
            s = format!("=={s}==");
        }
        if let Some(align) = style.align {
            s = format!(
                "<div align=\"{}\">{}</div>",
                align.as_str(),
                s.replace('\n', "<br>")
            );
        }
        if let Some(link) = &style.link {
            s = self.link(&s, link);
        }

        head + &s
    }

    fn link(&self, s: &str, link: &LinkTarget) -> String {
        match link {
            LinkTarget::Note(target) if self.options.wikilinks && !s.contains(WIKILINK_UNSAFE) => {
                let ext = format!(".{}", self.options.output_extension);
                let stem = target.strip_suffix(&ext).unwrap_or(target);
                let lnk = percent_decode_str(stem).decode_utf8_lossy();
                let display = unescape(s);
                let base = lnk.rsplit('/').next().unwrap_or(lnk.as_ref());
                if display == lnk || display == base {
                    format!("[[{lnk}]]")
                } else {
                    format!("[[{lnk}|{display}]]")
                }
            }
            other => format!("[{s}]({})", other.as_str()),
        }
    }
}

fn heading(text: &str, level: u8) -> String {
    let flat = text.trim().replace('\n', " ");
    format!("\n\n{} {flat}\n\n", "#".repeat(usize::from(level.clamp(1, 6))))
}

fn inline_code(s: &str) -> String {
    if !s.contains('`') {
        return format!("`{s}`");
    }
    let lead = if s.starts_with('`') { " " } else { "" };
    let trail = if s.ends_with('`') { " " } else { "" };
    format!("``{lead}{s}{trail}``")
}

// Switch delimiters when the content already touches a `*`, otherwise the
// boundary reads as `***` or `****`
fn emphasis(s: &str, marker: &str, alternate: &str) -> String {
    let marker = if s.starts_with('*') || s.ends_with('*') {
        alternate
    } else {
        marker
    };
    format!("{marker}{s}{marker}")
}

fn is_default_color(color: &str) -> bool {
    let normalized: String = color
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_lowercase();
    DEFAULT_COLORS.contains(&normalized.as_str())
}
