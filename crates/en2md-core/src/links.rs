//! Link resolver
//!
//! Classifies anchor targets into notes, local resources and external
//! URLs, records what the driver has to follow or copy, and attaches the
//! rewritten target to the anchor's style.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};

use crate::decode::{self, StyleContext};
use crate::diagnostics::DiagnosticKind;
use crate::escape::escape;
use crate::format::has_content;
use crate::options::PreviewMode;
use crate::style::{LinkTarget, Style};
use crate::walker::{Scope, Walker};

/// Characters left as is when quoting a local path
const PATH: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'_')
    .remove(b'.')
    .remove(b'-')
    .remove(b'~')
    .remove(b'/');

/// Characters quoted in external URLs
const URL: &AsciiSet = &percent_encoding::CONTROLS.add(b' ').add(b'<').add(b'>');

/// Targets the exporter writes for links it could not resolve
const PLACEHOLDERS: &[&str] = &["https:", "http:"];

/// Extensions whose links carry a preview image
pub const MEDIA_EXTENSIONS: &[&str] = &["pdf", "mp4", "mov", "webm", "mp3", "m4a", "wav"];

const NOTE_EXTENSIONS: &[&str] = &["html", "htm"];

// Color given to note links by the exporter
const INTERNAL_COLORS: &[&str] = &["rgb(105,170,53)", "#69aa35"];

/// Percent-decode a path, normalizing Windows separators
pub fn decode_path(path: &str) -> String {
    percent_decode_str(&path.replace('\\', "/"))
        .decode_utf8_lossy()
        .into_owned()
}

/// Percent-encode a decoded local path
pub fn quote_path(path: &str) -> String {
    utf8_percent_encode(path, PATH).to_string()
}

/// Last path component
pub fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Lower-cased extension of the last path component
pub fn extension(path: &str) -> Option<String> {
    let base = basename(path);
    base.rsplit_once('.')
        .filter(|(stem, _)| !stem.is_empty())
        .map(|(_, ext)| ext.to_ascii_lowercase())
}

/// Whether a target is a local file with an embeddable-media extension
pub fn is_media(href: &str) -> bool {
    !href.contains(':') && extension(href).is_some_and(|e| MEDIA_EXTENSIONS.contains(&e.as_str()))
}

fn is_internal_color(color: &str) -> bool {
    let normalized: String = color.chars().filter(|c| !c.is_whitespace()).collect();
    INTERNAL_COLORS.contains(&normalized.to_ascii_lowercase().as_str())
}

fn replace_extension(path: &str, ext: &str) -> String {
    match path.rsplit_once('.') {
        Some((stem, _)) => format!("{stem}.{ext}"),
        None => format!("{path}.{ext}"),
    }
}

impl Walker<'_> {
    /// Resolve an anchor whose children rendered to `txt` with `style`
    pub(crate) fn link(&mut self, scope: &Scope<'_>, txt: String, style: Style) -> (String, Style) {
        let element = scope.element;
        let Some(href) = element.attr("href").map(str::trim) else {
            return (txt, style);
        };

        if href.is_empty() || PLACEHOLDERS.contains(&href) {
            self.diagnostics.push(
                DiagnosticKind::EmptyLink,
                format!("Empty link found for {}", element.text_content().trim()),
            );
            return (txt, style);
        }
        if href == element.text_content() {
            // Autolink, keep the URL verbatim
            return (element.text_content(), style);
        }
        if href.starts_with('#') {
            return (txt, style);
        }

        let own = decode::decode_style(element.attr("style").unwrap_or(""), StyleContext::Span);
        let internal = own.color.as_deref().is_some_and(is_internal_color);
        let mut style = style.union(&own);
        let mut txt = txt;

        let target = if !href.contains(':') {
            let path = decode_path(href);
            let ext = extension(&path);
            let target = if ext.as_deref().is_some_and(|e| NOTE_EXTENSIONS.contains(&e)) {
                self.internal_links.push(path.clone());
                let path = replace_extension(&path, &self.options.output_extension);
                LinkTarget::Note(quote_path(&path))
            } else {
                self.resources.push(path.clone());
                if is_media(&path) {
                    match self.options.previews {
                        PreviewMode::Linked => txt = escape(basename(&path)),
                        PreviewMode::Suppressed if !has_content(&txt) => {
                            txt = escape(basename(&path));
                        }
                        _ => {}
                    }
                }
                LinkTarget::Resource(quote_path(&path))
            };
            if internal && !self.options.color_internal_links {
                style.color = None;
            }
            target
        } else {
            if internal {
                self.diagnostics.push(
                    DiagnosticKind::UnresolvedInternalLink,
                    format!("Unresolved internal link: {} {href}", element.text_content().trim()),
                );
            }
            LinkTarget::External(utf8_percent_encode(href, URL).to_string())
        };

        style.link = Some(target);
        (txt, style)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_path() {
        assert_eq!(quote_path("My Notes/Trip (2).md"), "My%20Notes/Trip%20%282%29.md");
        assert_eq!(quote_path("a_b-c.~d"), "a_b-c.~d");
        assert_eq!(quote_path(&decode_path("Packing%20list.html")), "Packing%20list.html");
    }

    #[test]
    fn test_decode_path_normalizes_separators() {
        assert_eq!(decode_path("Trip_files\\map%201.png"), "Trip_files/map 1.png");
    }

    #[test]
    fn test_extension() {
        assert_eq!(extension("a/b.HTML").as_deref(), Some("html"));
        assert_eq!(extension("dir.v2/file"), None);
        assert_eq!(extension(".hidden"), None);
        assert!(is_media("Trip_files/scan.pdf"));
        assert!(!is_media("https://x.org/scan.pdf"));
    }

    #[test]
    fn test_internal_color() {
        assert!(is_internal_color("rgb(105, 170, 53)"));
        assert!(is_internal_color("#69AA35"));
        assert!(!is_internal_color("rgb(0, 0, 0)"));
    }

    #[test]
    fn test_replace_extension() {
        assert_eq!(replace_extension("Notes/Trip.html", "md"), "Notes/Trip.md");
        assert_eq!(replace_extension("Trip.v2.htm", "md"), "Trip.v2.md");
    }
}
