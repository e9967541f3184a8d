//! Media resolver
//!
//! Renders `img` elements in the configured image dialect and records local
//! image files as resources.

use crate::diagnostics::DiagnosticKind;
use crate::links::{basename, decode_path, is_media, quote_path};
use crate::options::{ImageDialect, PreviewMode};
use crate::walker::{Scope, Walker};

fn stem(name: &str) -> &str {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.contains(char::is_whitespace) => stem,
        _ => name,
    }
}

/// Size suffix: `W` or `WxH`; height alone cannot be expressed
fn size(width: Option<&str>, height: Option<&str>) -> Option<String> {
    let width = width.filter(|w| !w.is_empty())?;
    Some(match height.filter(|h| !h.is_empty()) {
        Some(height) => format!("{width}x{height}"),
        None => width.to_string(),
    })
}

impl Walker<'_> {
    pub(crate) fn image(&mut self, scope: &Scope<'_>) -> String {
        let element = scope.element;

        // The enclosing anchor already links to the real file
        if self.options.previews == PreviewMode::Suppressed
            && let Some(parent) = scope.parent
            && parent.element.name == "a"
            && parent.element.attr("href").is_some_and(is_media)
        {
            return String::new();
        }

        let src = element.attr("src").unwrap_or("").trim();
        let remote = src.contains("://");
        let (target, path) = if remote {
            self.diagnostics
                .push(DiagnosticKind::ExternalImage, format!("External image found: {src}"));
            (src.to_string(), src.to_string())
        } else {
            let path = decode_path(src);
            self.resources.push(path.clone());
            (quote_path(&path), path)
        };

        let caption = element
            .attr("data-filename")
            .filter(|name| !name.is_empty())
            .map(|name| stem(name).to_string())
            .or_else(|| {
                element
                    .attr("alt")
                    .filter(|alt| !alt.is_empty())
                    .map(|alt| stem(alt).to_string())
            })
            .unwrap_or_else(|| stem(basename(&path)).to_string());
        let width = element.attr("width");
        let height = element.attr("height");

        match self.options.images {
            ImageDialect::Html => {
                let attrs: Vec<String> = [
                    ("src", Some(target.as_str())),
                    ("alt", Some(caption.as_str())),
                    ("width", width),
                    ("height", height),
                ]
                .into_iter()
                .filter_map(|(k, v)| v.filter(|v| !v.is_empty()).map(|v| format!("{k}=\"{v}\"")))
                .collect();
                format!("<img {}>", attrs.join(" "))
            }
            ImageDialect::Embed if !remote => {
                let label = size(width, height).unwrap_or(caption);
                format!("![[{path}|{label}]]")
            }
            ImageDialect::Markdown | ImageDialect::Embed => {
                let size = size(width, height).map(|s| format!("|{s}")).unwrap_or_default();
                format!("![{caption}{size}]({target})")
            }
        }
    }
}
