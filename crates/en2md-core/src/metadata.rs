//! Metadata extractor
//!
//! Note exports start with the note title as an `h1` followed by a two-column
//! table of attributes (`Created:`, `Updated:`, `Tags:`, ...). Both are cut
//! out of the tree before the body is converted.

use chrono::NaiveDateTime;
use en_html::{Document, Element, TagKind};
use serde::Serialize;

use crate::diagnostics::{DiagnosticKind, Diagnostics};

/// Date format used in the attribute table
pub const SOURCE_DATE_FORMAT: &str = "%m/%d/%Y %I:%M %p";
/// Date format written to the frontmatter
pub const FRONTMATTER_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%SZ";
/// Tag prefix that names the notebook folder of a note
pub const NOTEBOOK_TAG_PREFIX: &str = "nb:";

/// Metadata of one note
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Metadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Folder derived from an `nb:` tag
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notebook: Option<String>,
}

impl Metadata {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Remove the title and the attribute table from `doc` and return them
    pub fn extract(doc: &mut Document) -> Self {
        let mut meta = Self::default();

        if let Some(h1) = doc.take(|e| e.kind() == TagKind::Heading(1)) {
            let title = h1.text_content().trim().to_string();
            meta.title = (!title.is_empty()).then_some(title);
        }

        if let Some(table) = doc.take(is_metadata_table) {
            for (key, value) in table_pairs(&table) {
                meta.set(&key, value);
            }
        }

        if let Some(pos) = meta.tags.iter().position(|t| t.starts_with(NOTEBOOK_TAG_PREFIX)) {
            let tag = meta.tags.remove(pos);
            meta.notebook = normalize_path(&tag[NOTEBOOK_TAG_PREFIX.len()..]);
        }

        meta
    }

    fn set(&mut self, key: &str, value: String) {
        match key {
            "created" => self.created = Some(value),
            "updated" => self.updated = Some(value),
            "source" => self.source = Some(value),
            "author" => self.author = Some(value),
            "tags" => {
                for tag in value.split(',').map(str::trim).filter(|t| !t.is_empty()) {
                    if !self.tags.iter().any(|t| t == tag) {
                        self.tags.push(tag.to_string());
                    }
                }
            }
            other => log::debug!("Ignoring note attribute: {other}"),
        }
    }

    /// Render as a YAML frontmatter block
    ///
    /// Dates that do not match the export format are kept verbatim and
    /// reported.
    pub fn to_frontmatter(&self, diagnostics: &mut Diagnostics) -> String {
        let mut lines = Vec::new();
        if let Some(title) = &self.title {
            lines.push(format!("title: {}", yaml_scalar(title)));
        }
        if let Some(updated) = &self.updated {
            lines.push(format!("updated: {}", reformat_date(updated, diagnostics)));
        }
        if let Some(created) = &self.created {
            lines.push(format!("created: {}", reformat_date(created, diagnostics)));
        }
        if let Some(source) = &self.source {
            lines.push(format!("source: {}", yaml_scalar(source)));
        }
        if let Some(author) = &self.author {
            lines.push(format!("author: {}", yaml_scalar(author)));
        }
        if !self.tags.is_empty() {
            lines.push("tags:".to_string());
            lines.extend(self.tags.iter().map(|t| format!("  - {}", yaml_scalar(t))));
        }
        format!("---\n{}\n---\n\n", lines.join("\n"))
    }
}

/// Whether every row is a `key:` / value pair
fn is_metadata_table(e: &Element) -> bool {
    if e.kind() != TagKind::Table {
        return false;
    }
    let rows = rows(e);
    !rows.is_empty()
        && rows.iter().all(|cells| {
            cells.len() == 2 && cells[0].text_content().trim().ends_with(':')
        })
}

fn rows(table: &Element) -> Vec<Vec<&Element>> {
    let mut trs = Vec::new();
    for child in table.child_elements() {
        match child.kind() {
            TagKind::Tr => trs.push(child),
            TagKind::Thead | TagKind::Tbody | TagKind::Tfoot => {
                trs.extend(child.child_elements().filter(|e| e.kind() == TagKind::Tr));
            }
            _ => {}
        }
    }
    trs.into_iter()
        .map(|tr| {
            tr.child_elements()
                .filter(|c| matches!(c.kind(), TagKind::Td | TagKind::Th))
                .collect()
        })
        .collect()
}

fn table_pairs(table: &Element) -> Vec<(String, String)> {
    rows(table)
        .into_iter()
        .filter_map(|cells| {
            let [key, value] = cells.as_slice() else {
                return None;
            };
            let key = key.text_content();
            let key = key.trim().trim_end_matches(':').trim().to_lowercase();
            Some((key, value.text_content().trim().to_string()))
        })
        .collect()
}

fn reformat_date(date: &str, diagnostics: &mut Diagnostics) -> String {
    match NaiveDateTime::parse_from_str(date.trim(), SOURCE_DATE_FORMAT) {
        Ok(parsed) => parsed.format(FRONTMATTER_DATE_FORMAT).to_string(),
        Err(e) => {
            diagnostics.push(
                DiagnosticKind::InvalidDate,
                format!("Cannot parse date '{date}': {e}"),
            );
            yaml_scalar(date)
        }
    }
}

/// Quote a YAML scalar when it would break the frontmatter syntax
fn yaml_scalar(s: &str) -> String {
    let special_start = s.starts_with([
        '-', '?', ':', ',', '[', ']', '{', '}', '#', '&', '*', '!', '|', '>', '\'', '"', '%', '@', '`',
    ]);
    let unsafe_inner = s.contains(": ") || s.contains(" #") || s.ends_with(':');
    if s.is_empty() || special_start || unsafe_inner || s != s.trim() || s.contains('\n') {
        format!("\"{}\"", escape_yaml_string(s))
    } else {
        s.to_string()
    }
}

fn escape_yaml_string(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

/// Normalize a slash-separated folder path; `None` when nothing is left
fn normalize_path(path: &str) -> Option<String> {
    let path = path.replace('\\', "/");
    let mut parts: Vec<&str> = Vec::new();
    for part in path.split('/') {
        match part.trim() {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            _ => parts.push(part),
        }
    }
    (!parts.is_empty()).then(|| parts.join("/"))
}
