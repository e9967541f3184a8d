//! Tree walker
//!
//! Converts each node of the document tree into a `(text, style)` pair. The
//! style of a node is handed up to its parent, which decides whether to
//! format it immediately or to merge it with sibling spans first.
//!
//! Ancestor information is carried down explicitly as a [`Scope`] chain.

use en_html::{Element, Node, TagKind};

use crate::decode::{self, StyleContext};
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::escape::escape;
use crate::format::Formatter;
use crate::options::ConvertOptions;
use crate::spans::{Span, merge_spans};
use crate::style::{Align, CodeMode, Style};

/// Read-only view of an element and its ancestors
#[derive(Clone, Copy)]
pub(crate) struct Scope<'s> {
    pub element: &'s Element,
    pub parent: Option<&'s Scope<'s>>,
    /// Inside `pre`: source whitespace is content
    pub preformatted: bool,
}

impl<'s> Scope<'s> {
    pub fn root(element: &'s Element) -> Self {
        Self {
            element,
            parent: None,
            preformatted: false,
        }
    }

    pub fn child(&'s self, element: &'s Element) -> Self {
        Self {
            element,
            parent: Some(self),
            preformatted: self.preformatted || element.kind() == TagKind::Pre,
        }
    }

    pub fn kind(&self) -> TagKind {
        self.element.kind()
    }

    pub fn parent_kind(&self) -> Option<TagKind> {
        self.parent.map(Scope::kind)
    }
}

/// Conversion state for one document
pub(crate) struct Walker<'a> {
    pub options: &'a ConvertOptions,
    pub diagnostics: Diagnostics,
    /// Decoded paths of linked notes, in order of appearance
    pub internal_links: Vec<String>,
    /// Decoded paths of local files referenced by links and images
    pub resources: Vec<String>,
}

impl<'a> Walker<'a> {
    pub fn new(options: &'a ConvertOptions) -> Self {
        Self {
            options,
            diagnostics: Diagnostics::new(),
            internal_links: Vec::new(),
            resources: Vec::new(),
        }
    }

    pub fn formatter(&mut self) -> Formatter<'_> {
        Formatter::new(self.options, &mut self.diagnostics)
    }

    pub fn format(&mut self, text: &str, style: &Style) -> String {
        self.formatter().format(text, style)
    }

    /// Convert the body element into unfinalized Markdown
    pub fn body(&mut self, body: &Element) -> String {
        let scope = Scope::root(body);
        let (text, style) = self.element(&scope);
        self.format(&text, &style)
    }

    fn process(&mut self, node: &Node, parent: &Scope<'_>) -> (String, Style) {
        match node {
            // Source line breaks are not content in HTML
            Node::Text(text) if !parent.preformatted => {
                (escape(text).replace('\n', " "), Style::default())
            }
            Node::Text(text) => (escape(text), Style::default()),
            Node::Element(element) => self.element(&parent.child(element)),
        }
    }

    pub(crate) fn element(&mut self, scope: &Scope<'_>) -> (String, Style) {
        let element = scope.element;
        let kind = element.kind();

        let (mut txt, mut style) = match kind {
            // These walk their own children
            TagKind::Table | TagKind::Tbody | TagKind::Dl => (String::new(), Style::default()),
            _ => match element.children.as_slice() {
                [] => (String::new(), Style::default()),
                [only] => self.process(only, scope),
                children => (self.merge(children, scope), Style::default()),
            },
        };

        match kind {
            TagKind::Div => {
                let prop = element.attr("style").unwrap_or("");
                let block = decode::decode_style(prop, StyleContext::Block);
                if block.codeblock.is_some() {
                    style.codeblock = block.codeblock;
                }
                if block.align.is_some() {
                    style.align = block.align;
                }
                if decode::has_paragraph_margins(prop) {
                    txt.push('\n');
                }
            }
            TagKind::Pre => style.codeblock = Some(String::new()),
            TagKind::Span => {
                // With several children their own styles take precedence
                if element.children.len() <= 1 {
                    let own = decode::decode_style(element.attr("style").unwrap_or(""), StyleContext::Span);
                    style = style.union(&own);
                }
            }
            TagKind::Hr => txt = "\n\n----\n\n".to_string(),
            TagKind::Heading(level) => {
                let own = decode::decode_style(element.attr("style").unwrap_or(""), StyleContext::Heading);
                let inner = self.format(&txt, &style.union(&own));
                let heading = Style {
                    heading: Some(level),
                    ..Style::default()
                };
                txt = self.format(&inner, &heading);
                style = Style::default();
            }
            TagKind::A => return self.link(scope, txt, style),
            TagKind::Img => txt = self.image(scope),
            TagKind::Font => {
                let face = decode::font_face(element.attr("face").unwrap_or(""));
                let styled = decode::decode_style(element.attr("style").unwrap_or(""), StyleContext::Font);
                if decode::is_monospace_font(&face) || styled.code.is_some() {
                    style.code = Some(CodeMode::Inline);
                }
                if !face.is_empty() && !decode::is_known_font(&face) {
                    self.diagnostics
                        .push(DiagnosticKind::UnknownFont, format!("Unknown font: {face}"));
                }
            }
            TagKind::Blockquote => txt = format!("\n\n> {}\n\n", txt.trim()),
            TagKind::P => {
                txt.push('\n');
                if let Some(align) = element.attr("align").and_then(Align::parse) {
                    style.align = Some(align);
                }
            }
            TagKind::Br => txt = "\n".to_string(),
            TagKind::Ul | TagKind::Ol => txt = list(scope, &txt),
            TagKind::Li => {
                // Markers must never end up inside emphasis
                txt = self.format(&txt, &style);
                style = Style::default();
                let nested = element
                    .first_significant_child()
                    .and_then(Node::as_element)
                    .is_some_and(|e| e.kind().is_list());
                if !nested {
                    let mark = match scope.parent_kind() {
                        Some(TagKind::Ul) => "- ",
                        _ => "1. ",
                    };
                    txt = format!("{mark}{}\n", collapse_blank_lines(txt.trim()));
                }
            }
            TagKind::U => style.underline = true,
            TagKind::Del | TagKind::Strike | TagKind::S => style.strikethrough = true,
            TagKind::Code | TagKind::Tt => style.code = Some(CodeMode::Inline),
            TagKind::I | TagKind::Em => style.italic = true,
            TagKind::B | TagKind::Strong => style.bold = true,
            TagKind::Sup => style.superscript = true,
            TagKind::Sub => style.subscript = true,
            TagKind::Small => {
                style.subscript = true;
                style.superscript = true;
            }
            TagKind::Center => style.align = Some(Align::Center),
            TagKind::Abbr => {
                style.abbr = Some(element.attr("title").unwrap_or(" ").to_string());
            }
            TagKind::Q => txt = format!("\"{txt}\""),
            TagKind::Mark => {
                style.highlight = Some("mark".to_string());
            }
            TagKind::Input => {
                if element.attr("type").is_some_and(|t| t.eq_ignore_ascii_case("checkbox")) {
                    let checked = element.attr("checked").is_some();
                    txt = if checked { "[x] " } else { "[ ] " }.to_string();
                }
            }
            TagKind::Dl => txt = self.definitions(scope),
            TagKind::Table | TagKind::Tbody => txt = self.table(scope),
            TagKind::Body
            | TagKind::Cite
            | TagKind::Address
            | TagKind::Dt
            | TagKind::Dd
            | TagKind::Thead
            | TagKind::Tfoot
            | TagKind::Tr
            | TagKind::Td
            | TagKind::Th => {}
            TagKind::Unknown(name) => {
                self.diagnostics
                    .push(DiagnosticKind::UnknownTag, format!("Unknown tag: {name}"));
            }
        }

        (txt, style)
    }

    /// Merge the output of several children into one string
    pub(crate) fn merge(&mut self, children: &[Node], scope: &Scope<'_>) -> String {
        let mut chunks = String::new();
        let mut spans: Vec<Span> = Vec::new();
        let mut prev_txt = String::new();
        let mut prev_style = Style::default();

        for (i, child) in children.iter().enumerate() {
            if !scope.preformatted && child.is_blank_text() && next_to_block(children, i) {
                continue;
            }

            let (mut txt, style) = self.process(child, scope);

            if child.is_element("span") {
                match spans.last_mut() {
                    Some(last) if prev_style == style => last.text.push_str(&txt),
                    _ => spans.push(Span::new(txt.clone(), style.clone())),
                }
                if !children.get(i + 1).is_some_and(|n| n.is_element("span")) {
                    let run = std::mem::take(&mut spans);
                    chunks.push_str(&merge_spans(&mut self.formatter(), &run));
                }
                prev_txt = txt;
                prev_style = style;
                continue;
            }

            if child.is_element("div") && !prev_txt.ends_with('\n') {
                txt.insert(0, '\n');
            }
            if let Node::Text(_) = child
                && scope.kind().is_list()
            {
                txt = txt.trim().to_string();
            }
            chunks.push_str(&self.format(&txt, &style));
            prev_txt = txt;
            prev_style = style;
        }

        chunks
    }
}

fn breaks_line(node: &Node) -> bool {
    node.as_element()
        .is_some_and(|e| e.kind().is_block() || e.kind() == TagKind::Br)
}

fn next_to_block(children: &[Node], i: usize) -> bool {
    let before = i.checked_sub(1).and_then(|j| children.get(j));
    let after = children.get(i + 1);
    before.is_some_and(breaks_line) || after.is_some_and(breaks_line)
}

/// Indent a nested list and pad it with blank lines
fn list(scope: &Scope<'_>, txt: &str) -> String {
    let context = match scope.parent {
        Some(parent) if parent.kind() == TagKind::Li => parent.parent,
        other => other,
    };
    let indent = match context.map(Scope::kind) {
        Some(TagKind::Ul) => "  ",
        Some(TagKind::Ol) => "   ",
        _ => "",
    };
    if indent.is_empty() {
        format!("\n\n{txt}\n\n")
    } else {
        format!("\n\n{indent}{}\n\n", txt.replace('\n', &format!("\n{indent}")))
    }
}

fn collapse_blank_lines(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for line in s.split('\n') {
        if line.trim().is_empty() && (out.is_empty() || out.ends_with('\n')) {
            continue;
        }
        out.push_str(line);
        out.push('\n');
    }
    out.truncate(out.trim_end_matches('\n').len());
    out
}

#[cfg(test)]
mod tests;
