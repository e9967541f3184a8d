//! Owned document tree types
//!
//! The tree produced by [`crate::parse`] is a plain value: every element owns
//! its attributes and children, and there are no parent pointers. Consumers
//! that need ancestor information carry it down explicitly while walking.

use serde::{Deserialize, Serialize};

/// A parsed note export
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Top-level nodes (normally a single `html` element)
    pub children: Vec<Node>,
}

/// A node in the document tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Node {
    /// Character data, entities already decoded
    Text(String),
    /// An element with its attributes and children
    Element(Element),
}

/// An element node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// Lower-case local tag name (e.g., "div", "span")
    pub name: String,
    /// Attributes in source order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attrs: Vec<Attribute>,
    /// Child nodes in source order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
}

/// An element attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

/// Element kinds the converter knows how to handle
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TagKind {
    A,
    Abbr,
    Address,
    B,
    Blockquote,
    Body,
    Br,
    Center,
    Cite,
    Code,
    Dd,
    Del,
    Div,
    Dl,
    Dt,
    Em,
    Font,
    /// `h1` to `h6`
    Heading(u8),
    Hr,
    I,
    Img,
    Input,
    Li,
    Mark,
    Ol,
    P,
    Pre,
    Q,
    S,
    Small,
    Span,
    Strike,
    Strong,
    Sub,
    Sup,
    Table,
    Tbody,
    Td,
    Tfoot,
    Th,
    Thead,
    Tr,
    Tt,
    U,
    Ul,
    /// Anything else, kept for diagnostics
    Unknown(String),
}

impl TagKind {
    /// Classify a tag name
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "a" => Self::A,
            "abbr" => Self::Abbr,
            "address" => Self::Address,
            "b" => Self::B,
            "blockquote" => Self::Blockquote,
            "body" => Self::Body,
            "br" => Self::Br,
            "center" => Self::Center,
            "cite" => Self::Cite,
            "code" => Self::Code,
            "dd" => Self::Dd,
            "del" => Self::Del,
            "div" => Self::Div,
            "dl" => Self::Dl,
            "dt" => Self::Dt,
            "em" => Self::Em,
            "font" => Self::Font,
            "h1" => Self::Heading(1),
            "h2" => Self::Heading(2),
            "h3" => Self::Heading(3),
            "h4" => Self::Heading(4),
            "h5" => Self::Heading(5),
            "h6" => Self::Heading(6),
            "hr" => Self::Hr,
            "i" => Self::I,
            "img" => Self::Img,
            "input" => Self::Input,
            "li" => Self::Li,
            "mark" => Self::Mark,
            "ol" => Self::Ol,
            "p" => Self::P,
            "pre" => Self::Pre,
            "q" => Self::Q,
            "s" => Self::S,
            "small" => Self::Small,
            "span" => Self::Span,
            "strike" => Self::Strike,
            "strong" => Self::Strong,
            "sub" => Self::Sub,
            "sup" => Self::Sup,
            "table" => Self::Table,
            "tbody" => Self::Tbody,
            "td" => Self::Td,
            "tfoot" => Self::Tfoot,
            "th" => Self::Th,
            "thead" => Self::Thead,
            "tr" => Self::Tr,
            "tt" => Self::Tt,
            "u" => Self::U,
            "ul" => Self::Ul,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// Whether the element starts a new block in the rendered output
    pub fn is_block(&self) -> bool {
        matches!(
            self,
            Self::Blockquote
                | Self::Body
                | Self::Center
                | Self::Div
                | Self::Dl
                | Self::Heading(_)
                | Self::Hr
                | Self::Li
                | Self::Ol
                | Self::P
                | Self::Pre
                | Self::Table
                | Self::Ul
        )
    }

    /// Whether the element is a list container
    pub fn is_list(&self) -> bool {
        matches!(self, Self::Ul | Self::Ol)
    }
}

impl Document {
    /// Create a document from top-level nodes
    pub fn new(children: Vec<Node>) -> Self {
        Self { children }
    }

    /// The `html` root element, if any
    pub fn root(&self) -> Option<&Element> {
        self.children
            .iter()
            .filter_map(Node::as_element)
            .find(|e| e.name == "html")
    }

    /// The `body` element directly under the root
    pub fn body(&self) -> Option<&Element> {
        self.root()?.child_elements().find(|e| e.name == "body")
    }

    /// First element (document order) matching a predicate
    pub fn find(&self, predicate: impl Fn(&Element) -> bool + Copy) -> Option<&Element> {
        self.children.iter().find_map(|n| n.find(predicate))
    }

    /// Remove and return the first element (document order) matching a predicate
    pub fn take(&mut self, predicate: impl Fn(&Element) -> bool + Copy) -> Option<Element> {
        take_from(&mut self.children, predicate)
    }
}

fn take_from(
    nodes: &mut Vec<Node>,
    predicate: impl Fn(&Element) -> bool + Copy,
) -> Option<Element> {
    for i in 0..nodes.len() {
        let Node::Element(element) = &mut nodes[i] else {
            continue;
        };
        if predicate(element) {
            if let Node::Element(taken) = nodes.remove(i) {
                return Some(taken);
            }
            return None;
        }
        if let Some(taken) = take_from(&mut element.children, predicate) {
            return Some(taken);
        }
    }
    None
}

impl Node {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(e) => Some(e),
            Self::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Element(_) => None,
        }
    }

    /// Concatenated character data of this node and its descendants
    pub fn text_content(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Element(e) => e.text_content(),
        }
    }

    /// Whether this is a text node holding only whitespace
    pub fn is_blank_text(&self) -> bool {
        matches!(self, Self::Text(s) if s.chars().all(char::is_whitespace))
    }

    /// Whether this is an element whose tag name is `name`
    pub fn is_element(&self, name: &str) -> bool {
        matches!(self, Self::Element(e) if e.name == name)
    }

    fn find(&self, predicate: impl Fn(&Element) -> bool + Copy) -> Option<&Element> {
        let element = self.as_element()?;
        if predicate(element) {
            return Some(element);
        }
        element.children.iter().find_map(|n| n.find(predicate))
    }
}

impl Element {
    /// Create an element without attributes
    pub fn new(name: impl Into<String>, children: Vec<Node>) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
            children,
        }
    }

    /// Builder-style attribute setter
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push(Attribute {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    /// Look up an attribute value by name
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(name))
            .map(|a| a.value.as_str())
    }

    /// Classify this element
    pub fn kind(&self) -> TagKind {
        TagKind::parse(&self.name)
    }

    /// Element children, skipping text
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    /// First child that is an element or non-blank text
    pub fn first_significant_child(&self) -> Option<&Node> {
        self.children.iter().find(|n| !n.is_blank_text())
    }

    /// Concatenated character data of all descendants
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(&self.children, &mut out);
        out
    }

    /// Integer attribute (e.g., `colspan`), if present and valid
    pub fn usize_attr(&self, name: &str) -> Option<usize> {
        self.attr(name).and_then(|v| v.trim().parse().ok())
    }
}

fn collect_text(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(s) => out.push_str(s),
            Node::Element(e) => collect_text(&e.children, out),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Document {
        Document::new(vec![Node::Element(Element::new(
            "html",
            vec![
                Node::Element(Element::new("head", vec![])),
                Node::Element(Element::new(
                    "body",
                    vec![
                        Node::Element(Element::new("h1", vec![Node::text("Title")])),
                        Node::Element(Element::new(
                            "div",
                            vec![Node::text("a "), Node::Element(Element::new("b", vec![Node::text("b")]))],
                        )),
                    ],
                )),
            ],
        ))])
    }

    #[test]
    fn test_tag_kind_parse() {
        assert_eq!(TagKind::parse("DIV"), TagKind::Div);
        assert_eq!(TagKind::parse("h3"), TagKind::Heading(3));
        assert_eq!(TagKind::parse("h7"), TagKind::Unknown("h7".to_string()));
        assert!(TagKind::Ul.is_list());
        assert!(TagKind::P.is_block());
        assert!(!TagKind::Span.is_block());
    }

    #[test]
    fn test_body_lookup() {
        let doc = sample();
        let body = doc.body().unwrap();
        assert_eq!(body.children.len(), 2);
    }

    #[test]
    fn test_text_content() {
        let doc = sample();
        assert_eq!(doc.body().unwrap().text_content(), "Titlea b");
    }

    #[test]
    fn test_take_removes_first_match() {
        let mut doc = sample();
        let h1 = doc.take(|e| e.name == "h1").unwrap();
        assert_eq!(h1.text_content(), "Title");
        assert!(doc.find(|e| e.name == "h1").is_none());
        assert_eq!(doc.body().unwrap().children.len(), 1);
    }

    #[test]
    fn test_attr_lookup_is_case_insensitive() {
        let el = Element::new("td", vec![]).with_attr("COLSPAN", " 2 ");
        assert_eq!(el.attr("colspan"), Some(" 2 "));
        assert_eq!(el.usize_attr("colspan"), Some(2));
        assert_eq!(el.usize_attr("rowspan"), None);
    }

    #[test]
    fn test_first_significant_child_skips_blank_text() {
        let li = Element::new(
            "li",
            vec![Node::text("\n  "), Node::Element(Element::new("ul", vec![]))],
        );
        assert!(li.first_significant_child().unwrap().is_element("ul"));
    }
}
