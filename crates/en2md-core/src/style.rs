//! Style model
//!
//! A [`Style`] is a fixed-schema record of optional attributes. "Unset" is an
//! explicit `None`/`false`, never a falsy value, so a heading level or a color
//! is never dropped by accident. Styles compose as sets of (attribute, value)
//! pairs: two styles share an attribute only when both set it to the same
//! value.

/// Inline code rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodeMode {
    /// Backtick-delimited literal, content cleaned and unescaped
    Inline,
    /// `<code>` wrapper, content left as is (inner markers already emitted)
    Raw,
}

/// Paragraph alignment that needs an explicit wrapper
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Align {
    Center,
    Right,
}

impl Align {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "center" => Some(Self::Center),
            "right" => Some(Self::Right),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Center => "center",
            Self::Right => "right",
        }
    }
}

/// Classified hyperlink target, already rewritten for output
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LinkTarget {
    /// Another note; path has the output extension
    Note(String),
    /// A local file copied alongside the notes
    Resource(String),
    /// Anything with a scheme
    External(String),
}

impl LinkTarget {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Note(s) | Self::Resource(s) | Self::External(s) => s,
        }
    }
}

/// Formatting attributes of a run of text
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Style {
    pub italic: bool,
    pub bold: bool,
    pub underline: bool,
    pub strikethrough: bool,
    pub subscript: bool,
    pub superscript: bool,
    pub code: Option<CodeMode>,
    pub color: Option<String>,
    pub highlight: Option<String>,
    pub abbr: Option<String>,
    pub link: Option<LinkTarget>,
    /// Heading level, 1 to 6
    pub heading: Option<u8>,
    pub align: Option<Align>,
    /// Fenced code block with its language tag
    pub codeblock: Option<String>,
}

fn same<T: PartialEq + Clone>(a: &Option<T>, b: &Option<T>) -> Option<T> {
    match (a, b) {
        (Some(x), Some(y)) if x == y => Some(x.clone()),
        _ => None,
    }
}

fn unless_same<T: PartialEq + Clone>(a: &Option<T>, b: &Option<T>) -> Option<T> {
    match (a, b) {
        (Some(x), Some(y)) if x == y => None,
        _ => a.clone(),
    }
}

impl Style {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether no attribute is set
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Attributes set identically in both styles
    pub fn intersection(&self, other: &Self) -> Self {
        Self {
            italic: self.italic && other.italic,
            bold: self.bold && other.bold,
            underline: self.underline && other.underline,
            strikethrough: self.strikethrough && other.strikethrough,
            subscript: self.subscript && other.subscript,
            superscript: self.superscript && other.superscript,
            code: same(&self.code, &other.code),
            color: same(&self.color, &other.color),
            highlight: same(&self.highlight, &other.highlight),
            abbr: same(&self.abbr, &other.abbr),
            link: same(&self.link, &other.link),
            heading: same(&self.heading, &other.heading),
            align: same(&self.align, &other.align),
            codeblock: same(&self.codeblock, &other.codeblock),
        }
    }

    /// Attributes of `self` not set identically in `other`
    pub fn difference(&self, other: &Self) -> Self {
        Self {
            italic: self.italic && !other.italic,
            bold: self.bold && !other.bold,
            underline: self.underline && !other.underline,
            strikethrough: self.strikethrough && !other.strikethrough,
            subscript: self.subscript && !other.subscript,
            superscript: self.superscript && !other.superscript,
            code: unless_same(&self.code, &other.code),
            color: unless_same(&self.color, &other.color),
            highlight: unless_same(&self.highlight, &other.highlight),
            abbr: unless_same(&self.abbr, &other.abbr),
            link: unless_same(&self.link, &other.link),
            heading: unless_same(&self.heading, &other.heading),
            align: unless_same(&self.align, &other.align),
            codeblock: unless_same(&self.codeblock, &other.codeblock),
        }
    }

    /// Attributes of both styles; values set in `other` win
    pub fn union(&self, other: &Self) -> Self {
        Self {
            italic: self.italic || other.italic,
            bold: self.bold || other.bold,
            underline: self.underline || other.underline,
            strikethrough: self.strikethrough || other.strikethrough,
            subscript: self.subscript || other.subscript,
            superscript: self.superscript || other.superscript,
            code: other.code.or(self.code),
            color: other.color.clone().or_else(|| self.color.clone()),
            highlight: other.highlight.clone().or_else(|| self.highlight.clone()),
            abbr: other.abbr.clone().or_else(|| self.abbr.clone()),
            link: other.link.clone().or_else(|| self.link.clone()),
            heading: other.heading.or(self.heading),
            align: other.align.or(self.align),
            codeblock: other.codeblock.clone().or_else(|| self.codeblock.clone()),
        }
    }
}
