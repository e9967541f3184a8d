//! Style decoder
//!
//! Turns an inline `style` property string into a [`Style`]. Interpretation
//! of the tokens depends on the element that carries them.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::style::{Align, CodeMode, Style};

/// Language tag given to code blocks marked by the editor
pub const DEFAULT_CODE_LANGUAGE: &str = "bash";

pub const MONOSPACE_FONTS: &[&str] = &[
    "andale mono",
    "consolas",
    "courier new",
    "lucida console",
    "menlo",
    "monaco",
    "monospace",
];

pub const KNOWN_FONTS: &[&str] = &[
    "arial",
    "calibri",
    "tahoma",
    "times new roman",
    "lucida sans unicode",
    "helvetica",
    "verdana",
    "wingdings",
];

// The editor occasionally drops the font-family value and leaves a quoted separator
static DROPPED_FONT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""(;\} |;)""#).expect("valid regex"));

/// Which element the style string belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleContext {
    /// Inline runs (`span`, `a`)
    Span,
    /// `div` blocks: code blocks and alignment
    Block,
    /// `h1` to `h6`: inline attributes of the heading text
    Heading,
    /// `font` elements: monospace detection only
    Font,
}

/// Split a property string into lower-cased keys and trimmed values
///
/// Tokens are split on the first colon only, so values such as
/// `rgb(0, 0, 0)` or URLs survive intact. Tokens without a colon are ignored.
pub fn style_tokens(prop: &str) -> HashMap<String, String> {
    let prop = DROPPED_FONT.replace_all(prop, "\"Courier New\"");
    let mut tokens: HashMap<String, String> = prop
        .split(';')
        .filter_map(|token| {
            let (key, value) = token.split_once(':')?;
            Some((key.trim().to_ascii_lowercase(), value.trim().to_string()))
        })
        .collect();

    if let Some(value) = tokens.remove("text-decoration-line") {
        tokens.insert("text-decoration".to_string(), value);
    }
    tokens
}

/// Decode a property string for the given context
pub fn decode_style(prop: &str, context: StyleContext) -> Style {
    if prop.trim().is_empty() {
        return Style::default();
    }
    let tokens = style_tokens(prop);
    match context {
        StyleContext::Span | StyleContext::Heading => inline_style(&tokens),
        StyleContext::Block => block_style(&tokens),
        StyleContext::Font => Style {
            code: is_monospace(&tokens).then_some(CodeMode::Inline),
            ..Style::default()
        },
    }
}

fn get<'a>(tokens: &'a HashMap<String, String>, key: &str) -> &'a str {
    tokens.get(key).map(String::as_str).unwrap_or("")
}

fn inline_style(tokens: &HashMap<String, String>) -> Style {
    let weight = get(tokens, "font-weight").to_ascii_lowercase();
    let decoration = get(tokens, "text-decoration").to_ascii_lowercase();
    let vertical = get(tokens, "vertical-align").to_ascii_lowercase();
    let non_empty = |key: &str| Some(get(tokens, key).to_string()).filter(|v| !v.is_empty());

    Style {
        italic: get(tokens, "font-style").eq_ignore_ascii_case("italic"),
        bold: weight == "bold" || weight.parse::<u16>().is_ok_and(|w| w >= 600),
        underline: decoration.contains("underline"),
        strikethrough: decoration.contains("line-through"),
        subscript: vertical == "sub",
        superscript: vertical == "super",
        code: is_monospace(tokens).then_some(CodeMode::Inline),
        color: non_empty("color"),
        highlight: non_empty("--en-highlight"),
        ..Style::default()
    }
}

fn block_style(tokens: &HashMap<String, String>) -> Style {
    let marked = get(tokens, "-en-codeblock").eq_ignore_ascii_case("true");
    Style {
        codeblock: (marked || looks_like_code(tokens)).then(|| DEFAULT_CODE_LANGUAGE.to_string()),
        align: Align::parse(get(tokens, "text-align")),
        ..Style::default()
    }
}

fn is_monospace(tokens: &HashMap<String, String>) -> bool {
    let family = get(tokens, "font-family").to_ascii_lowercase();
    family.contains("courier") || family.contains("monospace")
}

// Older exports mark code blocks only by a boxed monospace font
fn looks_like_code(tokens: &HashMap<String, String>) -> bool {
    let boxed = tokens.keys().any(|k| k.starts_with("border"));
    let shaded = tokens.contains_key("background-color") || tokens.contains_key("background");
    is_monospace(tokens) && boxed && shaded
}

/// Whether a `div` style carries the vertical margins of a paragraph
pub fn has_paragraph_margins(prop: &str) -> bool {
    let tokens = style_tokens(prop);
    ["margin-top", "margin-bottom"].iter().any(|key| {
        tokens
            .get(*key)
            .is_some_and(|v| v.chars().any(|c| ('1'..='9').contains(&c)))
    })
}

/// First family of a `face` attribute, unquoted and lower-cased
pub fn font_face(face: &str) -> String {
    face.split(',')
        .next()
        .unwrap_or("")
        .trim()
        .trim_matches(['\'', '"'])
        .to_ascii_lowercase()
}

pub fn is_monospace_font(family: &str) -> bool {
    MONOSPACE_FONTS.contains(&family)
}

pub fn is_known_font(family: &str) -> bool {
    is_monospace_font(family) || KNOWN_FONTS.contains(&family)
}
