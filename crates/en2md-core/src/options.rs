//! Conversion options
//!
//! All rendering toggles are fixed per run and threaded through every
//! component via [`ConvertOptions`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConvertError;

/// How previews of embedded media (PDF, video, audio) are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreviewMode {
    /// Drop the preview image, keep only the link to the file
    #[serde(rename = "no")]
    Suppressed,
    /// Replace the preview with the file name
    #[default]
    #[serde(rename = "link")]
    Linked,
    /// Keep the preview image inside the link
    #[serde(rename = "image")]
    Inlined,
}

/// Output syntax for images
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageDialect {
    /// `<img src="..." alt="..." width="...">`
    Html,
    /// `![caption|WxH](src)`
    #[default]
    Markdown,
    /// `![[src|caption]]`
    Embed,
}

/// Rendering of definition lists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DefinitionStyle {
    /// `term` line followed by `: definition`
    Markdown,
    /// Literal `<dl>` passthrough
    #[default]
    Html,
}

/// Marker inserted before single line breaks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HardBreak {
    /// A trailing backslash
    #[default]
    Backslash,
    /// A literal `<br>`
    Html,
}

impl HardBreak {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Backslash => "backslash",
            Self::Html => "html",
        }
    }

    pub fn marker(self) -> &'static str {
        match self {
            Self::Backslash => "\\",
            Self::Html => "<br>",
        }
    }
}

impl PreviewMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Suppressed => "no",
            Self::Linked => "link",
            Self::Inlined => "image",
        }
    }
}

impl ImageDialect {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Markdown => "markdown",
            Self::Embed => "embed",
        }
    }
}

impl DefinitionStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Markdown => "markdown",
            Self::Html => "html",
        }
    }
}

impl FromStr for PreviewMode {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "no" | "none" => Ok(Self::Suppressed),
            "link" => Ok(Self::Linked),
            "image" => Ok(Self::Inlined),
            _ => Err(ConvertError::UnknownPreviewMode(s.to_string())),
        }
    }
}

impl FromStr for ImageDialect {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "html" => Ok(Self::Html),
            "markdown" | "md" => Ok(Self::Markdown),
            "embed" | "wikilink" => Ok(Self::Embed),
            _ => Err(ConvertError::UnknownImageDialect(s.to_string())),
        }
    }
}

impl FromStr for DefinitionStyle {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "markdown" | "md" => Ok(Self::Markdown),
            "html" => Ok(Self::Html),
            _ => Err(ConvertError::UnknownDefinitionStyle(s.to_string())),
        }
    }
}

impl FromStr for HardBreak {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "backslash" | "\\" => Ok(Self::Backslash),
            "html" | "<br>" => Ok(Self::Html),
            _ => Err(ConvertError::UnknownHardBreak(s.to_string())),
        }
    }
}

impl fmt::Display for PreviewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ImageDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for HardBreak {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for DefinitionStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options for note conversion
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Render internal note links as `[[target|alias]]`
    pub wikilinks: bool,
    /// Keep the export's green color on internal links
    pub color_internal_links: bool,
    /// Preview behavior for embedded media links
    pub previews: PreviewMode,
    /// Image output syntax
    pub images: ImageDialect,
    /// Definition list rendering
    pub definitions: DefinitionStyle,
    /// Marker for single line breaks
    pub hard_break: HardBreak,
    /// Extension given to rewritten internal links (without the dot)
    pub output_extension: String,
    /// Prepend a frontmatter block built from the note metadata
    pub frontmatter: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            wikilinks: true,
            color_internal_links: false,
            previews: PreviewMode::default(),
            images: ImageDialect::default(),
            definitions: DefinitionStyle::default(),
            hard_break: HardBreak::default(),
            output_extension: "md".to_string(),
            frontmatter: true,
        }
    }
}
