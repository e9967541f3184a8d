//! Configuration file support for en2md CLI
//!
//! Loads settings from `en2md.toml`. Every field is optional; command-line
//! flags take precedence over file values.

use anyhow::{Context, Result};
use en2md_core::{ConvertOptions, DefinitionStyle, HardBreak, ImageDialect, PreviewMode};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file name, looked up in the input directory
pub const CONFIG_FILE_NAME: &str = "en2md.toml";

/// Schema URL for the configuration file
pub const SCHEMA_URL: &str =
    "https://raw.githubusercontent.com/en2md/en2md/main/crates/en2md-cli/schema/en2md.schema.json";

/// Root configuration structure
#[derive(Debug, Default, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(default)]
pub struct Config {
    /// Output configuration
    #[serde(skip_serializing_if = "OutputConfig::is_empty")]
    pub output: OutputConfig,
    /// Internal link configuration
    #[serde(skip_serializing_if = "LinksConfig::is_empty")]
    pub links: LinksConfig,
    /// Image and attachment configuration
    #[serde(skip_serializing_if = "MediaConfig::is_empty")]
    pub media: MediaConfig,
    /// Code block configuration
    #[serde(skip_serializing_if = "CodeConfig::is_empty")]
    pub code: CodeConfig,
}

/// Output configuration
#[derive(Debug, Default, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(default)]
pub struct OutputConfig {
    /// Output directory; notes are placed in notebook folders below it (default: next to the sources)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
    /// File extension of converted notes (default: "md")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
    /// Add YAML frontmatter with the note attributes (default: true)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frontmatter: Option<bool>,
    /// Hard line break marker: "backslash" or "html" (default: "backslash")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hard_break: Option<String>,
    /// Definition lists: "markdown" (`: ` definitions) or "html" (default: "html")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub definitions: Option<String>,
}

impl OutputConfig {
    fn is_empty(&self) -> bool {
        self.directory.is_none()
            && self.extension.is_none()
            && self.frontmatter.is_none()
            && self.hard_break.is_none()
            && self.definitions.is_none()
    }
}

/// Internal link configuration
#[derive(Debug, Default, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(default)]
pub struct LinksConfig {
    /// Render links between notes as [[wikilinks]] (default: true)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wikilinks: Option<bool>,
    /// Keep the source color of internal links (default: false)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_internal: Option<bool>,
}

impl LinksConfig {
    fn is_empty(&self) -> bool {
        self.wikilinks.is_none() && self.color_internal.is_none()
    }
}

/// Image and attachment configuration
#[derive(Debug, Default, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(default)]
pub struct MediaConfig {
    /// Image syntax: "html", "markdown" or "embed" (default: "markdown")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<String>,
    /// Preview images of linked attachments: "no", "link" or "image" (default: "link")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previews: Option<String>,
}

impl MediaConfig {
    fn is_empty(&self) -> bool {
        self.images.is_none() && self.previews.is_none()
    }
}

/// Code block configuration
#[derive(Debug, Default, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(default)]
pub struct CodeConfig {
    /// JSON file mapping note file names to the languages of their code blocks
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hints: Option<PathBuf>,
}

impl CodeConfig {
    fn is_empty(&self) -> bool {
        self.hints.is_none()
    }
}

impl Config {
    /// Load configuration from a specific file path
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Try to load configuration from a directory (looks for `en2md.toml`)
    ///
    /// Returns `Ok(None)` if the config file doesn't exist.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Conversion options with the file values applied over the defaults
    ///
    /// Unknown mode names are errors rather than silently ignored.
    pub fn convert_options(&self) -> Result<ConvertOptions> {
        let mut options = ConvertOptions::default();

        if let Some(extension) = &self.output.extension {
            options.output_extension = extension.trim_start_matches('.').to_string();
        }
        if let Some(frontmatter) = self.output.frontmatter {
            options.frontmatter = frontmatter;
        }
        if let Some(hard_break) = &self.output.hard_break {
            options.hard_break = hard_break
                .parse::<HardBreak>()
                .context("Invalid [output] hard_break")?;
        }
        if let Some(definitions) = &self.output.definitions {
            options.definitions = definitions
                .parse::<DefinitionStyle>()
                .context("Invalid [output] definitions")?;
        }
        if let Some(wikilinks) = self.links.wikilinks {
            options.wikilinks = wikilinks;
        }
        if let Some(color) = self.links.color_internal {
            options.color_internal_links = color;
        }
        if let Some(images) = &self.media.images {
            options.images = images
                .parse::<ImageDialect>()
                .context("Invalid [media] images")?;
        }
        if let Some(previews) = &self.media.previews {
            options.previews = previews
                .parse::<PreviewMode>()
                .context("Invalid [media] previews")?;
        }

        Ok(options)
    }

    /// Generate JSON schema for the configuration
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Config)
    }

    /// Generate JSON schema as a string
    pub fn json_schema_string() -> Result<String> {
        let schema = Self::json_schema();
        serde_json::to_string_pretty(&schema).context("Failed to serialize JSON schema")
    }

    /// Serialize configuration to TOML string with schema directive
    pub fn to_toml_with_schema(&self) -> Result<String> {
        let toml_content =
            toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;

        Ok(format!("#:schema {}\n\n{}", SCHEMA_URL, toml_content))
    }

    /// Create a sample configuration with the defaults spelled out, for `init`
    pub fn sample() -> Self {
        let defaults = ConvertOptions::default();
        Config {
            output: OutputConfig {
                directory: None, // next to the sources
                extension: Some(defaults.output_extension),
                frontmatter: Some(defaults.frontmatter),
                hard_break: Some(defaults.hard_break.to_string()),
                definitions: Some(defaults.definitions.to_string()),
            },
            links: LinksConfig {
                wikilinks: Some(defaults.wikilinks),
                color_internal: Some(defaults.color_internal_links),
            },
            media: MediaConfig {
                images: Some(defaults.images.to_string()),
                previews: Some(defaults.previews.to_string()),
            },
            code: CodeConfig { hints: None },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty_config() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.output.extension.is_none());
        assert!(config.links.wikilinks.is_none());
    }

    #[test]
    fn test_parse_full_config() {
        let config: Config = toml::from_str(
            r#"
            [output]
            directory = "vault"
            extension = "markdown"
            frontmatter = false
            hard_break = "html"
            definitions = "markdown"

            [links]
            wikilinks = false
            color_internal = true

            [media]
            images = "embed"
            previews = "no"

            [code]
            hints = "hints.json"
            "#,
        )
        .unwrap();

        assert_eq!(config.output.directory, Some(PathBuf::from("vault")));
        assert_eq!(config.code.hints, Some(PathBuf::from("hints.json")));

        let options = config.convert_options().unwrap();
        assert_eq!(options.output_extension, "markdown");
        assert!(!options.frontmatter);
        assert_eq!(options.hard_break, HardBreak::Html);
        assert_eq!(options.definitions, DefinitionStyle::Markdown);
        assert!(!options.wikilinks);
        assert!(options.color_internal_links);
        assert_eq!(options.images, ImageDialect::Embed);
        assert_eq!(options.previews, PreviewMode::Suppressed);
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [media]
            images = "html"
            "#,
        )
        .unwrap();

        let options = config.convert_options().unwrap();
        assert_eq!(options.images, ImageDialect::Html);
        assert_eq!(options.previews, PreviewMode::Linked);
        assert!(options.wikilinks);
        assert_eq!(options.output_extension, "md");
    }

    #[test]
    fn test_unknown_mode_is_an_error() {
        let config: Config = toml::from_str(
            r#"
            [media]
            images = "ascii-art"
            "#,
        )
        .unwrap();

        let err = config.convert_options().unwrap_err();
        assert!(format!("{err:#}").contains("ascii-art"));
    }

    #[test]
    fn test_serialize_empty_config() {
        let config = Config::default();
        let toml = config.to_toml_with_schema().unwrap();
        assert!(toml.starts_with("#:schema"));
        assert!(!toml.contains("[output]"));
    }

    #[test]
    fn test_sample_roundtrip() {
        let config = Config::sample();
        let toml = config.to_toml_with_schema().unwrap();
        assert!(toml.contains("[media]"));
        assert!(toml.contains("images = \"markdown\""));

        let parsed: Config = toml::from_str(&toml).unwrap();
        let options = parsed.convert_options().unwrap();
        let defaults = ConvertOptions::default();
        assert_eq!(options.previews, defaults.previews);
        assert_eq!(options.definitions, defaults.definitions);
        assert_eq!(options.hard_break, defaults.hard_break);
    }

    #[test]
    fn test_json_schema_generation() {
        let schema = Config::json_schema_string().unwrap();
        assert!(schema.contains("\"title\""));
        assert!(schema.contains("MediaConfig"));
    }
}
