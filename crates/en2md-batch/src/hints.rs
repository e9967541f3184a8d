//! Per-note code block languages
//!
//! Exported code blocks carry no language. A hints file maps note file names
//! to the languages of their fenced code blocks, in order:
//!
//! ```json
//! { "Setup.html": ["bash", "python"] }
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::{BatchError, Result};

/// Note name -> fenced code block languages
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeHints(HashMap<String, Vec<String>>);

impl CodeHints {
    pub fn new(map: HashMap<String, Vec<String>>) -> Self {
        Self(map)
    }

    /// Load hints from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let map = serde_json::from_str(&content).map_err(|e| BatchError::Hints {
            file: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(Self(map))
    }

    /// Hints for a note, by relative name first and then by file name
    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.0
            .get(name)
            .or_else(|| {
                let file_name = name.rsplit('/').next()?;
                self.0.get(file_name)
            })
            .map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
