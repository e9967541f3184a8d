//! en2md-batch: Folder-level operations for note export conversion
//!
//! This crate drives [`en2md_core`] over an export directory:
//! - Single-note, link-following and whole-directory modes
//! - Output placement by notebook and resource copying
//! - Per-note code block language hints
//! - Run reports with missing notes, missing links and root notes
//!
//! The core performs no I/O; everything touching the filesystem lives here.
//!
//! ## Features
//!
//! - `graph`: Enable root detection over the internal-link graph (petgraph)

pub mod graph;
pub mod hints;
pub mod report;

pub use graph::{Island, LinkGraphAnalyzer, LinkMap, RootAnalysis, UnavailableAnalyzer, default_analyzer};
#[cfg(feature = "graph")]
pub use graph::PetgraphAnalyzer;
pub use hints::CodeHints;
pub use report::{ConvertedNote, Failure, RunReport};

use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Instant;

use en2md_core::{ConvertError, ConvertOptions, convert_document};
use rayon::prelude::*;
use serde::Serialize;

/// Errors that can occur during batch operations
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Input file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Directory not found: {0}")]
    DirectoryNotFound(PathBuf),

    #[error("Mode '{0}' needs a start file, not a directory")]
    StartFileRequired(Mode),

    #[error("Parse error in {file}: {source}")]
    Parse {
        file: PathBuf,
        source: en_html::ParseError,
    },

    #[error("Conversion failed for {file}: {source}")]
    Convert { file: PathBuf, source: ConvertError },

    #[error("Invalid code hints file {file}: {message}")]
    Hints { file: PathBuf, message: String },

    #[error("Unknown mode: {0} (expected single, recursive or all)")]
    UnknownMode(String),
}

/// Result type for batch operations
pub type Result<T> = std::result::Result<T, BatchError>;

/// Which notes a run converts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Only the start note
    #[default]
    Single,
    /// The start note and every note reachable through internal links
    Recursive,
    /// Every note of the export directory
    All,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Recursive => "recursive",
            Self::All => "all",
        }
    }
}

impl FromStr for Mode {
    type Err = BatchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single" => Ok(Self::Single),
            "recursive" => Ok(Self::Recursive),
            "all" => Ok(Self::All),
            _ => Err(BatchError::UnknownMode(s.to_string())),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An export directory and the note a run starts from
#[derive(Debug, Clone)]
pub struct NoteExport {
    /// Directory holding the exported notes
    pub root: PathBuf,
    /// Start note, relative to `root`
    pub start: Option<String>,
    /// Every note file of `root`, sorted
    pub notes: Vec<String>,
}

impl NoteExport {
    /// Open an export from a note file or from its directory
    pub fn open(path: &Path) -> Result<Self> {
        let (root, start) = if path.is_file() {
            let root = path.parent().map(Path::to_path_buf).unwrap_or_default();
            let start = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned());
            (root, start)
        } else if path.is_dir() {
            (path.to_path_buf(), None)
        } else {
            return Err(BatchError::FileNotFound(path.to_path_buf()));
        };

        let dir = if root.as_os_str().is_empty() {
            Path::new(".")
        } else {
            root.as_path()
        };
        let notes = collect_notes(dir)?;

        Ok(Self { root, start, notes })
    }
}

/// Options for a batch run
#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    pub mode: Mode,
    /// Write into `<dir>/<notebook>/` and copy resources to `<dir>/resources/`;
    /// without it, output is written next to each source note
    pub output_dir: Option<PathBuf>,
    /// Convert without writing anything
    pub dry_run: bool,
    /// Number of parallel jobs in `all` mode (None = use all CPUs)
    pub parallel_jobs: Option<usize>,
    pub convert: ConvertOptions,
    pub code_hints: CodeHints,
}

/// Builder for batch runs
///
/// # Example
///
/// ```ignore
/// use en2md_batch::{BatchConverter, BatchOptions, Mode, NoteExport};
///
/// let export = NoteExport::open(Path::new("export/Home.html"))?;
/// let options = BatchOptions {
///     mode: Mode::Recursive,
///     output_dir: Some(PathBuf::from("vault")),
///     ..Default::default()
/// };
/// let report = BatchConverter::new(&export, options).run()?;
/// println!("{report}");
/// ```
pub struct BatchConverter<'a> {
    export: &'a NoteExport,
    options: BatchOptions,
    analyzer: Box<dyn LinkGraphAnalyzer>,
}

impl<'a> BatchConverter<'a> {
    pub fn new(export: &'a NoteExport, options: BatchOptions) -> Self {
        Self {
            export,
            options,
            analyzer: default_analyzer(),
        }
    }

    /// Replace the link graph analyzer used in `all` mode
    pub fn with_analyzer(mut self, analyzer: impl LinkGraphAnalyzer + 'static) -> Self {
        self.analyzer = Box::new(analyzer);
        self
    }

    /// Execute the run
    ///
    /// Failures of individual notes are collected in the report; only
    /// problems with the run as a whole are returned as errors.
    pub fn run(self) -> Result<RunReport> {
        let started = Instant::now();
        let (export, options) = (self.export, &self.options);

        if let Some(out_dir) = &options.output_dir
            && !options.dry_run
        {
            fs::create_dir_all(out_dir)?;
        }

        let mut report = RunReport::new(options.mode);
        match options.mode {
            Mode::Single => {
                let start = self.start()?;
                report.record(start, convert_note(export, options, start));
            }
            Mode::Recursive => {
                let start = self.start()?;
                let mut pending = vec![start.to_string()];
                let mut seen = BTreeSet::new();
                let mut missing_links = BTreeSet::new();
                while let Some(name) = pending.pop() {
                    if !seen.insert(name.clone()) {
                        continue;
                    }
                    // Dangling links are reported, not failed
                    if name != start && !export.root.join(&name).is_file() {
                        missing_links.insert(name);
                        continue;
                    }
                    let outcome = convert_note(export, options, &name);
                    if let Ok(note) = &outcome {
                        // Reversed so the first link is visited first
                        pending.extend(
                            note.links
                                .iter()
                                .rev()
                                .filter(|link| !seen.contains(*link))
                                .cloned(),
                        );
                    }
                    report.record(&name, outcome);
                }
                report.missing_files = export
                    .notes
                    .iter()
                    .filter(|name| !seen.contains(*name))
                    .cloned()
                    .collect();
                report.missing_links = missing_links.into_iter().collect();
            }
            Mode::All => {
                if let Some(n) = options.parallel_jobs {
                    rayon::ThreadPoolBuilder::new()
                        .num_threads(n)
                        .build_global()
                        .ok(); // Ignore error if already initialized
                }

                let outcomes: Vec<_> = export
                    .notes
                    .par_iter()
                    .map(|name| (name, convert_note(export, options, name)))
                    .collect();
                for (name, outcome) in outcomes {
                    report.record(name, outcome);
                }

                let targets: BTreeSet<&String> =
                    report.converted.iter().flat_map(|n| &n.links).collect();
                report.missing_links = targets
                    .into_iter()
                    .filter(|name| !report.is_converted(name))
                    .cloned()
                    .collect();
                report.roots = self.analyzer.analyze(&report.link_map());
            }
        }

        report.elapsed = started.elapsed();
        Ok(report)
    }

    fn start(&self) -> Result<&'a str> {
        self.export
            .start
            .as_deref()
            .ok_or(BatchError::StartFileRequired(self.options.mode))
    }
}

/// Convert one note, write it and copy its resources
fn convert_note(export: &NoteExport, options: &BatchOptions, name: &str) -> Result<ConvertedNote> {
    log::info!("Converting {name}");

    let source = export.root.join(name);
    if !source.is_file() {
        return Err(BatchError::FileNotFound(source));
    }

    let bytes = fs::read(&source)?;
    let doc = en_html::parse_bytes(&bytes).map_err(|e| BatchError::Parse {
        file: source.clone(),
        source: e,
    })?;
    let conversion = convert_document(doc, &options.convert, options.code_hints.get(name))
        .map_err(|e| BatchError::Convert {
            file: source.clone(),
            source: e,
        })?;

    let stem = Path::new(name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    if let Some(title) = &conversion.metadata.title
        && *title != stem
    {
        log::info!("{name}: output file name differs from title \"{title}\"");
    }

    let output = output_path(export, options, name, &stem, conversion.metadata.notebook.as_deref());
    let links = conversion
        .internal_links
        .iter()
        .filter_map(|link| resolve_relative(name, link))
        .collect();

    let mut missing_resources = Vec::new();
    if !options.dry_run {
        if let Some(parent) = output.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&output, &conversion.text)?;

        if let Some(out_dir) = &options.output_dir {
            for resource in &conversion.resources {
                if let Err(e) = copy_resource(export, out_dir, name, resource) {
                    log::warn!("{name}: could not copy resource {resource}: {e}");
                    missing_resources.push(resource.clone());
                }
            }
        }
    }

    Ok(ConvertedNote {
        name: name.to_string(),
        title: conversion.metadata.title,
        output,
        links,
        warnings: conversion.diagnostics.warnings(),
        missing_resources,
    })
}

/// Where a converted note is written
fn output_path(
    export: &NoteExport,
    options: &BatchOptions,
    name: &str,
    stem: &str,
    notebook: Option<&str>,
) -> PathBuf {
    let file_name = format!("{stem}.{}", options.convert.output_extension);
    match &options.output_dir {
        Some(out_dir) => {
            let mut dir = out_dir.clone();
            if let Some(notebook) = notebook {
                dir.push(notebook);
            }
            dir.join(file_name)
        }
        None => export.root.join(name).with_file_name(file_name),
    }
}

/// Copy a resource into `<out_dir>/resources/`, keeping its relative path
fn copy_resource(export: &NoteExport, out_dir: &Path, note: &str, resource: &str) -> Result<()> {
    let relative = resolve_relative(note, resource)
        .ok_or_else(|| BatchError::FileNotFound(PathBuf::from(resource)))?;
    let target = out_dir.join("resources").join(&relative);
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(export.root.join(&relative), target)?;
    Ok(())
}

/// Resolve a link found in note `from` to a path relative to the export root
///
/// Returns None for links that leave the export directory.
fn resolve_relative(from: &str, link: &str) -> Option<String> {
    let mut parts: Vec<&str> = from.split('/').collect();
    parts.pop();
    for part in link.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                parts.pop()?;
            }
            _ => parts.push(part),
        }
    }
    (!parts.is_empty()).then(|| parts.join("/"))
}

/// Collect all note files of a directory (not recursive)
fn collect_notes(dir: &Path) -> Result<Vec<String>> {
    if !dir.is_dir() {
        return Err(BatchError::DirectoryNotFound(dir.to_path_buf()));
    }

    let mut notes = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file()
            && let Some(ext) = path.extension()
            && (ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm"))
            && let Some(name) = path.file_name()
        {
            notes.push(name.to_string_lossy().into_owned());
        }
    }
    notes.sort();

    Ok(notes)
}
