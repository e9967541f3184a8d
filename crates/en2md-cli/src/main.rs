//! en2md: CLI tool to convert note-export HTML to Markdown

mod config;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::LevelFilter;
use std::fs;
use std::path::{Path, PathBuf};

use config::{CONFIG_FILE_NAME, Config};
use en2md_batch::{BatchConverter, BatchOptions, CodeHints, Mode, NoteExport};
use en2md_core::{ConvertOptions, DefinitionStyle, HardBreak, ImageDialect, PreviewMode};

#[derive(Parser, Debug)]
#[command(name = "en2md")]
#[command(about = "Convert note-export HTML to Markdown")]
#[command(version)]
#[command(args_conflicts_with_subcommands = true)]
#[command(after_help = "Examples:
  en2md Home.html                     # Convert one note to Home.md
  en2md Home.html -m recursive -o vault/
                                      # Follow internal links, write into vault/
  en2md export/ -m all -o vault/ -j4  # Convert every note with 4 jobs
  en2md init                          # Write a sample en2md.toml")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    convert: ConvertArgs,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a sample configuration file
    Init {
        /// Configuration file to create
        #[arg(short, long, default_value = CONFIG_FILE_NAME)]
        output: PathBuf,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,

        /// Print the JSON schema of the configuration file instead
        #[arg(long)]
        schema: bool,
    },
}

#[derive(Args, Debug)]
struct ConvertArgs {
    /// Note to convert (or start from), or the export directory in `all` mode
    input: Option<PathBuf>,

    /// Conversion mode: single, recursive or all
    #[arg(short, long, default_value_t = Mode::Single)]
    mode: Mode,

    /// Output directory (defaults to next to each source note)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Number of parallel jobs in `all` mode (defaults to number of CPUs)
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Convert without writing any file
    #[arg(short = 't', long)]
    dry_run: bool,

    /// Configuration file (defaults to en2md.toml in the input directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON file mapping note file names to their code block languages
    #[arg(long)]
    code_hints: Option<PathBuf>,

    /// Run report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    report: ReportFormat,

    /// Render links between notes as [text](target) instead of [[wikilinks]]
    #[arg(long)]
    markdown_links: bool,

    /// Keep the source color of internal links
    #[arg(long)]
    color_internal_links: bool,

    /// Image syntax: html, markdown or embed
    #[arg(long)]
    images: Option<ImageDialect>,

    /// Preview images of linked attachments: no, link or image
    #[arg(long)]
    previews: Option<PreviewMode>,

    /// Definition lists: markdown or html
    #[arg(long)]
    definitions: Option<DefinitionStyle>,

    /// Hard line break marker: backslash or html
    #[arg(long)]
    hard_break: Option<HardBreak>,

    /// File extension of converted notes
    #[arg(long)]
    extension: Option<String>,

    /// Disable YAML frontmatter
    #[arg(long)]
    no_frontmatter: bool,

    /// Verbose output (-v: info, -vv: debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode - only show errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, Default)]
enum ReportFormat {
    #[default]
    Text,
    Json,
}

impl ConvertArgs {
    /// Apply command-line overrides on top of the configured options
    fn apply(&self, options: &mut ConvertOptions) {
        if self.markdown_links {
            options.wikilinks = false;
        }
        if self.color_internal_links {
            options.color_internal_links = true;
        }
        if let Some(images) = self.images {
            options.images = images;
        }
        if let Some(previews) = self.previews {
            options.previews = previews;
        }
        if let Some(definitions) = self.definitions {
            options.definitions = definitions;
        }
        if let Some(hard_break) = self.hard_break {
            options.hard_break = hard_break;
        }
        if let Some(extension) = &self.extension {
            options.output_extension = extension.trim_start_matches('.').to_string();
        }
        if self.no_frontmatter {
            options.frontmatter = false;
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Command::Init {
            output,
            force,
            schema,
        }) => {
            init_logging(0, false);
            init_config(&output, force, schema)
        }
        None => {
            init_logging(cli.convert.verbose, cli.convert.quiet);
            convert(&cli.convert)
        }
    }
}

/// Install the logger; `RUST_LOG` takes precedence over the flags
fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => LevelFilter::Error,
        (false, 0) => LevelFilter::Warn,
        (false, 1) => LevelFilter::Info,
        (false, _) => LevelFilter::Debug,
    };

    env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp(None)
        .parse_default_env()
        .init();
}

/// Run a conversion
fn convert(args: &ConvertArgs) -> Result<()> {
    let Some(input) = &args.input else {
        anyhow::bail!("No input given (see --help)");
    };
    if !input.exists() {
        anyhow::bail!("Input path does not exist: {}", input.display());
    }

    let export = NoteExport::open(input)
        .with_context(|| format!("Failed to open export: {}", input.display()))?;

    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::load_from_dir(export_dir(&export))?.unwrap_or_default(),
    };

    let mut convert_options = config.convert_options()?;
    args.apply(&mut convert_options);

    let code_hints = match args.code_hints.as_ref().or(config.code.hints.as_ref()) {
        Some(path) => CodeHints::load(path)
            .with_context(|| format!("Failed to load code hints: {}", path.display()))?,
        None => CodeHints::default(),
    };

    let options = BatchOptions {
        mode: args.mode,
        output_dir: args.output.clone().or(config.output.directory),
        dry_run: args.dry_run,
        parallel_jobs: args.jobs,
        convert: convert_options,
        code_hints,
    };

    let report = BatchConverter::new(&export, options).run()?;

    match args.report {
        ReportFormat::Text => {
            if !args.quiet {
                println!("{report}");
            }
        }
        ReportFormat::Json => println!("{}", report.to_json()?),
    }

    if !report.failures.is_empty() {
        anyhow::bail!("{} files failed to convert", report.failures.len());
    }

    Ok(())
}

/// Directory searched for the default configuration file
fn export_dir(export: &NoteExport) -> &Path {
    if export.root.as_os_str().is_empty() {
        Path::new(".")
    } else {
        &export.root
    }
}

/// Write a sample configuration file, or print the schema
fn init_config(output: &Path, force: bool, schema: bool) -> Result<()> {
    if schema {
        println!("{}", Config::json_schema_string()?);
        return Ok(());
    }

    if output.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            output.display()
        );
    }

    let content = Config::sample().to_toml_with_schema()?;
    fs::write(output, content)
        .with_context(|| format!("Failed to write: {}", output.display()))?;

    println!("{}", output.display());

    Ok(())
}
