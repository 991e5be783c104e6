//! CLI binary for nb2gallery.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ConversionConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use nb2gallery::config::{DEFAULT_AUTHORS_DIR, DEFAULT_GALLERY_DIR};
use nb2gallery::{
    convert_to_file, AuthorAssets, ConversionConfig, ConversionProgressCallback, ConversionStats,
    PandocConverter, ProgressCallback,
};
use serde::Serialize;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one bar tick per cell.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.cyan} {prefix:.bold}  [{bar:42.green/238}] {pos:>3}/{len} cells  {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏  ")
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
        );
        bar.set_prefix("Converting");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_conversion_start(&self, total_cells: usize) {
        self.bar.set_length(total_cells as u64);
        self.bar.reset_eta();
    }

    fn on_cell_start(&self, index: usize, _total: usize, cell_type: &str) {
        self.bar.set_message(format!("cell {} ({cell_type})", index + 1));
    }

    fn on_cell_complete(&self, _index: usize, _total: usize, _fragment_len: usize) {
        self.bar.inc(1);
    }

    fn on_conversion_complete(&self, _total_cells: usize, _document_len: usize) {
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Static demo: captured outputs and figures are embedded
  nb2gallery qsvt_intro.ipynb --author-file authors/jane.yml

  # Executable demo (name starts with tutorial_): outputs are regenerated
  nb2gallery tutorial_qaoa.ipynb --author-file authors/jane.yml

  # Custom gallery location, JSON summary
  nb2gallery demo.ipynb --author-file a.yml --sphinx-gallery-dir ./demos --json

AUTHOR FILE (YAML):
  name: Jane Q. Doe                # required
  profile_picture: pics/jane.png   # required
  bio: Writes quantum demos.       # optional
  formatted_name: jdoe             # optional file-name override

ENVIRONMENT VARIABLES:
  NB2GALLERY_PANDOC        Path to the pandoc executable
  RUST_LOG                 Log filter (overrides --verbose/--quiet)
"#;

/// Convert a Jupyter notebook into a Sphinx-Gallery demo script.
#[derive(Parser, Debug)]
#[command(
    name = "nb2gallery",
    version,
    about = "Convert a Jupyter notebook into a Sphinx-Gallery demo script",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Notebook (.ipynb) to convert.
    file: PathBuf,

    /// Treat the notebook as executable even without the `tutorial_` prefix.
    #[arg(long, env = "NB2GALLERY_IS_EXECUTABLE")]
    is_executable: bool,

    /// Sphinx-Gallery directory (the directory that holds all demos).
    #[arg(long, env = "NB2GALLERY_GALLERY_DIR", default_value = DEFAULT_GALLERY_DIR)]
    sphinx_gallery_dir: PathBuf,

    /// Directory where author pictures and bio files are saved.
    #[arg(long, env = "NB2GALLERY_AUTHORS_DIR", default_value = DEFAULT_AUTHORS_DIR)]
    authors_directory: PathBuf,

    /// YAML file with the author information.
    #[arg(long, env = "NB2GALLERY_AUTHOR_FILE")]
    author_file: PathBuf,

    /// Image asset folder under the gallery directory (default: notebook name without prefix).
    #[arg(long, env = "NB2GALLERY_ASSET_FOLDER")]
    asset_folder: Option<String>,

    /// Directory relative output paths are resolved against.
    #[arg(long, env = "NB2GALLERY_BASE_DIR", default_value = ".")]
    base_dir: PathBuf,

    /// pandoc executable used for markdown → rst.
    #[arg(long, env = "NB2GALLERY_PANDOC", default_value = "pandoc")]
    pandoc: PathBuf,

    /// Line width pandoc wraps rst at.
    #[arg(long, env = "NB2GALLERY_COLUMNS", default_value_t = 100)]
    columns: usize,

    /// Print a JSON summary (paths and stats) on stdout.
    #[arg(long, env = "NB2GALLERY_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "NB2GALLERY_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "NB2GALLERY_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "NB2GALLERY_QUIET")]
    quiet: bool,
}

#[derive(Serialize)]
struct Summary<'a> {
    document: PathBuf,
    executable: bool,
    assets: &'a [PathBuf],
    author: &'a AuthorAssets,
    stats: &'a ConversionStats,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn ConversionProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;

    // ── Run conversion ───────────────────────────────────────────────────
    let output = convert_to_file(&cli.file, &cli.author_file, &config)
        .with_context(|| format!("Failed to convert {}", cli.file.display()))?;
    let document = config.document_path();

    if cli.json {
        let summary = Summary {
            document,
            executable: config.executable,
            assets: &output.assets,
            author: &output.author,
            stats: &output.stats,
        };
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).context("Failed to serialise summary")?
        );
    } else if !cli.quiet {
        eprintln!(
            "{}  {} cells  {} images  {}ms  →  {}",
            green("✔"),
            output.stats.total_cells,
            output.stats.images_written,
            output.stats.duration_ms,
            bold(&document.display().to_string()),
        );
        eprintln!(
            "   {}",
            dim(&format!("author: {}", output.author.info_file.display()))
        );
    }

    Ok(())
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ConversionConfig> {
    let converter = PandocConverter::new(&cli.pandoc).with_columns(cli.columns);

    let mut builder = ConversionConfig::for_notebook(&cli.file)
        .gallery_dir(&cli.sphinx_gallery_dir)
        .authors_dir(&cli.authors_directory)
        .base_dir(&cli.base_dir)
        .markup_converter(Arc::new(converter));

    // The flag can only switch execution on; the name prefix still applies.
    if cli.is_executable {
        builder = builder.executable(true);
    }
    if let Some(ref folder) = cli.asset_folder {
        builder = builder.asset_folder(folder.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
