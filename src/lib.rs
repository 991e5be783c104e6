//! # nb2gallery
//!
//! Convert Jupyter notebooks into Sphinx-Gallery demo scripts.
//!
//! A gallery script is a Python file whose prose lives in comments written in
//! reStructuredText. The first markdown cell becomes the module docstring,
//! later markdown cells become `# `-prefixed comment blocks, code cells are
//! copied verbatim, and (for demos that are not re-executed at build time)
//! captured outputs are embedded as `Out:` blocks and extracted figures.
//!
//! ## Pipeline Overview
//!
//! ```text
//! .ipynb
//!  │
//!  ├─ 1. Input       parse notebook JSON and author YAML
//!  ├─ 2. Validate    non-empty, first cell is markdown
//!  ├─ 3. Markup      markdown cells → rst (pandoc, injectable)
//!  ├─ 4. Polish      3-rule rst post-processing
//!  ├─ 5. Outputs     Out: blocks, PNGs decoded to sidecar files
//!  ├─ 6. Escape      comment out `%` magic lines
//!  └─ 7. Author      bio include + renamed picture, appended last
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use nb2gallery::{convert_to_file, ConversionConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::for_notebook("tutorial_qaoa.ipynb")
//!         .gallery_dir("../demonstrations")
//!         .build()?;
//!     let output = convert_to_file("tutorial_qaoa.ipynb", "author.yml", &config)?;
//!     eprintln!("{} images extracted", output.stats.images_written);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `nb2gallery` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod notebook;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder, EXECUTABLE_PREFIX};
pub use convert::{convert, convert_to_file, transcode, TranscodedNotebook};
pub use error::{ErrorKind, Nb2GalleryError};
pub use notebook::{Cell, MultilineText, Notebook, Output};
pub use output::{AuthorAssets, ConversionOutput, ConversionStats};
pub use pipeline::author::AuthorInfo;
pub use pipeline::input::{read_author, read_notebook};
pub use pipeline::markup::{MarkupConverter, PandocConverter};
pub use pipeline::postprocess::clean_markup;
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
