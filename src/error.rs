//! Error types for the nb2gallery library.
//!
//! Every failure is fatal: the conversion is a one-shot batch transform, so
//! there is nothing to retry and nothing useful to emit after a bad cell. All
//! variants live in [`Nb2GalleryError`] and are grouped by [`ErrorKind`] so
//! callers can branch on the class of failure without matching every variant.
//!
//! | Kind | Raised when |
//! |------|-------------|
//! | [`ErrorKind::Structural`] | notebook has no `cells`, no cells at all, or a non-markdown first cell |
//! | [`ErrorKind::MalformedOutput`] | an output record lacks the representation its type promises |
//! | [`ErrorKind::Io`] | an input cannot be read/parsed or an output cannot be written |
//! | [`ErrorKind::Config`] | author metadata or conversion settings are invalid |
//! | [`ErrorKind::Markup`] | the markdown → reStructuredText converter failed |

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the nb2gallery library.
#[derive(Debug, Error)]
pub enum Nb2GalleryError {
    // ── Structural errors ─────────────────────────────────────────────────
    /// The notebook document has no `cells` array.
    #[error("Notebook has no 'cells' array")]
    MissingCells,

    /// The notebook has a `cells` array but it is empty.
    #[error("Notebook contains no cells; the first cell must be a markdown header")]
    EmptyNotebook,

    /// The first cell must be markdown; it becomes the document header.
    #[error("First notebook cell must be markdown (found '{found}')")]
    HeaderNotMarkdown { found: String },

    // ── Output errors ─────────────────────────────────────────────────────
    /// A captured output is missing the representation its type requires.
    #[error("Malformed output #{output} in cell {cell}: {detail}")]
    MalformedOutput {
        cell: usize,
        output: usize,
        detail: String,
    },

    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("File not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// Any other read failure.
    #[error("Failed to read '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The notebook file is not valid notebook JSON.
    #[error("Notebook '{path}' is not valid JSON: {source}")]
    NotebookParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    // ── Output I/O errors ─────────────────────────────────────────────────
    /// Could not create a directory or write a file (document, image, author asset).
    #[error("Failed to write '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// The author file is malformed or lacks a required field.
    #[error("Invalid author file '{path}': {detail}")]
    AuthorParse { path: PathBuf, detail: String },

    /// Author metadata parsed but cannot be used.
    #[error("Invalid author information: {0}")]
    InvalidAuthor(String),

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Markup converter errors ───────────────────────────────────────────
    /// The markdown → reStructuredText converter failed.
    #[error("Markdown conversion failed: {detail}")]
    MarkupConversion { detail: String },
}

/// Coarse classification of [`Nb2GalleryError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Structural,
    MalformedOutput,
    Io,
    Config,
    Markup,
}

impl Nb2GalleryError {
    /// The class this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingCells | Self::EmptyNotebook | Self::HeaderNotMarkdown { .. } => {
                ErrorKind::Structural
            }
            Self::MalformedOutput { .. } => ErrorKind::MalformedOutput,
            Self::FileNotFound { .. }
            | Self::PermissionDenied { .. }
            | Self::ReadFailed { .. }
            | Self::NotebookParse { .. }
            | Self::OutputWriteFailed { .. } => ErrorKind::Io,
            Self::AuthorParse { .. } | Self::InvalidAuthor(_) | Self::InvalidConfig(_) => {
                ErrorKind::Config
            }
            Self::MarkupConversion { .. } => ErrorKind::Markup,
        }
    }

    /// Map a read error on `path` to the most specific variant.
    pub(crate) fn from_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::NotFound => Self::FileNotFound { path },
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            _ => Self::ReadFailed { path, source },
        }
    }

    pub(crate) fn write_failed(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::OutputWriteFailed {
            path: path.into(),
            source,
        }
    }
}
