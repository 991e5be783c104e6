//! Input loading: notebook JSON and author YAML from disk.
//!
//! Both readers attach the offending path to every error so the CLI can say
//! exactly which file to fix.

use crate::error::Nb2GalleryError;
use crate::notebook::Notebook;
use crate::pipeline::author::AuthorInfo;
use std::path::Path;
use tracing::debug;

/// Read and parse a `.ipynb` file.
///
/// Only JSON syntax and cell/output shapes are checked here; the structural
/// rules (non-empty, markdown header) are enforced by the transcoder.
pub fn read_notebook(path: impl AsRef<Path>) -> Result<Notebook, Nb2GalleryError> {
    let path = path.as_ref();
    let text =
        std::fs::read_to_string(path).map_err(|e| Nb2GalleryError::from_read(path, e))?;
    let notebook =
        Notebook::from_json_str(&text).map_err(|source| Nb2GalleryError::NotebookParse {
            path: path.to_path_buf(),
            source,
        })?;
    debug!(
        "Loaded notebook {} (nbformat {}.{}, {} cells)",
        path.display(),
        notebook.nbformat.unwrap_or(0),
        notebook.nbformat_minor.unwrap_or(0),
        notebook.cells.as_ref().map_or(0, Vec::len)
    );
    Ok(notebook)
}

/// Read and parse an author YAML file.
///
/// A missing `name` or `profile_picture` is reported as a config error.
pub fn read_author(path: impl AsRef<Path>) -> Result<AuthorInfo, Nb2GalleryError> {
    let path = path.as_ref();
    let text =
        std::fs::read_to_string(path).map_err(|e| Nb2GalleryError::from_read(path, e))?;
    parse_author(&text).map_err(|detail| Nb2GalleryError::AuthorParse {
        path: path.to_path_buf(),
        detail,
    })
}

fn parse_author(content: &str) -> Result<AuthorInfo, String> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err("file is empty".into());
    }
    serde_yaml::from_str(trimmed).map_err(|e| format!("Invalid YAML: {e}"))
}
