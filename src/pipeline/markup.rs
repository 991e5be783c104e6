//! Markdown → reStructuredText conversion capability.
//!
//! The converter is injected through [`crate::config::ConversionConfig`] so
//! the transcoder never depends on a particular engine. The default,
//! [`PandocConverter`], shells out to the `pandoc` binary; tests and embedders
//! can pass any closure with the right signature instead.

use crate::error::Nb2GalleryError;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use tracing::debug;

/// Converts one markdown cell into the target reStructuredText dialect.
///
/// Implementations must be stateless across calls: the transcoder calls
/// [`to_markup`](MarkupConverter::to_markup) once per non-empty markdown cell,
/// in cell order.
pub trait MarkupConverter: Send + Sync {
    fn to_markup(&self, markdown: &str) -> Result<String, Nb2GalleryError>;
}

impl<F> MarkupConverter for F
where
    F: Fn(&str) -> Result<String, Nb2GalleryError> + Send + Sync,
{
    fn to_markup(&self, markdown: &str) -> Result<String, Nb2GalleryError> {
        self(markdown)
    }
}

/// Runs `pandoc --from=markdown --to=rst` per cell.
#[derive(Debug, Clone)]
pub struct PandocConverter {
    /// Executable to run. Default: `pandoc` (looked up on `PATH`).
    pub program: PathBuf,
    /// Column limit for `--wrap=auto`. Default: 100.
    pub columns: usize,
}

impl Default for PandocConverter {
    fn default() -> Self {
        Self {
            program: PathBuf::from("pandoc"),
            columns: 100,
        }
    }
}

impl PandocConverter {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            ..Self::default()
        }
    }

    pub fn with_columns(mut self, columns: usize) -> Self {
        self.columns = columns.max(1);
        self
    }

    fn args(&self) -> Vec<String> {
        vec![
            "--from=markdown".to_string(),
            "--to=rst".to_string(),
            "--wrap=auto".to_string(),
            format!("--columns={}", self.columns),
        ]
    }
}

impl MarkupConverter for PandocConverter {
    fn to_markup(&self, markdown: &str) -> Result<String, Nb2GalleryError> {
        let mut child = Command::new(&self.program)
            .args(self.args())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Nb2GalleryError::MarkupConversion {
                detail: format!("failed to run '{}': {e}", self.program.display()),
            })?;

        // pandoc reads all of stdin before writing, so a blocking write
        // followed by wait_with_output cannot deadlock.
        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(markdown.as_bytes())
                .map_err(|e| Nb2GalleryError::MarkupConversion {
                    detail: format!("failed to feed '{}': {e}", self.program.display()),
                })?;
        }

        let output = child
            .wait_with_output()
            .map_err(|e| Nb2GalleryError::MarkupConversion {
                detail: format!("'{}' did not finish: {e}", self.program.display()),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Nb2GalleryError::MarkupConversion {
                detail: format!(
                    "'{}' exited with {}: {}",
                    self.program.display(),
                    output.status,
                    stderr.trim()
                ),
            });
        }

        let rst = String::from_utf8(output.stdout).map_err(|e| {
            Nb2GalleryError::MarkupConversion {
                detail: format!("converter produced non-UTF-8 output: {e}"),
            }
        })?;
        debug!("Converted {} bytes of markdown → {} bytes of rst", markdown.len(), rst.len());
        Ok(rst)
    }
}
