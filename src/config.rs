//! Configuration types for notebook-to-gallery conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. Every path the converter touches is
//! derived from this struct; nothing is resolved against the process working
//! directory except through [`ConversionConfig::base_dir`].
//!
//! # Path semantics
//! `gallery_dir` and `authors_dir` play two roles. They are written into the
//! generated document verbatim (figure targets, `.. include::` paths, the
//! author `:photo:`), and they are resolved against `base_dir` when files are
//! actually read or written. Keeping them relative keeps the generated
//! document portable.

use crate::error::Nb2GalleryError;
use crate::pipeline::markup::{MarkupConverter, PandocConverter};
use crate::progress::ProgressCallback;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Notebook names starting with this prefix are live-executable demos.
pub const EXECUTABLE_PREFIX: &str = "tutorial_";

/// Default Sphinx-Gallery directory (the directory holding all demos).
pub const DEFAULT_GALLERY_DIR: &str = "../demonstrations";

/// Default directory for author pictures and bio files.
pub const DEFAULT_AUTHORS_DIR: &str = "../_static/authors";

/// Configuration for one notebook conversion.
///
/// # Example
/// ```rust
/// use nb2gallery::ConversionConfig;
///
/// let config = ConversionConfig::for_notebook("notebooks/tutorial_qaoa.ipynb")
///     .gallery_dir("demonstrations")
///     .build()
///     .unwrap();
/// assert!(config.executable);
/// assert_eq!(config.asset_folder, "qaoa");
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Notebook base name (file stem). Names the document and image assets.
    pub notebook_name: String,

    /// Live-executable demos are re-run by the gallery build, so captured
    /// outputs are not embedded. Default: name starts with [`EXECUTABLE_PREFIX`].
    pub executable: bool,

    /// Gallery directory; the document is written here. Default: [`DEFAULT_GALLERY_DIR`].
    pub gallery_dir: PathBuf,

    /// Image asset subfolder under `gallery_dir`. Default: notebook name with
    /// [`EXECUTABLE_PREFIX`] stripped.
    pub asset_folder: String,

    /// Author asset directory. Default: [`DEFAULT_AUTHORS_DIR`].
    pub authors_dir: PathBuf,

    /// Root for resolving relative paths on disk. Default: `.`.
    pub base_dir: PathBuf,

    /// Extension of the generated document. Default: `py`.
    pub document_extension: String,

    /// Markdown → reStructuredText engine. Default: [`PandocConverter`].
    pub markup_converter: Arc<dyn MarkupConverter>,

    /// Optional per-cell progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            notebook_name: String::new(),
            executable: false,
            gallery_dir: PathBuf::from(DEFAULT_GALLERY_DIR),
            asset_folder: String::new(),
            authors_dir: PathBuf::from(DEFAULT_AUTHORS_DIR),
            base_dir: PathBuf::from("."),
            document_extension: "py".to_string(),
            markup_converter: Arc::new(PandocConverter::default()),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("notebook_name", &self.notebook_name)
            .field("executable", &self.executable)
            .field("gallery_dir", &self.gallery_dir)
            .field("asset_folder", &self.asset_folder)
            .field("authors_dir", &self.authors_dir)
            .field("base_dir", &self.base_dir)
            .field("document_extension", &self.document_extension)
            .field("markup_converter", &"<dyn MarkupConverter>")
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
            executable_override: None,
            asset_folder_override: None,
        }
    }

    /// Builder pre-filled from the notebook path's naming convention.
    pub fn for_notebook(notebook_path: impl AsRef<Path>) -> ConversionConfigBuilder {
        let name = notebook_path
            .as_ref()
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::builder().notebook_name(name)
    }

    /// Resolve a configured path for filesystem access.
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    /// Where the converted document is written.
    pub fn document_path(&self) -> PathBuf {
        self.resolve(
            self.gallery_dir
                .join(format!("{}.{}", self.notebook_name, self.document_extension)),
        )
    }

    /// Directory receiving extracted images, as written into the document.
    pub fn asset_dir(&self) -> PathBuf {
        self.gallery_dir.join(&self.asset_folder)
    }
}

/// Whether the naming convention marks `name` as live-executable.
pub fn is_executable_name(name: &str) -> bool {
    name.starts_with(EXECUTABLE_PREFIX)
}

/// Asset folder derived from a notebook name.
pub fn default_asset_folder(name: &str) -> String {
    name.strip_prefix(EXECUTABLE_PREFIX).unwrap_or(name).to_string()
}

/// Builder for [`ConversionConfig`].
///
/// `executable` and `asset_folder` follow the notebook name unless set
/// explicitly, regardless of call order.
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
    executable_override: Option<bool>,
    asset_folder_override: Option<String>,
}

impl ConversionConfigBuilder {
    pub fn notebook_name(mut self, name: impl Into<String>) -> Self {
        self.config.notebook_name = name.into();
        self
    }

    pub fn executable(mut self, v: bool) -> Self {
        self.executable_override = Some(v);
        self
    }

    pub fn gallery_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.gallery_dir = dir.into();
        self
    }

    pub fn asset_folder(mut self, folder: impl Into<String>) -> Self {
        self.asset_folder_override = Some(folder.into());
        self
    }

    pub fn authors_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.authors_dir = dir.into();
        self
    }

    pub fn base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.base_dir = dir.into();
        self
    }

    pub fn document_extension(mut self, ext: impl Into<String>) -> Self {
        self.config.document_extension = ext.into();
        self
    }

    pub fn markup_converter(mut self, converter: Arc<dyn MarkupConverter>) -> Self {
        self.config.markup_converter = converter;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, Nb2GalleryError> {
        let mut config = self.config;
        if config.notebook_name.trim().is_empty() {
            return Err(Nb2GalleryError::InvalidConfig(
                "notebook name must not be empty".into(),
            ));
        }
        let ext = &config.document_extension;
        if ext.is_empty() || ext.contains(['/', '\\']) {
            return Err(Nb2GalleryError::InvalidConfig(format!(
                "document extension must be a bare extension, got '{ext}'"
            )));
        }

        config.executable = self
            .executable_override
            .unwrap_or_else(|| is_executable_name(&config.notebook_name));
        config.asset_folder = self
            .asset_folder_override
            .unwrap_or_else(|| default_asset_folder(&config.notebook_name));
        if config.asset_folder.is_empty() {
            return Err(Nb2GalleryError::InvalidConfig(
                "asset folder must not be empty".into(),
            ));
        }
        Ok(config)
    }
}
