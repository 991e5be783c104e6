//! Cell transcoding and the public conversion entry points.
//!
//! The transcoder walks the cells once, in order, appending one fragment per
//! cell to the document:
//!
//! | Cell | Fragment |
//! |------|----------|
//! | markdown, index 0 | `r"""<rst>"""` header docstring |
//! | markdown, index > 0 | `\n\n` + separator + `\n` + rst with every line prefixed `# ` |
//! | code | `\n\n` + source verbatim, then the rendered outputs (static demos only) |
//! | empty source / raw | nothing |
//!
//! After the last cell, every line starting with `%` (IPython magics) is
//! commented out so the script stays valid Python. The author block is
//! appended last, exactly once.

use crate::config::ConversionConfig;
use crate::error::Nb2GalleryError;
use crate::notebook::{Cell, Notebook};
use crate::output::{ConversionOutput, ConversionStats};
use crate::pipeline::author::{append_author_block, AuthorInfo};
use crate::pipeline::outputs::{render_outputs, separator, CellRef};
use crate::pipeline::{input, postprocess};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Result of transcoding the cells, before the author block is added.
#[derive(Debug, Clone, Default)]
pub struct TranscodedNotebook {
    pub document: String,
    pub assets: Vec<PathBuf>,
    pub stats: ConversionStats,
}

/// Convert every cell of `notebook` into gallery-script text.
///
/// # Errors
/// - Structural errors when the notebook has no cells or starts with a
///   non-markdown cell; nothing is converted in that case.
/// - Errors from the markup converter or the output renderer, unchanged.
pub fn transcode(
    notebook: &Notebook,
    config: &ConversionConfig,
) -> Result<TranscodedNotebook, Nb2GalleryError> {
    let cells = notebook.validated_cells()?;
    let total = cells.len();
    let mut out = TranscodedNotebook::default();
    out.stats.total_cells = total;

    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_start(total);
    }

    for (i, cell) in cells.iter().enumerate() {
        if let Some(ref cb) = config.progress_callback {
            cb.on_cell_start(i, total, cell.kind_name());
        }
        let before = out.document.len();

        let source = cell.source();
        match cell {
            Cell::Markdown(_) => {
                if source.is_empty() {
                    out.stats.skipped_cells += 1;
                } else {
                    let rst = config.markup_converter.to_markup(&source)?;
                    let rst = postprocess::clean_markup(&rst);
                    if i == 0 {
                        out.document.push_str(&format!("r\"\"\"{rst}\"\"\""));
                    } else {
                        out.document.push_str("\n\n");
                        out.document.push_str(&separator());
                        out.document.push('\n');
                        out.document.push_str(&comment_lines(&rst));
                    }
                    out.stats.markdown_cells += 1;
                }
            }
            Cell::Code(code) => {
                if source.is_empty() {
                    out.stats.skipped_cells += 1;
                } else {
                    out.document.push_str("\n\n");
                    out.document.push_str(&source);

                    let fallback_id;
                    let id = match code.id.as_deref() {
                        Some(id) => id,
                        None => {
                            if !config.executable && !code.outputs.is_empty() {
                                warn!("Cell {i} has no id; naming its assets 'cell{i}'");
                            }
                            fallback_id = format!("cell{i}");
                            &fallback_id
                        }
                    };
                    let rendered =
                        render_outputs(&code.outputs, CellRef { index: i, id }, config)?;
                    out.document.push_str(&rendered.fragment);
                    out.stats.outputs_rendered += rendered.rendered;
                    out.stats.images_written += rendered.images.len();
                    out.assets.extend(rendered.images);
                    out.stats.code_cells += 1;
                }
            }
            Cell::Raw(_) => {
                debug!("Cell {i}: raw cell skipped");
                out.stats.skipped_cells += 1;
            }
        }

        let fragment_len = out.document.len() - before;
        debug!("Cell {i} ({}): {fragment_len} bytes", cell.kind_name());
        if let Some(ref cb) = config.progress_callback {
            cb.on_cell_complete(i, total, fragment_len);
        }
    }

    out.document = escape_magic_lines(&out.document);

    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_complete(total, out.document.len());
    }
    Ok(out)
}

/// Convert a parsed notebook and append the author block.
///
/// Author metadata is validated before any cell is processed. Image assets
/// and author files are written as side effects; the document itself is only
/// returned, see [`convert_to_file`] for writing it.
pub fn convert(
    notebook: &Notebook,
    author: &AuthorInfo,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Nb2GalleryError> {
    let start = Instant::now();
    info!("Converting notebook '{}'", config.notebook_name);
    author.validate()?;

    let TranscodedNotebook {
        mut document,
        assets,
        mut stats,
    } = transcode(notebook, config)?;

    let (author_fragment, author_assets) = append_author_block(author, config)?;
    document.push_str(&author_fragment);

    stats.duration_ms = start.elapsed().as_millis() as u64;
    info!(
        "Converted '{}': {} markdown / {} code cells, {} images, {}ms",
        config.notebook_name,
        stats.markdown_cells,
        stats.code_cells,
        stats.images_written,
        stats.duration_ms
    );

    Ok(ConversionOutput {
        document,
        assets,
        author: author_assets,
        stats,
    })
}

/// Read the notebook and author files, convert, and write the document to
/// [`ConversionConfig::document_path`].
///
/// The author file is read first so a bad author fails before the notebook
/// is touched.
///
/// Uses atomic write (temp file + rename) so a failed run never leaves a
/// partial document behind.
pub fn convert_to_file(
    notebook_path: impl AsRef<Path>,
    author_path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Nb2GalleryError> {
    let author = input::read_author(author_path)?;
    let notebook = input::read_notebook(notebook_path)?;

    let output = convert(&notebook, &author, config)?;
    let path = config.document_path();
    write_document(&path, &output.document)?;
    info!("Wrote {}", path.display());
    Ok(output)
}

// ── Internal helpers ─────────────────────────────────────────────────────

fn comment_lines(text: &str) -> String {
    text.split('\n')
        .map(|line| format!("# {line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Comment out lines starting with `%` (IPython magics).
fn escape_magic_lines(document: &str) -> String {
    document.replace("\n%", "\n# %")
}

fn write_document(path: &Path, document: &str) -> Result<(), Nb2GalleryError> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(parent).map_err(|e| Nb2GalleryError::write_failed(parent, e))?;

    let mut tmp = tempfile::NamedTempFile::new_in(parent)
        .map_err(|e| Nb2GalleryError::write_failed(path, e))?;
    tmp.write_all(document.as_bytes())
        .map_err(|e| Nb2GalleryError::write_failed(path, e))?;
    tmp.persist(path)
        .map_err(|e| Nb2GalleryError::write_failed(path, e.error))?;
    Ok(())
}
