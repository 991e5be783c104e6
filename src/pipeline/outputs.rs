//! Output-block rendering: captured cell outputs → commented rst.
//!
//! Static (non-executable) demos embed what the notebook printed. Text results
//! become an `Out:` block of comment lines; PNG images are decoded to sidecar
//! files next to the demo and referenced with a `.. figure::` directive.
//!
//! The `Out:` header with its separator is emitted for the first output of a
//! cell that renders anything; skipped outputs (errors, html-only displays,
//! empty streams) do not count. Streams always carry their own header.

use crate::config::ConversionConfig;
use crate::error::Nb2GalleryError;
use crate::notebook::{MimeBundle, MultilineText, Output};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::path::PathBuf;
use tracing::{debug, warn};

/// Width of the `####…` comment line separating gallery blocks.
pub const SEPARATOR_WIDTH: usize = 70;

/// The `####…` block separator.
pub fn separator() -> String {
    "#".repeat(SEPARATOR_WIDTH)
}

const OUTPUT_HEADER: [&str; 6] = [
    ".. rst-class :: sphx-glr-script-out",
    "",
    "Out:",
    "",
    ".. code-block: none",
    "",
];

/// Identifies the cell whose outputs are being rendered.
#[derive(Debug, Clone, Copy)]
pub struct CellRef<'a> {
    /// Position in the notebook, for error messages.
    pub index: usize,
    /// Cell identifier used in asset file names.
    pub id: &'a str,
}

/// What rendering a cell's outputs produced.
#[derive(Debug, Default)]
pub struct RenderedOutputs {
    pub fragment: String,
    /// Image files written, as resolved on disk.
    pub images: Vec<PathBuf>,
    pub rendered: usize,
}

/// Render one code cell's outputs.
///
/// Returns an empty fragment without touching the filesystem when the demo is
/// executable: the gallery build re-runs the code and captures fresh output.
pub fn render_outputs(
    outputs: &[Output],
    cell: CellRef<'_>,
    config: &ConversionConfig,
) -> Result<RenderedOutputs, Nb2GalleryError> {
    let mut result = RenderedOutputs::default();
    if config.executable {
        return Ok(result);
    }

    let mut image_ordinal = 0usize;
    for (j, output) in outputs.iter().enumerate() {
        let first = result.rendered == 0;
        let malformed = |detail: String| Nb2GalleryError::MalformedOutput {
            cell: cell.index,
            output: j,
            detail,
        };

        match output {
            Output::ExecuteResult { data } => {
                let data = data
                    .as_ref()
                    .ok_or_else(|| malformed("execute_result has no 'data'".into()))?;
                let text = data
                    .text(MimeBundle::TEXT_PLAIN)
                    .map_err(|_| malformed("'text/plain' is not text".into()))?
                    .ok_or_else(|| malformed("execute_result has no 'text/plain'".into()))?;
                if first {
                    result.fragment.push_str(&header_block());
                }
                result.fragment.push_str(&output_lines(&text, str::trim_end));
                result.rendered += 1;
            }
            Output::DisplayData { data } => {
                let data = data
                    .as_ref()
                    .ok_or_else(|| malformed("display_data has no 'data'".into()))?;

                if data.contains(MimeBundle::IMAGE_PNG) {
                    let payload = data
                        .text(MimeBundle::IMAGE_PNG)
                        .map_err(|_| malformed("'image/png' is not base64 text".into()))?
                        .unwrap_or_default();
                    let bytes = decode_png(&payload).map_err(malformed)?;

                    image_ordinal += 1;
                    let file_name =
                        format!("{}_{}_{}.png", config.notebook_name, cell.id, image_ordinal);
                    let target = config.asset_dir().join(&file_name);
                    let written = write_asset(&config.resolve(&target), &bytes)?;

                    if first {
                        result.fragment.push_str("\n\n");
                        result.fragment.push_str(&separator());
                    }
                    result.fragment.push_str("\n#\n");
                    result.fragment.push_str(&figure_role(&target));
                    result.images.push(written);
                    result.rendered += 1;
                } else if let Some(text) = data
                    .text(MimeBundle::TEXT_PLAIN)
                    .map_err(|_| malformed("'text/plain' is not text".into()))?
                {
                    if first {
                        result.fragment.push_str(&header_block());
                    }
                    result.fragment.push_str(&output_lines(&text, str::trim));
                    result.rendered += 1;
                } else {
                    warn!(
                        "Cell {} output #{}: no text/plain or image/png representation ({}), skipped",
                        cell.index,
                        j,
                        data.mime_types().collect::<Vec<_>>().join(", ")
                    );
                }
            }
            Output::Stream { name, text } => match text {
                Some(text) if !text.is_empty() => {
                    debug!(
                        "Cell {} output #{}: stream '{}'",
                        cell.index,
                        j,
                        name.as_deref().unwrap_or("stdout")
                    );
                    result.fragment.push_str(&header_block());
                    result.fragment.push_str(&output_lines(text, str::trim_end));
                    result.rendered += 1;
                }
                _ => debug!("Cell {} output #{}: empty stream, skipped", cell.index, j),
            },
            Output::Unrecognised => {
                debug!("Cell {} output #{}: unrecognised output type, skipped", cell.index, j);
            }
        }
    }

    Ok(result)
}

/// Separator + commented `Out:` header, with no output lines.
fn header_block() -> String {
    let header = OUTPUT_HEADER
        .iter()
        .map(|line| format!("# {line}"))
        .collect::<Vec<_>>()
        .join("\n");
    format!("\n\n{}\n{}", separator(), header)
}

/// `\n#    line` for each output line, or nothing when there are no lines.
fn output_lines(text: &MultilineText, trim: fn(&str) -> &str) -> String {
    let lines = text.lines();
    if lines.is_empty() {
        return String::new();
    }
    let body = lines
        .iter()
        .map(|line| format!("#    {}", trim(line)))
        .collect::<Vec<_>>()
        .join("\n");
    format!("\n{body}")
}

fn figure_role(target: &std::path::Path) -> String {
    let target = target.to_string_lossy().replace('\\', "/");
    [
        format!("# .. figure:: {target}"),
        "#    :align: center".to_string(),
        "#    :width: 80%".to_string(),
    ]
    .join("\n")
}

/// Decode a notebook PNG payload; nbformat may wrap base64 across lines.
fn decode_png(payload: &MultilineText) -> Result<Vec<u8>, String> {
    let compact: String = payload
        .joined()
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    if compact.is_empty() {
        return Err("'image/png' payload is empty".into());
    }
    STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| format!("'image/png' is not valid base64: {e}"))
}

fn write_asset(path: &std::path::Path, bytes: &[u8]) -> Result<PathBuf, Nb2GalleryError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| Nb2GalleryError::write_failed(parent, e))?;
    }
    std::fs::write(path, bytes).map_err(|e| Nb2GalleryError::write_failed(path, e))?;
    debug!("Wrote image asset {} ({} bytes)", path.display(), bytes.len());
    Ok(path.to_path_buf())
}
