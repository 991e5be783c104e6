//! Result types returned by the conversion entry points.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The converted document plus everything written alongside it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionOutput {
    /// Full gallery script: header, cell fragments, author block.
    pub document: String,
    /// Image files extracted from captured outputs, in document order.
    pub assets: Vec<PathBuf>,
    /// Files written by the author block.
    pub author: AuthorAssets,
    pub stats: ConversionStats,
}

/// Files produced for the author block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorAssets {
    /// Sanitised filename stem shared by both files.
    pub stem: String,
    /// Renamed copy of the profile picture.
    pub picture: PathBuf,
    /// Generated `.. bio::` include file.
    pub info_file: PathBuf,
}

/// Counters for one conversion run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionStats {
    pub total_cells: usize,
    pub markdown_cells: usize,
    pub code_cells: usize,
    /// Cells with empty source, raw cells.
    pub skipped_cells: usize,
    /// Captured outputs that produced text or figure markup.
    pub outputs_rendered: usize,
    pub images_written: usize,
    pub duration_ms: u64,
}
