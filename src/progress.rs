//! Progress-callback trait for per-cell conversion events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to receive
//! events as the transcoder walks the notebook. Markdown cells dominate the
//! runtime (each one runs the markup converter), so a long notebook is worth
//! a progress bar.
//!
//! # Example
//!
//! ```rust
//! use nb2gallery::{ConversionProgressCallback, ConversionConfig};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     completed: AtomicUsize,
//! }
//!
//! impl ConversionProgressCallback for CountingCallback {
//!     fn on_cell_complete(&self, index: usize, total_cells: usize, fragment_len: usize) {
//!         let done = self.completed.fetch_add(1, Ordering::SeqCst) + 1;
//!         eprintln!("cell {}/{} ({} bytes), {done} done", index + 1, total_cells, fragment_len);
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback { completed: AtomicUsize::new(0) });
//!
//! let config = ConversionConfig::builder()
//!     .notebook_name("demo")
//!     .progress_callback(counter as Arc<dyn ConversionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the transcoder as it processes each cell.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Events arrive in cell order on the converting thread.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once after the notebook passes validation.
    fn on_conversion_start(&self, total_cells: usize) {
        let _ = total_cells;
    }

    /// Called before a cell is transformed.
    ///
    /// # Arguments
    /// * `index`      : 0-indexed cell position
    /// * `total_cells`: cells in the notebook
    /// * `cell_type`  : nbformat `cell_type`
    fn on_cell_start(&self, index: usize, total_cells: usize, cell_type: &str) {
        let _ = (index, total_cells, cell_type);
    }

    /// Called after a cell's fragment has been appended.
    ///
    /// `fragment_len` is 0 for cells that contribute nothing.
    fn on_cell_complete(&self, index: usize, total_cells: usize, fragment_len: usize) {
        let _ = (index, total_cells, fragment_len);
    }

    /// Called once after every cell has been transformed.
    fn on_conversion_complete(&self, total_cells: usize, document_len: usize) {
        let _ = (total_cells, document_len);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;
