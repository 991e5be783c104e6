//! Pipeline stages for notebook-to-gallery conversion.
//!
//! Each submodule implements exactly one transformation step; the cell
//! transcoder in [`crate::convert`] drives them in order.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ markup ──▶ postprocess ──┐
//! (JSON/YAML) (pandoc)  (rst fixes)   ├──▶ document ──▶ author
//!       └───────▶ outputs ───────────┘                 (trailer)
//!                 (Out: / figures)
//! ```
//!
//! 1. [`input`]      : read the notebook and author files with path-aware errors
//! 2. [`markup`]     : markdown → rst through an injected converter
//! 3. [`postprocess`]: ordered regex rules fixing converter artefacts
//! 4. [`outputs`]    : captured outputs → commented `Out:` blocks and figure assets
//! 5. [`author`]     : author picture/bio assets and the closing include

pub mod author;
pub mod input;
pub mod markup;
pub mod outputs;
pub mod postprocess;
