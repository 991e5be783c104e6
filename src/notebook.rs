//! Notebook data model (nbformat v4), deserialised with serde.
//!
//! Only the fields the converter reads are modelled; everything else in the
//! JSON (metadata, execution counts, widget state) is ignored. nbformat allows
//! multi-line strings to be stored either as a list of lines or as a single
//! string, so every text field goes through [`MultilineText`].

use crate::error::Nb2GalleryError;
use serde::Deserialize;
use std::collections::BTreeMap;

/// A parsed notebook document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Notebook {
    /// Ordered cell list. `None` when the document has no `cells` key.
    #[serde(default)]
    pub cells: Option<Vec<Cell>>,

    #[serde(default)]
    pub nbformat: Option<u32>,

    #[serde(default)]
    pub nbformat_minor: Option<u32>,
}

impl Notebook {
    /// Parse a notebook from its JSON text.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Check the structural invariants and return the cell list.
    ///
    /// A convertible notebook has at least one cell and its first cell is
    /// markdown (it becomes the document header).
    pub fn validated_cells(&self) -> Result<&[Cell], Nb2GalleryError> {
        let cells = self.cells.as_deref().ok_or(Nb2GalleryError::MissingCells)?;
        let first = cells.first().ok_or(Nb2GalleryError::EmptyNotebook)?;
        if !matches!(first, Cell::Markdown(_)) {
            return Err(Nb2GalleryError::HeaderNotMarkdown {
                found: first.kind_name().to_string(),
            });
        }
        Ok(cells)
    }
}

/// One notebook cell, tagged by `cell_type`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "cell_type", rename_all = "lowercase")]
pub enum Cell {
    Markdown(MarkdownCell),
    Code(CodeCell),
    /// Raw cells pass through nbconvert untouched; the gallery format has no
    /// place for them.
    Raw(RawCell),
}

impl Cell {
    /// The nbformat `cell_type` string.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Cell::Markdown(_) => "markdown",
            Cell::Code(_) => "code",
            Cell::Raw(_) => "raw",
        }
    }

    /// The full cell source.
    pub fn source(&self) -> String {
        match self {
            Cell::Markdown(c) => c.source.joined(),
            Cell::Code(c) => c.source.joined(),
            Cell::Raw(c) => c.source.joined(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MarkdownCell {
    #[serde(default)]
    pub source: MultilineText,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CodeCell {
    /// Cell identifier (nbformat ≥ 4.5). Names extracted image assets.
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub source: MultilineText,

    #[serde(default)]
    pub outputs: Vec<Output>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCell {
    #[serde(default)]
    pub source: MultilineText,
}

/// A captured execution output, tagged by `output_type`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "output_type", rename_all = "snake_case")]
pub enum Output {
    ExecuteResult {
        #[serde(default)]
        data: Option<MimeBundle>,
    },
    DisplayData {
        #[serde(default)]
        data: Option<MimeBundle>,
    },
    Stream {
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        text: Option<MultilineText>,
    },
    /// `error` outputs and anything newer than this model.
    #[serde(other)]
    Unrecognised,
}

impl Output {
    /// The nbformat `output_type` string.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Output::ExecuteResult { .. } => "execute_result",
            Output::DisplayData { .. } => "display_data",
            Output::Stream { .. } => "stream",
            Output::Unrecognised => "unrecognised",
        }
    }
}

/// MIME type → representation map of an `execute_result` / `display_data`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct MimeBundle(BTreeMap<String, serde_json::Value>);

impl MimeBundle {
    pub const TEXT_PLAIN: &'static str = "text/plain";
    pub const IMAGE_PNG: &'static str = "image/png";

    pub fn contains(&self, mime: &str) -> bool {
        self.0.contains_key(mime)
    }

    /// Text representation for `mime`; `Ok(None)` when the key is absent.
    pub fn text(&self, mime: &str) -> Result<Option<MultilineText>, NonTextValue> {
        match self.0.get(mime) {
            None => Ok(None),
            Some(value) => MultilineText::from_json(value)
                .map(Some)
                .ok_or(NonTextValue),
        }
    }

    pub fn mime_types(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl FromIterator<(String, serde_json::Value)> for MimeBundle {
    fn from_iter<I: IntoIterator<Item = (String, serde_json::Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A MIME entry held something other than a string or list of strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NonTextValue;

/// nbformat multi-line string: a list of lines or one string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum MultilineText {
    Lines(Vec<String>),
    Single(String),
}

impl Default for MultilineText {
    fn default() -> Self {
        MultilineText::Lines(Vec::new())
    }
}

impl MultilineText {
    /// Concatenate into a single string (list items already carry their `\n`).
    pub fn joined(&self) -> String {
        match self {
            MultilineText::Lines(lines) => lines.concat(),
            MultilineText::Single(s) => s.clone(),
        }
    }

    /// Iterate the stored lines. Each line may still end with `\n`.
    pub fn lines(&self) -> Vec<&str> {
        match self {
            MultilineText::Lines(lines) => lines.iter().map(String::as_str).collect(),
            MultilineText::Single(s) => s.split_inclusive('\n').collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            MultilineText::Lines(lines) => lines.iter().all(String::is_empty),
            MultilineText::Single(s) => s.is_empty(),
        }
    }

    fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::String(s) => Some(MultilineText::Single(s.clone())),
            serde_json::Value::Array(items) => items
                .iter()
                .map(|v| v.as_str().map(str::to_string))
                .collect::<Option<Vec<_>>>()
                .map(MultilineText::Lines),
            _ => None,
        }
    }
}
