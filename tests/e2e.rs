//! End-to-end tests for nb2gallery.
//!
//! Every test runs the public API against a fresh temporary directory. The
//! markdown converter is a closure standing in for pandoc, except in
//! `test_real_pandoc_header`, which runs the real binary and skips itself
//! when pandoc is not installed.
//!
//! Run with:
//!   cargo test --test e2e -- --nocapture

use nb2gallery::{
    clean_markup, convert, convert_to_file, transcode, AuthorInfo, ConversionConfig, ErrorKind,
    MarkupConverter, Nb2GalleryError, Notebook, PandocConverter,
};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

// 1×1 transparent PNG.
const PNG_B64: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

// ── Test helpers ─────────────────────────────────────────────────────────────

/// Markdown `# X` → rst title, everything else passed through.
fn fake_pandoc() -> Arc<dyn MarkupConverter> {
    Arc::new(|md: &str| -> Result<String, Nb2GalleryError> {
        let rst = match md.strip_prefix("# ") {
            Some(title) => format!("{title}\n{}\n", "=".repeat(title.len())),
            None => format!("{md}\n"),
        };
        Ok(rst)
    })
}

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::create_dir_all(dir.path().join("pics")).unwrap();
        std::fs::write(dir.path().join("pics/jane.png"), b"jane-picture").unwrap();
        Self { dir }
    }

    fn root(&self) -> &Path {
        self.dir.path()
    }

    fn config(&self, name: &str) -> ConversionConfig {
        ConversionConfig::builder()
            .notebook_name(name)
            .base_dir(self.root())
            .gallery_dir("demonstrations")
            .authors_dir("_static/authors")
            .markup_converter(fake_pandoc())
            .build()
            .expect("valid config")
    }

    fn write_notebook(&self, file: &str, value: serde_json::Value) -> PathBuf {
        let path = self.root().join(file);
        std::fs::write(&path, serde_json::to_string_pretty(&value).unwrap()).unwrap();
        path
    }

    fn write_author(&self, yaml: &str) -> PathBuf {
        let path = self.root().join("author.yml");
        std::fs::write(&path, yaml).unwrap();
        path
    }
}

fn jane() -> AuthorInfo {
    AuthorInfo {
        name: "Jane Q. Doe".into(),
        profile_picture: PathBuf::from("pics/jane.png"),
        bio: Some("Writes demos.".into()),
        formatted_name: None,
    }
}

fn notebook(value: serde_json::Value) -> Notebook {
    serde_json::from_value(value).expect("valid notebook")
}

fn separator() -> String {
    "#".repeat(70)
}

// ── Structural failures ──────────────────────────────────────────────────────

#[test]
fn test_code_first_cell_writes_nothing() {
    let ws = Workspace::new();
    let nb = ws.write_notebook(
        "demo.ipynb",
        json!({"cells": [
            {"cell_type": "code", "id": "a", "source": "print(1)", "outputs": []},
            {"cell_type": "markdown", "source": "# Title"}
        ]}),
    );
    let author = ws.write_author("name: Jane Q. Doe\nprofile_picture: pics/jane.png\n");
    let config = ws.config("demo");

    let err = convert_to_file(&nb, &author, &config).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Structural);
    assert!(!config.document_path().exists(), "no document on failure");
    assert!(
        !ws.root().join("_static/authors/jane_q_doe.txt").exists(),
        "author block must not run after a structural failure"
    );
}

#[test]
fn test_missing_cells_and_empty_notebook() {
    let ws = Workspace::new();
    let config = ws.config("demo");
    for value in [json!({"metadata": {}}), json!({"cells": []})] {
        let err = convert(&notebook(value), &jane(), &config).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Structural);
    }
}

#[test]
fn test_missing_author_field_fails_before_cells() {
    let ws = Workspace::new();
    let nb = ws.write_notebook(
        "demo.ipynb",
        json!({"cells": [{"cell_type": "markdown", "source": "# Title"}]}),
    );
    let author = ws.write_author("profile_picture: pics/jane.png\n");
    let config = ws.config("demo");

    let err = convert_to_file(&nb, &author, &config).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);
    assert!(!config.document_path().exists());
}

#[test]
fn test_malformed_output_aborts_without_document() {
    let ws = Workspace::new();
    let nb = ws.write_notebook(
        "demo.ipynb",
        json!({"cells": [
            {"cell_type": "markdown", "source": "# Title"},
            {"cell_type": "code", "id": "c", "source": "x", "outputs": [
                {"output_type": "execute_result", "data": {"text/html": ["<i>x</i>"]}}
            ]}
        ]}),
    );
    let author = ws.write_author("name: Jane Q. Doe\nprofile_picture: pics/jane.png\n");
    let config = ws.config("demo");

    let err = convert_to_file(&nb, &author, &config).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedOutput);
    assert!(!config.document_path().exists());
}

// ── Post-processing through the public API ──────────────────────────────────

#[test]
fn test_container_note_becomes_note_directive() {
    let out = clean_markup("Intro\n\n.. container:: note\n\n   Careful.\n");
    assert!(out.lines().any(|l| l == ".. note::"));
    assert!(!out.contains("container::"));
}

#[test]
fn test_property_marker_gets_its_own_line() {
    assert_eq!(clean_markup("foo :property=bar"), "foo\n   :property=bar");
}

// ── Outputs ─────────────────────────────────────────────────────────────────

#[test]
fn test_image_only_display_data_is_idempotent() {
    let ws = Workspace::new();
    let config = ws.config("gates");
    let nb = notebook(json!({"cells": [
        {"cell_type": "markdown", "source": "# Gates"},
        {"cell_type": "code", "id": "f00d", "source": "plt.show()", "outputs": [
            {"output_type": "display_data", "data": {"image/png": PNG_B64}, "metadata": {}}
        ]}
    ]}));

    let first = convert(&nb, &jane(), &config).unwrap();
    let image = ws.root().join("demonstrations/gates/gates_f00d_1.png");
    assert_eq!(first.assets, vec![image.clone()]);
    assert_eq!(first.document.matches(".. figure::").count(), 1);
    assert!(first
        .document
        .contains("# .. figure:: demonstrations/gates/gates_f00d_1.png\n#    :align: center\n#    :width: 80%"));
    let bytes = std::fs::read(&image).unwrap();

    let second = convert(&nb, &jane(), &config).unwrap();
    assert_eq!(second.document, first.document);
    assert_eq!(std::fs::read(&image).unwrap(), bytes);
    let files = std::fs::read_dir(ws.root().join("demonstrations/gates"))
        .unwrap()
        .count();
    assert_eq!(files, 1);
}

#[test]
fn test_executable_notebook_embeds_no_outputs() {
    let ws = Workspace::new();
    let config = ConversionConfig::builder()
        .notebook_name("tutorial_gates")
        .base_dir(ws.root())
        .gallery_dir("demonstrations")
        .markup_converter(fake_pandoc())
        .build()
        .unwrap();
    assert!(config.executable);

    let nb = notebook(json!({"cells": [
        {"cell_type": "markdown", "source": "# Gates"},
        {"cell_type": "code", "id": "a", "source": "print(1)", "outputs": [
            {"output_type": "stream", "name": "stdout", "text": ["1\n"]},
            {"output_type": "display_data", "data": {"image/png": PNG_B64}}
        ]}
    ]}));
    let out = transcode(&nb, &config).unwrap();
    assert!(out.document.ends_with("\n\nprint(1)"));
    assert!(out.assets.is_empty());
    assert!(!ws.root().join("demonstrations/gates").exists());
}

// ── Full conversions ─────────────────────────────────────────────────────────

#[test]
fn test_two_cell_notebook_document() {
    let ws = Workspace::new();
    let nb = ws.write_notebook(
        "demo.ipynb",
        json!({"nbformat": 4, "nbformat_minor": 5, "cells": [
            {"cell_type": "markdown", "metadata": {}, "source": ["# Title"]},
            {"cell_type": "code", "id": "c1", "execution_count": 1, "metadata": {},
             "source": ["print(1)"],
             "outputs": [{"output_type": "execute_result", "execution_count": 1,
                          "metadata": {}, "data": {"text/plain": ["1"]}}]}
        ]}),
    );
    let author = ws.write_author("name: Jane Q. Doe\nprofile_picture: pics/jane.png\n");
    let config = ws.config("demo");

    let output = convert_to_file(&nb, &author, &config).unwrap();
    let written = std::fs::read_to_string(config.document_path()).unwrap();
    assert_eq!(written, output.document);

    let sep = separator();
    let expected = format!(
        "r\"\"\"Title\n=====\n\"\"\"\n\nprint(1)\n\n{sep}\n\
# .. rst-class :: sphx-glr-script-out\n# \n# Out:\n# \n# .. code-block: none\n# \n#    1\
\n\n{sep}\n# About the author\n# ----------------\n# .. include:: _static/authors/jane_q_doe.txt"
    );
    assert_eq!(written, expected);
    assert_eq!(output.stats.markdown_cells, 1);
    assert_eq!(output.stats.code_cells, 1);
    assert_eq!(output.stats.outputs_rendered, 1);
}

#[test]
fn test_author_assets_written() {
    let ws = Workspace::new();
    let config = ws.config("demo");
    let nb = notebook(json!({"cells": [{"cell_type": "markdown", "source": "# T"}]}));
    let author = AuthorInfo {
        bio: None,
        ..jane()
    };

    let out = convert(&nb, &author, &config).unwrap();
    assert_eq!(out.author.stem, "jane_q_doe");
    let authors = ws.root().join("_static/authors");
    assert_eq!(
        std::fs::read(authors.join("jane_q_doe.png")).unwrap(),
        b"jane-picture"
    );
    let info = std::fs::read_to_string(authors.join("jane_q_doe.txt")).unwrap();
    assert!(info.starts_with(".. bio:: Jane Q. Doe\n   :photo: _static/authors/jane_q_doe.png"));
    assert!(out
        .document
        .ends_with("# .. include:: _static/authors/jane_q_doe.txt"));
}

#[test]
fn test_exactly_one_author_block() {
    let ws = Workspace::new();
    let config = ws.config("demo");
    let mut cells = vec![json!({"cell_type": "markdown", "source": "# T"})];
    for code_cells in [0usize, 5] {
        cells.truncate(1);
        for i in 0..code_cells {
            cells.push(json!({"cell_type": "code", "id": format!("c{i}"),
                              "source": format!("x = {i}"), "outputs": []}));
        }
        let nb = notebook(json!({ "cells": cells.clone() }));
        let out = convert(&nb, &jane(), &config).unwrap();
        assert_eq!(out.document.matches("About the author").count(), 1);
        assert!(out
            .document
            .ends_with("# .. include:: _static/authors/jane_q_doe.txt"));
        assert_eq!(out.stats.code_cells, code_cells);
    }
}

#[test]
fn test_mixed_outputs_and_markdown_sections() {
    let ws = Workspace::new();
    let config = ws.config("mixed");
    let nb = notebook(json!({"cells": [
        {"cell_type": "markdown", "source": "# Mixed"},
        {"cell_type": "markdown", "source": "Some prose"},
        {"cell_type": "code", "id": "k", "source": "%timeit f()\nrun()", "outputs": [
            {"output_type": "stream", "name": "stdout", "text": "running\n"},
            {"output_type": "display_data", "data": {"image/png": PNG_B64,
                                                      "text/plain": ["<Figure>"]}},
            {"output_type": "display_data", "data": {"text/plain": ["  done  "]}}
        ]}
    ]}));

    let out = convert(&nb, &jane(), &config).unwrap();
    let doc = &out.document;
    assert!(doc.contains(&format!("\n\n{}\n# Some prose\n# ", separator())));
    assert!(doc.contains("\n# %timeit f()\nrun()"));
    assert!(doc.contains("#    running"));
    assert!(doc.contains("# .. figure:: demonstrations/mixed/mixed_k_1.png"));
    assert!(!doc.contains("<Figure>"));
    assert!(doc.contains("\n#    done"));
    assert_eq!(doc.matches("Out:").count(), 1, "only the stream has a header");
    assert_eq!(out.stats.images_written, 1);
}

#[test]
fn test_result_after_error_output_keeps_out_block() {
    let ws = Workspace::new();
    let config = ws.config("demo");
    let nb = notebook(json!({"cells": [
        {"cell_type": "markdown", "source": "# T"},
        {"cell_type": "code", "id": "e", "source": "f()", "outputs": [
            {"output_type": "error", "ename": "ValueError", "evalue": "x", "traceback": []},
            {"output_type": "execute_result", "data": {"text/plain": ["42"]}}
        ]}
    ]}));

    let out = transcode(&nb, &config).unwrap();
    assert!(out.document.contains(&format!("\n\nf()\n\n{}\n# .. rst-class", separator())));
    assert!(out.document.ends_with("# Out:\n# \n# .. code-block: none\n# \n#    42"));
}

#[test]
fn test_rerun_with_picture_already_renamed() {
    let ws = Workspace::new();
    let config = ws.config("demo");
    let nb = notebook(json!({"cells": [{"cell_type": "markdown", "source": "# T"}]}));
    convert(&nb, &jane(), &config).unwrap();

    let renamed = AuthorInfo {
        profile_picture: PathBuf::from("_static/authors/jane_q_doe.png"),
        ..jane()
    };
    let out = convert(&nb, &renamed, &config).unwrap();
    assert_eq!(std::fs::read(&out.author.picture).unwrap(), b"jane-picture");
}

// ── Real pandoc (skipped when unavailable) ───────────────────────────────────

#[test]
fn test_real_pandoc_header() {
    let pandoc = PandocConverter::default();
    let Ok(rst) = pandoc.to_markup("# Title") else {
        println!("SKIP: pandoc not available");
        return;
    };
    assert!(rst.starts_with("Title\n====="), "got: {rst:?}");

    let ws = Workspace::new();
    let config = ConversionConfig::builder()
        .notebook_name("demo")
        .base_dir(ws.root())
        .gallery_dir("demonstrations")
        .authors_dir("_static/authors")
        .markup_converter(Arc::new(pandoc))
        .build()
        .unwrap();
    let nb = notebook(json!({"cells": [
        {"cell_type": "markdown", "source": "# Title"},
        {"cell_type": "markdown", "source": "<div class=\"note\">\nCareful.\n</div>"}
    ]}));
    let out = convert(&nb, &jane(), &config).unwrap();
    assert!(out.document.starts_with("r\"\"\"Title\n=====\n"));
    assert!(!out.document.contains("container::"));
}
