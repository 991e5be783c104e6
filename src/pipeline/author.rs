//! Author block: the "About the author" trailer of every demo.
//!
//! The author's picture is copied into the shared authors directory under a
//! sanitised name, a small `.. bio::` file is generated next to it, and the
//! demo ends with an `.. include::` of that file.

use crate::config::ConversionConfig;
use crate::error::Nb2GalleryError;
use crate::output::AuthorAssets;
use crate::pipeline::outputs::separator;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Author metadata, usually loaded from a YAML file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthorInfo {
    pub name: String,
    /// Picture to copy; relative paths resolve against the config's base dir.
    pub profile_picture: PathBuf,
    #[serde(default)]
    pub bio: Option<String>,
    /// Overrides the filename stem derived from `name`.
    #[serde(default)]
    pub formatted_name: Option<String>,
}

static RE_NON_ALNUM: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9]+").unwrap());

impl AuthorInfo {
    /// Filename stem shared by the renamed picture and the info file.
    ///
    /// `formatted_name` is used verbatim when present; otherwise every run of
    /// non-alphanumeric characters in `name` becomes `_` and the result is
    /// lowercased.
    pub fn file_stem(&self) -> Result<String, Nb2GalleryError> {
        let stem = match self.formatted_name.as_deref() {
            Some(formatted) => formatted.trim().to_string(),
            None => sanitise_name(&self.name),
        };
        if stem.is_empty() || stem.contains(['/', '\\']) || stem == "." || stem == ".." {
            return Err(Nb2GalleryError::InvalidAuthor(format!(
                "cannot derive a file name for author '{}' (got '{stem}')",
                self.name
            )));
        }
        Ok(stem)
    }

    /// Check required fields before any cell is processed.
    pub fn validate(&self) -> Result<(), Nb2GalleryError> {
        if self.name.trim().is_empty() {
            return Err(Nb2GalleryError::InvalidAuthor("'name' is empty".into()));
        }
        if self.profile_picture.as_os_str().is_empty() {
            return Err(Nb2GalleryError::InvalidAuthor(
                "'profile_picture' is empty".into(),
            ));
        }
        self.file_stem().map(|_| ())
    }
}

fn sanitise_name(name: &str) -> String {
    RE_NON_ALNUM
        .replace_all(name.trim(), "_")
        .trim_matches('_')
        .to_lowercase()
}

/// All suffixes of the file name (`photo.tar.gz` → `.tar.gz`).
fn full_suffix(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    if name.ends_with('.') {
        return String::new();
    }
    let trimmed = name.trim_start_matches('.');
    trimmed
        .find('.')
        .map(|i| trimmed[i..].to_string())
        .unwrap_or_default()
}

/// Copying a file onto itself truncates it before reading.
fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

fn posix(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Copy the picture, write the info file and return the trailing fragment.
///
/// Expects an author that already passed [`AuthorInfo::validate`]. A picture
/// that already lives at its renamed location is left in place.
pub fn append_author_block(
    author: &AuthorInfo,
    config: &ConversionConfig,
) -> Result<(String, AuthorAssets), Nb2GalleryError> {
    let stem = author.file_stem()?;

    let source = config.resolve(&author.profile_picture);
    if !source.is_file() {
        return Err(Nb2GalleryError::FileNotFound { path: source });
    }

    let picture_name = format!("{stem}{}", full_suffix(&source));
    let picture_ref = config.authors_dir.join(&picture_name);
    let info_ref = config.authors_dir.join(format!("{stem}.txt"));

    let authors_dir = config.resolve(&config.authors_dir);
    std::fs::create_dir_all(&authors_dir)
        .map_err(|e| Nb2GalleryError::write_failed(&authors_dir, e))?;

    let picture_path = config.resolve(&picture_ref);
    if same_file(&source, &picture_path) {
        debug!("Picture {} already in place", picture_path.display());
    } else {
        std::fs::copy(&source, &picture_path)
            .map_err(|e| Nb2GalleryError::write_failed(&picture_path, e))?;
        debug!("Copied {} → {}", source.display(), picture_path.display());
    }

    let info_path = config.resolve(&info_ref);
    std::fs::write(&info_path, bio_text(author, &picture_ref))
        .map_err(|e| Nb2GalleryError::write_failed(&info_path, e))?;
    info!("Wrote author info {}", info_path.display());

    let fragment = [
        "About the author".to_string(),
        "----------------".to_string(),
        format!(".. include:: {}", posix(&info_ref)),
    ]
    .iter()
    .map(|line| format!("# {line}"))
    .collect::<Vec<_>>()
    .join("\n");

    Ok((
        format!("\n\n{}\n{fragment}", separator()),
        AuthorAssets {
            stem,
            picture: picture_path,
            info_file: info_path,
        },
    ))
}

/// `.. bio::` directive body. Continuation lines of a multi-line bio are
/// indented to stay inside the directive.
fn bio_text(author: &AuthorInfo, picture_ref: &Path) -> String {
    let bio = author
        .bio
        .as_deref()
        .unwrap_or("")
        .trim_end()
        .replace('\n', "\n   ");
    format!(
        ".. bio:: {}\n   :photo: {}\n\n   {bio}\n    ",
        author.name,
        posix(picture_ref)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn author(name: &str) -> AuthorInfo {
        AuthorInfo {
            name: name.to_string(),
            profile_picture: PathBuf::from("pics/photo.png"),
            bio: None,
            formatted_name: None,
        }
    }

    fn config(base: &Path) -> ConversionConfig {
        ConversionConfig::builder()
            .notebook_name("demo")
            .base_dir(base)
            .authors_dir("_static/authors")
            .build()
            .unwrap()
    }

    #[test]
    fn stem_sanitises_name() {
        assert_eq!(author("Jane Q. Doe").file_stem().unwrap(), "jane_q_doe");
        assert_eq!(author("Jean-Luc O'Neil").file_stem().unwrap(), "jean_luc_o_neil");
        assert_eq!(author("  José  Núñez ").file_stem().unwrap(), "jos_n_ez");
    }

    #[test]
    fn formatted_name_overrides_stem() {
        let mut a = author("Jane Q. Doe");
        a.formatted_name = Some("jdoe".into());
        assert_eq!(a.file_stem().unwrap(), "jdoe");
    }

    #[test]
    fn unusable_stem_is_config_error() {
        let err = author("!!!").file_stem().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
        let mut a = author("Jane");
        a.formatted_name = Some("../escape".into());
        assert!(a.validate().is_err());
    }

    #[test]
    fn empty_name_fails_validation() {
        assert!(matches!(
            author("  ").validate(),
            Err(Nb2GalleryError::InvalidAuthor(_))
        ));
    }

    #[test]
    fn full_suffix_keeps_every_extension() {
        assert_eq!(full_suffix(Path::new("a/photo.png")), ".png");
        assert_eq!(full_suffix(Path::new("photo.tar.gz")), ".tar.gz");
        assert_eq!(full_suffix(Path::new(".hidden")), "");
        assert_eq!(full_suffix(Path::new("noext")), "");
    }

    #[test]
    fn writes_assets_and_returns_fragment() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("pics")).unwrap();
        std::fs::write(dir.path().join("pics/photo.png"), b"png-bytes").unwrap();

        let mut a = author("Jane Q. Doe");
        a.bio = Some("Writes demos.".into());
        let (fragment, assets) = append_author_block(&a, &config(dir.path())).unwrap();

        assert_eq!(assets.stem, "jane_q_doe");
        assert_eq!(
            std::fs::read(dir.path().join("_static/authors/jane_q_doe.png")).unwrap(),
            b"png-bytes"
        );
        let info =
            std::fs::read_to_string(dir.path().join("_static/authors/jane_q_doe.txt")).unwrap();
        assert_eq!(
            info,
            ".. bio:: Jane Q. Doe\n   :photo: _static/authors/jane_q_doe.png\n\n   Writes demos.\n    "
        );
        assert_eq!(
            fragment,
            format!(
                "\n\n{}\n# About the author\n# ----------------\n# .. include:: _static/authors/jane_q_doe.txt",
                "#".repeat(70)
            )
        );
    }

    #[test]
    fn info_file_overwritten_on_rerun() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("pics")).unwrap();
        std::fs::write(dir.path().join("pics/photo.png"), b"x").unwrap();
        let cfg = config(dir.path());

        let mut a = author("Ann");
        a.bio = Some("first".into());
        append_author_block(&a, &cfg).unwrap();
        a.bio = Some("second".into());
        let (_, assets) = append_author_block(&a, &cfg).unwrap();

        let info = std::fs::read_to_string(assets.info_file).unwrap();
        assert!(info.contains("second"));
        assert!(!info.contains("first"));
    }

    #[test]
    fn picture_already_at_destination_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let authors = dir.path().join("_static/authors");
        std::fs::create_dir_all(&authors).unwrap();
        std::fs::write(authors.join("jane_q_doe.png"), b"PICTURE").unwrap();

        let mut a = author("Jane Q. Doe");
        a.profile_picture = PathBuf::from("_static/authors/jane_q_doe.png");
        let (_, assets) = append_author_block(&a, &config(dir.path())).unwrap();

        assert_eq!(std::fs::read(&assets.picture).unwrap(), b"PICTURE");
        let again = dir.path().join("_static/../_static/authors/jane_q_doe.png");
        a.profile_picture = again;
        append_author_block(&a, &config(dir.path())).unwrap();
        assert_eq!(std::fs::read(&assets.picture).unwrap(), b"PICTURE");
    }

    #[test]
    fn missing_picture_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = append_author_block(&author("Ann"), &config(dir.path())).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
        assert!(err.to_string().contains("photo.png"));
    }

    #[test]
    fn multiline_bio_stays_indented() {
        let mut a = author("Ann");
        a.bio = Some("line one\nline two\n".into());
        let text = bio_text(&a, Path::new("authors/ann.png"));
        assert!(text.contains("\n   line one\n   line two\n    "));
    }
}
