//! Pairing of micrograph images with their `.align` companion files.

use std::fs;
use std::path::{Path, PathBuf};

/// Image extensions recognised as micrographs (case-insensitive).
pub const IMAGE_EXTENSIONS: [&str; 4] = ["bmp", "jpg", "png", "tiff"];
/// Extension of the alignment metadata file.
pub const ALIGN_EXTENSION: &str = "align";

#[derive(thiserror::Error, Debug)]
pub enum SourceError {
    #[error("no companion file found for {path}")]
    CompanionNotFound { path: PathBuf },
    #[error("not a micrograph or alignment file: {path}")]
    UnsupportedFile { path: PathBuf },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A micrograph and its alignment file, sharing a stem in one directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourcePair {
    pub image: PathBuf,
    pub alignment: PathBuf,
}

/// Text before the first `.` of the file name.
fn stem(path: &Path) -> Option<&str> {
    let name = path.file_name()?.to_str()?;
    name.split('.').next().filter(|s| !s.is_empty())
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
}

fn is_image(path: &Path) -> bool {
    extension(path).is_some_and(|e| IMAGE_EXTENSIONS.contains(&e.as_str()))
}

fn is_alignment(path: &Path) -> bool {
    extension(path).is_some_and(|e| e == ALIGN_EXTENSION)
}

impl SourcePair {
    /// Resolve the pair from either of its two files.
    ///
    /// The sibling is searched in the same directory; entries are visited
    /// in name order so the first match is deterministic.
    pub fn resolve(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let want_image = if is_alignment(path) {
            true
        } else if is_image(path) {
            false
        } else {
            return Err(SourceError::UnsupportedFile {
                path: path.to_path_buf(),
            });
        };
        let key = stem(path).ok_or_else(|| SourceError::UnsupportedFile {
            path: path.to_path_buf(),
        })?;
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let mut entries = fs::read_dir(&dir)?
            .map(|e| e.map(|e| e.path()))
            .collect::<Result<Vec<_>, _>>()?;
        entries.sort();

        let companion = entries.into_iter().find(|p| {
            p.is_file()
                && stem(p) == Some(key)
                && if want_image { is_image(p) } else { is_alignment(p) }
        });
        let Some(companion) = companion else {
            log::warn!("no companion for {}", path.display());
            return Err(SourceError::CompanionNotFound {
                path: path.to_path_buf(),
            });
        };
        log::debug!("paired {} with {}", path.display(), companion.display());

        let (image, alignment) = if want_image {
            (companion, path.to_path_buf())
        } else {
            (path.to_path_buf(), companion)
        };
        Ok(Self { image, alignment })
    }
}
