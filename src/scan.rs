//! Directory enumeration.
//!
//! Finds conversion candidates under a directory, either across the whole
//! tree or among its immediate children only. Both modes skip directory
//! entries and keep files accepted by
//! [`is_supported_image`](crate::naming::is_supported_image), except outputs
//! of an earlier pass that kept its sources (`a.converted.webp`, see
//! [`is_kept_conversion`](crate::naming::is_kept_conversion)).
//!
//! ## Ordering
//!
//! Recursive mode walks depth-first with entries sorted by file name, and
//! flat mode sorts the listing by file name, so repeated runs over an
//! unchanged tree see the same order.
//!
//! ## Errors
//!
//! - The root must exist and be a directory; otherwise the call fails
//!   before yielding anything.
//! - In recursive mode an unreadable subdirectory surfaces as an `Err`
//!   item when the walk reaches it; [`enumerate`] stops there.
//!
//! ```text
//! shots/
//! ├── a.jpg            ← yielded
//! ├── a.converted.webp ← filtered out (earlier output)
//! ├── notes.txt        ← filtered out
//! └── trip/
//!     └── b.PNG        ← yielded (recursive mode only)
//! ```

use crate::naming::{is_kept_conversion, is_supported_image};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),
}

/// Lazily yields candidate image paths under a directory.
pub enum Candidates {
    Recursive(walkdir::IntoIter),
    Flat(std::vec::IntoIter<PathBuf>),
}

impl Iterator for Candidates {
    type Item = Result<PathBuf, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Candidates::Recursive(walk) => loop {
                let entry = match walk.next()? {
                    Ok(entry) => entry,
                    Err(e) => return Some(Err(e.into())),
                };
                if entry.file_type().is_dir() {
                    continue;
                }
                if is_candidate(entry.path()) {
                    return Some(Ok(entry.into_path()));
                }
            },
            Candidates::Flat(paths) => paths.next().map(Ok),
        }
    }
}

fn is_candidate(path: &Path) -> bool {
    is_supported_image(path) && !is_kept_conversion(path)
}

/// Start enumerating `dir`.
///
/// Flat mode reads the whole listing here, so an unreadable root fails
/// immediately. Recursive mode validates the root and then walks on demand.
pub fn candidates(dir: &Path, recursive: bool) -> Result<Candidates, ScanError> {
    if !fs::metadata(dir)?.is_dir() {
        return Err(ScanError::NotADirectory(dir.to_path_buf()));
    }

    if recursive {
        let walk = WalkDir::new(dir)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter();
        return Ok(Candidates::Recursive(walk));
    }

    let mut paths = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            continue;
        }
        let path = entry.path();
        if is_candidate(&path) {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(Candidates::Flat(paths.into_iter()))
}

/// Collect every candidate under `dir`. The first error aborts the walk.
pub fn enumerate(dir: &Path, recursive: bool) -> Result<Vec<PathBuf>, ScanError> {
    candidates(dir, recursive)?.collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{relative_names, setup_tree};

    #[test]
    fn flat_lists_immediate_supported_children() {
        let tmp = setup_tree(&["a.jpg", "b.PNG", "notes.txt", "trip/c.jpeg"]);

        let found = enumerate(tmp.path(), false).unwrap();
        assert_eq!(relative_names(tmp.path(), &found), vec!["a.jpg", "b.PNG"]);
    }

    #[test]
    fn recursive_descends_depth_first() {
        let tmp = setup_tree(&[
            "z.webp",
            "a/1.jpg",
            "a/deep/2.png",
            "b/3.jpeg",
            "b/skip.gif",
        ]);

        let found = enumerate(tmp.path(), true).unwrap();
        assert_eq!(
            relative_names(tmp.path(), &found),
            vec!["a/1.jpg", "a/deep/2.png", "b/3.jpeg", "z.webp"]
        );
    }

    #[test]
    fn earlier_kept_outputs_are_not_candidates() {
        let tmp = setup_tree(&[
            "a.jpg",
            "a.converted.webp",
            "trip/b.png",
            "trip/b.converted.PNG",
        ]);

        let flat = enumerate(tmp.path(), false).unwrap();
        assert_eq!(relative_names(tmp.path(), &flat), vec!["a.jpg"]);

        let deep = enumerate(tmp.path(), true).unwrap();
        assert_eq!(
            relative_names(tmp.path(), &deep),
            vec!["a.jpg", "trip/b.png"]
        );
    }

    #[test]
    fn directories_named_like_images_are_skipped() {
        let tmp = setup_tree(&["album.jpg/inner.png", "real.jpg"]);

        let flat = enumerate(tmp.path(), false).unwrap();
        assert_eq!(relative_names(tmp.path(), &flat), vec!["real.jpg"]);

        let deep = enumerate(tmp.path(), true).unwrap();
        assert_eq!(
            relative_names(tmp.path(), &deep),
            vec!["album.jpg/inner.png", "real.jpg"]
        );
    }

    #[test]
    fn empty_directory_yields_nothing() {
        let tmp = tempfile::TempDir::new().unwrap();
        assert!(enumerate(tmp.path(), false).unwrap().is_empty());
        assert!(enumerate(tmp.path(), true).unwrap().is_empty());
    }

    #[test]
    fn missing_root_fails_in_both_modes() {
        let tmp = tempfile::TempDir::new().unwrap();
        let missing = tmp.path().join("nope");

        assert!(matches!(enumerate(&missing, false), Err(ScanError::Io(_))));
        assert!(matches!(enumerate(&missing, true), Err(ScanError::Io(_))));
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_subdirectory_aborts_recursive_walk() {
        use crate::test_helpers::{lock_dir, unlock_dir};

        let tmp = setup_tree(&["a.jpg", "sub/b.jpg"]);
        let sub = tmp.path().join("sub");
        if !lock_dir(&sub) {
            return;
        }

        let deep = enumerate(tmp.path(), true);
        let flat = enumerate(tmp.path(), false);
        let mut lazy = candidates(tmp.path(), true).unwrap();
        let first = lazy.next();
        let second = lazy.next();
        unlock_dir(&sub);

        assert!(matches!(deep, Err(ScanError::Walk(_))), "{deep:?}");
        assert_eq!(relative_names(tmp.path(), &flat.unwrap()), vec!["a.jpg"]);
        assert!(first.unwrap().unwrap().ends_with("a.jpg"));
        assert!(matches!(second, Some(Err(ScanError::Walk(_)))));
    }

    #[test]
    fn file_root_is_rejected() {
        let tmp = setup_tree(&["a.jpg"]);
        let file = tmp.path().join("a.jpg");

        assert!(matches!(
            enumerate(&file, true),
            Err(ScanError::NotADirectory(_))
        ));
    }

    #[test]
    fn candidates_are_lazy_in_recursive_mode() {
        let tmp = setup_tree(&["a.jpg", "b.jpg", "c.jpg"]);

        let mut iter = candidates(tmp.path(), true).unwrap();
        let first = iter.next().unwrap().unwrap();
        assert!(first.ends_with("a.jpg"));
        assert_eq!(iter.count(), 2);
    }
}
