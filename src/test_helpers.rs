//! Shared test utilities for the pixbatch test suite.
//!
//! Provides fixture-tree builders, synthetic image writers, and path
//! helpers used by the scan, imaging and process tests.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_tree(&["a.jpg", "trip/b.png", "notes.txt"]);
//! let found = scan::enumerate(tmp.path(), true).unwrap();
//! assert_eq!(relative_names(tmp.path(), &found), vec!["a.jpg", "trip/b.png"]);
//! ```

use image::{ImageEncoder, RgbImage, RgbaImage};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// =========================================================================
// Fixture setup
// =========================================================================

/// Create a temp directory containing empty files at the given relative
/// paths. Parent directories are created as needed.
///
/// Contents are placeholders: use [`setup_image_tree`] when a real decoder
/// will read the files.
pub fn setup_tree(files: &[&str]) -> TempDir {
    let tmp = TempDir::new().unwrap();
    for rel in files {
        let path = tmp.path().join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, b"").unwrap();
    }
    tmp
}

/// Like [`setup_tree`], but `.jpg`/`.jpeg` and `.png` entries are real
/// 32x24 images. Other files stay empty.
pub fn setup_image_tree(files: &[&str]) -> TempDir {
    let tmp = TempDir::new().unwrap();
    for rel in files {
        let path = tmp.path().join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        match crate::naming::bare_type(&path).as_str() {
            "jpg" | "jpeg" => create_test_jpeg(&path, 32, 24),
            "png" => create_test_png(&path, 32, 24),
            _ => std::fs::write(&path, b"").unwrap(),
        }
    }
    tmp
}

// =========================================================================
// Synthetic images
// =========================================================================

/// Create a small valid JPEG file with the given dimensions.
pub fn create_test_jpeg(path: &Path, width: u32, height: u32) {
    let img = RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let file = std::fs::File::create(path).unwrap();
    let writer = std::io::BufWriter::new(file);
    image::codecs::jpeg::JpegEncoder::new(writer)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
}

/// Create a small valid PNG file with an alpha channel.
pub fn create_test_png(path: &Path, width: u32, height: u32) {
    let img = RgbaImage::from_fn(width, height, |x, y| {
        image::Rgba([(x % 256) as u8, 64, (y % 256) as u8, 200])
    });
    img.save_with_format(path, image::ImageFormat::Png).unwrap();
}

// =========================================================================
// Path helpers
// =========================================================================

/// Paths relative to `root`, `/`-separated, in input order.
pub fn relative_names(root: &Path, paths: &[PathBuf]) -> Vec<String> {
    paths
        .iter()
        .map(|p| {
            p.strip_prefix(root)
                .unwrap_or_else(|_| panic!("{} is not under {}", p.display(), root.display()))
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("/")
        })
        .collect()
}

/// Sorted copy, for comparing outcome sets whose order is not guaranteed.
pub fn sorted(mut paths: Vec<PathBuf>) -> Vec<PathBuf> {
    paths.sort();
    paths
}

// =========================================================================
// Permissions
// =========================================================================

/// Remove every permission bit from `dir`.
///
/// Returns `false` when the directory is still readable afterwards (running
/// as root), in which case callers should skip their assertions.
#[cfg(unix)]
pub fn lock_dir(dir: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(dir, std::fs::Permissions::from_mode(0o000)).unwrap();
    if std::fs::read_dir(dir).is_ok() {
        unlock_dir(dir);
        return false;
    }
    true
}

/// Restore `dir` to `0o755` so the temp tree can be cleaned up.
#[cfg(unix)]
pub fn unlock_dir(dir: &Path) {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(dir, std::fs::Permissions::from_mode(0o755)).unwrap();
}
