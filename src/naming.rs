//! Path classification and output naming.
//!
//! A file is a conversion source when its extension (case-insensitive) is
//! one of [`SOURCE_EXTENSIONS`]. The target format is whatever the converter
//! is asked to produce and plays no part in eligibility.
//!
//! ## Output names
//!
//! | Naming | keep original | `shots/a.JPG` → |
//! |---|---|---|
//! | target extension | either | `shots/a.webp` |
//! | keep extension | no | `shots/a.JPG` (re-encoded in place) |
//! | keep extension | yes | `shots/a.converted.JPG` |
//!
//! The same marker applies when a target-extension name collides with a
//! kept source (`a.webp` converted to WebP). Directory passes recognise the
//! marker with [`is_kept_conversion`] and leave such files alone, so a second
//! pass never produces `a.converted.converted.JPG`.

use crate::imaging::{NamingPolicy, TargetFormat};
use std::path::{Path, PathBuf};

/// Extensions accepted as conversion sources.
pub const SOURCE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

/// Marker inserted before the extension when an in-place name would
/// overwrite a source that must be kept.
const KEPT_SOURCE_MARKER: &str = "converted";

/// Lower-cased extension without its leading dot, or `""` when there is none.
///
/// - `"a.PNG"` → `"png"`
/// - `"dir/photo.tar.JPG"` → `"jpg"`
/// - `"noext"` → `""`
/// - `".hidden"` → `""` (a leading dot starts the name, not an extension)
pub fn bare_type(path: impl AsRef<Path>) -> String {
    path.as_ref()
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default()
}

/// Whether `path` names a supported conversion source.
pub fn is_supported_image(path: impl AsRef<Path>) -> bool {
    let ext = bare_type(path);
    SOURCE_EXTENSIONS.contains(&ext.as_str())
}

/// Whether `path` carries the `.converted` marker written by [`output_path`].
///
/// - `"a.converted.JPG"` → `true`
/// - `"a.CONVERTED.webp"` → `true`
/// - `"converted.jpg"` → `false`
pub fn is_kept_conversion(path: impl AsRef<Path>) -> bool {
    path.as_ref()
        .file_stem()
        .map(Path::new)
        .and_then(|stem| stem.extension())
        .and_then(|e| e.to_str())
        .is_some_and(|marker| marker.eq_ignore_ascii_case(KEPT_SOURCE_MARKER))
}

/// Compute where the converted image for `source` is written.
///
/// When the natural name lands on the source itself and the source must be
/// kept, `.converted` is inserted before the extension.
pub fn output_path(
    source: &Path,
    format: TargetFormat,
    naming: NamingPolicy,
    keep_original: bool,
) -> PathBuf {
    let natural = match naming {
        NamingPolicy::TargetExtension => source.with_extension(format.extension()),
        NamingPolicy::KeepExtension => source.to_path_buf(),
    };
    if !keep_original || natural != source {
        return natural;
    }

    let stem = natural
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match natural.extension() {
        Some(ext) => format!("{stem}.{KEPT_SOURCE_MARKER}.{}", ext.to_string_lossy()),
        None => format!("{stem}.{KEPT_SOURCE_MARKER}"),
    };
    natural.with_file_name(name)
}
