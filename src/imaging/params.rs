//! Parameter types for conversion operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the batch engine in [`process`](crate::process) (which
//! decides which files to convert) and the [`backend`](super::backend)
//! (which does the actual pixel work).
//!
//! ## Types
//!
//! - [`Quality`]: Lossy encoding quality (1-100, default 90). Clamped on construction.
//! - [`TargetFormat`]: Output format, WebP or AVIF.
//! - [`NamingPolicy`]: Whether outputs take the target extension or keep the source's.
//! - [`ResizeMode`]: Keep original dimensions, or fit inside a bounding box.
//! - [`ConvertOptions`]: Everything a converter needs besides the source path.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(90)
    }
}

/// Output image format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetFormat {
    #[default]
    Webp,
    Avif,
}

impl TargetFormat {
    /// File extension without the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            TargetFormat::Webp => "webp",
            TargetFormat::Avif => "avif",
        }
    }
}

impl fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Returned when a string names neither `webp` nor `avif`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported image format: {0} (expected webp or avif)")]
pub struct UnknownFormat(pub String);

impl FromStr for TargetFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "webp" => Ok(TargetFormat::Webp),
            "avif" => Ok(TargetFormat::Avif),
            other => Err(UnknownFormat(other.to_string())),
        }
    }
}

/// How the output file is named relative to the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamingPolicy {
    /// `photo.jpg` → `photo.avif`
    #[default]
    TargetExtension,
    /// `photo.jpg` → `photo.jpg` (re-encoded content, original name)
    KeepExtension,
}

impl NamingPolicy {
    pub fn from_target_ext(use_target_ext: bool) -> Self {
        if use_target_ext {
            NamingPolicy::TargetExtension
        } else {
            NamingPolicy::KeepExtension
        }
    }
}

/// Whether and how to shrink the image before encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResizeMode {
    /// Encode at source dimensions.
    #[default]
    Original,
    /// Fit inside `max_width` x `max_height`. A zero on either axis picks the
    /// orientation default (see [`calculate_target_size`](super::calculate_target_size)).
    Fit { max_width: u32, max_height: u32 },
}

/// Shared parameters for every job in a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConvertOptions {
    pub format: TargetFormat,
    pub naming: NamingPolicy,
    pub quality: Quality,
    /// Leave the source file on disk after a successful conversion.
    pub keep_original: bool,
    pub resize: ResizeMode,
}
