//! Application configuration.
//!
//! Resolved once at startup into an [`AppConfig`] that the rest of the
//! program only reads. Layers, lowest to highest precedence:
//!
//! 1. Stock defaults (see [`stock_config_toml`])
//! 2. `pixbatch.toml` in the working directory, or the file given with
//!    `--config`, merged key-by-key over the defaults
//! 3. Environment: `DB_PATH`, `ASSETS_PATH`, `IMAGE_FORMAT`
//! 4. Command-line flags (applied by `main`)
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [paths]
//! assets_dir = "../assets"     # Uploads, converted images, public files
//! db_path = "resource_hub.db"  # Database file; its parent dir is created
//!
//! [conversion]
//! format = "webp"              # webp | avif
//! quality = 90                 # Lossy quality (1-100)
//! concurrency = 4              # Workers per batch (<= 0 means 4)
//! keep_original = false        # Keep sources after converting
//! keep_extension = false       # Write output under the source's name
//! codec = "rust"               # rust | disabled
//! # max_width = 1280           # Shrink to fit; 0 or unset on one axis
//! # max_height = 720           # picks the orientation default
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{ConvertOptions, NamingPolicy, Quality, ResizeMode, TargetFormat};
use crate::process::Concurrency;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "pixbatch.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Which converter does the encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Codec {
    /// Pure-Rust decode and encode.
    #[default]
    Rust,
    /// Every conversion fails with an "unavailable" error.
    Disabled,
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Codec::Rust => "rust",
            Codec::Disabled => "disabled",
        })
    }
}

impl FromStr for Codec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rust" => Ok(Codec::Rust),
            "disabled" => Ok(Codec::Disabled),
            other => Err(format!("unknown codec: {other} (expected rust or disabled)")),
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub paths: PathsConfig,
    pub conversion: ConversionConfig,
}

/// Where the application keeps its files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    /// Root of `uploads/`, `imgs/` and `public/`.
    pub assets_dir: PathBuf,
    pub db_path: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            assets_dir: PathBuf::from("../assets"),
            db_path: PathBuf::from("resource_hub.db"),
        }
    }
}

/// Defaults for every batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConversionConfig {
    pub format: TargetFormat,
    pub quality: u32,
    /// Worker count; zero or negative selects the default.
    pub concurrency: i64,
    pub keep_original: bool,
    /// Write the output under the source's file name instead of swapping
    /// the extension.
    pub keep_extension: bool,
    pub codec: Codec,
    pub max_width: Option<u32>,
    pub max_height: Option<u32>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            format: TargetFormat::default(),
            quality: Quality::default().value(),
            concurrency: 4,
            keep_original: false,
            keep_extension: false,
            codec: Codec::default(),
            max_width: None,
            max_height: None,
        }
    }
}

impl ConversionConfig {
    /// Unset bounds mean no resizing. When only one axis is set, the other
    /// is treated as zero, which selects the orientation default.
    pub fn resize_mode(&self) -> ResizeMode {
        match (self.max_width, self.max_height) {
            (None, None) => ResizeMode::Original,
            (w, h) => ResizeMode::Fit {
                max_width: w.unwrap_or(0),
                max_height: h.unwrap_or(0),
            },
        }
    }
}

impl AppConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=100).contains(&self.conversion.quality) {
            return Err(ConfigError::Validation(
                "conversion.quality must be 1-100".into(),
            ));
        }
        if self.paths.assets_dir.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "paths.assets_dir must not be empty".into(),
            ));
        }
        if self.paths.db_path.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "paths.db_path must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Apply `DB_PATH`, `ASSETS_PATH` and `IMAGE_FORMAT` as returned by
    /// `lookup`. Empty values are ignored, as is an unrecognised format.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let set = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(db_path) = set("DB_PATH") {
            info!("Using database path from DB_PATH: {db_path}");
            self.paths.db_path = PathBuf::from(db_path);
        }
        if let Some(assets) = set("ASSETS_PATH") {
            info!("Using assets directory from ASSETS_PATH: {assets}");
            self.paths.assets_dir = PathBuf::from(assets);
        }
        if let Some(format) = set("IMAGE_FORMAT") {
            match format.parse::<TargetFormat>() {
                Ok(parsed) => {
                    info!("Using image format from IMAGE_FORMAT: {parsed}");
                    self.conversion.format = parsed;
                }
                Err(e) => warn!("Ignoring IMAGE_FORMAT: {e}"),
            }
        }
    }

    /// Create the database's parent directory and the assets layout.
    ///
    /// Failures are logged and otherwise ignored.
    pub fn bootstrap(&self) {
        let mut dirs = Vec::with_capacity(5);
        if let Some(parent) = self.paths.db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            dirs.push(parent.to_path_buf());
        }
        dirs.push(self.paths.assets_dir.clone());
        for sub in ["uploads", "imgs", "public"] {
            dirs.push(self.paths.assets_dir.join(sub));
        }

        for dir in dirs {
            match fs::create_dir_all(&dir) {
                Ok(()) => debug!("Ensured directory {}", dir.display()),
                Err(e) => warn!("Failed to create directory {}: {e}", dir.display()),
            }
        }
    }

    pub fn assets_dir(&self) -> &Path {
        &self.paths.assets_dir
    }

    pub fn db_path(&self) -> &Path {
        &self.paths.db_path
    }

    pub fn image_format(&self) -> TargetFormat {
        self.conversion.format
    }

    /// Switch the default target format. Only `webp` and `avif` are
    /// accepted; anything else leaves the setting unchanged.
    pub fn set_image_format(&mut self, format: &str) -> bool {
        match format.parse::<TargetFormat>() {
            Ok(parsed) => {
                info!("Image format set to {parsed}");
                self.conversion.format = parsed;
                true
            }
            Err(e) => {
                warn!("{e}");
                false
            }
        }
    }

    /// Batch options derived from the `[conversion]` section.
    pub fn convert_options(&self) -> ConvertOptions {
        let c = &self.conversion;
        ConvertOptions {
            format: c.format,
            naming: NamingPolicy::from_target_ext(!c.keep_extension),
            quality: Quality::new(c.quality),
            keep_original: c.keep_original,
            resize: c.resize_mode(),
        }
    }

    pub fn concurrency(&self) -> Concurrency {
        Concurrency::new(self.conversion.concurrency)
    }
}

/// Build version, injected from the `VERSION` file at compile time.
pub fn version() -> &'static str {
    option_env!("PIXBATCH_VERSION").unwrap_or("dev")
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer that user overrides are merged onto.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(AppConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist, `Err` if it exists but
/// cannot be read or parsed.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<AppConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: AppConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the file layer.
///
/// An explicit `path` must exist. Without one, [`DEFAULT_CONFIG_FILE`] in
/// the working directory is used if present.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let overlay = match path {
        Some(p) => Some(toml::from_str(&fs::read_to_string(p)?)?),
        None => load_raw_config(Path::new(DEFAULT_CONFIG_FILE))?,
    };
    if overlay.is_none() {
        debug!("No {DEFAULT_CONFIG_FILE} found, using stock defaults");
    }
    resolve_config(stock_defaults_value()?, overlay)
}

/// Returns a fully-commented stock `pixbatch.toml` with all keys and
/// explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# pixbatch configuration
# ======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Environment variables override this file:
#   DB_PATH       -> paths.db_path
#   ASSETS_PATH   -> paths.assets_dir
#   IMAGE_FORMAT  -> conversion.format (webp or avif)
# Command-line flags override both.
#
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Paths
# ---------------------------------------------------------------------------
[paths]
# Assets root. uploads/, imgs/ and public/ are created beneath it.
assets_dir = "../assets"

# Database file. Its parent directory is created at startup.
db_path = "resource_hub.db"

# ---------------------------------------------------------------------------
# Conversion
# ---------------------------------------------------------------------------
[conversion]
# Target format: "webp" (lossless) or "avif" (lossy, uses quality).
format = "webp"

# AVIF encoding quality (1 = worst, 100 = best).
quality = 90

# Parallel workers per batch. Zero or negative means 4.
concurrency = 4

# Keep the source file after a successful conversion.
keep_original = false

# Write output under the source's file name (photo.jpg stays photo.jpg).
keep_extension = false

# "rust" encodes in-process; "disabled" fails every conversion.
codec = "rust"

# Shrink images to fit inside this box. Leave both unset to keep the
# original size. 0 or unset on one axis uses 1280x720 for landscape and
# 600x900 for portrait sources.
# max_width = 1280
# max_height = 720
"##
}
