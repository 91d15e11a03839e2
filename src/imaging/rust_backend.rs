//! Pure Rust converter built on the `image` crate.
//!
//! ## Crate mapping
//!
//! | Step | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, WebP) | `image::ImageReader` (pure Rust decoders) |
//! | Resize | `DynamicImage::resize_exact` with `Lanczos3` |
//! | Encode → AVIF | `image::codecs::avif::AvifEncoder` (rav1e, speed 6) |
//! | Encode → WebP | `image::codecs::webp::WebPEncoder` (lossless only) |
//!
//! Output goes to a hidden `.part` sibling first and is then moved into
//! place, so a failed encode never clobbers an existing file, including the
//! source itself when re-encoding in place.
//!
//! An output path that already exists and is not the job's own source is
//! never replaced: the job fails with [`ConvertError::OutputExists`]. This
//! keeps `a.jpg` and `a.png` in one batch from both landing on `a.webp`.

use super::backend::{ConvertError, ImageConverter};
use super::calculations::calculate_target_size;
use super::params::{ConvertOptions, ResizeMode, TargetFormat};
use crate::naming::{is_supported_image, output_path};
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader};
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// AV1 encoder speed (1 = slowest/best, 10 = fastest).
const AVIF_SPEED: u8 = 6;

/// Converter backed by the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-step mapping.
#[derive(Debug, Default, Clone, Copy)]
pub struct RustConverter;

impl RustConverter {
    pub fn new() -> Self {
        Self
    }
}

/// Load and decode an image from disk, sniffing the format from content.
fn load_image(path: &Path) -> Result<DynamicImage, ConvertError> {
    ImageReader::open(path)?
        .with_guessed_format()?
        .decode()
        .map_err(|e| ConvertError::Decode {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
}

/// Shrink `img` according to `mode`. Never enlarges.
fn apply_resize(img: DynamicImage, mode: ResizeMode) -> DynamicImage {
    let ResizeMode::Fit {
        max_width,
        max_height,
    } = mode
    else {
        return img;
    };

    let original = (img.width(), img.height());
    let (w, h) = calculate_target_size(original, (max_width, max_height));
    // Extreme aspect ratios can floor one axis to zero
    let target = (w.max(1), h.max(1));
    if target == original {
        return img;
    }
    img.resize_exact(target.0, target.1, FilterType::Lanczos3)
}

/// Both encoders accept 8-bit RGB/RGBA only.
fn to_encodable(img: DynamicImage) -> DynamicImage {
    if img.color().has_alpha() {
        DynamicImage::ImageRgba8(img.into_rgba8())
    } else {
        DynamicImage::ImageRgb8(img.into_rgb8())
    }
}

fn encode(
    img: &DynamicImage,
    path: &Path,
    format: TargetFormat,
    quality: u32,
) -> Result<(), ConvertError> {
    let file = fs::File::create(path)?;
    let mut writer = BufWriter::new(file);

    let encoded = match format {
        TargetFormat::Avif => {
            let encoder = image::codecs::avif::AvifEncoder::new_with_speed_quality(
                &mut writer,
                AVIF_SPEED,
                quality as u8,
            );
            img.write_with_encoder(encoder)
        }
        TargetFormat::Webp => {
            let encoder = image::codecs::webp::WebPEncoder::new_lossless(&mut writer);
            img.write_with_encoder(encoder)
        }
    };
    encoded.map_err(|e| ConvertError::Encode {
        format: format.to_string(),
        message: e.to_string(),
    })?;

    writer.flush()?;
    Ok(())
}

/// Hidden sibling of `output`, distinct for every source that maps onto it.
fn staging_path(output: &Path, source: &Path) -> PathBuf {
    let file_name = |p: &Path| {
        p.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    };
    output.with_file_name(format!(".{}.{}.part", file_name(output), file_name(source)))
}

/// Move the staged file to `output`.
///
/// In-place re-encodes replace the source. Anything else is placed with a
/// hard link, which fails atomically when `output` already exists, so two
/// jobs racing for the same name cannot both succeed.
fn place(staging: &Path, output: &Path, source: &Path) -> Result<(), ConvertError> {
    if output == source {
        fs::rename(staging, output)?;
        return Ok(());
    }
    match fs::hard_link(staging, output) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            return Err(ConvertError::OutputExists(output.to_path_buf()));
        }
        // Filesystems without hard links: best-effort check, then rename
        Err(_) => {
            if output.exists() {
                return Err(ConvertError::OutputExists(output.to_path_buf()));
            }
            fs::rename(staging, output)?;
            return Ok(());
        }
    }
    fs::remove_file(staging)?;
    Ok(())
}

impl ImageConverter for RustConverter {
    fn convert(&self, source: &Path, options: &ConvertOptions) -> Result<PathBuf, ConvertError> {
        if !is_supported_image(source) {
            return Err(ConvertError::Unsupported(source.to_path_buf()));
        }

        let output = output_path(
            source,
            options.format,
            options.naming,
            options.keep_original,
        );
        if output != source && output.exists() {
            return Err(ConvertError::OutputExists(output));
        }

        let img = load_image(source)?;
        let img = to_encodable(apply_resize(img, options.resize));

        let staging = staging_path(&output, source);
        let placed = encode(&img, &staging, options.format, options.quality.value())
            .and_then(|()| place(&staging, &output, source));
        if let Err(e) = placed {
            let _ = fs::remove_file(&staging);
            return Err(e);
        }

        if !options.keep_original && output != source {
            fs::remove_file(source)?;
        }

        Ok(output)
    }
}
