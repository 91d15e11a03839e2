//! Converter that refuses every job.
//!
//! Selected with `codec = "disabled"`. Every call fails with
//! [`ConvertError::Unavailable`], which the batch engine handles like any
//! other per-item failure.

use super::backend::{ConvertError, ImageConverter};
use super::params::ConvertOptions;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledConverter;

impl ImageConverter for DisabledConverter {
    fn convert(&self, _source: &Path, options: &ConvertOptions) -> Result<PathBuf, ConvertError> {
        Err(ConvertError::Unavailable(
            options.format.extension().to_ascii_uppercase(),
        ))
    }
}
