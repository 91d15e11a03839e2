//! Single-item conversion trait and shared error type.
//!
//! The [`ImageConverter`] trait is the only thing the batch engine knows
//! about image encoding: give it one source path and the batch options, get
//! back an output path or an error.
//!
//! Implementations:
//! - [`RustConverter`](super::rust_backend::RustConverter): decodes with the
//!   `image` crate and encodes to WebP or AVIF.
//! - [`DisabledConverter`](super::disabled::DisabledConverter): always fails;
//!   stands in when encoding is switched off.

use super::params::ConvertOptions;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to decode {path}: {message}")]
    Decode { path: PathBuf, message: String },
    #[error("{format} encode failed: {message}")]
    Encode { format: String, message: String },
    #[error("unsupported source image: {0}")]
    Unsupported(PathBuf),
    #[error("output already exists: {0}")]
    OutputExists(PathBuf),
    #[error("{0} support is temporarily unavailable, please try again later")]
    Unavailable(String),
}

/// Converts one image to the target format.
///
/// Must be safe to call from several workers at once on different paths;
/// the batch engine puts no lock around it. Failures are reported through
/// the `Err` value, never by panicking.
pub trait ImageConverter: Sync {
    /// Convert `source` according to `options`, returning the written path.
    fn convert(&self, source: &Path, options: &ConvertOptions) -> Result<PathBuf, ConvertError>;
}

impl<C: ImageConverter + ?Sized> ImageConverter for &C {
    fn convert(&self, source: &Path, options: &ConvertOptions) -> Result<PathBuf, ConvertError> {
        (**self).convert(source, options)
    }
}

impl<C: ImageConverter + ?Sized> ImageConverter for Box<C> {
    fn convert(&self, source: &Path, options: &ConvertOptions) -> Result<PathBuf, ConvertError> {
        (**self).convert(source, options)
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::naming::output_path;
    use std::collections::HashSet;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Mock converter that records calls without touching the filesystem.
    /// Uses Mutex (not RefCell) so it is Sync and can be shared by workers.
    #[derive(Default)]
    pub struct MockConverter {
        pub fail_paths: HashSet<PathBuf>,
        pub fail_all: bool,
        pub delay: Option<Duration>,
        pub calls: Mutex<Vec<PathBuf>>,
        active: AtomicUsize,
        peak: AtomicUsize,
    }

    impl MockConverter {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn failing_on<I, P>(paths: I) -> Self
        where
            I: IntoIterator<Item = P>,
            P: Into<PathBuf>,
        {
            Self {
                fail_paths: paths.into_iter().map(Into::into).collect(),
                ..Self::default()
            }
        }

        pub fn failing_all() -> Self {
            Self {
                fail_all: true,
                ..Self::default()
            }
        }

        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        pub fn get_calls(&self) -> Vec<PathBuf> {
            self.calls.lock().unwrap().clone()
        }

        /// Highest number of `convert` calls observed running at once.
        pub fn peak_concurrency(&self) -> usize {
            self.peak.load(Ordering::SeqCst)
        }
    }

    impl ImageConverter for MockConverter {
        fn convert(
            &self,
            source: &Path,
            options: &ConvertOptions,
        ) -> Result<PathBuf, ConvertError> {
            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);

            self.calls.lock().unwrap().push(source.to_path_buf());
            if let Some(delay) = self.delay {
                std::thread::sleep(delay);
            }

            self.active.fetch_sub(1, Ordering::SeqCst);

            if self.fail_all || self.fail_paths.contains(source) {
                return Err(ConvertError::Decode {
                    path: source.to_path_buf(),
                    message: "mock failure".into(),
                });
            }
            Ok(output_path(
                source,
                options.format,
                options.naming,
                options.keep_original,
            ))
        }
    }

    #[test]
    fn mock_records_calls() {
        let conv = MockConverter::new();
        let out = conv
            .convert(Path::new("/test/image.jpg"), &ConvertOptions::default())
            .unwrap();

        assert_eq!(out, PathBuf::from("/test/image.webp"));
        assert_eq!(conv.get_calls(), vec![PathBuf::from("/test/image.jpg")]);
    }

    #[test]
    fn mock_fails_configured_paths() {
        let conv = MockConverter::failing_on(["/bad.png"]);
        let opts = ConvertOptions::default();

        assert!(conv.convert(Path::new("/bad.png"), &opts).is_err());
        assert!(conv.convert(Path::new("/good.png"), &opts).is_ok());
        assert_eq!(conv.get_calls().len(), 2);
    }

    #[test]
    fn converter_works_through_references_and_boxes() {
        let conv = MockConverter::new();
        let by_ref: &dyn ImageConverter = &conv;
        let boxed: Box<dyn ImageConverter + Send> = Box::new(MockConverter::failing_all());
        let opts = ConvertOptions::default();

        assert!(by_ref.convert(Path::new("/a.jpg"), &opts).is_ok());
        assert!(boxed.convert(Path::new("/a.jpg"), &opts).is_err());
    }

    #[test]
    fn unavailable_message_names_the_format() {
        let err = ConvertError::Unavailable("AVIF".into());
        assert_eq!(
            err.to_string(),
            "AVIF support is temporarily unavailable, please try again later"
        );
    }
}
