//! Single-image conversion in pure Rust, with no system libraries.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Target size** | [`calculate_target_size`] (pure) |
//! | **Decode** | `image::ImageReader` |
//! | **Resize** | Lanczos3 |
//! | **Encode** | `AvifEncoder` (rav1e) / `WebPEncoder` |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing a conversion
//! - **Backend**: [`ImageConverter`] trait + [`ConvertError`]
//! - **Converters**: [`RustConverter`] and [`DisabledConverter`]

pub mod backend;
mod calculations;
pub mod disabled;
mod params;
pub mod rust_backend;

pub use backend::{ConvertError, ImageConverter};
pub use calculations::{LANDSCAPE_BOUNDS, PORTRAIT_BOUNDS, calculate_target_size};
pub use disabled::DisabledConverter;
pub use params::{
    ConvertOptions, NamingPolicy, Quality, ResizeMode, TargetFormat, UnknownFormat,
};
pub use rust_backend::RustConverter;
