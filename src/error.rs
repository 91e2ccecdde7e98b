// SPDX-License-Identifier: MPL-2.0
//! Error types shared across the crate.
//!
//! Expected conditions at the UI boundary (empty crop, pointer without an image,
//! undo on an empty stack) never surface as errors; the editor treats them as
//! no-ops. Only operations that touch files or allocate surfaces return [`Result`].

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Corrupt or unsupported image data. The load is aborted.
    #[error("decode error: {0}")]
    Decode(String),

    #[error("transform error: {0}")]
    Transform(#[from] TransformError),

    /// No image is loaded or its display rectangle has zero size.
    #[error("no coordinate mapping: no image is displayed")]
    CoordinateMapping,

    /// Surface or encoder creation failed while exporting.
    #[error("composite error: {0}")]
    Composite(String),

    #[error("config error: {0}")]
    Config(String),
}

/// Geometric edits that cannot be applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
    #[error("degenerate crop rectangle {width}x{height}")]
    DegenerateCrop { width: u32, height: u32 },

    #[error("crop rectangle lies outside the {image_width}x{image_height} image")]
    CropOutOfBounds { image_width: u32, image_height: u32 },

    #[error("unsupported output format: {0}")]
    UnsupportedFormat(String),
}

impl From<image_rs::ImageError> for Error {
    fn from(err: image_rs::ImageError) -> Self {
        Error::Decode(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
