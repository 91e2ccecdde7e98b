// SPDX-License-Identifier: MPL-2.0
//! Test utilities for float comparisons and image fixtures.
//!
//! Re-exports the `approx` crate's assertion macro, which handles floating-point
//! precision issues that `assert_eq!` cannot.

pub use approx::assert_abs_diff_eq;

use image_rs::{DynamicImage, Rgba, RgbaImage};

/// Default epsilon for f32 comparisons.
pub const F32_EPSILON: f32 = 1e-4;

/// Solid-colour RGBA image.
pub fn solid_image(width: u32, height: u32, color: [u8; 4]) -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba(color)))
}

/// Image where every pixel encodes its own coordinates: `[x, y, 0, 255]`.
///
/// Dimensions must stay below 256 so the coordinates fit a channel.
pub fn coordinate_image(width: u32, height: u32) -> DynamicImage {
    let buffer = RgbaImage::from_fn(width, height, |x, y| {
        Rgba([x as u8, y as u8, 0, 255])
    });
    DynamicImage::ImageRgba8(buffer)
}
