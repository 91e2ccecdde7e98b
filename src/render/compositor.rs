// SPDX-License-Identifier: MPL-2.0
//! Export compositing.
//!
//! Every exported buffer goes through the same fixed pipeline:
//!
//! 1. convert the base image to the working pixel format
//! 2. rotate (lossless quarter turns)
//! 3. crop, in post-rotation coordinates
//! 4. resize to the requested output size, if any
//! 5. draw strokes then texts onto a premultiplied surface
//! 6. emit the target pixel layout
//!
//! Annotations are normalized to the displayed frame, which is exactly what
//! steps 2 and 3 produce, so they land where they were drawn on screen.

use super::overlay;
use super::text::TextRenderer;
use crate::domain::editing::{EditState, RotationAngle};
use crate::domain::geometry::rotate_rect;
use crate::error::{Error, Result, TransformError};
use crate::media::save::{ClipboardFormat, SaveFormat};
use image_rs::imageops::FilterType;
use image_rs::{DynamicImage, RgbImage, RgbaImage};
use tiny_skia::{ColorU8, Pixmap};

/// Byte layout of an exported buffer. All layouts use straight alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelLayout {
    /// 24-bit RGB.
    Rgb8,
    /// 32-bit RGBA.
    Rgba8,
    /// 32-bit BGRA, as clipboard bitmaps expect.
    Bgra8,
}

impl PixelLayout {
    #[must_use]
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Rgb8 => 3,
            Self::Rgba8 | Self::Bgra8 => 4,
        }
    }
}

/// Where an export is headed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportTarget {
    File(SaveFormat),
    Clipboard(ClipboardFormat),
}

impl ExportTarget {
    /// Pixel layout the target receives.
    #[must_use]
    pub fn layout(self, has_overlays: bool) -> PixelLayout {
        match self {
            Self::File(format) => select_file_layout(format, has_overlays),
            Self::Clipboard(ClipboardFormat::Dib) => PixelLayout::Bgra8,
            Self::Clipboard(ClipboardFormat::Png) => PixelLayout::Rgba8,
        }
    }
}

/// 24-bit for JPEG and BMP without overlays, 32-bit otherwise.
#[must_use]
pub fn select_file_layout(format: SaveFormat, has_overlays: bool) -> PixelLayout {
    if !has_overlays && format.prefers_opaque() {
        PixelLayout::Rgb8
    } else {
        PixelLayout::Rgba8
    }
}

/// Composited pixels, rows top-down without padding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportBuffer {
    pub width: u32,
    pub height: u32,
    pub layout: PixelLayout,
    pub pixels: Vec<u8>,
}

impl ExportBuffer {
    /// Converts back into an image for encoding.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Composite`] if the buffer does not match its dimensions.
    pub fn into_image(self) -> Result<DynamicImage> {
        let Self {
            width,
            height,
            layout,
            mut pixels,
        } = self;
        let mismatch = || Error::Composite(format!("{width}x{height} buffer has wrong length"));
        match layout {
            PixelLayout::Rgb8 => RgbImage::from_raw(width, height, pixels)
                .map(DynamicImage::ImageRgb8)
                .ok_or_else(mismatch),
            PixelLayout::Rgba8 => RgbaImage::from_raw(width, height, pixels)
                .map(DynamicImage::ImageRgba8)
                .ok_or_else(mismatch),
            PixelLayout::Bgra8 => {
                swap_red_blue(&mut pixels);
                RgbaImage::from_raw(width, height, pixels)
                    .map(DynamicImage::ImageRgba8)
                    .ok_or_else(mismatch)
            }
        }
    }
}

/// Runs the export pipeline.
#[derive(Debug, Clone, Default)]
pub struct Compositor {
    text: TextRenderer,
}

impl Compositor {
    #[must_use]
    pub fn new(text: TextRenderer) -> Self {
        Self { text }
    }

    /// Composites `image` (original resolution, unrotated) with `state`.
    ///
    /// `size` resizes the rotated and cropped frame before overlays are drawn;
    /// `None` keeps full resolution.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transform`] when the crop is degenerate or outside the
    /// image, and [`Error::Composite`] when a surface cannot be created or the
    /// requested size is empty.
    pub fn export(
        &self,
        image: &DynamicImage,
        state: &EditState,
        target: ExportTarget,
        size: Option<(u32, u32)>,
    ) -> Result<ExportBuffer> {
        let has_overlays = state.has_annotations();
        let layout = target.layout(has_overlays);

        let working = if has_overlays || layout != PixelLayout::Rgb8 {
            DynamicImage::ImageRgba8(image.to_rgba8())
        } else {
            DynamicImage::ImageRgb8(image.to_rgb8())
        };
        let (orig_width, orig_height) = (image.width(), image.height());

        let rotated = rotate_image(working, state.rotation);
        let cropped = match state.crop {
            Some(crop) => {
                if crop.is_empty() {
                    return Err(TransformError::DegenerateCrop {
                        width: crop.width,
                        height: crop.height,
                    }
                    .into());
                }
                let rect = rotate_rect(crop, state.rotation, orig_width, orig_height);
                if !rect.fits_within(rotated.width(), rotated.height()) {
                    return Err(TransformError::CropOutOfBounds {
                        image_width: orig_width,
                        image_height: orig_height,
                    }
                    .into());
                }
                rotated.crop_imm(rect.x, rect.y, rect.width, rect.height)
            }
            None => rotated,
        };

        let sized = match size {
            Some((0, _) | (_, 0)) => {
                return Err(Error::Composite("requested output size is empty".into()));
            }
            Some((width, height)) if (width, height) != (cropped.width(), cropped.height()) => {
                cropped.resize_exact(width, height, FilterType::Triangle)
            }
            _ => cropped,
        };

        let composed = if has_overlays {
            let mut surface = to_surface(&sized.to_rgba8())?;
            overlay::draw_strokes(&mut surface, &state.strokes);
            self.text.draw_all(&mut surface, &state.texts)?;
            DynamicImage::ImageRgba8(from_surface(&surface)?)
        } else {
            sized
        };

        log::debug!(
            "Composited {}x{} as {layout:?} for {target:?}",
            composed.width(),
            composed.height()
        );
        Ok(emit(composed, layout))
    }
}

/// Lossless clockwise rotation by quarter turns.
#[must_use]
pub fn rotate_image(image: DynamicImage, rotation: RotationAngle) -> DynamicImage {
    match rotation.quarter_turns() {
        1 => image.rotate90(),
        2 => image.rotate180(),
        3 => image.rotate270(),
        _ => image,
    }
}

/// Undoes [`rotate_image`].
#[must_use]
pub fn unrotate_image(image: DynamicImage, rotation: RotationAngle) -> DynamicImage {
    rotate_image(image, RotationAngle::new(360 - i32::from(rotation.degrees())))
}

fn emit(image: DynamicImage, layout: PixelLayout) -> ExportBuffer {
    let (width, height) = (image.width(), image.height());
    let pixels = match layout {
        PixelLayout::Rgb8 => image.into_rgb8().into_raw(),
        PixelLayout::Rgba8 => image.into_rgba8().into_raw(),
        PixelLayout::Bgra8 => {
            let mut pixels = image.into_rgba8().into_raw();
            swap_red_blue(&mut pixels);
            pixels
        }
    };
    ExportBuffer {
        width,
        height,
        layout,
        pixels,
    }
}

fn swap_red_blue(pixels: &mut [u8]) {
    for px in pixels.chunks_exact_mut(4) {
        px.swap(0, 2);
    }
}

/// Premultiplied drawing surface holding `image`.
fn to_surface(image: &RgbaImage) -> Result<Pixmap> {
    let mut pixmap = Pixmap::new(image.width(), image.height()).ok_or_else(|| {
        Error::Composite(format!(
            "cannot allocate {}x{} surface",
            image.width(),
            image.height()
        ))
    })?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(image.pixels()) {
        let [r, g, b, a] = src.0;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }
    Ok(pixmap)
}

/// Straight-alpha copy of a surface.
fn from_surface(pixmap: &Pixmap) -> Result<RgbaImage> {
    let pixels = pixmap
        .pixels()
        .iter()
        .flat_map(|p| {
            let c = p.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
        .collect();
    RgbaImage::from_raw(pixmap.width(), pixmap.height(), pixels)
        .ok_or_else(|| Error::Composite("surface has unexpected size".into()))
}
