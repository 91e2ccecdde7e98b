// SPDX-License-Identifier: MPL-2.0
//! Decoded images and the collaborators that produce and store them.
//!
//! - [`ImageHandle`]: a decoded base image, optionally animated.
//! - [`Decoder`] / [`ImageDecoder`]: turns a path into an [`ImageHandle`].
//! - [`cache`]: LRU cache with a background prefetch worker.
//! - [`navigator`]: folder listing and next/previous navigation.
//! - [`animation`]: frame stepping for animated images.
//! - [`save`]: encoding, safe overwrite and clipboard buffers.

pub mod animation;
pub mod cache;
pub mod navigator;
pub mod save;

use crate::config::defaults::{DEFAULT_FRAME_DELAY_MS, MIN_FRAME_DELAY_MS};
use crate::domain::geometry::PixelRect;
use crate::error::{Error, Result};
use image_rs::{AnimationDecoder, DynamicImage, GenericImageView, RgbaImage};
use resvg::usvg;
use std::fs;
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

pub use cache::{CacheStats, ImageCache};
pub use navigator::{FolderNavigator, Navigator};

/// Supported image extensions
pub mod extensions {
    use std::path::Path;

    /// Image file extensions, lowercase.
    pub const IMAGE_EXTENSIONS: &[&str] = &[
        "jpg", "jpeg", "jfif", "png", "bmp", "gif", "tiff", "tif", "webp", "ico", "svg",
    ];

    /// Checks whether the path has a supported image extension (case-insensitive).
    #[must_use]
    pub fn is_supported<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
    }
}

/// One frame of an animated image.
#[derive(Debug, Clone)]
pub struct AnimationFrame {
    pub image: Arc<DynamicImage>,
    pub delay: Duration,
}

/// A decoded base image.
///
/// Cloning is cheap: pixel data is shared.
#[derive(Debug, Clone)]
pub struct ImageHandle {
    image: Arc<DynamicImage>,
    frames: Option<Arc<[AnimationFrame]>>,
}

impl ImageHandle {
    #[must_use]
    pub fn new(image: DynamicImage) -> Self {
        Self {
            image: Arc::new(image),
            frames: None,
        }
    }

    /// Animated image from its frames. The first frame doubles as the still image.
    ///
    /// Returns `None` when `frames` is empty. A single frame yields a still image.
    #[must_use]
    pub fn animated(frames: Vec<AnimationFrame>) -> Option<Self> {
        let first = Arc::clone(&frames.first()?.image);
        let frames = (frames.len() > 1).then(|| Arc::from(frames));
        Some(Self {
            image: first,
            frames,
        })
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// The still image (first frame for animations).
    #[must_use]
    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    #[must_use]
    pub fn frames(&self) -> Option<&[AnimationFrame]> {
        self.frames.as_deref()
    }

    #[must_use]
    pub fn is_animated(&self) -> bool {
        self.frames.is_some()
    }

    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.frames.as_ref().map_or(1, |frames| frames.len())
    }

    /// Frame `index`, falling back to the still image.
    #[must_use]
    pub fn frame(&self, index: usize) -> &DynamicImage {
        self.frames
            .as_ref()
            .and_then(|frames| frames.get(index))
            .map_or(&*self.image, |frame| &*frame.image)
    }

    /// Approximate memory footprint of the decoded pixels.
    #[must_use]
    pub fn byte_size(&self) -> usize {
        let (w, h) = self.dimensions();
        (w as usize) * (h as usize) * 4 * self.frame_count()
    }

    /// Still sub-image. `None` when `rect` is empty or not inside the image.
    #[must_use]
    pub fn cropped(&self, rect: PixelRect) -> Option<Self> {
        let (w, h) = self.dimensions();
        if !rect.fits_within(w, h) {
            return None;
        }
        Some(Self::new(
            self.image.crop_imm(rect.x, rect.y, rect.width, rect.height),
        ))
    }
}

/// Decodes image files.
pub trait Decoder: Send + Sync {
    /// # Errors
    ///
    /// Returns [`Error::Decode`] for unsupported or corrupt input and
    /// [`Error::Io`] when the file cannot be read.
    fn decode(&self, path: &Path) -> Result<ImageHandle>;
}

/// Decoder backed by the `image` crate, with SVG rasterised through `resvg`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageDecoder;

impl Decoder for ImageDecoder {
    fn decode(&self, path: &Path) -> Result<ImageHandle> {
        load_image(path)
    }
}

/// Load an image from the given path.
///
/// Animated GIFs keep all their frames; SVG files are rasterised at their
/// intrinsic size.
///
/// # Errors
///
/// Returns an error if:
/// - The file cannot be read ([`Error::Io`])
/// - The extension is unsupported or the data is invalid ([`Error::Decode`])
pub fn load_image<P: AsRef<Path>>(path: P) -> Result<ImageHandle> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|s| s.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    if !extensions::IMAGE_EXTENSIONS.contains(&extension.as_str()) {
        return Err(Error::Decode(format!(
            "unsupported image format: {}",
            path.display()
        )));
    }

    let bytes = fs::read(path)?;
    let handle = match extension.as_str() {
        "svg" => ImageHandle::new(rasterize_svg(&bytes)?),
        "gif" => decode_gif(&bytes)?,
        _ => ImageHandle::new(image_rs::load_from_memory(&bytes)?),
    };

    let (width, height) = handle.dimensions();
    if width == 0 || height == 0 {
        return Err(Error::Decode(format!(
            "image has empty dimensions: {}",
            path.display()
        )));
    }
    log::debug!(
        "Decoded {} ({width}x{height}, {} frame(s))",
        path.display(),
        handle.frame_count()
    );
    Ok(handle)
}

/// Delay to wait after a frame, with implausibly short values replaced.
#[must_use]
pub fn normalize_frame_delay(delay_ms: u64) -> Duration {
    if delay_ms < MIN_FRAME_DELAY_MS {
        Duration::from_millis(DEFAULT_FRAME_DELAY_MS)
    } else {
        Duration::from_millis(delay_ms)
    }
}

fn decode_gif(bytes: &[u8]) -> Result<ImageHandle> {
    let decoder = image_rs::codecs::gif::GifDecoder::new(Cursor::new(bytes))?;
    let frames = decoder.into_frames().collect_frames()?;
    let frames = frames
        .into_iter()
        .map(|frame| {
            let (numer, denom) = frame.delay().numer_denom_ms();
            let delay_ms = if denom == 0 {
                0
            } else {
                u64::from(numer / denom)
            };
            AnimationFrame {
                image: Arc::new(DynamicImage::ImageRgba8(frame.into_buffer())),
                delay: normalize_frame_delay(delay_ms),
            }
        })
        .collect();
    ImageHandle::animated(frames).ok_or_else(|| Error::Decode("GIF contains no frames".into()))
}

fn rasterize_svg(bytes: &[u8]) -> Result<DynamicImage> {
    let tree = usvg::Tree::from_data(bytes, &usvg::Options::default())
        .map_err(|e| Error::Decode(format!("invalid SVG: {e}")))?;

    let size = tree.size().to_int_size();
    let mut pixmap = tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| Error::Decode("SVG has empty dimensions".into()))?;
    resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

    let pixels: Vec<u8> = pixmap
        .pixels()
        .iter()
        .flat_map(|p| {
            let c = p.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
        .collect();
    RgbaImage::from_raw(size.width(), size.height(), pixels)
        .map(DynamicImage::ImageRgba8)
        .ok_or_else(|| Error::Decode("SVG pixel buffer has unexpected size".into()))
}
