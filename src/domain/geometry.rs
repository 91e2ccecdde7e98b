// SPDX-License-Identifier: MPL-2.0
//! Coordinate spaces and the conversions between them.
//!
//! Three spaces are in play and each has its own type:
//!
//! - **Screen** ([`ScreenPoint`], [`ScreenRect`]): viewport pixels.
//! - **Normalized** ([`NormalizedPoint`]): fractions of the displayed frame,
//!   i.e. the working image after rotation (and crop, when one is applied).
//! - **Image pixels** ([`ImageRect`], [`PixelRect`]): pixels of either the
//!   displayed frame or the unrotated source, depending on the function.
//!
//! Conversions only happen through the functions in this module. Every
//! screen mapping goes through [`image_display_rect`] so rendering and input
//! agree on where the image is.

#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

use crate::domain::editing::{RotationAngle, ZoomFactor};

// ==========================================================================
// Screen space
// ==========================================================================

/// Size of the drawable area in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    #[must_use]
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScreenPoint {
    pub x: f32,
    pub y: f32,
}

impl ScreenPoint {
    #[must_use]
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScreenRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl ScreenRect {
    #[must_use]
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle spanned by two arbitrary corners.
    #[must_use]
    pub fn from_corners(a: ScreenPoint, b: ScreenPoint) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: (a.x - b.x).abs(),
            height: (a.y - b.y).abs(),
        }
    }

    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

// ==========================================================================
// Normalized space
// ==========================================================================

/// Position as a fraction of the displayed frame's width and height.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NormalizedPoint {
    pub x: f32,
    pub y: f32,
}

impl NormalizedPoint {
    #[must_use]
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Pixel position inside a `width`×`height` frame.
    #[must_use]
    pub fn to_pixels(self, width: u32, height: u32) -> (f32, f32) {
        (self.x * width as f32, self.y * height as f32)
    }
}

// ==========================================================================
// Image pixel space
// ==========================================================================

/// Sub-pixel rectangle in image pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ImageRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Integer rectangle in image pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    #[must_use]
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[must_use]
    pub fn right(&self) -> u32 {
        self.x.saturating_add(self.width)
    }

    #[must_use]
    pub fn bottom(&self) -> u32 {
        self.y.saturating_add(self.height)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Whether the rectangle is non-empty and lies within a `width`×`height` image.
    #[must_use]
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        !self.is_empty() && self.right() <= width && self.bottom() <= height
    }

    /// Inclusive containment test for a sub-pixel position.
    #[must_use]
    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x as f32
            && px <= self.right() as f32
            && py >= self.y as f32
            && py <= self.bottom() as f32
    }

    /// Translates by another rectangle's origin.
    #[must_use]
    pub fn offset_by(&self, origin: &PixelRect) -> Self {
        Self {
            x: self.x + origin.x,
            y: self.y + origin.y,
            ..*self
        }
    }
}

// ==========================================================================
// Placement
// ==========================================================================

/// Scale at which a `width`×`height` image, rotated, fits the viewport.
///
/// Returns 0.0 when either the image or the viewport is empty.
#[must_use]
pub fn fit_scale(width: u32, height: u32, rotation: RotationAngle, viewport: Viewport) -> f32 {
    let (w, h) = rotation.rotated_size(width, height);
    if w == 0 || h == 0 || viewport.is_empty() {
        return 0.0;
    }
    (viewport.width / w as f32).min(viewport.height / h as f32)
}

/// Screen rectangle occupied by the displayed image.
///
/// Dimensions swap for 90°/270°, the image is fitted to the viewport, scaled
/// by `zoom`, centered and finally offset by `pan`. Empty input yields an
/// empty rectangle.
#[must_use]
pub fn image_display_rect(
    width: u32,
    height: u32,
    rotation: RotationAngle,
    viewport: Viewport,
    zoom: ZoomFactor,
    pan: ScreenPoint,
) -> ScreenRect {
    let scale = fit_scale(width, height, rotation, viewport) * zoom.value();
    if scale <= 0.0 {
        return ScreenRect::default();
    }
    let (w, h) = rotation.rotated_size(width, height);
    let scaled_width = w as f32 * scale;
    let scaled_height = h as f32 * scale;
    ScreenRect {
        x: (viewport.width - scaled_width) / 2.0 + pan.x,
        y: (viewport.height - scaled_height) / 2.0 + pan.y,
        width: scaled_width,
        height: scaled_height,
    }
}

/// Maps a screen position into the displayed frame. `None` when nothing is displayed.
#[must_use]
pub fn screen_to_normalized(point: ScreenPoint, display: ScreenRect) -> Option<NormalizedPoint> {
    if display.is_empty() {
        return None;
    }
    Some(NormalizedPoint {
        x: (point.x - display.x) / display.width,
        y: (point.y - display.y) / display.height,
    })
}

#[must_use]
pub fn normalized_to_screen(point: NormalizedPoint, display: ScreenRect) -> ScreenPoint {
    ScreenPoint {
        x: display.x + point.x * display.width,
        y: display.y + point.y * display.height,
    }
}

/// Maps a screen rectangle into pixels of a `frame_width`×`frame_height` frame,
/// without clamping.
#[must_use]
pub fn screen_rect_to_image(
    rect: ScreenRect,
    display: ScreenRect,
    frame_width: u32,
    frame_height: u32,
) -> Option<ImageRect> {
    if display.is_empty() {
        return None;
    }
    let scale_x = frame_width as f32 / display.width;
    let scale_y = frame_height as f32 / display.height;
    Some(ImageRect {
        x: (rect.x - display.x) * scale_x,
        y: (rect.y - display.y) * scale_y,
        width: rect.width * scale_x,
        height: rect.height * scale_y,
    })
}

/// Inverse of [`screen_rect_to_image`].
#[must_use]
pub fn image_rect_to_screen(
    rect: ImageRect,
    display: ScreenRect,
    frame_width: u32,
    frame_height: u32,
) -> ScreenRect {
    if frame_width == 0 || frame_height == 0 {
        return ScreenRect::default();
    }
    let scale_x = display.width / frame_width as f32;
    let scale_y = display.height / frame_height as f32;
    ScreenRect {
        x: display.x + rect.x * scale_x,
        y: display.y + rect.y * scale_y,
        width: rect.width * scale_x,
        height: rect.height * scale_y,
    }
}

/// Converts a screen-space crop selection into integer pixels of the displayed
/// frame, clamped to its bounds. The result may be empty.
#[must_use]
pub fn crop_rect_to_image_pixels(
    screen_crop: ScreenRect,
    display: ScreenRect,
    frame_width: u32,
    frame_height: u32,
) -> Option<PixelRect> {
    let rect = screen_rect_to_image(screen_crop, display, frame_width, frame_height)?;
    let max_x = frame_width as f32;
    let max_y = frame_height as f32;
    let left = rect.x.clamp(0.0, max_x).round();
    let top = rect.y.clamp(0.0, max_y).round();
    let right = (rect.x + rect.width).clamp(0.0, max_x).round();
    let bottom = (rect.y + rect.height).clamp(0.0, max_y).round();
    Some(PixelRect {
        x: left as u32,
        y: top as u32,
        width: (right - left).max(0.0) as u32,
        height: (bottom - top).max(0.0) as u32,
    })
}

// ==========================================================================
// Rotation-aware rectangle math
// ==========================================================================

/// Maps a rectangle of an unrotated `width`×`height` image to the same pixels
/// after a clockwise `rotation`.
#[must_use]
pub fn rotate_rect(rect: PixelRect, rotation: RotationAngle, width: u32, height: u32) -> PixelRect {
    match rotation.degrees() {
        90 => PixelRect::new(
            height.saturating_sub(rect.bottom()),
            rect.x,
            rect.height,
            rect.width,
        ),
        180 => PixelRect::new(
            width.saturating_sub(rect.right()),
            height.saturating_sub(rect.bottom()),
            rect.width,
            rect.height,
        ),
        270 => PixelRect::new(
            rect.y,
            width.saturating_sub(rect.right()),
            rect.height,
            rect.width,
        ),
        _ => rect,
    }
}

/// Inverse of [`rotate_rect`]: `width`×`height` are the unrotated dimensions.
#[must_use]
pub fn unrotate_rect(
    rect: PixelRect,
    rotation: RotationAngle,
    width: u32,
    height: u32,
) -> PixelRect {
    match rotation.degrees() {
        90 => PixelRect::new(
            rect.y,
            height.saturating_sub(rect.right()),
            rect.height,
            rect.width,
        ),
        180 => PixelRect::new(
            width.saturating_sub(rect.right()),
            height.saturating_sub(rect.bottom()),
            rect.width,
            rect.height,
        ),
        270 => PixelRect::new(
            width.saturating_sub(rect.bottom()),
            rect.x,
            rect.height,
            rect.width,
        ),
        _ => rect,
    }
}
