// SPDX-License-Identifier: MPL-2.0
//! Centralized default values for all configuration constants.
//!
//! This module serves as the single source of truth for default values
//! used across the crate. Constants are organized by category.
//!
//! # Categories
//!
//! - **Editing**: Annotation colors, sizes and erase radius
//! - **History**: Undo capacity
//! - **Zoom**: Zoom factor bounds and step
//! - **Display**: Background and crop overlay appearance
//! - **Cache**: Decoded image cache and prefetch window
//! - **Export**: Encoder quality and file naming
//! - **Animation**: Frame delay normalization

// ==========================================================================
// Editing Defaults
// ==========================================================================

/// Default stroke color (opaque red).
pub const DEFAULT_STROKE_COLOR: [u8; 4] = [255, 0, 0, 255];

/// Stroke width in screen pixels at the moment the stroke is drawn.
pub const DEFAULT_STROKE_WIDTH_PX: f32 = 3.0;

/// Default text color (opaque white).
pub const DEFAULT_TEXT_COLOR: [u8; 4] = [255, 255, 255, 255];

/// Font size in screen pixels at the moment the text is committed.
pub const DEFAULT_FONT_SIZE_PX: f32 = 24.0;

/// Font family used when rasterising text annotations.
pub const DEFAULT_FONT_FAMILY: &str = "sans-serif";

/// Erase hit radius in screen pixels.
pub const DEFAULT_ERASE_RADIUS_PX: f32 = 30.0;

/// Horizontal extent of a text hit box, in normalized units.
pub const TEXT_HIT_BOX_WIDTH: f32 = 0.2;

/// Minimum number of points for a stroke to exist.
pub const MIN_STROKE_POINTS: usize = 2;

/// Smallest character code accepted by the inline text editor.
pub const MIN_PRINTABLE_CHAR: u32 = 32;

/// Bounds for configurable pixel sizes.
pub const MIN_ANNOTATION_SIZE_PX: f32 = 0.5;
pub const MAX_ANNOTATION_SIZE_PX: f32 = 512.0;

// ==========================================================================
// History Defaults
// ==========================================================================

/// Maximum number of undo snapshots kept per image.
pub const UNDO_CAPACITY: usize = 50;

// ==========================================================================
// Zoom Defaults
// ==========================================================================

/// Minimum zoom factor relative to fit-to-window.
pub const MIN_ZOOM: f32 = 0.1;

/// Maximum zoom factor relative to fit-to-window.
pub const MAX_ZOOM: f32 = 10.0;

/// Default zoom factor (fit to window).
pub const DEFAULT_ZOOM: f32 = 1.0;

/// Multiplier applied per zoom in/out step.
pub const DEFAULT_ZOOM_STEP: f32 = 1.25;

/// Bounds for the zoom step multiplier.
pub const MIN_ZOOM_STEP: f32 = 1.01;
pub const MAX_ZOOM_STEP: f32 = 4.0;

// ==========================================================================
// Display Defaults
// ==========================================================================

/// Viewport clear color.
pub const DEFAULT_BACKGROUND: [u8; 4] = [26, 26, 26, 255];

/// Opacity of the mask drawn outside the crop selection.
pub const DEFAULT_CROP_DIM_OPACITY: f32 = 0.5;

/// Width of the crop selection border in screen pixels.
pub const DEFAULT_CROP_BORDER_WIDTH: f32 = 2.0;

// ==========================================================================
// Cache Defaults
// ==========================================================================

/// Number of decoded images kept in the cache.
pub const DEFAULT_CACHE_CAPACITY: usize = 10;

/// Minimum cache capacity.
pub const MIN_CACHE_CAPACITY: usize = 1;

/// Maximum cache capacity.
pub const MAX_CACHE_CAPACITY: usize = 64;

/// Number of neighbours prefetched in each direction.
pub const DEFAULT_PREFETCH_ADJACENT: usize = 3;

/// Maximum number of neighbours prefetched in each direction.
pub const MAX_PREFETCH_ADJACENT: usize = 16;

// ==========================================================================
// Export Defaults
// ==========================================================================

/// JPEG encoder quality (1-100).
pub const DEFAULT_JPEG_QUALITY: u8 = 90;

/// Minimum JPEG quality.
pub const MIN_JPEG_QUALITY: u8 = 1;

/// Maximum JPEG quality.
pub const MAX_JPEG_QUALITY: u8 = 100;

/// Suffix appended to the file stem by save-as-copy.
pub const DEFAULT_EDITED_SUFFIX: &str = "_edited";

/// First counter appended once the plain suffixed name is taken.
pub const EDITED_COUNTER_START: u32 = 2;

/// Prefix of the staging file written during an overwrite save.
pub const TEMP_FILE_PREFIX: &str = "~temp_";

// ==========================================================================
// Animation Defaults
// ==========================================================================

/// Delay used when a frame declares none or an implausibly short one.
pub const DEFAULT_FRAME_DELAY_MS: u64 = 100;

/// Delays below this are replaced by [`DEFAULT_FRAME_DELAY_MS`].
pub const MIN_FRAME_DELAY_MS: u64 = 20;

// ==========================================================================
// Compile-time Validation
// ==========================================================================

const _: () = {
    // Zoom validation
    assert!(MIN_ZOOM > 0.0);
    assert!(MIN_ZOOM < DEFAULT_ZOOM);
    assert!(MAX_ZOOM > DEFAULT_ZOOM);
    assert!(DEFAULT_ZOOM_STEP >= MIN_ZOOM_STEP);
    assert!(DEFAULT_ZOOM_STEP <= MAX_ZOOM_STEP);

    // Annotation validation
    assert!(MIN_STROKE_POINTS >= 2);
    assert!(DEFAULT_STROKE_WIDTH_PX >= MIN_ANNOTATION_SIZE_PX);
    assert!(DEFAULT_FONT_SIZE_PX <= MAX_ANNOTATION_SIZE_PX);
    assert!(DEFAULT_ERASE_RADIUS_PX <= MAX_ANNOTATION_SIZE_PX);

    // History validation
    assert!(UNDO_CAPACITY > 0);

    // Cache validation
    assert!(MIN_CACHE_CAPACITY > 0);
    assert!(DEFAULT_CACHE_CAPACITY >= MIN_CACHE_CAPACITY);
    assert!(DEFAULT_CACHE_CAPACITY <= MAX_CACHE_CAPACITY);
    assert!(DEFAULT_PREFETCH_ADJACENT <= MAX_PREFETCH_ADJACENT);

    // Export validation
    assert!(DEFAULT_JPEG_QUALITY >= MIN_JPEG_QUALITY);
    assert!(DEFAULT_JPEG_QUALITY <= MAX_JPEG_QUALITY);

    // Animation validation
    assert!(MIN_FRAME_DELAY_MS < DEFAULT_FRAME_DELAY_MS);
};
