// SPDX-License-Identifier: MPL-2.0
//! Editing newtypes.
//!
//! This module provides type-safe wrappers for editing values,
//! ensuring they are always within valid ranges.

use crate::config::defaults;

// =============================================================================
// RotationAngle
// =============================================================================

/// Clockwise rotation in 90° increments.
///
/// This newtype enforces validity at the type level, ensuring the value
/// is always one of: 0°, 90°, 180°, or 270°.
///
/// # Example
///
/// ```
/// use lens_edit::domain::editing::RotationAngle;
///
/// let angle = RotationAngle::default();
/// assert_eq!(angle.degrees(), 0);
///
/// let rotated = angle.rotate_clockwise();
/// assert_eq!(rotated.degrees(), 90);
///
/// // Full rotation cycle
/// let full = rotated.rotate_clockwise().rotate_clockwise().rotate_clockwise();
/// assert_eq!(full.degrees(), 0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RotationAngle(u16);

impl RotationAngle {
    /// No rotation (0°).
    pub const ZERO: Self = Self(0);

    /// Creates a rotation angle, rounding down to a 90° increment and wrapping
    /// into 0-270°. Negative values count counter-clockwise.
    #[must_use]
    pub fn new(degrees: i32) -> Self {
        let wrapped = degrees.rem_euclid(360);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        Self(((wrapped / 90) * 90) as u16)
    }

    /// Returns the angle in degrees.
    #[must_use]
    pub fn degrees(self) -> u16 {
        self.0
    }

    /// Number of clockwise quarter turns (0-3).
    #[must_use]
    pub fn quarter_turns(self) -> u8 {
        #[allow(clippy::cast_possible_truncation)]
        let turns = (self.0 / 90) as u8;
        turns
    }

    /// Adds a signed delta. Returns `None` unless the delta is a multiple of 90°.
    #[must_use]
    pub fn rotated_by(self, delta_degrees: i32) -> Option<Self> {
        if delta_degrees % 90 != 0 {
            return None;
        }
        Some(Self::new(i32::from(self.0) + delta_degrees))
    }

    /// Rotates 90° clockwise.
    #[must_use]
    pub fn rotate_clockwise(self) -> Self {
        Self((self.0 + 90) % 360)
    }

    /// Rotates 90° counter-clockwise.
    #[must_use]
    pub fn rotate_counterclockwise(self) -> Self {
        Self((self.0 + 270) % 360)
    }

    /// Returns true if the angle is not zero.
    #[must_use]
    pub fn is_rotated(self) -> bool {
        self.0 != 0
    }

    /// Returns true if width and height swap when the rotation is applied.
    ///
    /// This is true for 90° and 270° rotations.
    #[must_use]
    pub fn swaps_dimensions(self) -> bool {
        self.0 == 90 || self.0 == 270
    }

    /// Dimensions of a `width`×`height` image after this rotation.
    #[must_use]
    pub fn rotated_size(self, width: u32, height: u32) -> (u32, u32) {
        if self.swaps_dimensions() {
            (height, width)
        } else {
            (width, height)
        }
    }
}

// =============================================================================
// Zoom Bounds
// =============================================================================

/// Zoom factor bounds, relative to fit-to-window.
pub mod zoom_bounds {
    use crate::config::defaults;

    /// Minimum zoom factor.
    pub const MIN: f32 = defaults::MIN_ZOOM;
    /// Maximum zoom factor.
    pub const MAX: f32 = defaults::MAX_ZOOM;
    /// Default zoom factor.
    pub const DEFAULT: f32 = defaults::DEFAULT_ZOOM;
}

// =============================================================================
// ZoomFactor
// =============================================================================

/// Zoom multiplier applied on top of the fit-to-window scale, clamped to 0.1–10.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomFactor(f32);

impl ZoomFactor {
    /// Creates a zoom factor, clamping to the valid range. NaN maps to the default.
    #[must_use]
    pub fn new(value: f32) -> Self {
        if value.is_nan() {
            return Self::default();
        }
        Self(value.clamp(zoom_bounds::MIN, zoom_bounds::MAX))
    }

    #[must_use]
    pub fn value(self) -> f32 {
        self.0
    }

    /// Multiplies by `step`.
    #[must_use]
    pub fn zoom_in(self, step: f32) -> Self {
        Self::new(self.0 * step)
    }

    /// Divides by `step`.
    #[must_use]
    pub fn zoom_out(self, step: f32) -> Self {
        Self::new(self.0 / step)
    }

    #[must_use]
    pub fn is_min(self) -> bool {
        self.0 <= zoom_bounds::MIN
    }

    #[must_use]
    pub fn is_max(self) -> bool {
        self.0 >= zoom_bounds::MAX
    }
}

impl Default for ZoomFactor {
    fn default() -> Self {
        Self(zoom_bounds::DEFAULT)
    }
}

// =============================================================================
// Color
// =============================================================================

/// Straight-alpha 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const RED: Self = Self::from_rgba8(defaults::DEFAULT_STROKE_COLOR);
    pub const WHITE: Self = Self::from_rgba8(defaults::DEFAULT_TEXT_COLOR);
    pub const BLACK: Self = Self::from_rgba8([0, 0, 0, 255]);

    #[must_use]
    pub const fn from_rgba8(rgba: [u8; 4]) -> Self {
        Self {
            r: rgba[0],
            g: rgba[1],
            b: rgba[2],
            a: rgba[3],
        }
    }

    #[must_use]
    pub const fn to_rgba8(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Same color with alpha scaled by `opacity` (0.0–1.0).
    #[must_use]
    pub fn with_opacity(self, opacity: f32) -> Self {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let a = (f32::from(self.a) * opacity.clamp(0.0, 1.0)).round() as u8;
        Self { a, ..self }
    }

    /// `#rrggbb` form used in SVG fills.
    #[must_use]
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Alpha as a 0.0–1.0 fraction.
    #[must_use]
    pub fn opacity(self) -> f32 {
        f32::from(self.a) / 255.0
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::RED
    }
}
