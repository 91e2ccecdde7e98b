// SPDX-License-Identifier: MPL-2.0
//! Overlay annotations drawn on top of the image.
//!
//! Positions and sizes are stored relative to the displayed frame so the same
//! annotation renders at the same visual size in a small preview and in a
//! full-resolution export.

use super::Color;
use crate::config::defaults::MIN_STROKE_POINTS;
use crate::domain::geometry::NormalizedPoint;

/// Freehand polyline.
#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    pub points: Vec<NormalizedPoint>,
    pub color: Color,
    /// Line width as a fraction of the frame width.
    pub width: f32,
}

impl Stroke {
    /// Starts a stroke at `origin`.
    #[must_use]
    pub fn begin(origin: NormalizedPoint, color: Color, width: f32) -> Self {
        Self {
            points: vec![origin],
            color,
            width,
        }
    }

    /// Whether the stroke has enough points to be drawn.
    #[must_use]
    pub fn is_drawable(&self) -> bool {
        self.points.len() >= MIN_STROKE_POINTS
    }

    /// Line width in pixels for an output `output_width` pixels wide.
    #[must_use]
    pub fn width_for(&self, output_width: f32) -> f32 {
        self.width * output_width
    }
}

/// Single-line text anchored at its top-left corner.
#[derive(Debug, Clone, PartialEq)]
pub struct TextAnnotation {
    pub anchor: NormalizedPoint,
    pub text: String,
    pub color: Color,
    /// Font size as a fraction of the frame width.
    pub font_size: f32,
}

impl TextAnnotation {
    /// Font size in pixels for an output `output_width` pixels wide.
    #[must_use]
    pub fn font_size_for(&self, output_width: f32) -> f32 {
        self.font_size * output_width
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::assert_abs_diff_eq;

    #[test]
    fn single_point_stroke_is_not_drawable() {
        let mut stroke = Stroke::begin(NormalizedPoint::new(0.1, 0.1), Color::RED, 0.01);
        assert!(!stroke.is_drawable());
        stroke.points.push(NormalizedPoint::new(0.2, 0.2));
        assert!(stroke.is_drawable());
    }

    #[test]
    fn sizes_scale_with_output_width() {
        let stroke = Stroke::begin(NormalizedPoint::default(), Color::RED, 0.005);
        assert_abs_diff_eq!(stroke.width_for(200.0), 1.0);
        assert_abs_diff_eq!(stroke.width_for(4000.0), 20.0);

        let text = TextAnnotation {
            anchor: NormalizedPoint::default(),
            text: "hi".to_string(),
            color: Color::WHITE,
            font_size: 0.03,
        };
        assert_abs_diff_eq!(text.font_size_for(1000.0), 30.0);
    }
}
