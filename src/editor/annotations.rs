// SPDX-License-Identifier: MPL-2.0
//! Annotation engine: sizing, erase hit-testing and crop re-projection.
//!
//! All functions are pure and operate on normalized coordinates of the
//! displayed frame.

#![allow(clippy::cast_precision_loss)]

use crate::config::defaults::TEXT_HIT_BOX_WIDTH;
use crate::domain::editing::{RotationAngle, Stroke, TextAnnotation};
use crate::domain::geometry::{NormalizedPoint, PixelRect, ScreenRect};

/// Converts a screen-pixel length into a fraction of the displayed width.
#[must_use]
pub fn normalized_length(length_px: f32, display: ScreenRect) -> f32 {
    if display.width <= 0.0 {
        return 0.0;
    }
    length_px / display.width
}

/// Erase radius in normalized units for a radius given in screen pixels.
#[must_use]
pub fn normalized_hit_radius(radius_px: f32, display: ScreenRect) -> f32 {
    let shortest = display.width.min(display.height);
    if shortest <= 0.0 {
        return 0.0;
    }
    radius_px / shortest
}

/// Whether any point of `stroke` lies within `radius` of `point`.
#[must_use]
pub fn stroke_hit(stroke: &Stroke, point: NormalizedPoint, radius: f32) -> bool {
    let radius_sq = radius * radius;
    stroke.points.iter().any(|p| {
        let dx = p.x - point.x;
        let dy = p.y - point.y;
        dx * dx + dy * dy <= radius_sq
    })
}

/// Whether a click at `point` lands on `text`.
///
/// Text grows right and down from its anchor, so the box extends
/// [`TEXT_HIT_BOX_WIDTH`] to the right and two radii downwards but only one
/// radius to the left and up.
#[must_use]
pub fn text_hit(text: &TextAnnotation, point: NormalizedPoint, radius: f32) -> bool {
    let dx = point.x - text.anchor.x;
    let dy = point.y - text.anchor.y;
    (-radius..TEXT_HIT_BOX_WIDTH).contains(&dx) && (-radius..2.0 * radius).contains(&dy)
}

/// Removes every stroke and text hit at `point`. Returns how many were removed.
pub fn erase_at(
    strokes: &mut Vec<Stroke>,
    texts: &mut Vec<TextAnnotation>,
    point: NormalizedPoint,
    radius: f32,
) -> usize {
    let before = strokes.len() + texts.len();
    strokes.retain(|stroke| !stroke_hit(stroke, point, radius));
    texts.retain(|text| !text_hit(text, point, radius));
    before - strokes.len() - texts.len()
}

/// Re-expresses annotations relative to a crop of the displayed frame.
///
/// `crop` is in pixels of the `frame_width`×`frame_height` frame the
/// annotations are currently normalized against. Points outside the crop are
/// dropped rather than clipped; strokes left with fewer than two points and
/// texts whose anchor falls outside are removed. Widths and font sizes are
/// rescaled so their rendered size stays the same.
#[must_use]
pub fn reproject_for_crop(
    strokes: &[Stroke],
    texts: &[TextAnnotation],
    frame_width: u32,
    frame_height: u32,
    crop: PixelRect,
) -> (Vec<Stroke>, Vec<TextAnnotation>) {
    if crop.is_empty() {
        return (Vec::new(), Vec::new());
    }
    let scale = frame_width as f32 / crop.width as f32;
    let remap = |point: &NormalizedPoint| -> Option<NormalizedPoint> {
        let (px, py) = point.to_pixels(frame_width, frame_height);
        crop.contains(px, py).then(|| NormalizedPoint {
            x: (px - crop.x as f32) / crop.width as f32,
            y: (py - crop.y as f32) / crop.height as f32,
        })
    };

    let strokes = strokes
        .iter()
        .filter_map(|stroke| {
            let points: Vec<_> = stroke.points.iter().filter_map(remap).collect();
            let projected = Stroke {
                points,
                color: stroke.color,
                width: stroke.width * scale,
            };
            projected.is_drawable().then_some(projected)
        })
        .collect();

    let texts = texts
        .iter()
        .filter_map(|text| {
            remap(&text.anchor).map(|anchor| TextAnnotation {
                anchor,
                text: text.text.clone(),
                color: text.color,
                font_size: text.font_size * scale,
            })
        })
        .collect();

    (strokes, texts)
}

/// Follows a clockwise `turn` of a `frame_width`×`frame_height` frame so
/// annotations stay on the same image content.
///
/// Widths and font sizes are rescaled against the new frame width so their
/// pixel size does not change.
pub fn rotate_annotations(
    strokes: &mut [Stroke],
    texts: &mut [TextAnnotation],
    turn: RotationAngle,
    frame_width: u32,
    frame_height: u32,
) {
    let (new_width, _) = turn.rotated_size(frame_width, frame_height);
    if new_width == 0 {
        return;
    }
    let scale = frame_width as f32 / new_width as f32;
    let turn_point = |p: NormalizedPoint| match turn.quarter_turns() {
        1 => NormalizedPoint::new(1.0 - p.y, p.x),
        2 => NormalizedPoint::new(1.0 - p.x, 1.0 - p.y),
        3 => NormalizedPoint::new(p.y, 1.0 - p.x),
        _ => p,
    };

    for stroke in strokes.iter_mut() {
        for point in &mut stroke.points {
            *point = turn_point(*point);
        }
        stroke.width *= scale;
    }
    for text in texts.iter_mut() {
        text.anchor = turn_point(text.anchor);
        text.font_size *= scale;
    }
}
