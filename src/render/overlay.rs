// SPDX-License-Identifier: MPL-2.0
//! Rasterising markup strokes onto a tiny-skia surface.

#![allow(clippy::cast_precision_loss)]

use crate::domain::editing::{Color, Stroke};
use tiny_skia::{LineCap, LineJoin, Paint, PathBuilder, Pixmap, Transform};

/// Draws every drawable stroke in order; later strokes land on top.
pub fn draw_strokes(pixmap: &mut Pixmap, strokes: &[Stroke]) {
    for stroke in strokes {
        draw_stroke(pixmap, stroke);
    }
}

/// Draws one stroke as a connected polyline with round caps and joins.
///
/// Points and width are scaled to the pixmap size. Strokes with fewer than two
/// points are skipped.
pub fn draw_stroke(pixmap: &mut Pixmap, stroke: &Stroke) {
    if !stroke.is_drawable() {
        return;
    }
    let (width, height) = (pixmap.width(), pixmap.height());

    let mut builder = PathBuilder::new();
    for (index, point) in stroke.points.iter().enumerate() {
        let (x, y) = point.to_pixels(width, height);
        if index == 0 {
            builder.move_to(x, y);
        } else {
            builder.line_to(x, y);
        }
    }
    let Some(path) = builder.finish() else {
        return;
    };

    let line = tiny_skia::Stroke {
        width: stroke.width_for(width as f32).max(f32::EPSILON),
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..tiny_skia::Stroke::default()
    };
    pixmap.stroke_path(&path, &solid_paint(stroke.color), &line, Transform::identity(), None);
}

fn solid_paint(color: Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(color.r, color.g, color.b, color.a);
    paint.anti_alias = true;
    paint
}
