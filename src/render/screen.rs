// SPDX-License-Identifier: MPL-2.0
//! Per-frame draw command list for the on-screen preview.
//!
//! Nothing here touches pixels. The platform layer replays the commands with
//! whatever drawing API it has; overlays are positioned in screen space and
//! never baked into the image.

use crate::domain::editing::{Color, EditState, RotationAngle, Stroke};
use crate::domain::geometry::{normalized_to_screen, ScreenPoint, ScreenRect, Viewport};
use crate::editor::mode::TextSession;

/// One primitive of the on-screen preview.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Fill the whole viewport.
    Clear(Color),
    /// Draw `frame` of the working image, rotated, into `rect`.
    Image {
        rect: ScreenRect,
        rotation: RotationAngle,
        frame: usize,
    },
    Polyline {
        points: Vec<ScreenPoint>,
        color: Color,
        width: f32,
    },
    /// Text whose top-left corner is `position`. `caret` asks for an insertion
    /// caret right after the last glyph.
    Text {
        position: ScreenPoint,
        content: String,
        color: Color,
        size: f32,
        caret: bool,
    },
    FillRect {
        rect: ScreenRect,
        color: Color,
    },
    StrokeRect {
        rect: ScreenRect,
        color: Color,
        width: f32,
    },
}

/// Colors and sizes of the preview chrome.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenStyle {
    pub background: Color,
    pub crop_dim: Color,
    pub crop_border: Color,
    pub crop_border_width: f32,
}

impl Default for ScreenStyle {
    fn default() -> Self {
        use crate::config::defaults::{
            DEFAULT_BACKGROUND, DEFAULT_CROP_BORDER_WIDTH, DEFAULT_CROP_DIM_OPACITY,
        };
        Self {
            background: Color::from_rgba8(DEFAULT_BACKGROUND),
            crop_dim: Color::BLACK.with_opacity(DEFAULT_CROP_DIM_OPACITY),
            crop_border: Color::WHITE,
            crop_border_width: DEFAULT_CROP_BORDER_WIDTH,
        }
    }
}

/// Everything visible in one frame.
#[derive(Debug, Clone, Copy)]
pub struct Scene<'a> {
    pub viewport: Viewport,
    /// Where the displayed frame lands; empty when no image is shown.
    pub display: ScreenRect,
    pub rotation: RotationAngle,
    pub frame: usize,
    pub state: &'a EditState,
    pub active_stroke: Option<&'a Stroke>,
    pub text_session: Option<&'a TextSession>,
    /// Color and normalized font size of the text being typed.
    pub pending_text_style: (Color, f32),
    pub crop_selection: Option<ScreenRect>,
}

/// Builds the command list for `scene`, back to front.
#[must_use]
pub fn build(scene: &Scene<'_>, style: &ScreenStyle) -> Vec<DrawCommand> {
    let mut commands = vec![DrawCommand::Clear(style.background)];
    if scene.display.is_empty() {
        return commands;
    }
    let display = scene.display;

    commands.push(DrawCommand::Image {
        rect: display,
        rotation: scene.rotation,
        frame: scene.frame,
    });

    let strokes = scene.state.strokes.iter().chain(scene.active_stroke);
    for stroke in strokes.filter(|s| s.is_drawable()) {
        commands.push(DrawCommand::Polyline {
            points: stroke
                .points
                .iter()
                .map(|p| normalized_to_screen(*p, display))
                .collect(),
            color: stroke.color,
            width: stroke.width_for(display.width),
        });
    }

    for text in &scene.state.texts {
        commands.push(DrawCommand::Text {
            position: normalized_to_screen(text.anchor, display),
            content: text.text.clone(),
            color: text.color,
            size: text.font_size_for(display.width),
            caret: false,
        });
    }

    if let Some(session) = scene.text_session {
        let (color, font_size) = scene.pending_text_style;
        commands.push(DrawCommand::Text {
            position: normalized_to_screen(session.anchor, display),
            content: session.buffer.clone(),
            color,
            size: font_size * display.width,
            caret: true,
        });
    }

    if let Some(selection) = scene.crop_selection.filter(|s| !s.is_empty()) {
        commands.extend(crop_overlay(selection, scene.viewport, style));
    }
    commands
}

/// Dims everything outside `selection` and outlines it.
fn crop_overlay(selection: ScreenRect, viewport: Viewport, style: &ScreenStyle) -> [DrawCommand; 5] {
    let dim = |rect| DrawCommand::FillRect {
        rect,
        color: style.crop_dim,
    };
    [
        dim(ScreenRect::new(0.0, 0.0, viewport.width, selection.y)),
        dim(ScreenRect::new(
            0.0,
            selection.bottom(),
            viewport.width,
            viewport.height - selection.bottom(),
        )),
        dim(ScreenRect::new(0.0, selection.y, selection.x, selection.height)),
        dim(ScreenRect::new(
            selection.right(),
            selection.y,
            viewport.width - selection.right(),
            selection.height,
        )),
        DrawCommand::StrokeRect {
            rect: selection,
            color: style.crop_border,
            width: style.crop_border_width,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::editing::TextAnnotation;
    use crate::domain::geometry::NormalizedPoint;
    use crate::test_utils::assert_abs_diff_eq;

    fn scene<'a>(state: &'a EditState) -> Scene<'a> {
        Scene {
            viewport: Viewport::new(800.0, 600.0),
            display: ScreenRect::new(100.0, 50.0, 400.0, 200.0),
            rotation: RotationAngle::ZERO,
            frame: 0,
            state,
            active_stroke: None,
            text_session: None,
            pending_text_style: (Color::WHITE, 0.024),
            crop_selection: None,
        }
    }

    #[test]
    fn empty_display_only_clears() {
        let state = EditState::default();
        let mut scene = scene(&state);
        scene.display = ScreenRect::default();
        let commands = build(&scene, &ScreenStyle::default());
        assert_eq!(commands.len(), 1);
        assert!(matches!(commands[0], DrawCommand::Clear(_)));
    }

    #[test]
    fn strokes_and_texts_are_mapped_to_screen() {
        let state = EditState {
            strokes: vec![Stroke {
                points: vec![NormalizedPoint::new(0.0, 0.0), NormalizedPoint::new(1.0, 1.0)],
                color: Color::RED,
                width: 0.01,
            }],
            texts: vec![TextAnnotation {
                anchor: NormalizedPoint::new(0.5, 0.5),
                text: "note".to_string(),
                color: Color::WHITE,
                font_size: 0.05,
            }],
            ..EditState::default()
        };
        let commands = build(&scene(&state), &ScreenStyle::default());

        assert_eq!(commands.len(), 4);
        match &commands[2] {
            DrawCommand::Polyline { points, width, .. } => {
                assert_eq!(points[0], ScreenPoint::new(100.0, 50.0));
                assert_eq!(points[1], ScreenPoint::new(500.0, 250.0));
                assert_abs_diff_eq!(*width, 4.0);
            }
            other => panic!("expected polyline, got {other:?}"),
        }
        match &commands[3] {
            DrawCommand::Text {
                position,
                size,
                caret,
                ..
            } => {
                assert_eq!(*position, ScreenPoint::new(300.0, 150.0));
                assert_abs_diff_eq!(*size, 20.0);
                assert!(!caret);
            }
            other => panic!("expected text, got {other:?}"),
        }
    }

    #[test]
    fn text_being_typed_has_a_caret() {
        let state = EditState::default();
        let session = TextSession {
            anchor: NormalizedPoint::new(0.0, 0.0),
            buffer: "ab".to_string(),
        };
        let mut scene = scene(&state);
        scene.text_session = Some(&session);
        let commands = build(&scene, &ScreenStyle::default());
        assert!(matches!(
            commands.last(),
            Some(DrawCommand::Text { caret: true, content, .. }) if content == "ab"
        ));
    }

    #[test]
    fn crop_selection_adds_dim_mask_and_border() {
        let state = EditState::default();
        let mut scene = scene(&state);
        scene.crop_selection = Some(ScreenRect::new(200.0, 100.0, 100.0, 50.0));
        let commands = build(&scene, &ScreenStyle::default());

        let dims: Vec<_> = commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::FillRect { rect, color } => Some((*rect, *color)),
                _ => None,
            })
            .collect();
        assert_eq!(dims.len(), 4);
        assert_eq!(dims[0].0, ScreenRect::new(0.0, 0.0, 800.0, 100.0));
        assert_eq!(dims[1].0, ScreenRect::new(0.0, 150.0, 800.0, 450.0));
        assert_eq!(dims[3].0, ScreenRect::new(300.0, 100.0, 500.0, 50.0));
        assert_eq!(dims[0].1.a, 128);
        assert!(matches!(
            commands.last(),
            Some(DrawCommand::StrokeRect { width, .. }) if (*width - 2.0).abs() < f32::EPSILON
        ));
    }
}
