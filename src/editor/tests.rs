// SPDX-License-Identifier: MPL-2.0
use super::*;
use crate::config::defaults::UNDO_CAPACITY;
use crate::domain::geometry::PixelRect;
use crate::media::save::SaveFormat;
use crate::render::PixelLayout;
use crate::test_utils::{assert_abs_diff_eq, solid_image, F32_EPSILON};

/// 400x200 image shown in an 800x400 viewport: screen = normalized × (800, 400).
fn session() -> EditSession {
    let mut session = EditSession::new(ImageHandle::new(solid_image(400, 200, [0, 0, 0, 255])));
    session.set_viewport(Viewport::new(800.0, 400.0));
    session
}

fn pt(x: f32, y: f32) -> ScreenPoint {
    ScreenPoint::new(x, y)
}

fn draw(session: &mut EditSession, points: &[(f32, f32)]) {
    let (first, rest) = points.split_first().expect("at least one point");
    session.pointer_down(pt(first.0, first.1));
    for &(x, y) in rest {
        session.pointer_move(pt(x, y));
    }
    let last = points.last().expect("at least one point");
    session.pointer_up(pt(last.0, last.1));
}

fn drag_crop(session: &mut EditSession, from: (f32, f32), to: (f32, f32)) {
    session.pointer_down(pt(from.0, from.1));
    session.pointer_move(pt(to.0, to.1));
    session.pointer_up(pt(to.0, to.1));
}

// ==========================================================================
// Rotation
// ==========================================================================

#[test]
fn rotation_wraps_at_full_turn() {
    let mut session = session();
    session.rotate_clockwise();
    session.rotate_clockwise();
    assert_eq!(session.state().rotation.degrees(), 180);
    session.rotate_clockwise();
    session.rotate_clockwise();
    assert_eq!(session.state().rotation.degrees(), 0);
    assert_eq!(session.undo_depth(), 4);
}

#[test]
fn counterclockwise_rotation_from_zero_is_270() {
    let mut session = session();
    assert!(session.rotate_counterclockwise());
    assert_eq!(session.state().rotation.degrees(), 270);
    assert_eq!(session.frame_size(), (200, 400));
}

#[test]
fn non_quarter_rotation_is_ignored() {
    let mut session = session();
    assert!(!session.apply_rotation(45));
    assert!(!session.apply_rotation(360));
    assert_eq!(session.undo_depth(), 0);
    assert!(!session.has_pending_edits());
}

#[test]
fn rotation_carries_annotations_along() {
    let mut session = session();
    session.toggle_mode(EditMode::Markup);
    draw(&mut session, &[(0.0, 0.0), (400.0, 200.0)]);
    session.rotate_clockwise();

    let points = &session.state().strokes[0].points;
    assert_abs_diff_eq!(points[0].x, 1.0);
    assert_abs_diff_eq!(points[0].y, 0.0);
    assert_abs_diff_eq!(points[1].x, 0.5);
    assert_abs_diff_eq!(points[1].y, 0.5);
}

#[test]
fn undo_history_is_capped() {
    let mut session = session();
    for _ in 0..UNDO_CAPACITY + 10 {
        session.rotate_clockwise();
    }
    assert_eq!(session.undo_depth(), UNDO_CAPACITY);
}

// ==========================================================================
// Markup
// ==========================================================================

#[test]
fn stroke_is_recorded_in_normalized_coordinates() {
    let mut session = session();
    session.toggle_mode(EditMode::Markup);
    draw(&mut session, &[(80.0, 40.0), (400.0, 200.0), (720.0, 360.0)]);

    let strokes = &session.state().strokes;
    assert_eq!(strokes.len(), 1);
    assert_eq!(strokes[0].points.len(), 3);
    assert_abs_diff_eq!(strokes[0].points[0].x, 0.1);
    assert_abs_diff_eq!(strokes[0].points[2].y, 0.9);
    // 3 px on an 800 px wide display
    assert_abs_diff_eq!(strokes[0].width, 3.0 / 800.0);
    assert_eq!(strokes[0].color, Color::RED);
    assert_eq!(session.undo_depth(), 1);
}

#[test]
fn undo_restores_state_before_stroke() {
    let mut session = session();
    session.rotate_clockwise();
    let before = session.state().clone();

    session.toggle_mode(EditMode::Markup);
    draw(&mut session, &[(300.0, 100.0), (350.0, 150.0)]);
    assert_ne!(session.state(), &before);

    assert!(session.undo());
    assert_eq!(session.state(), &before);
}

#[test]
fn single_point_stroke_leaves_no_trace() {
    let mut session = session();
    session.toggle_mode(EditMode::Markup);
    draw(&mut session, &[(100.0, 100.0)]);

    assert!(session.state().strokes.is_empty());
    assert_eq!(session.undo_depth(), 0);
}

#[test]
fn every_recorded_stroke_has_two_points() {
    let mut session = session();
    session.toggle_mode(EditMode::Markup);
    draw(&mut session, &[(10.0, 10.0)]);
    draw(&mut session, &[(10.0, 10.0), (20.0, 20.0)]);
    draw(&mut session, &[(30.0, 30.0)]);
    session.pointer_down(pt(50.0, 50.0));
    session.toggle_mode(EditMode::Erase);

    assert!(session.state().strokes.iter().all(Stroke::is_drawable));
    assert_eq!(session.state().strokes.len(), 1);
    assert_eq!(session.undo_depth(), 1);
}

#[test]
fn pointer_without_displayed_image_is_ignored() {
    let mut session = EditSession::new(ImageHandle::new(solid_image(10, 10, [0, 0, 0, 255])));
    session.toggle_mode(EditMode::Markup);
    draw(&mut session, &[(1.0, 1.0), (2.0, 2.0)]);
    assert!(!session.has_pending_edits());
    assert_eq!(session.undo_depth(), 0);
}

#[test]
fn switching_mode_mid_stroke_discards_it() {
    let mut session = session();
    session.toggle_mode(EditMode::Markup);
    session.pointer_down(pt(10.0, 10.0));
    session.pointer_move(pt(20.0, 20.0));
    session.toggle_mode(EditMode::Text);

    assert_eq!(session.mode(), EditMode::Text);
    assert!(session.state().strokes.is_empty());
    assert_eq!(session.undo_depth(), 0);
}

#[test]
fn undo_mid_stroke_drops_it_and_steps_back() {
    let mut session = session();
    session.toggle_mode(EditMode::Markup);
    draw(&mut session, &[(10.0, 10.0), (20.0, 20.0)]);
    session.pointer_down(pt(100.0, 100.0));
    session.pointer_move(pt(200.0, 200.0));
    assert_eq!(session.undo_depth(), 2);

    assert!(session.undo());
    assert!(session.state().strokes.is_empty());
    assert!(session.interaction().active_stroke().is_none());
    assert_eq!(session.undo_depth(), 0);

    // Releasing the button afterwards records nothing
    session.pointer_up(pt(200.0, 200.0));
    assert!(session.state().strokes.is_empty());
    assert_eq!(session.mode(), EditMode::Markup);
}

#[test]
fn undo_of_first_stroke_while_drawing_reports_nothing_to_undo() {
    let mut session = session();
    session.toggle_mode(EditMode::Markup);
    session.pointer_down(pt(100.0, 100.0));
    session.pointer_move(pt(200.0, 200.0));

    assert!(!session.undo());
    assert!(session.interaction().active_stroke().is_none());
    assert_eq!(session.undo_depth(), 0);
    assert!(!session.has_pending_edits());
}

#[test]
fn toggling_the_active_mode_returns_to_none() {
    let mut session = session();
    session.toggle_mode(EditMode::Crop);
    assert_eq!(session.mode(), EditMode::Crop);
    session.toggle_mode(EditMode::Crop);
    assert_eq!(session.mode(), EditMode::None);
}

// ==========================================================================
// Crop
// ==========================================================================

#[test]
fn crop_applies_selection_and_reprojects_annotations() {
    let mut session = session();
    session.toggle_mode(EditMode::Markup);
    draw(&mut session, &[(300.0, 150.0), (400.0, 200.0), (500.0, 250.0)]);
    let before = session.state().clone();

    session.toggle_mode(EditMode::Crop);
    drag_crop(&mut session, (200.0, 100.0), (600.0, 300.0));
    assert!(session.key_down(Key::Enter));

    assert_eq!(session.mode(), EditMode::None);
    assert_eq!(session.state().crop, Some(PixelRect::new(100, 50, 200, 100)));
    assert_eq!(session.working_image().dimensions(), (200, 100));

    let stroke = &session.state().strokes[0];
    assert_abs_diff_eq!(stroke.points[0].x, 0.25, epsilon = F32_EPSILON);
    assert_abs_diff_eq!(stroke.points[0].y, 0.25, epsilon = F32_EPSILON);
    assert_abs_diff_eq!(stroke.points[2].x, 0.75, epsilon = F32_EPSILON);
    assert_abs_diff_eq!(stroke.width, 2.0 * before.strokes[0].width, epsilon = F32_EPSILON);

    // One undo step brings back the uncropped image and original coordinates
    assert!(session.undo());
    assert_eq!(session.state(), &before);
    assert_eq!(session.working_image().dimensions(), (400, 200));
}

#[test]
fn crop_on_rotated_frame_is_stored_in_source_pixels() {
    let mut session = session();
    session.rotate_clockwise();
    // Frame is 200x400; keep its left half
    assert!(session.apply_crop_pixels(PixelRect::new(0, 0, 100, 400)));

    // The left half of a clockwise-rotated image is the bottom half of the source
    assert_eq!(session.state().crop, Some(PixelRect::new(0, 100, 400, 100)));
    assert_eq!(session.frame_size(), (100, 400));
}

#[test]
fn successive_crops_accumulate_in_source_pixels() {
    let mut session = session();
    assert!(session.apply_crop_pixels(PixelRect::new(100, 50, 200, 100)));
    assert!(session.apply_crop_pixels(PixelRect::new(10, 10, 50, 50)));
    assert_eq!(session.state().crop, Some(PixelRect::new(110, 60, 50, 50)));
    assert_eq!(session.undo_depth(), 2);

    session.undo();
    assert_eq!(session.state().crop, Some(PixelRect::new(100, 50, 200, 100)));
    assert_eq!(session.working_image().dimensions(), (200, 100));
}

#[test]
fn degenerate_crop_is_ignored() {
    let mut session = session();
    session.toggle_mode(EditMode::Crop);
    drag_crop(&mut session, (200.0, 100.0), (200.0, 300.0));
    assert!(!session.apply_crop());
    assert!(!session.apply_crop_pixels(PixelRect::new(390, 0, 20, 20)));

    assert!(!session.state().has_crop());
    assert_eq!(session.undo_depth(), 0);
    assert_eq!(session.mode(), EditMode::Crop);
}

#[test]
fn full_frame_crop_leaves_crop_mode_without_an_edit() {
    let mut session = session();
    session.toggle_mode(EditMode::Crop);
    drag_crop(&mut session, (-10.0, -10.0), (810.0, 410.0));
    assert!(session.key_down(Key::Enter));

    assert_eq!(session.mode(), EditMode::None);
    assert!(!session.state().has_crop());
    assert_eq!(session.undo_depth(), 0);
    assert_eq!(session.working_image().dimensions(), (400, 200));
    assert!(session.apply_crop_pixels(PixelRect::new(0, 0, 400, 200)));
    assert!(!session.has_pending_edits());
}

#[test]
fn stored_crop_always_fits_the_source() {
    let mut session = session();
    session.toggle_mode(EditMode::Crop);
    // Selection overflows the displayed image on every side
    drag_crop(&mut session, (-100.0, -100.0), (900.0, 250.0));
    assert!(session.apply_crop());

    let crop = session.state().crop.expect("crop applied");
    assert!(crop.fits_within(400, 200));
    assert_eq!(crop, PixelRect::new(0, 0, 400, 125));
}

#[test]
fn cancel_crop_clears_selection() {
    let mut session = session();
    session.toggle_mode(EditMode::Crop);
    drag_crop(&mut session, (10.0, 10.0), (100.0, 100.0));
    assert!(session.interaction().crop_selection().is_some());
    session.cancel_crop();
    assert_eq!(session.mode(), EditMode::None);
    assert!(session.interaction().crop_selection().is_none());
}

// ==========================================================================
// Text
// ==========================================================================

#[test]
fn typed_text_is_committed_on_enter() {
    let mut session = session();
    session.toggle_mode(EditMode::Text);
    session.pointer_down(pt(400.0, 200.0));
    for c in "Hix".chars() {
        session.key_down(Key::Char(c));
    }
    session.key_down(Key::Char('\u{7}'));
    session.key_down(Key::Backspace);
    assert!(session.key_down(Key::Enter));

    let texts = &session.state().texts;
    assert_eq!(texts.len(), 1);
    assert_eq!(texts[0].text, "Hi");
    assert_abs_diff_eq!(texts[0].anchor.x, 0.5);
    assert_abs_diff_eq!(texts[0].font_size, 24.0 / 800.0);
    assert_eq!(texts[0].color, Color::WHITE);
    assert_eq!(session.undo_depth(), 1);
    assert_eq!(session.mode(), EditMode::Text);
}

#[test]
fn empty_text_is_not_committed() {
    let mut session = session();
    session.toggle_mode(EditMode::Text);
    session.pointer_down(pt(100.0, 100.0));
    assert!(!session.commit_text());
    assert!(session.state().texts.is_empty());
    assert_eq!(session.undo_depth(), 0);
}

#[test]
fn escape_cancels_typing_then_leaves_mode() {
    let mut session = session();
    session.toggle_mode(EditMode::Text);
    session.pointer_down(pt(100.0, 100.0));
    session.append_char('a');

    assert!(session.key_down(Key::Escape));
    assert_eq!(session.mode(), EditMode::Text);
    assert!(session.interaction().text_session().is_none());
    assert!(session.state().texts.is_empty());

    assert!(session.key_down(Key::Escape));
    assert_eq!(session.mode(), EditMode::None);
}

#[test]
fn clicking_elsewhere_commits_pending_text() {
    let mut session = session();
    session.toggle_mode(EditMode::Text);
    session.pointer_down(pt(100.0, 100.0));
    session.append_char('a');
    session.pointer_down(pt(300.0, 300.0));

    assert_eq!(session.state().texts.len(), 1);
    let pending = session.interaction().text_session().expect("new session");
    assert!(pending.buffer.is_empty());
}

// ==========================================================================
// Erase
// ==========================================================================

#[test]
fn erase_gesture_takes_one_undo_step() {
    let mut session = session();
    session.toggle_mode(EditMode::Markup);
    draw(&mut session, &[(100.0, 100.0), (120.0, 100.0)]);
    draw(&mut session, &[(600.0, 300.0), (620.0, 300.0)]);
    assert_eq!(session.undo_depth(), 2);

    session.toggle_mode(EditMode::Erase);
    session.pointer_down(pt(105.0, 102.0));
    assert_eq!(session.state().strokes.len(), 1);
    session.pointer_move(pt(615.0, 305.0));
    session.pointer_up(pt(615.0, 305.0));

    assert!(session.state().strokes.is_empty());
    assert_eq!(session.undo_depth(), 3);
    session.undo();
    assert_eq!(session.state().strokes.len(), 2);
}

#[test]
fn erase_removes_text_right_of_click() {
    let mut session = session();
    session.toggle_mode(EditMode::Text);
    session.pointer_down(pt(400.0, 200.0));
    session.append_char('x');
    session.commit_text();

    session.toggle_mode(EditMode::Erase);
    // Far left of the anchor: outside the asymmetric hit box
    session.pointer_down(pt(300.0, 200.0));
    session.pointer_up(pt(300.0, 200.0));
    assert_eq!(session.state().texts.len(), 1);

    // Clicking where the glyphs are drawn hits it
    session.pointer_down(pt(440.0, 210.0));
    assert!(session.state().texts.is_empty());
}

// ==========================================================================
// View and output
// ==========================================================================

#[test]
fn idle_drag_pans_the_view() {
    let mut session = session();
    session.pointer_down(pt(10.0, 10.0));
    session.pointer_move(pt(30.0, 5.0));
    session.pointer_up(pt(30.0, 5.0));
    assert_eq!(session.view().pan, ScreenPoint::new(20.0, -5.0));
    assert_abs_diff_eq!(session.display_rect().x, 20.0);
    session.reset_view();
    assert_eq!(session.view().pan, ScreenPoint::default());
}

#[test]
fn screen_render_lists_image_then_overlays() {
    let mut session = session();
    session.toggle_mode(EditMode::Markup);
    draw(&mut session, &[(100.0, 100.0), (200.0, 200.0)]);
    session.toggle_mode(EditMode::Crop);
    drag_crop(&mut session, (100.0, 100.0), (300.0, 200.0));

    let commands = session.render_to_screen(Viewport::new(800.0, 400.0));
    assert!(matches!(commands[0], DrawCommand::Clear(_)));
    assert!(matches!(commands[1], DrawCommand::Image { frame: 0, .. }));
    assert!(matches!(commands[2], DrawCommand::Polyline { .. }));
    let dims = commands
        .iter()
        .filter(|c| matches!(c, DrawCommand::FillRect { .. }))
        .count();
    assert_eq!(dims, 4);
}

#[test]
fn export_bakes_overlays_at_full_resolution() {
    let mut config = Config::default();
    config.editing.stroke_width_px = 20.0;
    let image = ImageHandle::new(solid_image(400, 200, [0, 0, 0, 255]));
    let mut session = EditSession::with_config(image, &config);
    session.set_viewport(Viewport::new(800.0, 400.0));
    session.toggle_mode(EditMode::Markup);
    draw(&mut session, &[(0.0, 200.0), (800.0, 200.0)]);

    let buffer = session
        .export_composite(ExportTarget::File(SaveFormat::Jpeg), None)
        .expect("export");
    assert_eq!(buffer.layout, PixelLayout::Rgba8);
    assert_eq!((buffer.width, buffer.height), (400, 200));
    // 20 screen px on an 800 px display is 10 px at full resolution
    let pixels = buffer.into_image().expect("image").to_rgba8();
    assert_eq!(pixels.get_pixel(200, 100).0, [255, 0, 0, 255]);
    assert_eq!(pixels.get_pixel(200, 10).0, [0, 0, 0, 255]);
}

#[test]
fn unrotated_export_keeps_source_orientation() {
    let mut session = session();
    session.rotate_clockwise();
    assert!(session.apply_crop_pixels(PixelRect::new(0, 0, 100, 400)));

    let image = session
        .export_unrotated(ExportTarget::File(SaveFormat::Png))
        .expect("export");
    assert_eq!((image.width(), image.height()), (400, 100));
}

#[test]
fn clearing_baked_edits_keeps_rotation() {
    let mut session = session();
    session.rotate_clockwise();
    session.apply_crop_pixels(PixelRect::new(0, 0, 100, 100));
    session.clear_baked_edits();

    assert_eq!(session.state().rotation.degrees(), 90);
    assert!(!session.state().has_crop());
    assert_eq!(session.undo_depth(), 0);
    assert_eq!(session.working_image().dimensions(), (400, 200));
}

// ==========================================================================
// Headless edits
// ==========================================================================

#[test]
fn strokes_and_text_can_be_added_without_pointer() {
    let mut session = session();
    let points = [NormalizedPoint::new(-0.5, 0.2), NormalizedPoint::new(0.6, 1.4)];
    assert!(session.add_stroke(&points));
    assert!(!session.add_stroke(&points[..1]));
    assert!(session.add_text(NormalizedPoint::new(0.1, 0.1), "note\n"));
    assert!(!session.add_text(NormalizedPoint::new(0.1, 0.1), ""));

    let stroke = &session.state().strokes[0];
    assert_abs_diff_eq!(stroke.points[0].x, 0.0);
    assert_abs_diff_eq!(stroke.points[1].y, 1.0);
    assert_abs_diff_eq!(stroke.width, 3.0 / 800.0);
    assert_eq!(session.state().texts[0].text, "note");
    assert_eq!(session.undo_depth(), 2);
}

#[test]
fn headless_sizes_fall_back_to_frame_width() {
    let mut session = EditSession::new(ImageHandle::new(solid_image(300, 100, [0, 0, 0, 255])));
    assert!(session.add_text(NormalizedPoint::new(0.5, 0.5), "x"));
    assert_abs_diff_eq!(session.state().texts[0].font_size, 24.0 / 300.0);
}
