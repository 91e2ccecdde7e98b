// SPDX-License-Identifier: MPL-2.0
//! Editing session for the current image.
//!
//! [`EditSession`] is the facade the platform layer talks to. It owns the
//! decoded base image, the pending [`EditState`], the undo history, the active
//! tool and the transient view. Every operation here is infallible from the
//! caller's point of view: requests that cannot apply (no image displayed, an
//! empty crop, undo with nothing to undo) are logged at debug level and
//! ignored. Only exporting touches resources that can fail.
//!
//! Pointer and keyboard routing lives in [`input`].

pub mod annotations;
mod input;
pub mod mode;
pub mod view;

pub use input::Key;
pub use mode::{CropDrag, EditMode, Interaction, TextSession};
pub use view::ViewState;

use crate::config::{Config, EditingConfig};
use crate::domain::editing::{
    Color, EditState, RotationAngle, Stroke, TextAnnotation, UndoStack,
};
use crate::domain::geometry::{
    crop_rect_to_image_pixels, fit_scale, image_display_rect, screen_to_normalized,
    unrotate_rect, NormalizedPoint, PixelRect, ScreenPoint, ScreenRect, Viewport,
};
use crate::error::Result;
use crate::media::ImageHandle;
use crate::render::screen::{self, Scene};
use crate::render::{Compositor, DrawCommand, ExportBuffer, ExportTarget, ScreenStyle, TextRenderer};

/// Pending edits of one loaded image.
#[derive(Debug)]
pub struct EditSession {
    /// Image as decoded, never cropped.
    base: ImageHandle,
    /// `base` with the current crop applied.
    working: ImageHandle,
    state: EditState,
    undo: UndoStack,
    interaction: Interaction,
    view: ViewState,
    viewport: Viewport,
    frame: usize,
    editing: EditingConfig,
    style: ScreenStyle,
    compositor: Compositor,
}

impl EditSession {
    /// Session with default settings.
    #[must_use]
    pub fn new(image: ImageHandle) -> Self {
        Self::with_config(image, &Config::default())
    }

    #[must_use]
    pub fn with_config(image: ImageHandle, config: &Config) -> Self {
        let text = TextRenderer::new(
            &config.editing.font_family,
            config.editing.font_file.as_deref(),
        );
        Self::with_renderer(image, config, text)
    }

    /// Session sharing an already configured text renderer.
    #[must_use]
    pub fn with_renderer(image: ImageHandle, config: &Config, text: TextRenderer) -> Self {
        let style = ScreenStyle {
            background: Color::from_rgba8(config.display.background),
            crop_dim: Color::BLACK.with_opacity(config.display.crop_dim_opacity),
            crop_border: Color::WHITE,
            crop_border_width: config.display.crop_border_width,
        };
        Self {
            working: image.clone(),
            base: image,
            state: EditState::default(),
            undo: UndoStack::default(),
            interaction: Interaction::default(),
            view: ViewState::new(config.display.zoom_step),
            viewport: Viewport::default(),
            frame: 0,
            editing: config.editing.clone(),
            style,
            compositor: Compositor::new(text),
        }
    }

    // ======================================================================
    // Accessors
    // ======================================================================

    #[must_use]
    pub fn state(&self) -> &EditState {
        &self.state
    }

    /// Image as decoded, without any edits.
    #[must_use]
    pub fn base_image(&self) -> &ImageHandle {
        &self.base
    }

    /// Image the screen shows: the base image with the crop applied.
    #[must_use]
    pub fn working_image(&self) -> &ImageHandle {
        &self.working
    }

    #[must_use]
    pub fn mode(&self) -> EditMode {
        self.interaction.mode()
    }

    #[must_use]
    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    #[must_use]
    pub fn view(&self) -> &ViewState {
        &self.view
    }

    #[must_use]
    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    #[must_use]
    pub fn has_pending_edits(&self) -> bool {
        self.state.has_edits()
    }

    /// Frame of an animated image currently shown.
    #[must_use]
    pub fn frame(&self) -> usize {
        self.frame
    }

    /// Shows frame `index`. Ignored while cropped, which freezes the animation.
    pub fn set_frame(&mut self, index: usize) {
        if self.state.has_crop() || !self.base.is_animated() {
            return;
        }
        if index < self.base.frame_count() {
            self.frame = index;
        }
    }

    /// Whether an animation may advance right now.
    #[must_use]
    pub fn is_animation_live(&self) -> bool {
        self.base.is_animated() && !self.state.has_crop()
    }

    /// Dimensions of the displayed frame: working image after rotation.
    #[must_use]
    pub fn frame_size(&self) -> (u32, u32) {
        let (w, h) = self.base.dimensions();
        self.state.frame_size(w, h)
    }

    // ======================================================================
    // View
    // ======================================================================

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Screen rectangle of the displayed frame for the current viewport.
    #[must_use]
    pub fn display_rect(&self) -> ScreenRect {
        let (w, h) = self.working.dimensions();
        image_display_rect(
            w,
            h,
            self.state.rotation,
            self.viewport,
            self.view.zoom,
            self.view.pan,
        )
    }

    pub fn zoom_in(&mut self) {
        self.view.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.view.zoom_out();
    }

    pub fn pan_by(&mut self, dx: f32, dy: f32) {
        self.view.pan_by(dx, dy);
    }

    pub fn reset_view(&mut self) {
        self.view.reset();
    }

    /// Zoom so one image pixel covers one screen pixel.
    pub fn actual_size(&mut self) {
        let (w, h) = self.working.dimensions();
        self.view
            .actual_size(fit_scale(w, h, self.state.rotation, self.viewport));
    }

    fn to_normalized(&self, point: ScreenPoint) -> Option<NormalizedPoint> {
        let mapped = screen_to_normalized(point, self.display_rect());
        if mapped.is_none() {
            log::debug!("Pointer at ({}, {}) ignored: no image displayed", point.x, point.y);
        }
        mapped
    }

    /// Normalized size for a length in screen pixels, falling back to frame
    /// pixels when nothing is displayed.
    fn normalized_size(&self, length_px: f32) -> f32 {
        let display = self.display_rect();
        if display.is_empty() {
            #[allow(clippy::cast_precision_loss)]
            let width = self.frame_size().0.max(1) as f32;
            length_px / width
        } else {
            annotations::normalized_length(length_px, display)
        }
    }

    // ======================================================================
    // Modes
    // ======================================================================

    /// Toggles `mode`: the active mode returns to `None`, any other mode is
    /// entered after abandoning whatever the previous tool had in progress.
    pub fn toggle_mode(&mut self, mode: EditMode) {
        let target = self.interaction.toggled(mode);
        self.abandon_in_progress();
        self.interaction = Interaction::enter(target);
        log::debug!("Edit mode: {target:?}");
    }

    /// Leaves the active mode, discarding in-progress drags, strokes and text.
    pub fn cancel_mode(&mut self) {
        self.abandon_in_progress();
        self.interaction = Interaction::default();
    }

    fn abandon_in_progress(&mut self) {
        if let Interaction::Markup { active: Some(_) } = self.interaction {
            // The snapshot pushed when the stroke began has nothing to undo
            self.undo.pop();
        }
    }

    // ======================================================================
    // Rotation
    // ======================================================================

    /// Rotates by `delta_degrees` (a multiple of 90, either sign).
    ///
    /// Annotations turn with the image. Returns whether anything changed.
    pub fn apply_rotation(&mut self, delta_degrees: i32) -> bool {
        let Some(rotation) = self.state.rotation.rotated_by(delta_degrees) else {
            log::debug!("Rotation by {delta_degrees} degrees ignored: not a quarter turn");
            return false;
        };
        let turn = RotationAngle::new(delta_degrees);
        if !turn.is_rotated() {
            return false;
        }
        self.cancel_gesture();
        self.push_undo();
        let (frame_width, frame_height) = self.frame_size();
        annotations::rotate_annotations(
            &mut self.state.strokes,
            &mut self.state.texts,
            turn,
            frame_width,
            frame_height,
        );
        self.state.rotation = rotation;
        true
    }

    pub fn rotate_clockwise(&mut self) -> bool {
        self.apply_rotation(90)
    }

    pub fn rotate_counterclockwise(&mut self) -> bool {
        self.apply_rotation(-90)
    }

    // ======================================================================
    // Crop
    // ======================================================================

    /// Starts dragging a crop selection at `point`. Crop mode only.
    pub fn begin_crop(&mut self, point: ScreenPoint) {
        if let Interaction::Crop(drag) = &mut self.interaction {
            drag.origin = Some(point);
            drag.selection = Some(ScreenRect::from_corners(point, point));
        }
    }

    /// Moves the free corner of the selection while dragging.
    pub fn update_crop_drag(&mut self, point: ScreenPoint) {
        if let Interaction::Crop(CropDrag {
            origin: Some(origin),
            selection,
        }) = &mut self.interaction
        {
            *selection = Some(ScreenRect::from_corners(*origin, point));
        }
    }

    /// Releases the drag; the selection stays until applied or cancelled.
    pub fn end_crop_drag(&mut self, point: ScreenPoint) {
        self.update_crop_drag(point);
        if let Interaction::Crop(drag) = &mut self.interaction {
            drag.origin = None;
        }
    }

    /// Clears the selection and leaves crop mode.
    pub fn cancel_crop(&mut self) {
        if self.mode() == EditMode::Crop {
            self.interaction = Interaction::default();
        }
    }

    /// Applies the on-screen selection and leaves Crop mode. Returns whether
    /// the selection was accepted.
    pub fn apply_crop(&mut self) -> bool {
        let Some(selection) = self.interaction.crop_selection() else {
            log::debug!("Crop ignored: no selection");
            return false;
        };
        let (frame_width, frame_height) = self.frame_size();
        let Some(rect) =
            crop_rect_to_image_pixels(selection, self.display_rect(), frame_width, frame_height)
        else {
            log::debug!("Crop ignored: no image displayed");
            return false;
        };
        let applied = self.apply_crop_pixels(rect);
        if applied {
            self.interaction = Interaction::default();
        }
        applied
    }

    /// Crops to `rect`, given in pixels of the displayed frame.
    ///
    /// Annotations are re-projected onto the cropped frame and the pre-crop
    /// state is kept as a single undo step. Empty or out-of-frame rectangles
    /// are rejected. A rectangle covering the whole frame is accepted without
    /// touching the state or the history.
    pub fn apply_crop_pixels(&mut self, rect: PixelRect) -> bool {
        let (frame_width, frame_height) = self.frame_size();
        if !rect.fits_within(frame_width, frame_height) {
            log::debug!(
                "Crop {}x{} at ({}, {}) ignored: degenerate or outside {frame_width}x{frame_height}",
                rect.width,
                rect.height,
                rect.x,
                rect.y
            );
            return false;
        }
        if (rect.width, rect.height) == (frame_width, frame_height) {
            log::debug!("Crop covers the whole frame; nothing to do");
            return true;
        }

        let (base_width, base_height) = self.base.dimensions();
        let (working_width, working_height) = self.state.working_size(base_width, base_height);
        let in_working = unrotate_rect(rect, self.state.rotation, working_width, working_height);
        let in_base = match self.state.crop {
            Some(previous) => in_working.offset_by(&previous),
            None => in_working,
        };

        let Some(working) = self.base.cropped(in_base) else {
            log::debug!("Crop ignored: rectangle does not fit the base image");
            return false;
        };

        self.push_undo();
        let (strokes, texts) = annotations::reproject_for_crop(
            &self.state.strokes,
            &self.state.texts,
            frame_width,
            frame_height,
            rect,
        );
        self.state.strokes = strokes;
        self.state.texts = texts;
        self.state.crop = Some(in_base);
        self.working = working;
        self.frame = 0;
        log::debug!(
            "Cropped to {}x{} at ({}, {}) in source pixels",
            in_base.width,
            in_base.height,
            in_base.x,
            in_base.y
        );
        true
    }

    // ======================================================================
    // Markup
    // ======================================================================

    /// Starts a stroke at `point`. Markup mode only.
    pub fn begin_stroke(&mut self, point: ScreenPoint) {
        if !matches!(self.interaction, Interaction::Markup { active: None }) {
            return;
        }
        let Some(origin) = self.to_normalized(point) else {
            return;
        };
        let width = self.normalized_size(self.editing.stroke_width_px);
        self.push_undo();
        self.interaction = Interaction::Markup {
            active: Some(Stroke::begin(origin, self.editing.stroke_color(), width)),
        };
    }

    /// Appends `point` to the stroke being drawn.
    pub fn extend_stroke(&mut self, point: ScreenPoint) {
        let Some(next) = self.to_normalized(point) else {
            return;
        };
        if let Interaction::Markup {
            active: Some(stroke),
        } = &mut self.interaction
        {
            stroke.points.push(next);
        }
    }

    /// Commits the stroke being drawn. A stroke with a single point is dropped
    /// together with its undo snapshot.
    pub fn end_stroke(&mut self) {
        let Interaction::Markup { active } = &mut self.interaction else {
            return;
        };
        let Some(stroke) = active.take() else {
            return;
        };
        if stroke.is_drawable() {
            self.state.strokes.push(stroke);
        } else {
            log::debug!("Stroke with a single point discarded");
            self.undo.pop();
        }
    }

    /// Records a finished stroke given in normalized coordinates, sized like
    /// one drawn on the current display. Returns whether it was recorded.
    pub fn add_stroke(&mut self, points: &[NormalizedPoint]) -> bool {
        let stroke = Stroke {
            points: points.iter().copied().map(clamp_unit).collect(),
            color: self.editing.stroke_color(),
            width: self.normalized_size(self.editing.stroke_width_px),
        };
        if !stroke.is_drawable() {
            log::debug!("Stroke with {} point(s) ignored", points.len());
            return false;
        }
        self.push_undo();
        self.state.strokes.push(stroke);
        true
    }

    // ======================================================================
    // Text
    // ======================================================================

    /// Starts typing at `point`. Text mode only; a non-empty session in
    /// progress is committed first.
    pub fn begin_text_edit(&mut self, point: ScreenPoint) {
        if self.mode() != EditMode::Text {
            return;
        }
        self.commit_text();
        let Some(anchor) = self.to_normalized(point) else {
            return;
        };
        self.interaction = Interaction::Text {
            session: Some(TextSession {
                anchor,
                buffer: String::new(),
            }),
        };
    }

    /// Appends a printable character to the text being typed.
    pub fn append_char(&mut self, c: char) {
        if c.is_control() {
            return;
        }
        if let Interaction::Text {
            session: Some(session),
        } = &mut self.interaction
        {
            session.buffer.push(c);
        }
    }

    pub fn backspace(&mut self) {
        if let Interaction::Text {
            session: Some(session),
        } = &mut self.interaction
        {
            session.buffer.pop();
        }
    }

    /// Ends the text session, adding an annotation when text was typed.
    /// Returns whether an annotation was added.
    pub fn commit_text(&mut self) -> bool {
        let Interaction::Text { session } = &mut self.interaction else {
            return false;
        };
        let Some(TextSession { anchor, buffer }) = session.take() else {
            return false;
        };
        if buffer.is_empty() {
            return false;
        }
        let font_size = self.normalized_size(self.editing.font_size_px);
        self.push_undo();
        self.state.texts.push(TextAnnotation {
            anchor,
            text: buffer,
            color: self.editing.text_color(),
            font_size,
        });
        true
    }

    /// Records a text annotation anchored at a normalized point. Returns
    /// whether it was recorded; empty text is ignored.
    pub fn add_text(&mut self, anchor: NormalizedPoint, text: &str) -> bool {
        let text: String = text.chars().filter(|c| !c.is_control()).collect();
        if text.is_empty() {
            return false;
        }
        let font_size = self.normalized_size(self.editing.font_size_px);
        self.push_undo();
        self.state.texts.push(TextAnnotation {
            anchor: clamp_unit(anchor),
            text,
            color: self.editing.text_color(),
            font_size,
        });
        true
    }

    /// Drops the text being typed. Stays in text mode.
    pub fn cancel_text(&mut self) {
        if let Interaction::Text { session } = &mut self.interaction {
            *session = None;
        }
    }

    // ======================================================================
    // Erase
    // ======================================================================

    /// Starts an erase gesture: one undo snapshot, then erases at `point`.
    pub fn begin_erase(&mut self, point: ScreenPoint) {
        if !matches!(self.interaction, Interaction::Erase { erasing: false }) {
            return;
        }
        if self.to_normalized(point).is_none() {
            return;
        }
        self.push_undo();
        self.interaction = Interaction::Erase { erasing: true };
        self.erase_at(point);
    }

    /// Removes every annotation hit at `point`. Returns how many were removed.
    pub fn erase_at(&mut self, point: ScreenPoint) -> usize {
        let Some(target) = self.to_normalized(point) else {
            return 0;
        };
        let radius =
            annotations::normalized_hit_radius(self.editing.erase_radius_px, self.display_rect());
        let removed = annotations::erase_at(
            &mut self.state.strokes,
            &mut self.state.texts,
            target,
            radius,
        );
        if removed > 0 {
            log::debug!("Erased {removed} annotation(s)");
        }
        removed
    }

    pub fn end_erase(&mut self) {
        if let Interaction::Erase { erasing } = &mut self.interaction {
            *erasing = false;
        }
    }

    // ======================================================================
    // History
    // ======================================================================

    fn push_undo(&mut self) {
        self.undo.push(self.state.clone());
    }

    /// Restores the previous snapshot. Returns whether there was one.
    ///
    /// A stroke still being drawn is discarded first; its snapshot does not
    /// count as a step.
    pub fn undo(&mut self) -> bool {
        if self.interaction.active_stroke().is_some() {
            self.cancel_gesture();
        }
        let Some(previous) = self.undo.pop() else {
            log::debug!("Undo ignored: history is empty");
            return false;
        };
        self.interaction = Interaction::enter(self.mode());
        let crop_changed = previous.crop != self.state.crop;
        self.state = previous;
        if crop_changed {
            self.rebuild_working();
        }
        true
    }

    /// Ends any gesture in progress without committing it.
    fn cancel_gesture(&mut self) {
        self.abandon_in_progress();
        self.interaction = Interaction::enter(self.mode());
    }

    /// Recomputes the working image after the crop changed.
    fn rebuild_working(&mut self) {
        self.working = match self.state.crop {
            Some(rect) => match self.base.cropped(rect) {
                Some(cropped) => cropped,
                None => {
                    log::warn!("Stored crop no longer fits the image; dropping it");
                    self.state.crop = None;
                    self.base.clone()
                }
            },
            None => {
                log::debug!("Crop undone; showing the full-resolution image again");
                self.base.clone()
            }
        };
        self.frame = 0;
    }

    /// Forgets every edit and the history, keeping the current image.
    pub fn clear_edits(&mut self) {
        self.state.clear();
        self.undo.clear();
        self.interaction = Interaction::default();
        self.working = self.base.clone();
        self.frame = 0;
    }

    /// After a save-as-copy baked crop and overlays: keep only the rotation.
    pub fn clear_baked_edits(&mut self) {
        self.state.clear_baked();
        self.undo.clear();
        self.interaction = Interaction::default();
        self.working = self.base.clone();
        self.frame = 0;
    }

    // ======================================================================
    // Output
    // ======================================================================

    /// Draw commands for the current frame in `viewport`.
    pub fn render_to_screen(&mut self, viewport: Viewport) -> Vec<DrawCommand> {
        self.viewport = viewport;
        let scene = Scene {
            viewport,
            display: self.display_rect(),
            rotation: self.state.rotation,
            frame: self.frame,
            state: &self.state,
            active_stroke: self.interaction.active_stroke(),
            text_session: self.interaction.text_session(),
            pending_text_style: (
                self.editing.text_color(),
                self.normalized_size(self.editing.font_size_px),
            ),
            crop_selection: self.interaction.crop_selection(),
        };
        screen::build(&scene, &self.style)
    }

    /// Composites the base image with every pending edit.
    ///
    /// Uses the frame currently shown. `size` overrides the full resolution.
    ///
    /// # Errors
    ///
    /// Returns an error if surface creation or the crop fails.
    pub fn export_composite(
        &self,
        target: ExportTarget,
        size: Option<(u32, u32)>,
    ) -> Result<ExportBuffer> {
        self.compositor
            .export(self.base.frame(self.frame), &self.state, target, size)
    }

    /// Like [`Self::export_composite`] but without rotation, for a copy that
    /// leaves the rotation pending.
    ///
    /// # Errors
    ///
    /// Returns an error if surface creation or the crop fails.
    pub fn export_unrotated(&self, target: ExportTarget) -> Result<image_rs::DynamicImage> {
        let buffer = self.export_composite(target, None)?;
        Ok(crate::render::compositor::unrotate_image(
            buffer.into_image()?,
            self.state.rotation,
        ))
    }
}

fn clamp_unit(point: NormalizedPoint) -> NormalizedPoint {
    NormalizedPoint::new(point.x.clamp(0.0, 1.0), point.y.clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests;
