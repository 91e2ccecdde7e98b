// SPDX-License-Identifier: MPL-2.0
//! The pending, not-yet-saved edits of the current image.

use super::{RotationAngle, Stroke, TextAnnotation};
use crate::domain::geometry::PixelRect;

/// Snapshot of every undoable edit.
///
/// The crop rectangle is expressed in pixels of the original, unrotated image.
/// Annotation coordinates are relative to the displayed frame (after rotation
/// and crop). Cloning yields an independent snapshot.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EditState {
    pub rotation: RotationAngle,
    pub crop: Option<PixelRect>,
    pub strokes: Vec<Stroke>,
    pub texts: Vec<TextAnnotation>,
}

impl EditState {
    #[must_use]
    pub fn has_crop(&self) -> bool {
        self.crop.is_some()
    }

    #[must_use]
    pub fn has_annotations(&self) -> bool {
        !self.strokes.is_empty() || !self.texts.is_empty()
    }

    /// Whether anything would change if the image were saved now.
    #[must_use]
    pub fn has_edits(&self) -> bool {
        self.rotation.is_rotated() || self.has_crop() || self.has_annotations()
    }

    /// Resets to an untouched image.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Drops everything a save-as-copy bakes in, keeping only the rotation.
    pub fn clear_baked(&mut self) {
        self.crop = None;
        self.strokes.clear();
        self.texts.clear();
    }

    /// Dimensions of the working image (original cropped, not rotated).
    #[must_use]
    pub fn working_size(&self, original_width: u32, original_height: u32) -> (u32, u32) {
        match self.crop {
            Some(rect) => (rect.width, rect.height),
            None => (original_width, original_height),
        }
    }

    /// Dimensions of the displayed frame (working image after rotation).
    #[must_use]
    pub fn frame_size(&self, original_width: u32, original_height: u32) -> (u32, u32) {
        let (w, h) = self.working_size(original_width, original_height);
        self.rotation.rotated_size(w, h)
    }
}
