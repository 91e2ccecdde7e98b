// SPDX-License-Identifier: MPL-2.0
//! Editing domain types: the undoable edit state and its building blocks.

mod annotation;
mod edit_state;
mod history;
mod newtypes;

pub use annotation::{Stroke, TextAnnotation};
pub use edit_state::EditState;
pub use history::UndoStack;
pub use newtypes::{zoom_bounds, Color, RotationAngle, ZoomFactor};
