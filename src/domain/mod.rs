// SPDX-License-Identifier: MPL-2.0
//! Domain layer - pure value types with no external crate dependencies.
//!
//! # Modules
//!
//! - [`editing`]: The undoable edit state ([`EditState`](editing::EditState),
//!   [`UndoStack`](editing::UndoStack)) and its value objects
//!   ([`RotationAngle`](editing::RotationAngle), [`ZoomFactor`](editing::ZoomFactor)).
//! - [`geometry`]: Screen, normalized and pixel coordinate spaces and the
//!   only sanctioned conversions between them.

pub mod editing;
pub mod geometry;
