// SPDX-License-Identifier: MPL-2.0
//! `lens_edit` is the editing core of a lightweight image viewer.
//!
//! It keeps non-destructive edits (quarter-turn rotation, crop, freehand
//! strokes, text) as a small state with an undo history, renders them as a
//! draw command list for the preview and composites them into full-resolution
//! pixels for saving or the clipboard. Navigation through a folder with a
//! prefetching image cache is wired up by [`app::Viewer`].

#![doc(html_root_url = "https://docs.rs/lens_edit/0.1.0")]

pub mod app;
pub mod config;
pub mod domain;
pub mod editor;
pub mod error;
pub mod media;
pub mod render;

#[cfg(test)]
mod test_utils;
