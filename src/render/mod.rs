// SPDX-License-Identifier: MPL-2.0
//! Turning an image plus its edit state into pixels or draw commands.
//!
//! - [`compositor`]: the export pipeline shared by clipboard and file output.
//! - [`screen`]: the per-frame draw command list for the live preview.
//! - [`overlay`] / [`text`]: annotation rasterisation used by the compositor.

pub mod compositor;
pub mod overlay;
pub mod screen;
pub mod text;

pub use compositor::{Compositor, ExportBuffer, ExportTarget, PixelLayout};
pub use screen::{DrawCommand, ScreenStyle};
pub use text::TextRenderer;
