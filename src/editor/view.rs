// SPDX-License-Identifier: MPL-2.0
//! Transient zoom/pan state. Not part of the undo history.

use crate::config::defaults::DEFAULT_ZOOM_STEP;
use crate::domain::editing::ZoomFactor;
use crate::domain::geometry::ScreenPoint;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewState {
    pub zoom: ZoomFactor,
    pub pan: ScreenPoint,
    zoom_step: f32,
}

impl ViewState {
    #[must_use]
    pub fn new(zoom_step: f32) -> Self {
        Self {
            zoom: ZoomFactor::default(),
            pan: ScreenPoint::default(),
            zoom_step,
        }
    }

    pub fn zoom_in(&mut self) {
        self.zoom = self.zoom.zoom_in(self.zoom_step);
    }

    pub fn zoom_out(&mut self) {
        self.zoom = self.zoom.zoom_out(self.zoom_step);
    }

    pub fn pan_by(&mut self, dx: f32, dy: f32) {
        self.pan.x += dx;
        self.pan.y += dy;
    }

    /// Fit to window, centered.
    pub fn reset(&mut self) {
        self.zoom = ZoomFactor::default();
        self.pan = ScreenPoint::default();
    }

    /// One image pixel per screen pixel, given the current fit-to-window scale.
    pub fn actual_size(&mut self, fit_scale: f32) {
        if fit_scale > 0.0 {
            self.zoom = ZoomFactor::new(1.0 / fit_scale);
            self.pan = ScreenPoint::default();
        }
    }
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new(DEFAULT_ZOOM_STEP)
    }
}
