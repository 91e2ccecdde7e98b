// SPDX-License-Identifier: MPL-2.0
//! Pointer and keyboard routing by active mode.

use super::{EditMode, EditSession, Interaction};
use crate::domain::geometry::ScreenPoint;

/// Keys the editor reacts to. Everything else is handled by the platform layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Escape,
    Backspace,
    Char(char),
}

impl EditSession {
    /// Primary button pressed at `point`.
    pub fn pointer_down(&mut self, point: ScreenPoint) {
        match self.mode() {
            EditMode::None => {
                self.interaction = Interaction::Idle {
                    pan_from: Some(point),
                };
            }
            EditMode::Crop => self.begin_crop(point),
            EditMode::Markup => self.begin_stroke(point),
            EditMode::Text => self.begin_text_edit(point),
            EditMode::Erase => self.begin_erase(point),
        }
    }

    /// Pointer moved. Only continues a gesture that is in progress.
    pub fn pointer_move(&mut self, point: ScreenPoint) {
        match &mut self.interaction {
            Interaction::Idle {
                pan_from: Some(from),
            } => {
                let (dx, dy) = (point.x - from.x, point.y - from.y);
                *from = point;
                self.view.pan_by(dx, dy);
            }
            Interaction::Crop(drag) if drag.is_dragging() => self.update_crop_drag(point),
            Interaction::Markup { active: Some(_) } => self.extend_stroke(point),
            Interaction::Erase { erasing: true } => {
                self.erase_at(point);
            }
            _ => {}
        }
    }

    /// Primary button released.
    pub fn pointer_up(&mut self, point: ScreenPoint) {
        match self.mode() {
            EditMode::None => self.interaction = Interaction::default(),
            EditMode::Crop => self.end_crop_drag(point),
            EditMode::Markup => self.end_stroke(),
            EditMode::Text => {}
            EditMode::Erase => self.end_erase(),
        }
    }

    /// Key pressed. Returns whether the editor consumed it.
    pub fn key_down(&mut self, key: Key) -> bool {
        let typing = self.interaction.text_session().is_some();
        match (key, self.mode()) {
            (Key::Enter, EditMode::Crop) => self.apply_crop(),
            (Key::Enter, EditMode::Text) if typing => {
                self.commit_text();
                true
            }
            (Key::Escape, EditMode::Text) if typing => {
                self.cancel_text();
                true
            }
            (Key::Escape, mode) if mode != EditMode::None => {
                self.cancel_mode();
                true
            }
            (Key::Backspace, EditMode::Text) if typing => {
                self.backspace();
                true
            }
            (Key::Char(c), EditMode::Text) if typing => {
                self.append_char(c);
                true
            }
            _ => false,
        }
    }
}
