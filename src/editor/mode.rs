// SPDX-License-Identifier: MPL-2.0
//! Interactive tool modes.
//!
//! Each mode is a variant of [`Interaction`] that owns only the transient
//! state its tool needs, so a crop drag can never coexist with a text buffer.

use crate::domain::editing::Stroke;
use crate::domain::geometry::{NormalizedPoint, ScreenPoint, ScreenRect};

/// Which tool is active. `None` is plain pan/zoom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditMode {
    #[default]
    None,
    Crop,
    Markup,
    Text,
    Erase,
}

/// Crop selection being dragged on screen.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CropDrag {
    /// Where the pointer went down, while the button is held.
    pub origin: Option<ScreenPoint>,
    /// Last selection rectangle, kept after release until applied or cancelled.
    pub selection: Option<ScreenRect>,
}

impl CropDrag {
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.origin.is_some()
    }
}

/// Inline text being typed.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSession {
    pub anchor: NormalizedPoint,
    pub buffer: String,
}

/// Active tool together with its in-progress state.
#[derive(Debug, Clone, PartialEq)]
pub enum Interaction {
    Idle { pan_from: Option<ScreenPoint> },
    Crop(CropDrag),
    Markup { active: Option<Stroke> },
    Text { session: Option<TextSession> },
    Erase { erasing: bool },
}

impl Default for Interaction {
    fn default() -> Self {
        Self::Idle { pan_from: None }
    }
}

impl Interaction {
    /// Fresh state for `mode`, with nothing in progress.
    #[must_use]
    pub fn enter(mode: EditMode) -> Self {
        match mode {
            EditMode::None => Self::Idle { pan_from: None },
            EditMode::Crop => Self::Crop(CropDrag::default()),
            EditMode::Markup => Self::Markup { active: None },
            EditMode::Text => Self::Text { session: None },
            EditMode::Erase => Self::Erase { erasing: false },
        }
    }

    #[must_use]
    pub fn mode(&self) -> EditMode {
        match self {
            Self::Idle { .. } => EditMode::None,
            Self::Crop(_) => EditMode::Crop,
            Self::Markup { .. } => EditMode::Markup,
            Self::Text { .. } => EditMode::Text,
            Self::Erase { .. } => EditMode::Erase,
        }
    }

    /// Target of a toggle: the same mode returns to `None`.
    #[must_use]
    pub fn toggled(&self, mode: EditMode) -> EditMode {
        if self.mode() == mode {
            EditMode::None
        } else {
            mode
        }
    }

    /// Whether a pointer gesture is currently held down.
    #[must_use]
    pub fn is_pointer_active(&self) -> bool {
        match self {
            Self::Idle { pan_from } => pan_from.is_some(),
            Self::Crop(drag) => drag.is_dragging(),
            Self::Markup { active } => active.is_some(),
            Self::Text { .. } => false,
            Self::Erase { erasing } => *erasing,
        }
    }

    #[must_use]
    pub fn crop_selection(&self) -> Option<ScreenRect> {
        match self {
            Self::Crop(drag) => drag.selection,
            _ => None,
        }
    }

    #[must_use]
    pub fn active_stroke(&self) -> Option<&Stroke> {
        match self {
            Self::Markup { active } => active.as_ref(),
            _ => None,
        }
    }

    #[must_use]
    pub fn text_session(&self) -> Option<&TextSession> {
        match self {
            Self::Text { session } => session.as_ref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggling_active_mode_returns_to_none() {
        let crop = Interaction::enter(EditMode::Crop);
        assert_eq!(crop.toggled(EditMode::Crop), EditMode::None);
        assert_eq!(crop.toggled(EditMode::Markup), EditMode::Markup);
    }

    #[test]
    fn entering_a_mode_starts_with_nothing_in_progress() {
        for mode in [
            EditMode::None,
            EditMode::Crop,
            EditMode::Markup,
            EditMode::Text,
            EditMode::Erase,
        ] {
            let interaction = Interaction::enter(mode);
            assert_eq!(interaction.mode(), mode);
            assert!(!interaction.is_pointer_active());
            assert!(interaction.crop_selection().is_none());
            assert!(interaction.text_session().is_none());
        }
    }

    #[test]
    fn accessors_only_answer_for_their_mode() {
        let markup = Interaction::Markup {
            active: Some(Stroke::begin(
                NormalizedPoint::default(),
                crate::domain::editing::Color::RED,
                0.01,
            )),
        };
        assert!(markup.active_stroke().is_some());
        assert!(markup.is_pointer_active());
        assert!(Interaction::enter(EditMode::Crop).active_stroke().is_none());
    }
}
