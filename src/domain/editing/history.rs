// SPDX-License-Identifier: MPL-2.0
//! Bounded undo history of edit-state snapshots.

use super::EditState;
use crate::config::defaults::UNDO_CAPACITY;
use std::collections::VecDeque;

/// LIFO of [`EditState`] snapshots, most recent last.
///
/// Pushing onto a full stack evicts the oldest snapshot.
#[derive(Debug, Clone)]
pub struct UndoStack {
    entries: VecDeque<EditState>,
    capacity: usize,
}

impl UndoStack {
    /// Creates a stack holding at most `capacity` snapshots (at least one).
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, state: EditState) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(state);
    }

    pub fn pop(&mut self) -> Option<EditState> {
        self.entries.pop_back()
    }

    #[must_use]
    pub fn peek(&self) -> Option<&EditState> {
        self.entries.back()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::with_capacity(UNDO_CAPACITY)
    }
}
