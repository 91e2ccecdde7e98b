// SPDX-License-Identifier: MPL-2.0
//! Folder navigation: the list of images next to the current one.

use super::extensions;
use crate::error::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// What the editor needs from a navigator.
pub trait Navigator {
    /// Path of the image currently shown, if any.
    fn current_path(&self) -> Option<&Path>;

    /// Up to `count` previous paths (nearest first) followed by up to `count`
    /// next paths (nearest first).
    fn adjacent_paths(&self, count: usize) -> Vec<PathBuf>;
}

/// Sorted list of supported images in one folder with a cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FolderNavigator {
    folder: Option<PathBuf>,
    files: Vec<PathBuf>,
    current: usize,
}

impl FolderNavigator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Scans the parent folder of `file` and points the cursor at it.
    ///
    /// # Errors
    ///
    /// Returns an error if the folder cannot be read.
    pub fn open(&mut self, file: &Path) -> Result<()> {
        let folder = file
            .parent()
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        self.files = scan_folder(&folder)?;
        self.folder = Some(folder);
        self.current = self
            .files
            .iter()
            .position(|p| p.file_name() == file.file_name())
            .unwrap_or(0);
        Ok(())
    }

    /// Scans `folder` and points the cursor at its first image.
    ///
    /// # Errors
    ///
    /// Returns an error if the folder cannot be read.
    pub fn open_folder(&mut self, folder: &Path) -> Result<Option<&Path>> {
        self.files = scan_folder(folder)?;
        self.folder = Some(folder.to_path_buf());
        self.current = 0;
        Ok(self.current_path())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Current index and total count, for "3 / 12" style display.
    #[must_use]
    pub fn position(&self) -> Option<(usize, usize)> {
        (!self.files.is_empty()).then_some((self.current, self.files.len()))
    }

    /// Moves to the next image. Does not wrap.
    pub fn next(&mut self) -> bool {
        if self.current + 1 < self.files.len() {
            self.current += 1;
            true
        } else {
            false
        }
    }

    /// Moves to the previous image. Does not wrap.
    pub fn previous(&mut self) -> bool {
        if self.current > 0 && !self.files.is_empty() {
            self.current -= 1;
            true
        } else {
            false
        }
    }

    pub fn first(&mut self) -> bool {
        self.go_to(0)
    }

    pub fn last(&mut self) -> bool {
        match self.files.len() {
            0 => false,
            len => self.go_to(len - 1),
        }
    }

    /// Moves the cursor. Returns whether it changed.
    pub fn go_to(&mut self, index: usize) -> bool {
        if index < self.files.len() && index != self.current {
            self.current = index;
            true
        } else {
            false
        }
    }

    /// Forgets the current entry after its file was deleted.
    pub fn remove_current(&mut self) -> Option<PathBuf> {
        if self.files.is_empty() {
            return None;
        }
        let removed = self.files.remove(self.current);
        if self.current >= self.files.len() && self.current > 0 {
            self.current -= 1;
        }
        Some(removed)
    }

    /// Renames the current file within its folder.
    ///
    /// # Errors
    ///
    /// Returns an error if there is no current file or the rename fails.
    pub fn rename_current(&mut self, new_name: &str) -> Result<PathBuf> {
        let current = self
            .files
            .get(self.current)
            .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::NotFound, "no current file"))?;
        let target = current
            .parent()
            .map_or_else(|| PathBuf::from(new_name), |dir| dir.join(new_name));
        fs::rename(current, &target)?;
        self.files[self.current] = target.clone();
        Ok(target)
    }

    /// Rescans the folder, keeping the cursor on the same file when it still exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the folder cannot be read.
    pub fn refresh(&mut self) -> Result<()> {
        let Some(folder) = self.folder.clone() else {
            return Ok(());
        };
        let current = self.current_path().map(Path::to_path_buf);
        self.files = scan_folder(&folder)?;
        match current.and_then(|c| self.files.iter().position(|p| *p == c)) {
            Some(index) => self.current = index,
            None => self.current = self.current.min(self.files.len().saturating_sub(1)),
        }
        Ok(())
    }
}

impl Navigator for FolderNavigator {
    fn current_path(&self) -> Option<&Path> {
        self.files.get(self.current).map(PathBuf::as_path)
    }

    fn adjacent_paths(&self, count: usize) -> Vec<PathBuf> {
        if self.files.is_empty() {
            return Vec::new();
        }
        let before = (1..=count)
            .take_while(|&i| i <= self.current)
            .map(|i| self.files[self.current - i].clone());
        let after = (1..=count)
            .map(|i| self.current + i)
            .take_while(|&i| i < self.files.len())
            .map(|i| self.files[i].clone());
        before.chain(after).collect()
    }
}

/// Supported images in `folder`, sorted case-insensitively by path.
fn scan_folder(folder: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(folder)? {
        let path = entry?.path();
        if path.is_file() && extensions::is_supported(&path) {
            files.push(path);
        }
    }
    files.sort_by_cached_key(|p| p.to_string_lossy().to_lowercase());
    Ok(files)
}
