// SPDX-License-Identifier: MPL-2.0
//! Application root: the folder being browsed and the image being edited.
//!
//! The `Viewer` wires the navigator, the decoded-image cache and the current
//! [`EditSession`] together. Every navigation loads through the cache, starts
//! a fresh session (edits, view and undo history are discarded) and queues the
//! neighbouring files for background decoding. Callers that want to warn about
//! unsaved work check [`Viewer::has_pending_edits`] first.

use crate::config::Config;
use crate::domain::geometry::Viewport;
use crate::editor::EditSession;
use crate::error::{Error, Result};
use crate::media::animation::FramePlayer;
use crate::media::save::{self, ClipboardFormat, SaveFormat};
use crate::media::{
    CacheStats, Decoder, FolderNavigator, ImageCache, ImageDecoder, ImageHandle, Navigator,
};
use crate::render::{ExportTarget, TextRenderer};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Folder browser with an edit session for the image on screen.
pub struct Viewer {
    config: Config,
    navigator: FolderNavigator,
    cache: ImageCache,
    decoder: Arc<dyn Decoder>,
    text: TextRenderer,
    viewport: Viewport,
    session: Option<EditSession>,
    player: Option<FramePlayer>,
    /// Frame index published by the player's `on_frame` callback.
    shown_frame: Arc<AtomicUsize>,
}

impl fmt::Debug for Viewer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Viewer")
            .field("current", &self.navigator.current_path())
            .field("position", &self.navigator.position())
            .field("cache", &self.cache)
            .field("has_session", &self.session.is_some())
            .field("player", &self.player)
            .finish_non_exhaustive()
    }
}

impl Viewer {
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self::with_decoder(config, Arc::new(ImageDecoder))
    }

    /// Viewer decoding through `decoder`, shared with the prefetch worker.
    #[must_use]
    pub fn with_decoder(config: Config, decoder: Arc<dyn Decoder>) -> Self {
        let config = config.sanitized();
        let cache = ImageCache::new(config.cache.capacity, Arc::clone(&decoder));
        let text = TextRenderer::new(
            &config.editing.font_family,
            config.editing.font_file.as_deref(),
        );
        Self {
            config,
            navigator: FolderNavigator::new(),
            cache,
            decoder,
            text,
            viewport: Viewport::default(),
            session: None,
            player: None,
            shown_frame: Arc::new(AtomicUsize::new(0)),
        }
    }

    // ======================================================================
    // Accessors
    // ======================================================================

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub fn session(&self) -> Option<&EditSession> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut EditSession> {
        self.session.as_mut()
    }

    #[must_use]
    pub fn current_path(&self) -> Option<&Path> {
        self.navigator.current_path()
    }

    /// Current index and file count in the folder.
    #[must_use]
    pub fn position(&self) -> Option<(usize, usize)> {
        self.navigator.position()
    }

    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    #[must_use]
    pub fn has_pending_edits(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(EditSession::has_pending_edits)
    }

    /// Resizes the drawable area, kept across navigation.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        if let Some(session) = self.session.as_mut() {
            session.set_viewport(viewport);
        }
    }

    // ======================================================================
    // Navigation
    // ======================================================================

    /// Opens `path` and makes its folder the navigation list.
    ///
    /// # Errors
    ///
    /// Returns an error if the folder cannot be scanned or the image cannot
    /// be decoded.
    pub fn open(&mut self, path: &Path) -> Result<()> {
        self.navigator.open(path)?;
        self.load_current()
    }

    /// # Errors
    ///
    /// Returns an error if the next image cannot be decoded.
    pub fn next(&mut self) -> Result<bool> {
        self.navigate(FolderNavigator::next)
    }

    /// # Errors
    ///
    /// Returns an error if the previous image cannot be decoded.
    pub fn previous(&mut self) -> Result<bool> {
        self.navigate(FolderNavigator::previous)
    }

    /// # Errors
    ///
    /// Returns an error if the first image cannot be decoded.
    pub fn first(&mut self) -> Result<bool> {
        self.navigate(FolderNavigator::first)
    }

    /// # Errors
    ///
    /// Returns an error if the last image cannot be decoded.
    pub fn last(&mut self) -> Result<bool> {
        self.navigate(FolderNavigator::last)
    }

    fn navigate(&mut self, step: impl FnOnce(&mut FolderNavigator) -> bool) -> Result<bool> {
        if !step(&mut self.navigator) {
            return Ok(false);
        }
        if self.has_pending_edits() {
            log::debug!("Discarding pending edits on navigation");
        }
        self.load_current()?;
        Ok(true)
    }

    /// Deletes the current file permanently and shows the one that took its
    /// place. Returns the deleted path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be removed or the replacement
    /// cannot be decoded.
    pub fn delete_current(&mut self) -> Result<Option<PathBuf>> {
        let Some(path) = self.navigator.current_path().map(Path::to_path_buf) else {
            return Ok(None);
        };
        fs::remove_file(&path).inspect_err(|err| {
            log::warn!("Failed to delete {}: {err}", path.display());
        })?;
        log::info!("Deleted {}", path.display());
        self.cache.remove(&path);
        self.navigator.remove_current();
        self.load_current()?;
        Ok(Some(path))
    }

    fn load_current(&mut self) -> Result<()> {
        let Some(path) = self.navigator.current_path().map(Path::to_path_buf) else {
            self.session = None;
            self.player = None;
            return Ok(());
        };
        let image = self.load(&path)?;
        self.install(image);
        self.cache
            .prefetch(&self.navigator.adjacent_paths(self.config.cache.prefetch_adjacent));
        Ok(())
    }

    fn load(&self, path: &Path) -> Result<ImageHandle> {
        if let Some(image) = self.cache.get(path) {
            return Ok(image);
        }
        let image = self.decoder.decode(path).inspect_err(|err| {
            log::warn!("Failed to load {}: {err}", path.display());
        })?;
        self.cache.insert(path.to_path_buf(), image.clone());
        Ok(image)
    }

    fn install(&mut self, image: ImageHandle) {
        self.shown_frame.store(0, Ordering::Release);
        self.player = FramePlayer::new(&image).map(|mut player| {
            let shown = Arc::clone(&self.shown_frame);
            player.on_frame(move |index| shown.store(index, Ordering::Release));
            player
        });
        let mut session = EditSession::with_renderer(image, &self.config, self.text.clone());
        session.set_viewport(self.viewport);
        self.session = Some(session);
    }

    // ======================================================================
    // Animation
    // ======================================================================

    /// Pauses or resumes the animation. Returns whether it is now paused,
    /// or `None` for a still image.
    pub fn toggle_animation_pause(&mut self) -> Option<bool> {
        let player = self.player.as_mut()?;
        player.toggle_pause();
        Some(player.is_paused())
    }

    /// Animation timer fired. Shows the next frame unless the animation is
    /// paused or frozen by a crop. Returns the delay until the next tick.
    pub fn tick_animation(&mut self) -> Option<Duration> {
        if !self.session.as_ref()?.is_animation_live() {
            return None;
        }
        let delay = self.player.as_mut()?.tick()?;
        self.show_published_frame();
        Some(delay)
    }

    /// Advances the animation by wall-clock time. Returns how many frames
    /// were skipped forward.
    pub fn advance_animation(&mut self, elapsed: Duration) -> usize {
        let live = self
            .session
            .as_ref()
            .is_some_and(EditSession::is_animation_live);
        let Some(player) = self.player.as_mut().filter(|_| live) else {
            return 0;
        };
        let advanced = player.advance(elapsed);
        if advanced > 0 {
            self.show_published_frame();
        }
        advanced
    }

    fn show_published_frame(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.set_frame(self.shown_frame.load(Ordering::Acquire));
        }
    }

    // ======================================================================
    // Saving
    // ======================================================================

    /// Overwrites the current file with every pending edit baked in.
    ///
    /// # Errors
    ///
    /// Returns an error if nothing is open, the extension is not writable or
    /// encoding fails. The original file is untouched on failure.
    pub fn save(&mut self) -> Result<PathBuf> {
        let path = self
            .navigator
            .current_path()
            .map(Path::to_path_buf)
            .ok_or_else(no_image)?;
        self.save_as(&path)?;
        Ok(path)
    }

    /// Writes the composited image to `path` and reopens it as the new base
    /// image with an empty history.
    ///
    /// # Errors
    ///
    /// Returns an error if nothing is open, the extension is not writable or
    /// encoding fails.
    pub fn save_as(&mut self, path: &Path) -> Result<()> {
        let format = SaveFormat::from_path(path)?;
        let session = self.session.as_ref().ok_or_else(no_image)?;
        let image = session
            .export_composite(ExportTarget::File(format), None)?
            .into_image()?;
        save::save_image(&image, path, self.config.export.jpeg_quality).inspect_err(|err| {
            log::warn!("Failed to save {}: {err}", path.display());
        })?;
        self.cache.remove(path);
        self.open(path)
    }

    /// Writes a copy next to the current file with crop and overlays baked
    /// in but not the rotation, which stays pending. Returns the copy's path.
    ///
    /// # Errors
    ///
    /// Returns an error if nothing is open, the extension is not writable or
    /// encoding fails.
    pub fn save_as_copy(&mut self) -> Result<PathBuf> {
        let current = self
            .navigator
            .current_path()
            .map(Path::to_path_buf)
            .ok_or_else(no_image)?;
        let format = SaveFormat::from_path(&current)?;
        let session = self.session.as_mut().ok_or_else(no_image)?;
        let target = save::edited_copy_path(&current, &self.config.export.edited_suffix);
        let image = session.export_unrotated(ExportTarget::File(format))?;
        save::save_image(&image, &target, self.config.export.jpeg_quality).inspect_err(
            |err| log::warn!("Failed to save copy {}: {err}", target.display()),
        )?;
        session.clear_baked_edits();
        self.navigator.refresh()?;
        Ok(target)
    }

    /// Composited image as clipboard bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if nothing is open or compositing fails.
    pub fn copy_to_clipboard(&self, format: ClipboardFormat) -> Result<Vec<u8>> {
        let session = self.session.as_ref().ok_or_else(no_image)?;
        let buffer = session.export_composite(ExportTarget::Clipboard(format), None)?;
        match format {
            ClipboardFormat::Dib => save::dib_from_bgra(buffer.width, buffer.height, &buffer.pixels),
            ClipboardFormat::Png => save::png_bytes(&buffer.into_image()?.to_rgba8()),
        }
    }
}

fn no_image() -> Error {
    std::io::Error::new(std::io::ErrorKind::NotFound, "no image is open").into()
}
