// SPDX-License-Identifier: MPL-2.0
//! Frame stepping for animated images.
//!
//! The player does not own a timer. The platform layer schedules one using the
//! delay returned by [`FramePlayer::tick`] and calls `tick` again when it fires.
//! Whoever needs to react to a new frame registers a callback on the player
//! instead of being looked up through global state.

use super::ImageHandle;
use std::fmt;
use std::time::Duration;

/// Invoked with the new frame index each time the frame changes.
pub type FrameCallback = Box<dyn FnMut(usize) + Send>;

pub struct FramePlayer {
    delays: Vec<Duration>,
    current: usize,
    paused: bool,
    /// Time accumulated towards the current frame's delay.
    elapsed: Duration,
    on_frame: Option<FrameCallback>,
}

impl FramePlayer {
    /// Player for an animated image; `None` for still images.
    #[must_use]
    pub fn new(image: &ImageHandle) -> Option<Self> {
        let frames = image.frames()?;
        Some(Self {
            delays: frames.iter().map(|frame| frame.delay).collect(),
            current: 0,
            paused: false,
            elapsed: Duration::ZERO,
            on_frame: None,
        })
    }

    /// Registers the frame-change callback, replacing any previous one.
    pub fn on_frame(&mut self, callback: impl FnMut(usize) + Send + 'static) {
        self.on_frame = Some(Box::new(callback));
    }

    #[must_use]
    pub fn current_frame(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.delays.len()
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    /// How long the current frame stays on screen.
    #[must_use]
    pub fn current_delay(&self) -> Duration {
        self.delays
            .get(self.current)
            .copied()
            .unwrap_or(Duration::ZERO)
    }

    /// Rewinds to the first frame without notifying.
    pub fn rewind(&mut self) {
        self.current = 0;
        self.elapsed = Duration::ZERO;
    }

    /// Timer fired: shows the next frame.
    ///
    /// Returns the delay until the following tick, or `None` while paused.
    pub fn tick(&mut self) -> Option<Duration> {
        if self.paused {
            return None;
        }
        self.step();
        Some(self.current_delay())
    }

    /// Advances by wall-clock time, possibly skipping several frames.
    ///
    /// Returns how many frames were advanced.
    pub fn advance(&mut self, elapsed: Duration) -> usize {
        if self.paused || self.delays.is_empty() {
            return 0;
        }
        self.elapsed += elapsed;
        let mut advanced = 0;
        loop {
            let delay = self.current_delay();
            if delay.is_zero() || self.elapsed < delay {
                break;
            }
            self.elapsed -= delay;
            self.step();
            advanced += 1;
        }
        advanced
    }

    fn step(&mut self) {
        if self.delays.is_empty() {
            return;
        }
        self.current = (self.current + 1) % self.delays.len();
        if let Some(callback) = self.on_frame.as_mut() {
            callback(self.current);
        }
    }
}

impl fmt::Debug for FramePlayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FramePlayer")
            .field("frame_count", &self.delays.len())
            .field("current", &self.current)
            .field("paused", &self.paused)
            .field("has_callback", &self.on_frame.is_some())
            .finish_non_exhaustive()
    }
}
