// SPDX-License-Identifier: MPL-2.0
//! Decoded image cache with background prefetching.
//!
//! # Design
//!
//! - **LRU eviction**: least recently used images are evicted first
//! - **Count-bounded**: at most `capacity` images are kept
//! - **Path-keyed**: images indexed by their file path
//! - **One worker thread**: prefetch requests are queued and decoded in order;
//!   the queue and the cache share one mutex and a condition variable wakes
//!   the worker
//!
//! Lookups never wait for the worker to finish a decode. A path already cached,
//! queued or being decoded is not queued again. Shutdown clears the queue,
//! wakes the worker and joins it; an in-flight decode is allowed to finish.
//!
//! # Usage
//!
//! ```ignore
//! let cache = ImageCache::new(10, Arc::new(ImageDecoder));
//!
//! if let Some(image) = cache.get(&path) {
//!     // Use cached image
//! }
//!
//! // Decode neighbours in the background
//! cache.prefetch(&navigator.adjacent_paths(3));
//! ```

use super::{Decoder, ImageHandle};
use lru::LruCache;
use std::collections::VecDeque;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;

/// Statistics about cache performance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of lookups that found an image.
    pub hits: u64,

    /// Number of lookups that found nothing.
    pub misses: u64,

    /// Number of images inserted (directly or by the prefetch worker).
    pub insertions: u64,

    /// Number of images evicted to respect the capacity.
    pub evictions: u64,

    /// Number of prefetch decodes that failed.
    pub failed_prefetches: u64,

    /// Number of prefetch results dropped because the path was replaced or
    /// removed while decoding.
    pub stale_prefetches: u64,
}

impl CacheStats {
    /// Returns the cache hit rate as a percentage (0.0 - 100.0).
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

struct CacheState {
    entries: LruCache<PathBuf, ImageHandle>,
    queue: VecDeque<PathBuf>,
    /// Path the worker is decoding right now.
    in_flight: Option<PathBuf>,
    stats: CacheStats,
}

impl CacheState {
    fn insert(&mut self, path: PathBuf, image: ImageHandle) {
        if let Some((evicted, _)) = self.entries.push(path.clone(), image) {
            if evicted != path {
                log::debug!("Evicted {} from image cache", evicted.display());
                self.stats.evictions += 1;
            }
        }
        self.stats.insertions += 1;
    }

    /// Makes a decode already running for `path` stale, so its result is dropped.
    fn forget_in_flight(&mut self, path: &Path) {
        if self.in_flight.as_deref() == Some(path) {
            self.in_flight = None;
        }
    }

    fn is_known(&self, path: &Path) -> bool {
        self.entries.contains(path)
            || self.in_flight.as_deref() == Some(path)
            || self.queue.iter().any(|queued| queued == path)
    }
}

struct Shared {
    state: Mutex<CacheState>,
    wake: Condvar,
    running: AtomicBool,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// LRU cache of decoded images plus a prefetch worker.
pub struct ImageCache {
    shared: Arc<Shared>,
    worker: Option<JoinHandle<()>>,
    capacity: usize,
}

impl ImageCache {
    /// Creates the cache and starts its worker thread.
    ///
    /// A zero capacity is raised to one. If the worker cannot be spawned the
    /// cache still works but prefetch requests are ignored.
    #[must_use]
    pub fn new(capacity: usize, decoder: Arc<dyn Decoder>) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        let shared = Arc::new(Shared {
            state: Mutex::new(CacheState {
                entries: LruCache::new(capacity),
                queue: VecDeque::new(),
                in_flight: None,
                stats: CacheStats::default(),
            }),
            wake: Condvar::new(),
            running: AtomicBool::new(true),
        });

        let worker_shared = Arc::clone(&shared);
        let worker = std::thread::Builder::new()
            .name("image-prefetch".into())
            .spawn(move || run_worker(&worker_shared, decoder.as_ref()));
        let worker = match worker {
            Ok(handle) => Some(handle),
            Err(err) => {
                log::error!("Failed to start prefetch worker: {err}");
                shared.running.store(false, Ordering::Release);
                None
            }
        };

        Self {
            shared,
            worker,
            capacity: capacity.get(),
        }
    }

    /// Looks up a decoded image, marking it most recently used.
    pub fn get(&self, path: &Path) -> Option<ImageHandle> {
        let mut state = self.shared.lock();
        let found = state.entries.get(path).cloned();
        if found.is_some() {
            state.stats.hits += 1;
        } else {
            state.stats.misses += 1;
        }
        found
    }

    /// Stores an image decoded on the caller's thread.
    pub fn insert(&self, path: PathBuf, image: ImageHandle) {
        let mut state = self.shared.lock();
        state.queue.retain(|queued| *queued != path);
        state.forget_in_flight(&path);
        state.insert(path, image);
    }

    /// Queues paths for background decoding. Fire-and-forget.
    ///
    /// Paths that are cached, already queued or being decoded are skipped.
    pub fn prefetch(&self, paths: &[PathBuf]) {
        if !self.is_running() {
            return;
        }
        let mut state = self.shared.lock();
        let mut queued = 0;
        for path in paths {
            if !state.is_known(path) {
                state.queue.push_back(path.clone());
                queued += 1;
            }
        }
        drop(state);
        if queued > 0 {
            log::debug!("Queued {queued} image(s) for prefetch");
            self.shared.wake.notify_one();
        }
    }

    /// Checks if an image is cached without updating LRU order.
    #[must_use]
    pub fn contains(&self, path: &Path) -> bool {
        self.shared.lock().entries.contains(path)
    }

    /// Drops a cached image, e.g. after the file changed on disk.
    pub fn remove(&self, path: &Path) {
        let mut state = self.shared.lock();
        state.entries.pop(path);
        state.queue.retain(|queued| queued != path);
        state.forget_in_flight(path);
    }

    /// Clears all cached images and pending requests.
    pub fn clear(&self) {
        let mut state = self.shared.lock();
        state.entries.clear();
        state.queue.clear();
        state.in_flight = None;
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.shared.lock().entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shared.lock().entries.is_empty()
    }

    /// Number of queued prefetch requests (excluding an in-flight decode).
    #[must_use]
    pub fn pending(&self) -> usize {
        self.shared.lock().queue.len()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.shared.lock().stats
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::Acquire)
    }

    /// Stops the worker and waits for it to exit. Idempotent.
    pub fn shutdown(&mut self) {
        self.shared.running.store(false, Ordering::Release);
        self.shared.lock().queue.clear();
        self.shared.wake.notify_all();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::error!("Prefetch worker panicked");
            } else {
                log::debug!("Prefetch worker stopped");
            }
        }
    }
}

impl Drop for ImageCache {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for ImageCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.shared.lock();
        f.debug_struct("ImageCache")
            .field("capacity", &self.capacity)
            .field("image_count", &state.entries.len())
            .field("pending", &state.queue.len())
            .field("running", &self.shared.running.load(Ordering::Acquire))
            .field("stats", &state.stats)
            .finish()
    }
}

fn run_worker(shared: &Shared, decoder: &dyn Decoder) {
    log::debug!("Prefetch worker started");
    while let Some(path) = next_request(shared) {
        let result = decoder.decode(&path);

        let mut state = shared.lock();
        // Cleared by `insert`, `remove` or `clear` while decoding: the result is stale
        let current = state.in_flight.take().as_deref() == Some(path.as_path());
        match result {
            Ok(image) => {
                if current && shared.running.load(Ordering::Acquire) {
                    state.insert(path, image);
                } else if !current {
                    state.stats.stale_prefetches += 1;
                    log::debug!("Dropped stale prefetch of {}", path.display());
                }
            }
            Err(err) => {
                state.stats.failed_prefetches += 1;
                log::warn!("Prefetch of {} failed: {err}", path.display());
            }
        }
    }
}

/// Blocks until a request is available. `None` once shutdown was requested.
fn next_request(shared: &Shared) -> Option<PathBuf> {
    let mut state = shared.lock();
    loop {
        if !shared.running.load(Ordering::Acquire) {
            return None;
        }
        if let Some(path) = state.queue.pop_front() {
            if state.entries.contains(&path) {
                continue;
            }
            state.in_flight = Some(path.clone());
            return Some(path);
        }
        state = shared
            .wake
            .wait(state)
            .unwrap_or_else(PoisonError::into_inner);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, Result};
    use crate::test_utils::solid_image;
    use std::sync::atomic::AtomicUsize;
    use std::time::{Duration, Instant};

    /// Decoder producing a 2x2 image, failing for paths containing "broken".
    #[derive(Default)]
    struct FakeDecoder {
        calls: AtomicUsize,
        gate: Mutex<bool>,
        opened: Condvar,
    }

    impl FakeDecoder {
        fn gated() -> Self {
            Self {
                gate: Mutex::new(false),
                ..Self::default()
            }
        }

        fn open_gate(&self) {
            *self.gate.lock().expect("gate lock") = true;
            self.opened.notify_all();
        }
    }

    impl Decoder for FakeDecoder {
        fn decode(&self, path: &Path) -> Result<ImageHandle> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut open = self.gate.lock().expect("gate lock");
            while !*open {
                open = self.opened.wait(open).expect("gate wait");
            }
            if path.to_string_lossy().contains("broken") {
                return Err(Error::Decode("broken".into()));
            }
            Ok(ImageHandle::new(solid_image(2, 2, [1, 2, 3, 255])))
        }
    }

    fn open_decoder() -> Arc<FakeDecoder> {
        let decoder = FakeDecoder::gated();
        decoder.open_gate();
        Arc::new(decoder)
    }

    fn wait_until(condition: impl Fn() -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if condition() {
                return true;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        false
    }

    fn image() -> ImageHandle {
        ImageHandle::new(solid_image(4, 4, [0, 0, 0, 255]))
    }

    #[test]
    fn insert_and_get_tracks_hits_and_misses() {
        let cache = ImageCache::new(10, open_decoder());
        let path = PathBuf::from("/test/image.jpg");
        cache.insert(path.clone(), image());

        assert!(cache.get(&path).is_some());
        assert!(cache.get(Path::new("/nonexistent")).is_none());

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert!((stats.hit_rate() - 50.0).abs() < 0.01);
    }

    #[test]
    fn least_recently_used_image_is_evicted() {
        let cache = ImageCache::new(2, open_decoder());
        let a = PathBuf::from("/a.png");
        let b = PathBuf::from("/b.png");
        let c = PathBuf::from("/c.png");
        cache.insert(a.clone(), image());
        cache.insert(b.clone(), image());
        let _ = cache.get(&a);
        cache.insert(c.clone(), image());

        assert_eq!(cache.len(), 2);
        assert!(cache.contains(&a));
        assert!(!cache.contains(&b));
        assert!(cache.contains(&c));
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn reinserting_same_path_is_not_an_eviction() {
        let cache = ImageCache::new(2, open_decoder());
        let a = PathBuf::from("/a.png");
        cache.insert(a.clone(), image());
        cache.insert(a, image());
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.stats().evictions, 0);
    }

    #[test]
    fn prefetch_decodes_in_background() {
        let decoder = open_decoder();
        let cache = ImageCache::new(10, decoder.clone());
        let paths = vec![PathBuf::from("/n1.png"), PathBuf::from("/n2.png")];

        cache.prefetch(&paths);

        assert!(wait_until(|| cache.len() == 2));
        assert_eq!(decoder.calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.stats().insertions, 2);
    }

    #[test]
    fn duplicate_prefetch_requests_are_suppressed() {
        let decoder = Arc::new(FakeDecoder::gated());
        let cache = ImageCache::new(10, decoder.clone());
        let first = PathBuf::from("/first.png");
        let second = PathBuf::from("/second.png");

        cache.prefetch(&[first.clone()]);
        assert!(wait_until(|| decoder.calls.load(Ordering::SeqCst) == 1));

        // `first` is in flight, `second` gets queued once.
        cache.prefetch(&[first.clone(), second.clone(), second.clone()]);
        cache.prefetch(&[second.clone()]);
        assert_eq!(cache.pending(), 1);

        decoder.open_gate();
        assert!(wait_until(|| cache.len() == 2));
        assert_eq!(decoder.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn cached_paths_are_not_prefetched() {
        let decoder = open_decoder();
        let cache = ImageCache::new(10, decoder.clone());
        let path = PathBuf::from("/cached.png");
        cache.insert(path.clone(), image());

        cache.prefetch(&[path]);
        assert_eq!(cache.pending(), 0);
        assert_eq!(decoder.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn failed_prefetch_is_counted_and_not_cached() {
        let cache = ImageCache::new(10, open_decoder());
        let path = PathBuf::from("/broken.png");
        cache.prefetch(&[path.clone()]);

        assert!(wait_until(|| cache.stats().failed_prefetches == 1));
        assert!(!cache.contains(&path));
    }

    #[test]
    fn shutdown_joins_worker_and_ignores_later_requests() {
        let decoder = open_decoder();
        let mut cache = ImageCache::new(10, decoder.clone());
        cache.shutdown();
        assert!(!cache.is_running());

        cache.prefetch(&[PathBuf::from("/late.png")]);
        assert_eq!(cache.pending(), 0);
        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(decoder.calls.load(Ordering::SeqCst), 0);

        // Second call is a no-op.
        cache.shutdown();
    }

    #[test]
    fn shutdown_lets_in_flight_decode_finish() {
        let decoder = Arc::new(FakeDecoder::gated());
        let mut cache = ImageCache::new(10, decoder.clone());
        cache.prefetch(&[PathBuf::from("/slow.png"), PathBuf::from("/queued.png")]);
        assert!(wait_until(|| decoder.calls.load(Ordering::SeqCst) == 1));

        let opener = {
            let decoder = decoder.clone();
            std::thread::spawn(move || {
                std::thread::sleep(Duration::from_millis(20));
                decoder.open_gate();
            })
        };
        cache.shutdown();
        opener.join().expect("opener thread");

        assert_eq!(decoder.calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.pending(), 0);
    }

    #[test]
    fn decode_in_flight_does_not_overwrite_fresh_insert() {
        let decoder = Arc::new(FakeDecoder::gated());
        let cache = ImageCache::new(10, decoder.clone());
        let path = PathBuf::from("/saved.png");

        cache.prefetch(&[path.clone()]);
        assert!(wait_until(|| decoder.calls.load(Ordering::SeqCst) == 1));

        // The file was rewritten while the old version was being decoded
        cache.remove(&path);
        cache.insert(path.clone(), ImageHandle::new(solid_image(9, 9, [0, 0, 0, 255])));
        decoder.open_gate();

        assert!(wait_until(|| cache.stats().stale_prefetches == 1));
        let cached = cache.get(&path).expect("fresh image stays cached");
        assert_eq!(cached.dimensions(), (9, 9));
        assert_eq!(cache.stats().insertions, 1);
    }

    #[test]
    fn decode_in_flight_after_remove_is_dropped() {
        let decoder = Arc::new(FakeDecoder::gated());
        let cache = ImageCache::new(10, decoder.clone());
        let path = PathBuf::from("/deleted.png");

        cache.prefetch(&[path.clone()]);
        assert!(wait_until(|| decoder.calls.load(Ordering::SeqCst) == 1));
        cache.remove(&path);
        decoder.open_gate();

        assert!(wait_until(|| cache.stats().stale_prefetches == 1));
        assert!(!cache.contains(&path));
    }

    #[test]
    fn clear_drops_images_and_queue() {
        let decoder = Arc::new(FakeDecoder::gated());
        let cache = ImageCache::new(10, decoder.clone());
        cache.insert(PathBuf::from("/x.png"), image());
        cache.prefetch(&[PathBuf::from("/y.png"), PathBuf::from("/z.png")]);

        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.pending(), 0);
        decoder.open_gate();
    }
}
