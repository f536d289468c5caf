//! Listing update detection
//!
//! File sources are polled for modification-time changes; a change is only
//! reported once the files have been quiet for the debounce period, so a
//! scraper rewriting several files produces a single event. Remote sources
//! get a refresh tick on a fixed period instead.

use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant, SystemTime};

use chrono::{DateTime, Local};

use crate::services::config::HomescoreConfig;
use crate::sources::ListingSource;
use crate::types::{HomescoreError, Result};

/// Longest uninterrupted sleep, bounds how long `stop` can take
const SLEEP_SLICE: Duration = Duration::from_millis(50);

/// Out-of-band signal that the listing collection should be reloaded
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateEvent {
    ListingsChanged {
        /// Files that changed; empty for a remote refresh tick
        changed: Vec<PathBuf>,
        at: DateTime<Local>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WatchOptions {
    pub interval: Duration,
    pub debounce: Duration,
    pub remote_refresh: Duration,
}

impl From<&HomescoreConfig> for WatchOptions {
    fn from(config: &HomescoreConfig) -> Self {
        Self {
            interval: config.watch_interval(),
            debounce: config.debounce(),
            remote_refresh: config.remote_refresh(),
        }
    }
}

/// Tracks modification times between polls and applies the debounce
#[derive(Debug, Default)]
pub struct ChangeTracker {
    seen: HashMap<PathBuf, Option<SystemTime>>,
    primed: bool,
    pending: BTreeSet<PathBuf>,
    last_change: Option<Instant>,
}

impl ChangeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one snapshot of `(path, mtime)` pairs taken at `now`. Returns the
    /// changed paths once no further change has been seen for `debounce`.
    ///
    /// The first snapshot only records the baseline.
    pub fn observe(
        &mut self,
        snapshot: Vec<(PathBuf, Option<SystemTime>)>,
        now: Instant,
        debounce: Duration,
    ) -> Option<Vec<PathBuf>> {
        let current: HashMap<PathBuf, Option<SystemTime>> = snapshot.into_iter().collect();

        if self.primed {
            let mut changed_now = false;
            for (path, mtime) in &current {
                if self.seen.get(path) != Some(mtime) {
                    self.pending.insert(path.clone());
                    changed_now = true;
                }
            }
            // Paths that disappeared since the last poll
            for path in self.seen.keys() {
                if !current.contains_key(path) {
                    self.pending.insert(path.clone());
                    changed_now = true;
                }
            }
            if changed_now {
                self.last_change = Some(now);
            }
        }
        self.seen = current;
        self.primed = true;

        let quiet = self
            .last_change
            .is_some_and(|last| now.saturating_duration_since(last) >= debounce);
        if quiet && !self.pending.is_empty() {
            self.last_change = None;
            return Some(std::mem::take(&mut self.pending).into_iter().collect());
        }
        None
    }
}

fn snapshot(paths: Vec<PathBuf>) -> Vec<(PathBuf, Option<SystemTime>)> {
    paths
        .into_iter()
        .map(|path| {
            let mtime = path.metadata().and_then(|m| m.modified()).ok();
            (path, mtime)
        })
        .collect()
}

/// Background watcher for one listing source
pub struct WatchService {
    source: Arc<dyn ListingSource>,
    options: WatchOptions,
}

impl WatchService {
    pub fn new(source: Arc<dyn ListingSource>, options: WatchOptions) -> Self {
        Self { source, options }
    }

    /// Start watching on a background thread. Events arrive on the returned
    /// receiver until the handle is stopped or dropped.
    pub fn spawn(self) -> Result<(WatchHandle, Receiver<UpdateEvent>)> {
        let (tx, rx) = mpsc::channel();
        let stop = Arc::new(AtomicBool::new(false));
        let thread_stop = Arc::clone(&stop);

        let thread = thread::Builder::new()
            .name("homescore-watch".into())
            .spawn(move || self.run(tx, &thread_stop))
            .map_err(|e| HomescoreError::Watch(format!("cannot start watcher: {}", e)))?;

        Ok((
            WatchHandle {
                stop,
                thread: Some(thread),
            },
            rx,
        ))
    }

    fn run(self, tx: Sender<UpdateEvent>, stop: &AtomicBool) {
        let remote = self.source.is_remote();
        tracing::info!(
            source = self.source.name(),
            remote,
            "watching for listing updates"
        );

        let mut tracker = ChangeTracker::new();
        let mut last_tick = Instant::now();

        while !stop.load(Ordering::Relaxed) {
            let event = if remote {
                if last_tick.elapsed() >= self.options.remote_refresh {
                    last_tick = Instant::now();
                    Some(Vec::new())
                } else {
                    None
                }
            } else {
                let paths = self.source.watch_paths();
                tracker.observe(snapshot(paths), Instant::now(), self.options.debounce)
            };

            if let Some(changed) = event {
                tracing::debug!(files = changed.len(), "listings changed");
                let event = UpdateEvent::ListingsChanged {
                    changed,
                    at: Local::now(),
                };
                if tx.send(event).is_err() {
                    // Receiver gone, nobody is listening
                    break;
                }
            }

            sleep_unless_stopped(self.options.interval, stop);
        }

        tracing::debug!("watcher stopped");
    }
}

fn sleep_unless_stopped(duration: Duration, stop: &AtomicBool) {
    let deadline = Instant::now() + duration;
    loop {
        let now = Instant::now();
        if now >= deadline || stop.load(Ordering::Relaxed) {
            return;
        }
        thread::sleep(SLEEP_SLICE.min(deadline - now));
    }
}

/// Stops the watcher thread when stopped or dropped
pub struct WatchHandle {
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl WatchHandle {
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for WatchHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::{FileSource, SourceLoad};
    use std::fs;
    use tempfile::TempDir;

    fn t(secs: u64) -> Option<SystemTime> {
        Some(SystemTime::UNIX_EPOCH + Duration::from_secs(secs))
    }

    fn p(name: &str) -> PathBuf {
        PathBuf::from(name)
    }

    // ========== ChangeTracker ==========

    #[test]
    fn test_first_snapshot_is_baseline() {
        let mut tracker = ChangeTracker::new();
        let start = Instant::now();
        assert_eq!(
            tracker.observe(vec![(p("a.json"), t(1))], start, Duration::ZERO),
            None
        );
        assert_eq!(
            tracker.observe(vec![(p("a.json"), t(1))], start, Duration::ZERO),
            None
        );
    }

    #[test]
    fn test_change_reported_without_debounce() {
        let mut tracker = ChangeTracker::new();
        let start = Instant::now();
        tracker.observe(vec![(p("a.json"), t(1))], start, Duration::ZERO);
        let changed = tracker.observe(vec![(p("a.json"), t(2))], start, Duration::ZERO);
        assert_eq!(changed, Some(vec![p("a.json")]));
        // reported once
        assert_eq!(
            tracker.observe(vec![(p("a.json"), t(2))], start, Duration::ZERO),
            None
        );
    }

    #[test]
    fn test_debounce_coalesces_changes() {
        let debounce = Duration::from_secs(1);
        let start = Instant::now();
        let mut tracker = ChangeTracker::new();
        tracker.observe(vec![(p("a.json"), t(1)), (p("b.json"), t(1))], start, debounce);

        let at = |ms: u64| start + Duration::from_millis(ms);
        assert_eq!(
            tracker.observe(vec![(p("a.json"), t(2)), (p("b.json"), t(1))], at(100), debounce),
            None
        );
        assert_eq!(
            tracker.observe(vec![(p("a.json"), t(2)), (p("b.json"), t(2))], at(600), debounce),
            None
        );
        // still within one second of the last change
        assert_eq!(
            tracker.observe(vec![(p("a.json"), t(2)), (p("b.json"), t(2))], at(1500), debounce),
            None
        );
        assert_eq!(
            tracker.observe(vec![(p("a.json"), t(2)), (p("b.json"), t(2))], at(1600), debounce),
            Some(vec![p("a.json"), p("b.json")])
        );
    }

    #[test]
    fn test_added_and_removed_files() {
        let mut tracker = ChangeTracker::new();
        let start = Instant::now();
        tracker.observe(vec![(p("a.json"), t(1))], start, Duration::ZERO);
        let changed = tracker.observe(vec![(p("b.json"), t(1))], start, Duration::ZERO);
        assert_eq!(changed, Some(vec![p("a.json"), p("b.json")]));
    }

    #[test]
    fn test_file_appearing_after_missing() {
        let mut tracker = ChangeTracker::new();
        let start = Instant::now();
        tracker.observe(vec![(p("a.json"), None)], start, Duration::ZERO);
        let changed = tracker.observe(vec![(p("a.json"), t(5))], start, Duration::ZERO);
        assert_eq!(changed, Some(vec![p("a.json")]));
    }

    // ========== WatchService ==========

    struct RemoteStub;

    impl ListingSource for RemoteStub {
        fn name(&self) -> &str {
            "stub"
        }

        fn fetch(&self) -> Result<SourceLoad> {
            Ok(SourceLoad::default())
        }

        fn watch_paths(&self) -> Vec<PathBuf> {
            Vec::new()
        }
    }

    #[test]
    fn test_remote_source_ticks() {
        let options = WatchOptions {
            interval: Duration::from_millis(10),
            debounce: Duration::ZERO,
            remote_refresh: Duration::from_millis(20),
        };
        let (handle, rx) = WatchService::new(Arc::new(RemoteStub), options)
            .spawn()
            .unwrap();
        let event = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(matches!(
            event,
            UpdateEvent::ListingsChanged { ref changed, .. } if changed.is_empty()
        ));
        handle.stop();
    }

    #[test]
    fn test_file_change_emits_event() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("listings.json");
        fs::write(&path, "[]").unwrap();

        let options = WatchOptions {
            interval: Duration::from_millis(20),
            debounce: Duration::ZERO,
            remote_refresh: Duration::from_secs(60),
        };
        let source = Arc::new(FileSource::new(path.clone()));
        let (handle, rx) = WatchService::new(source, options).spawn().unwrap();

        // let the watcher record its baseline, then move the mtime forward
        thread::sleep(Duration::from_millis(100));
        let file = fs::OpenOptions::new().write(true).open(&path).unwrap();
        file.set_modified(SystemTime::now() + Duration::from_secs(10))
            .unwrap();
        drop(file);

        let event = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        match event {
            UpdateEvent::ListingsChanged { changed, .. } => assert_eq!(changed, vec![path]),
        }
        drop(handle);
    }

    #[test]
    fn test_stop_ends_channel() {
        let options = WatchOptions {
            interval: Duration::from_millis(10),
            debounce: Duration::ZERO,
            remote_refresh: Duration::from_secs(60),
        };
        let (handle, rx) = WatchService::new(Arc::new(RemoteStub), options)
            .spawn()
            .unwrap();
        handle.stop();
        assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
    }
}
