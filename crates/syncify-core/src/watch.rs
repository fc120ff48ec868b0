//! Watching the editor configuration for changes
//!
//! Watching is an upstream trigger: a [`Watcher`] notices edits, the
//! [`UploadScheduler`] debounces them into a single pending upload, and every
//! transaction suspends the watcher with a [`WatchGuard`] so its own writes
//! are not picked up as edits.

use std::sync::Mutex;
use std::sync::mpsc::{self, Receiver};
use std::time::{Duration, Instant};

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher as _};
use syncify_fs::{IgnoreSet, NormalizedPath};

use crate::{Error, Result};

/// Something that notices configuration edits.
pub trait Watcher: Send + Sync {
    fn start(&self) -> Result<()>;

    fn stop(&self);

    fn is_running(&self) -> bool;
}

/// Watcher for runs that do not watch.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullWatcher;

impl Watcher for NullWatcher {
    fn start(&self) -> Result<()> {
        Ok(())
    }

    fn stop(&self) {}

    fn is_running(&self) -> bool {
        false
    }
}

/// Stops a watcher for as long as it lives.
///
/// On drop the watcher is restarted if `restart` was set, whether the
/// transaction succeeded, failed or panicked.
pub struct WatchGuard<'a> {
    watcher: &'a dyn Watcher,
    restart: bool,
}

impl<'a> WatchGuard<'a> {
    pub fn suspend(watcher: &'a dyn Watcher, restart: bool) -> Self {
        watcher.stop();
        Self { watcher, restart }
    }
}

impl Drop for WatchGuard<'_> {
    fn drop(&mut self) {
        if !self.restart {
            return;
        }
        if let Err(e) = self.watcher.start() {
            tracing::error!(error = %e, "Failed to restart watcher");
        }
    }
}

/// Debounces change notifications into at most one pending upload.
#[derive(Debug)]
pub struct UploadScheduler {
    delay: Duration,
    due: Mutex<Option<Instant>>,
}

impl UploadScheduler {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            due: Mutex::new(None),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedule an upload `delay` after `now`. A request made while one is
    /// already pending is suppressed and returns `false`.
    pub fn request(&self, now: Instant) -> bool {
        let mut due = self.due.lock().unwrap_or_else(|e| e.into_inner());
        if due.is_some() {
            tracing::debug!("Upload already pending, change ignored");
            return false;
        }
        *due = Some(now + self.delay);
        true
    }

    /// Drop the pending upload. Returns whether one was pending.
    pub fn cancel(&self) -> bool {
        let mut due = self.due.lock().unwrap_or_else(|e| e.into_inner());
        due.take().is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.due.lock().unwrap_or_else(|e| e.into_inner()).is_some()
    }

    /// Claim the pending upload if it is due at `now`. Once claimed it can
    /// no longer be cancelled.
    pub fn take_due(&self, now: Instant) -> bool {
        let mut due = self.due.lock().unwrap_or_else(|e| e.into_inner());
        match *due {
            Some(at) if at <= now => {
                *due = None;
                true
            }
            _ => false,
        }
    }
}

/// Live half of a running [`FsWatcher`].
struct Subscription {
    _watcher: RecommendedWatcher,
    events: Receiver<notify::Result<Event>>,
}

/// Watcher over filesystem notifications for the editor user directory.
///
/// Events below ignored paths and pure reads are dropped, so the
/// editor's own caches and history do not schedule uploads.
pub struct FsWatcher {
    root: NormalizedPath,
    ignore: IgnoreSet,
    subscription: Mutex<Option<Subscription>>,
}

impl FsWatcher {
    pub fn new(root: NormalizedPath, ignore: IgnoreSet) -> Self {
        Self {
            root,
            ignore,
            subscription: Mutex::new(None),
        }
    }

    fn is_relevant(&self, event: &Event) -> bool {
        if matches!(event.kind, EventKind::Access(_)) {
            return false;
        }
        let root = self.root.to_native();
        event.paths.iter().any(|path| {
            if !path.starts_with(&root) {
                return true;
            }
            let path = NormalizedPath::new(path);
            !self.ignore.is_ignored(&path, path.is_dir())
        })
    }

    /// Wait up to `timeout` for an edit, then drain whatever else queued up.
    /// Returns whether any relevant change arrived. While stopped this just
    /// waits out the timeout.
    pub fn changed(&self, timeout: Duration) -> bool {
        let subscription = self.subscription.lock().unwrap_or_else(|e| e.into_inner());
        let Some(subscription) = subscription.as_ref() else {
            std::thread::sleep(timeout);
            return false;
        };

        let mut changed = false;
        let mut next = subscription.events.recv_timeout(timeout).ok();
        while let Some(result) = next {
            match result {
                Ok(event) => changed |= self.is_relevant(&event),
                Err(e) => tracing::warn!(error = %e, "Watch error"),
            }
            next = subscription.events.try_recv().ok();
        }
        changed
    }
}

impl Watcher for FsWatcher {
    fn start(&self) -> Result<()> {
        let mut subscription = self.subscription.lock().unwrap_or_else(|e| e.into_inner());
        if subscription.is_some() {
            return Ok(());
        }

        let (sender, events) = mpsc::channel::<notify::Result<Event>>();
        let mut watcher = notify::recommended_watcher(move |event| {
            let _ = sender.send(event);
        })
        .map_err(|e| Error::Watch {
            path: self.root.to_native(),
            message: e.to_string(),
        })?;
        watcher
            .watch(&self.root.to_native(), RecursiveMode::Recursive)
            .map_err(|e| Error::Watch {
                path: self.root.to_native(),
                message: e.to_string(),
            })?;

        *subscription = Some(Subscription {
            _watcher: watcher,
            events,
        });
        tracing::debug!(root = %self.root, "Watcher started");
        Ok(())
    }

    fn stop(&self) {
        let mut subscription = self.subscription.lock().unwrap_or_else(|e| e.into_inner());
        if subscription.take().is_some() {
            tracing::debug!(root = %self.root, "Watcher stopped");
        }
    }

    fn is_running(&self) -> bool {
        self.subscription
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }
}
