// src/infrastructure/path_watcher.rs
//
// Seam over the OS file-notification mechanism.
//
// The resolver never talks to `notify` directly; it goes through the
// `PathWatcher` trait so tests can count subscribe/unsubscribe calls
// without touching the real filesystem.

use std::path::{Path, PathBuf};

use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};

use crate::error::AppResult;

/// Dynamic add/remove of watched paths.
#[cfg_attr(test, mockall::automock)]
pub trait PathWatcher: Send {
    fn watch(&mut self, path: &Path) -> AppResult<()>;
    fn unwatch(&mut self, path: &Path) -> AppResult<()>;
}

/// Production watcher backed by `notify`'s recommended platform watcher.
/// Every changed path reported by the OS is forwarded to `on_change`;
/// classification happens downstream.
pub struct NotifyPathWatcher {
    inner: RecommendedWatcher,
}

impl NotifyPathWatcher {
    pub fn new<F>(on_change: F) -> AppResult<Self>
    where
        F: Fn(PathBuf) + Send + 'static,
    {
        let inner = notify::recommended_watcher(move |result: Result<Event, notify::Error>| {
            match result {
                Ok(event) => {
                    for path in event.paths {
                        on_change(path);
                    }
                }
                Err(e) => log::warn!("[WATCH] Notification backend error: {}", e),
            }
        })?;

        Ok(Self { inner })
    }
}

impl PathWatcher for NotifyPathWatcher {
    fn watch(&mut self, path: &Path) -> AppResult<()> {
        self.inner.watch(path, RecursiveMode::NonRecursive)?;
        Ok(())
    }

    fn unwatch(&mut self, path: &Path) -> AppResult<()> {
        self.inner.unwatch(path)?;
        Ok(())
    }
}
