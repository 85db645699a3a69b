// src/infrastructure/marker_watcher.rs
//
// Marker file watcher - directory + file subscription lifecycle.
//
// CRITICAL RULES:
// - The directory is watched unconditionally from start()
// - The marker file is watched if and only if it existed at last observation
// - Subscribe / unsubscribe are idempotent (never a duplicate subscription)
// - Every failure here is soft: the watcher degrades to "no live updates"
//   instead of failing the resolver

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::VoicemailConfig;
use crate::events::ResolverEventKind;
use crate::infrastructure::path_watcher::PathWatcher;

pub struct MarkerFileWatcher {
    marker_dir: PathBuf,
    marker_file: PathBuf,
    watcher: Box<dyn PathWatcher>,
    directory_watched: bool,
    file_watched: bool,
}

impl MarkerFileWatcher {
    pub fn new(config: &VoicemailConfig, watcher: Box<dyn PathWatcher>) -> Self {
        Self {
            marker_dir: config.marker_dir(),
            marker_file: config.marker_file_path(),
            watcher,
            directory_watched: false,
            file_watched: false,
        }
    }

    /// Establish the directory watch, creating the directory if absent, and
    /// the marker-file watch when the file already exists. Idempotent.
    pub fn start(&mut self) {
        if self.directory_watched {
            return;
        }

        if !self.marker_dir.exists() {
            if let Err(e) = fs::create_dir_all(&self.marker_dir) {
                log::warn!(
                    "[WATCH] Creation of {} failed: {}",
                    self.marker_dir.display(),
                    e
                );
            }
        }

        match self.watcher.watch(&self.marker_dir) {
            Ok(()) => {
                self.directory_watched = true;
                log::debug!("[WATCH] Watching directory {}", self.marker_dir.display());
            }
            Err(e) => {
                // Degraded mode: queries still run at initialization and on
                // explicit refresh, there are just no live updates.
                log::warn!(
                    "[WATCH] Could not watch {}: {}",
                    self.marker_dir.display(),
                    e
                );
            }
        }

        if self.marker_file_exists() {
            log::debug!(
                "[WATCH] Marker file {} exists, start monitoring it",
                self.marker_file.display()
            );
            self.watch_marker_file();
        }
    }

    /// Release both subscriptions. Idempotent.
    pub fn stop(&mut self) {
        self.unwatch_marker_file();
        if self.directory_watched {
            if let Err(e) = self.watcher.unwatch(&self.marker_dir) {
                log::debug!(
                    "[WATCH] Unwatch of {} failed: {}",
                    self.marker_dir.display(),
                    e
                );
            }
            self.directory_watched = false;
        }
    }

    /// Add the marker-file subscription. No-op when already subscribed.
    pub fn watch_marker_file(&mut self) {
        if self.file_watched {
            return;
        }
        match self.watcher.watch(&self.marker_file) {
            Ok(()) => self.file_watched = true,
            Err(e) => log::warn!(
                "[WATCH] Could not watch {}: {}",
                self.marker_file.display(),
                e
            ),
        }
    }

    /// Drop the marker-file subscription. No-op when not subscribed.
    pub fn unwatch_marker_file(&mut self) {
        if !self.file_watched {
            return;
        }
        // The file is usually already gone at this point; a failed unwatch
        // still clears the local flag so a later existence transition
        // re-subscribes cleanly.
        if let Err(e) = self.watcher.unwatch(&self.marker_file) {
            log::debug!(
                "[WATCH] Unwatch of {} failed: {}",
                self.marker_file.display(),
                e
            );
        }
        self.file_watched = false;
    }

    pub fn marker_file_watched(&self) -> bool {
        self.file_watched
    }

    pub fn marker_file_exists(&self) -> bool {
        self.marker_file.exists()
    }

    /// Map a changed path reported by the OS to a resolver event. Changes to
    /// unrelated paths produce nothing.
    pub fn classify_change(
        marker_dir: &Path,
        marker_file: &Path,
        changed: &Path,
    ) -> Option<ResolverEventKind> {
        if changed == marker_file {
            Some(ResolverEventKind::MarkerFileChanged {
                path: changed.to_path_buf(),
            })
        } else if changed == marker_dir || changed.parent() == Some(marker_dir) {
            Some(ResolverEventKind::DirectoryChanged {
                path: changed.to_path_buf(),
            })
        } else {
            None
        }
    }
}

impl std::fmt::Debug for MarkerFileWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarkerFileWatcher")
            .field("marker_dir", &self.marker_dir)
            .field("marker_file", &self.marker_file)
            .field("directory_watched", &self.directory_watched)
            .field("file_watched", &self.file_watched)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::infrastructure::path_watcher::MockPathWatcher;

    fn test_config(root: &Path) -> VoicemailConfig {
        VoicemailConfig {
            marker_root: root.to_path_buf(),
            marker_dir_name: "contacts".to_string(),
            marker_file_name: "vmid".to_string(),
            identity_marker: "test-guid".to_string(),
        }
    }

    #[test]
    fn test_start_creates_directory_and_watches_it_once() {
        let tmp = tempfile::tempdir().unwrap();
        let config = test_config(tmp.path());
        let dir = config.marker_dir();

        let mut mock = MockPathWatcher::new();
        let expected_dir = dir.clone();
        mock.expect_watch()
            .withf(move |p| p == expected_dir)
            .times(1)
            .returning(|_| Ok(()));

        let mut watcher = MarkerFileWatcher::new(&config, Box::new(mock));
        watcher.start();
        // Second start() must not subscribe again.
        watcher.start();

        assert!(dir.is_dir());
        assert!(!watcher.marker_file_watched());
    }

    #[test]
    fn test_start_watches_existing_marker_file() {
        let tmp = tempfile::tempdir().unwrap();
        let config = test_config(tmp.path());
        std::fs::create_dir_all(config.marker_dir()).unwrap();
        std::fs::write(config.marker_file_path(), "vm").unwrap();

        let mut mock = MockPathWatcher::new();
        let expected_dir = config.marker_dir();
        mock.expect_watch()
            .withf(move |p| p == expected_dir)
            .times(1)
            .returning(|_| Ok(()));
        let expected_file = config.marker_file_path();
        mock.expect_watch()
            .withf(move |p| p == expected_file)
            .times(1)
            .returning(|_| Ok(()));

        let mut watcher = MarkerFileWatcher::new(&config, Box::new(mock));
        watcher.start();

        assert!(watcher.marker_file_watched());
    }

    #[test]
    fn test_file_subscription_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let config = test_config(tmp.path());

        let mut mock = MockPathWatcher::new();
        let expected_file = config.marker_file_path();
        mock.expect_watch()
            .withf(move |p| p == expected_file)
            .times(1)
            .returning(|_| Ok(()));
        let expected_file = config.marker_file_path();
        mock.expect_unwatch()
            .withf(move |p| p == expected_file)
            .times(1)
            .returning(|_| Ok(()));

        let mut watcher = MarkerFileWatcher::new(&config, Box::new(mock));
        watcher.watch_marker_file();
        watcher.watch_marker_file();
        assert!(watcher.marker_file_watched());

        watcher.unwatch_marker_file();
        watcher.unwatch_marker_file();
        assert!(!watcher.marker_file_watched());
    }

    #[test]
    fn test_watch_failure_degrades_instead_of_panicking() {
        let tmp = tempfile::tempdir().unwrap();
        let config = test_config(tmp.path());

        let mut mock = MockPathWatcher::new();
        mock.expect_watch()
            .returning(|_| Err(AppError::Other("backend unavailable".to_string())));

        let mut watcher = MarkerFileWatcher::new(&config, Box::new(mock));
        watcher.start();
        watcher.watch_marker_file();

        assert!(!watcher.marker_file_watched());
    }

    #[test]
    fn test_classify_change() {
        let dir = PathBuf::from("/dev/shm/contacts");
        let file = PathBuf::from("/dev/shm/contacts/vmid");

        assert!(matches!(
            MarkerFileWatcher::classify_change(&dir, &file, &file),
            Some(ResolverEventKind::MarkerFileChanged { .. })
        ));
        assert!(matches!(
            MarkerFileWatcher::classify_change(&dir, &file, &dir),
            Some(ResolverEventKind::DirectoryChanged { .. })
        ));
        assert!(matches!(
            MarkerFileWatcher::classify_change(
                &dir,
                &file,
                &PathBuf::from("/dev/shm/contacts/other")
            ),
            Some(ResolverEventKind::DirectoryChanged { .. })
        ));
        assert_eq!(
            MarkerFileWatcher::classify_change(&dir, &file, &PathBuf::from("/etc/hosts"))
                .map(|_| ()),
            None
        );
    }
}
