// src/infrastructure/mod.rs
//
// Infrastructure Layer
//
// Contains implementation details that support the domain
// but are not part of the domain itself.
//
// RULES:
// - Infrastructure serves the domain
// - Infrastructure never dictates domain behavior
// - Infrastructure is replaceable

pub mod marker_watcher;
pub mod path_watcher;

pub use marker_watcher::MarkerFileWatcher;
pub use path_watcher::{NotifyPathWatcher, PathWatcher};

#[cfg(test)]
pub use path_watcher::MockPathWatcher;
