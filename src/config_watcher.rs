//! Preferences file watching
//!
//! Uses the `notify` crate with debouncing to detect edits to the config
//! file. The runtime polls [`ConfigWatcher::poll_changed`] from its event
//! loop and reloads preferences when it returns true.

use notify_debouncer_mini::{new_debouncer, DebouncedEventKind, Debouncer};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::time::Duration;

/// Debounced watcher for a single config file
pub struct ConfigWatcher {
    _debouncer: Debouncer<notify::RecommendedWatcher>,
    rx: Receiver<Result<Vec<notify_debouncer_mini::DebouncedEvent>, notify::Error>>,
    path: PathBuf,
}

impl ConfigWatcher {
    /// Watch `path` for changes
    ///
    /// The parent directory is watched (editors often replace the file
    /// instead of writing in place), with a 500ms debounce.
    pub fn new(path: PathBuf) -> Result<Self, notify::Error> {
        let (tx, rx) = mpsc::channel();
        let mut debouncer = new_debouncer(Duration::from_millis(500), tx)?;

        let dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        debouncer
            .watcher()
            .watch(&dir, notify::RecursiveMode::NonRecursive)?;

        tracing::info!("Watching config file: {}", path.display());

        Ok(Self {
            _debouncer: debouncer,
            rx,
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Drain pending events; true if the config file itself changed
    pub fn poll_changed(&self) -> bool {
        let mut changed = false;

        while let Ok(result) = self.rx.try_recv() {
            match result {
                Ok(events) => {
                    for event in events {
                        if matches!(event.kind, DebouncedEventKind::AnyContinuous) {
                            continue;
                        }
                        if self.is_config_path(&event.path) {
                            changed = true;
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!("Config watcher error: {:?}", e);
                }
            }
        }

        if changed {
            tracing::debug!("Config file changed: {}", self.path.display());
        }
        changed
    }

    fn is_config_path(&self, path: &Path) -> bool {
        path == self.path || path.file_name() == self.path.file_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_ignores_sibling_files() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("config.yaml");
        let Ok(watcher) = ConfigWatcher::new(path.clone()) else {
            return; // Skip if the platform watcher is unavailable
        };

        assert!(watcher.is_config_path(&path));
        assert!(!watcher.is_config_path(&dir.path().join("other.yaml")));
    }
}
