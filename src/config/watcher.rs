//! Configuration file watcher for hot reload.
//!
//! # Design Decisions
//! - Watches the containing directory, not the file: editors and config
//!   management save by writing a temp file and renaming it over the original,
//!   which detaches a watch held on the old inode
//! - Events are matched on file name; the temp file and unrelated siblings are ignored
//! - A config that fails to load or validate is logged and dropped

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::time::Duration;
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use crate::config::loader::load_config;
use crate::config::schema::DashboardConfig;

/// A watcher that monitors the configuration file for changes.
pub struct ConfigWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<DashboardConfig>,
}

impl ConfigWatcher {
    /// Create a new ConfigWatcher.
    ///
    /// Returns the watcher and a receiver for configuration updates.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<DashboardConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (Self {
            path: path.to_path_buf(),
            update_tx,
        }, update_rx)
    }

    /// Directory to register with the OS watcher.
    fn watch_dir(&self) -> PathBuf {
        match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    /// Start watching. Dropping the returned watcher stops it.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let watch_dir = self.watch_dir();
        let file_name = self.path.file_name().map(OsString::from);
        let tx = self.update_tx;
        let path = self.path;

        let mut watcher = RecommendedWatcher::new(move |res: notify::Result<Event>| {
            match res {
                Ok(event) => {
                    if !(event.kind.is_modify() || event.kind.is_create()) {
                        return;
                    }
                    if !touches(&event, file_name.as_deref()) {
                        return;
                    }

                    tracing::info!(path = ?path, "Config file change detected, reloading");
                    match load_config(&path) {
                        Ok(new_config) => {
                            let _ = tx.send(new_config);
                        }
                        Err(e) => {
                            tracing::error!(error = %e, "Failed to reload config, keeping current configuration");
                        }
                    }
                }
                Err(e) => tracing::error!(error = ?e, "Watch error"),
            }
        }, Config::default().with_poll_interval(Duration::from_secs(2)))?;

        watcher.watch(&watch_dir, RecursiveMode::NonRecursive)?;

        tracing::info!(dir = ?watch_dir, "Config watcher started");
        Ok(watcher)
    }
}

fn touches(event: &Event, file_name: Option<&OsStr>) -> bool {
    match file_name {
        Some(name) => event.paths.iter().any(|p| p.file_name() == Some(name)),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tokio::time::timeout;

    /// Write to a sibling temp file and rename it over `path`.
    fn save_by_rename(path: &Path, content: &str) {
        let tmp = path.with_extension("toml.tmp");
        fs::write(&tmp, content).unwrap();
        fs::rename(&tmp, path).unwrap();
    }

    async fn next_title(rx: &mut mpsc::UnboundedReceiver<DashboardConfig>, want: &str) {
        let wait = async {
            while let Some(config) = rx.recv().await {
                if config.dashboard.title == want {
                    return;
                }
            }
            panic!("watcher channel closed");
        };
        timeout(Duration::from_secs(10), wait)
            .await
            .unwrap_or_else(|_| panic!("no reload with title {want:?}"));
    }

    #[test]
    fn test_bare_file_name_watches_cwd() {
        let (watcher, _rx) = ConfigWatcher::new(Path::new("dashboard.toml"));
        assert_eq!(watcher.watch_dir(), PathBuf::from("."));

        let (watcher, _rx) = ConfigWatcher::new(Path::new("/etc/dashboard/dashboard.toml"));
        assert_eq!(watcher.watch_dir(), PathBuf::from("/etc/dashboard"));
    }

    #[tokio::test]
    async fn test_reload_survives_atomic_saves() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dashboard.toml");
        fs::write(&path, "[dashboard]\ntitle = \"start\"\n").unwrap();

        let (watcher, mut rx) = ConfigWatcher::new(&path);
        let _handle = watcher.run().unwrap();

        save_by_rename(&path, "[dashboard]\ntitle = \"first\"\n");
        next_title(&mut rx, "first").await;

        // A watch on the replaced inode would go quiet here.
        save_by_rename(&path, "[dashboard]\ntitle = \"second\"\n");
        next_title(&mut rx, "second").await;
    }

    #[tokio::test]
    async fn test_sibling_files_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dashboard.toml");
        fs::write(&path, "[dashboard]\ntitle = \"start\"\n").unwrap();

        let (watcher, mut rx) = ConfigWatcher::new(&path);
        let _handle = watcher.run().unwrap();

        fs::write(dir.path().join("other.toml"), "[dashboard]\ntitle = \"other\"\n").unwrap();
        assert!(timeout(Duration::from_millis(500), rx.recv()).await.is_err());
    }
}
