//! Polling-based file watching for detecting document changes.
//!
//! The watcher runs on its own thread and reports modification-time
//! advancement to the owning session over a channel. It deliberately polls
//! rather than subscribing to OS notifications: the behavior must be the same
//! on every platform, and a one second tick is plenty for a preview.

use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;

/// Events emitted by the file watcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchEvent {
    /// The watched file's modification time advanced.
    Changed,
}

/// Configuration for the file watcher.
#[derive(Debug, Clone)]
pub struct WatcherConfig {
    /// Interval between modification-time checks.
    pub poll_interval: Duration,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
        }
    }
}

/// A file watcher that monitors a single file for modification.
///
/// The polling loop terminates when [`FileWatcher::stop`] is called or when
/// the watched file disappears. Disappearance is silent termination, not an
/// error: there is simply nothing left to watch.
pub struct FileWatcher {
    /// Channel to signal shutdown; consumed on the first `stop()`.
    shutdown_tx: Option<mpsc::Sender<()>>,
    /// Polling thread handle, joined on `stop()`.
    thread: Option<std::thread::JoinHandle<()>>,
    /// The file path being watched.
    file_path: PathBuf,
}

impl FileWatcher {
    /// Start watching `path`, emitting [`WatchEvent::Changed`] on `events`
    /// whenever its modification time advances.
    ///
    /// The modification time is captured here, before the loop starts, so the
    /// file's existing state never produces a spurious signal. Fails if the
    /// file cannot be stat'ed at construction time.
    pub fn spawn(
        path: &Path,
        config: WatcherConfig,
        events: UnboundedSender<WatchEvent>,
    ) -> std::io::Result<Self> {
        let file_path = path.to_path_buf();
        let mut last_mtime = std::fs::metadata(&file_path)?.modified()?;

        let (shutdown_tx, shutdown_rx) = mpsc::channel();
        let poll_interval = config.poll_interval;
        let watched = file_path.clone();

        let thread = std::thread::spawn(move || {
            tracing::info!(path = ?watched, ?poll_interval, "Started polling file watcher");

            loop {
                // The shutdown channel doubles as the poll tick.
                match shutdown_rx.recv_timeout(poll_interval) {
                    Ok(()) | Err(mpsc::RecvTimeoutError::Disconnected) => break,
                    Err(mpsc::RecvTimeoutError::Timeout) => {}
                }

                match std::fs::metadata(&watched) {
                    Ok(metadata) => {
                        if let Ok(mtime) = metadata.modified() {
                            if mtime > last_mtime {
                                last_mtime = mtime;
                                if events.send(WatchEvent::Changed).is_err() {
                                    // Owner dropped the receiver.
                                    break;
                                }
                            }
                        }
                    }
                    Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                        tracing::debug!(path = ?watched, "Watched file vanished, watcher exiting");
                        break;
                    }
                    // Transient read errors: keep polling.
                    Err(_) => {}
                }
            }
        });

        Ok(Self {
            shutdown_tx: Some(shutdown_tx),
            thread: Some(thread),
            file_path,
        })
    }

    /// Get the path being watched.
    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// Whether the polling loop is still running.
    pub fn is_running(&self) -> bool {
        self.thread.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Request termination and wait for the polling loop to fully exit.
    ///
    /// The join is mandatory: the owner may only start a new watcher once the
    /// previous loop has finished its in-flight iteration. Calling `stop`
    /// again after it has returned is a no-op.
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for FileWatcher {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::SystemTime;

    fn fast_config() -> WatcherConfig {
        WatcherConfig {
            poll_interval: Duration::from_millis(20),
        }
    }

    /// Bump the file's mtime far enough into the future that it is strictly
    /// greater than any previously observed value, regardless of filesystem
    /// timestamp granularity.
    fn advance_mtime(path: &Path) {
        let file = std::fs::File::options().write(true).open(path).unwrap();
        file.set_modified(SystemTime::now() + Duration::from_secs(5))
            .unwrap();
    }

    fn wait_for_event(rx: &mut tokio::sync::mpsc::UnboundedReceiver<WatchEvent>) -> bool {
        for _ in 0..100 {
            if rx.try_recv().is_ok() {
                return true;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        false
    }

    #[test]
    fn test_watcher_config_default() {
        let config = WatcherConfig::default();
        assert_eq!(config.poll_interval, Duration::from_secs(1));
    }

    #[test]
    fn test_spawn_on_missing_file_fails() {
        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
        let result = FileWatcher::spawn(Path::new("/nonexistent/doc.md"), fast_config(), tx);
        assert!(result.is_err());
    }

    #[test]
    fn test_change_signal_is_delivered_at_least_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.md");
        std::fs::write(&path, "# hi").unwrap();

        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let mut watcher = FileWatcher::spawn(&path, fast_config(), tx).unwrap();

        advance_mtime(&path);
        assert!(wait_for_event(&mut rx), "expected a change signal");

        watcher.stop();
    }

    #[test]
    fn test_no_spurious_signal_for_existing_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.md");
        std::fs::write(&path, "# hi").unwrap();

        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let mut watcher = FileWatcher::spawn(&path, fast_config(), tx).unwrap();

        std::thread::sleep(Duration::from_millis(100));
        assert!(rx.try_recv().is_err(), "unchanged file must not signal");

        watcher.stop();
    }

    #[test]
    fn test_no_signals_after_stop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.md");
        std::fs::write(&path, "# hi").unwrap();

        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let mut watcher = FileWatcher::spawn(&path, fast_config(), tx).unwrap();

        watcher.stop();
        assert!(!watcher.is_running());

        advance_mtime(&path);
        std::thread::sleep(Duration::from_millis(100));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_stop_twice_is_safe() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.md");
        std::fs::write(&path, "# hi").unwrap();

        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
        let mut watcher = FileWatcher::spawn(&path, fast_config(), tx).unwrap();

        watcher.stop();
        watcher.stop();
    }

    #[test]
    fn test_file_deletion_terminates_loop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.md");
        std::fs::write(&path, "# hi").unwrap();

        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
        let watcher = FileWatcher::spawn(&path, fast_config(), tx).unwrap();

        std::fs::remove_file(&path).unwrap();

        let mut terminated = false;
        for _ in 0..100 {
            if !watcher.is_running() {
                terminated = true;
                break;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        assert!(terminated, "watcher must exit once the file vanishes");
    }
}
