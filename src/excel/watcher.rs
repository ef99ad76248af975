use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use super::reader::compute_checksum;
use super::types::*;

/// Watches the workbook file and reports edits made outside the app, or the
/// file disappearing (e.g. an ephemeral data directory being reset).
///
/// The parent directory is watched rather than the file itself because saves
/// replace the file by rename, which would orphan a watch on the old inode.
pub struct WorkbookWatcher {
    #[allow(dead_code)]
    watcher: RecommendedWatcher,
    path: PathBuf,
    running: Arc<Mutex<bool>>,
}

/// Last observed state of the watched file
#[derive(Debug, Clone, PartialEq)]
struct Observed {
    exists: bool,
    checksum: Option<String>,
}

impl WorkbookWatcher {
    /// Start watching `path`; change events are sent on `event_sender`
    pub fn start(path: &Path, event_sender: Sender<WorkbookChange>) -> Result<Self, ExcelError> {
        let path_buf = path.to_path_buf();
        let parent = path_buf
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        if !parent.exists() {
            return Err(ExcelError::file_not_found(&parent.display().to_string()));
        }

        let initial = Observed {
            exists: path_buf.exists(),
            checksum: compute_checksum(&path_buf).ok(),
        };

        let (tx, rx): (Sender<Result<Event, notify::Error>>, Receiver<Result<Event, notify::Error>>) = channel();

        let mut watcher = RecommendedWatcher::new(
            move |res| {
                let _ = tx.send(res);
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )
        .map_err(|e| ExcelError::watch_error(format!("Failed to create watcher: {}", e)))?;

        watcher
            .watch(&parent, RecursiveMode::NonRecursive)
            .map_err(|e| ExcelError::watch_error(format!("Failed to watch {}: {}", parent.display(), e)))?;

        let running = Arc::new(Mutex::new(true));
        let running_ref = running.clone();
        let watched_path = path_buf.clone();

        thread::spawn(move || {
            process_watch_events(rx, event_sender, running_ref, watched_path, initial);
        });

        tracing::debug!(path = %path_buf.display(), "watching workbook");

        Ok(WorkbookWatcher {
            watcher,
            path: path_buf,
            running,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for WorkbookWatcher {
    fn drop(&mut self) {
        if let Ok(mut running) = self.running.lock() {
            *running = false;
        }
    }
}

/// Process watch events in a background thread
fn process_watch_events(
    rx: Receiver<Result<Event, notify::Error>>,
    event_sender: Sender<WorkbookChange>,
    running: Arc<Mutex<bool>>,
    path: PathBuf,
    mut observed: Observed,
) {
    // Saves arrive as a burst of events; settle before looking at the file
    let debounce_duration = Duration::from_millis(500);
    let mut pending_since: Option<Instant> = None;

    loop {
        match rx.recv_timeout(Duration::from_millis(250)) {
            Ok(Ok(event)) => {
                if is_relevant(&event, &path) {
                    pending_since.get_or_insert_with(Instant::now);
                }
            }
            Ok(Err(e)) => {
                tracing::warn!(path = %path.display(), "watch error: {}", e);
            }
            Err(RecvTimeoutError::Timeout) => {
                let still_running = running.lock().map(|r| *r).unwrap_or(false);
                if !still_running {
                    break;
                }
            }
            Err(RecvTimeoutError::Disconnected) => break,
        }

        if let Some(since) = pending_since {
            if since.elapsed() >= debounce_duration {
                pending_since = None;

                let current = Observed {
                    exists: path.exists(),
                    checksum: compute_checksum(&path).ok(),
                };

                if let Some(change) = classify_change(&path, &observed, &current) {
                    if event_sender.send(change).is_err() {
                        break;
                    }
                }
                observed = current;
            }
        }
    }
}

fn is_relevant(event: &Event, path: &Path) -> bool {
    matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    ) && event.paths.iter().any(|p| same_file_name(p, path))
}

fn same_file_name(candidate: &Path, path: &Path) -> bool {
    candidate == path || (candidate.file_name().is_some() && candidate.file_name() == path.file_name())
}

/// Decide what, if anything, to report for a state transition
fn classify_change(path: &Path, before: &Observed, after: &Observed) -> Option<WorkbookChange> {
    if !after.exists {
        if !before.exists {
            return None;
        }
        return Some(WorkbookChange {
            path: path.display().to_string(),
            change_type: FileChangeType::Deleted,
            new_checksum: None,
        });
    }

    if before.exists && before.checksum == after.checksum {
        return None;
    }

    Some(WorkbookChange {
        path: path.display().to_string(),
        change_type: FileChangeType::Modified,
        new_checksum: after.checksum.clone(),
    })
}

/// Create a channel for receiving workbook change events
pub fn create_event_channel() -> (Sender<WorkbookChange>, Receiver<WorkbookChange>) {
    channel()
}
