//! File watching for edit-triggered refresh.

use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use stillframe_jsx::sources::is_component_file;
use tokio::sync::mpsc as async_mpsc;

/// Quiet period that closes a burst of filesystem events.
const DEBOUNCE: Duration = Duration::from_millis(100);

/// Events emitted by the file watcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// Component source was created or modified
    SourceChanged(PathBuf),

    /// Component source was deleted
    SourceRemoved(PathBuf),

    /// Any other file changed
    Other(PathBuf),
}

/// File watcher for detecting changes.
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
}

impl FileWatcher {
    /// Create a new file watcher for the given paths.
    ///
    /// Returns the watcher and a channel to receive events. Bursts of events
    /// are coalesced so one save produces one event per path.
    pub fn new(
        paths: &[PathBuf],
    ) -> Result<(Self, async_mpsc::Receiver<WatchEvent>), std::io::Error> {
        let (sync_tx, sync_rx) = mpsc::channel();
        let (async_tx, async_rx) = async_mpsc::channel(100);

        let mut watcher = notify::recommended_watcher(move |res: Result<notify::Event, _>| {
            if let Ok(event) = res {
                let _ = sync_tx.send(event);
            }
        })
        .map_err(std::io::Error::other)?;

        for path in paths {
            if path.exists() {
                watcher
                    .watch(path, RecursiveMode::Recursive)
                    .map_err(std::io::Error::other)?;
            }
        }

        std::thread::spawn(move || {
            while let Ok(first) = sync_rx.recv() {
                let mut pending = Vec::new();
                collect_event(&mut pending, first);

                while let Ok(next) = sync_rx.recv_timeout(DEBOUNCE) {
                    collect_event(&mut pending, next);
                }

                for event in pending {
                    if async_tx.blocking_send(event).is_err() {
                        return;
                    }
                }
            }
        });

        Ok((Self { _watcher: watcher }, async_rx))
    }
}

/// Add the classified events of `event` to `pending`, skipping duplicates.
fn collect_event(pending: &mut Vec<WatchEvent>, event: notify::Event) {
    for path in &event.paths {
        if let Some(watch_event) = classify_event(path, &event.kind) {
            if !pending.contains(&watch_event) {
                pending.push(watch_event);
            }
        }
    }
}

/// Classify a notify event into a WatchEvent.
fn classify_event(path: &Path, kind: &notify::EventKind) -> Option<WatchEvent> {
    use notify::EventKind;

    let is_source = is_component_file(path);

    match kind {
        EventKind::Create(_) | EventKind::Modify(_) if is_source => {
            Some(WatchEvent::SourceChanged(path.to_path_buf()))
        }
        EventKind::Remove(_) if is_source => Some(WatchEvent::SourceRemoved(path.to_path_buf())),
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_) => {
            Some(WatchEvent::Other(path.to_path_buf()))
        }
        _ => None,
    }
}
