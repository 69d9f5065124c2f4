use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tokio::sync::broadcast;

/// One file-change event for the live-update channel.
#[derive(Debug, Clone, Serialize)]
pub struct FileEvent {
    pub event: String,
    pub filepath: String,
}

/// Shared application state passed to all route handlers. The broadcast
/// sender is the connection registry for the SSE channel: subscribers are
/// added on connect and pruned by the channel when their receiver drops.
#[derive(Clone)]
pub struct AppState {
    pub root: PathBuf,
    pub event_tx: broadcast::Sender<FileEvent>,
}

impl AppState {
    pub fn new(root: PathBuf) -> Self {
        let (tx, _) = broadcast::channel(64);
        let state = Self {
            root: root.clone(),
            event_tx: tx.clone(),
        };

        // Watch the ideas directory by polling mtimes and broadcast per-file
        // add/change/unlink events. Catches both API mutations and external
        // edits to the markdown files.
        // Guard: only spawn if inside a Tokio runtime (skipped in sync unit tests).
        if tokio::runtime::Handle::try_current().is_ok() {
            let dir = ideaboard_core::paths::ideas_dir(&root);
            tokio::spawn(async move {
                let mut seen = scan(&dir).await;
                loop {
                    tokio::time::sleep(std::time::Duration::from_millis(800)).await;
                    let current = scan(&dir).await;
                    for (path, mtime) in &current {
                        match seen.get(path) {
                            None => emit(&tx, "add", path),
                            Some(prev) if prev != mtime => emit(&tx, "change", path),
                            _ => {}
                        }
                    }
                    for path in seen.keys() {
                        if !current.contains_key(path) {
                            emit(&tx, "unlink", path);
                        }
                    }
                    seen = current;
                }
            });
        }

        state
    }
}

async fn scan(dir: &Path) -> HashMap<PathBuf, SystemTime> {
    let mut map = HashMap::new();
    let Ok(mut entries) = tokio::fs::read_dir(dir).await else {
        return map;
    };
    while let Ok(Some(entry)) = entries.next_entry().await {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("md") {
            continue;
        }
        if let Ok(meta) = entry.metadata().await {
            if let Ok(mtime) = meta.modified() {
                map.insert(path, mtime);
            }
        }
    }
    map
}

fn emit(tx: &broadcast::Sender<FileEvent>, event: &str, path: &Path) {
    let _ = tx.send(FileEvent {
        event: event.to_string(),
        filepath: path.display().to_string(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_state_stores_root() {
        let state = AppState::new(PathBuf::from("/tmp/test"));
        assert_eq!(state.root, PathBuf::from("/tmp/test"));
    }
}
