use crate::error::{IngestError, Result};
use feedlens_parser::FeedFileMatcher;
use notify::{
    Config as NotifyConfig, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher,
};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;

/// A create/modify touching a feed file in the watched directory.
#[derive(Debug, Clone)]
pub struct WatchEvent {
    pub path: PathBuf,
}

/// Start watching the input directory, forwarding matching events into
/// `sender`. The watcher callback runs on notify's own thread and does no
/// file I/O beyond the event read.
///
/// Returns the watcher handle; dropping it stops the event stream. An
/// unopenable watch directory is the one fatal initialization error.
pub fn spawn_fs_watcher(
    input_dir: &Path,
    matcher: FeedFileMatcher,
    sender: mpsc::Sender<WatchEvent>,
) -> Result<RecommendedWatcher> {
    std::fs::create_dir_all(input_dir).map_err(|e| {
        IngestError::WatchInit(format!(
            "cannot create watch directory {}: {e}",
            input_dir.display()
        ))
    })?;

    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => {
                if !is_relevant_kind(&event.kind) {
                    return;
                }
                for path in event.paths {
                    if matcher.is_feed_file(&path) {
                        let _ = sender.blocking_send(WatchEvent { path });
                    }
                }
            }
            Err(err) => log::warn!("Watcher error: {err}"),
        },
        NotifyConfig::default(),
    )
    .map_err(|e| IngestError::WatchInit(format!("watcher init failed: {e}")))?;

    watcher
        .watch(input_dir, RecursiveMode::NonRecursive)
        .map_err(|e| {
            IngestError::WatchInit(format!("cannot watch {}: {e}", input_dir.display()))
        })?;

    log::info!("Watching {} for feed files", input_dir.display());
    Ok(watcher)
}

const fn is_relevant_kind(kind: &EventKind) -> bool {
    matches!(kind, EventKind::Create(_) | EventKind::Modify(_))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_create_and_modify_are_relevant() {
        assert!(is_relevant_kind(&EventKind::Create(
            notify::event::CreateKind::File
        )));
        assert!(is_relevant_kind(&EventKind::Modify(
            notify::event::ModifyKind::Any
        )));
        assert!(!is_relevant_kind(&EventKind::Remove(
            notify::event::RemoveKind::File
        )));
        assert!(!is_relevant_kind(&EventKind::Access(
            notify::event::AccessKind::Read
        )));
    }
}
