use feedlens_parser::FeedFileMatcher;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Sweep the input directory for feed files already present before the
/// watcher started. The input directory is flat; nothing below depth 1 is
/// considered.
pub fn sweep_existing(input_dir: &Path, matcher: &FeedFileMatcher) -> Vec<PathBuf> {
    let mut found = Vec::new();
    for entry in WalkDir::new(input_dir).min_depth(1).max_depth(1) {
        match entry {
            Ok(entry) => {
                if !entry.file_type().is_file() {
                    continue;
                }
                let path = entry.path();
                if matcher.is_feed_file(path) {
                    found.push(path.to_path_buf());
                }
            }
            Err(err) => log::warn!("Failed to read directory entry: {err}"),
        }
    }
    log::info!(
        "Initial sweep of {} found {} feed file(s)",
        input_dir.display(),
        found.len()
    );
    found
}
