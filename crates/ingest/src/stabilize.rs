use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// In-memory bookkeeping for one file being watched for quiescence.
/// Exists only for the duration of a stabilization episode.
#[derive(Debug, Clone)]
pub struct StabilizationRecord {
    pub path: PathBuf,
    pub started_at: Instant,
    pub last_modification: Instant,
    pub last_known_size: u64,
}

/// Per-path state machine deciding when a file has stopped changing.
///
/// Tracking → Stable (promoted, removed) or Abandoned (file gone or
/// unreadable, removed). A path is promoted at most once per episode; a
/// later create event starts a fresh episode.
///
/// Methods take `now` explicitly so tests can drive the clock. Touched by
/// both the watcher callback thread and the scheduler task, hence the
/// internal mutex.
pub struct StabilizationTracker {
    records: Mutex<HashMap<PathBuf, StabilizationRecord>>,
    delay: Duration,
}

impl StabilizationTracker {
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            delay,
        }
    }

    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// Record a create/modify event. First observation captures the
    /// current size and starts the clock; subsequent events reset the
    /// clock and stay in Tracking.
    pub fn observe(&self, path: &Path, now: Instant) {
        let mut records = self.records.lock().expect("tracker lock poisoned");
        if let Some(record) = records.get_mut(path) {
            record.last_modification = now;
            log::debug!("Stabilization clock reset for {}", path.display());
            return;
        }

        let size = match std::fs::metadata(path) {
            Ok(meta) => meta.len(),
            Err(err) => {
                // Vanished between the event and now; nothing to track.
                log::debug!("Not tracking {}: {err}", path.display());
                return;
            }
        };
        log::info!("Tracking {} ({size} bytes)", path.display());
        records.insert(
            path.to_path_buf(),
            StabilizationRecord {
                path: path.to_path_buf(),
                started_at: now,
                last_modification: now,
                last_known_size: size,
            },
        );
    }

    /// Advance every tracked path, returning those that became Stable.
    /// Paths whose file disappeared are dropped (Abandoned).
    pub fn tick(&self, now: Instant) -> Vec<PathBuf> {
        let mut records = self.records.lock().expect("tracker lock poisoned");
        let mut stable = Vec::new();
        let mut abandoned = Vec::new();

        for (path, record) in records.iter_mut() {
            let meta = match std::fs::metadata(path) {
                Ok(meta) => meta,
                Err(err) => {
                    log::warn!("Abandoning {}: {err}", path.display());
                    abandoned.push(path.clone());
                    continue;
                }
            };

            let size = meta.len();
            if size != record.last_known_size {
                log::debug!(
                    "{} still growing ({} -> {size} bytes)",
                    path.display(),
                    record.last_known_size
                );
                record.last_known_size = size;
                record.last_modification = now;
                continue;
            }

            if now.duration_since(record.last_modification) >= self.delay {
                log::info!(
                    "{} stable after {:?}",
                    path.display(),
                    now.duration_since(record.started_at)
                );
                stable.push(path.clone());
            }
        }

        for path in &abandoned {
            records.remove(path);
        }
        for path in &stable {
            records.remove(path);
        }
        stable
    }

    #[must_use]
    pub fn is_tracking(&self, path: &Path) -> bool {
        self.records
            .lock()
            .expect("tracker lock poisoned")
            .contains_key(path)
    }

    #[must_use]
    pub fn tracked_count(&self) -> usize {
        self.records.lock().expect("tracker lock poisoned").len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, "{content}").unwrap();
        path
    }

    #[test]
    fn promotes_to_stable_exactly_once_per_episode() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "FEED1.txt", "077;20;x\n");
        let tracker = StabilizationTracker::new(Duration::from_secs(60));

        let t0 = Instant::now();
        tracker.observe(&path, t0);
        assert!(tracker.is_tracking(&path));

        // Before the delay elapses nothing is stable.
        assert!(tracker.tick(t0 + Duration::from_secs(30)).is_empty());

        // After the delay the path stabilizes once.
        let stable = tracker.tick(t0 + Duration::from_secs(61));
        assert_eq!(stable, vec![path.clone()]);
        assert!(!tracker.is_tracking(&path));

        // Extra ticks are no-ops.
        assert!(tracker.tick(t0 + Duration::from_secs(120)).is_empty());
    }

    #[test]
    fn modify_event_resets_the_clock() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "FEED1.txt", "077;20;x\n");
        let tracker = StabilizationTracker::new(Duration::from_secs(60));

        let t0 = Instant::now();
        tracker.observe(&path, t0);
        tracker.observe(&path, t0 + Duration::from_secs(50));

        // 61s after the first observation but only 11s after the last
        // modification: must not be stable yet.
        assert!(tracker.tick(t0 + Duration::from_secs(61)).is_empty());
        assert_eq!(
            tracker.tick(t0 + Duration::from_secs(111)),
            vec![path.clone()]
        );
    }

    #[test]
    fn size_change_observed_on_tick_resets_the_clock() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "FEED1.txt", "077;20;x\n");
        let tracker = StabilizationTracker::new(Duration::from_secs(60));

        let t0 = Instant::now();
        tracker.observe(&path, t0);

        // Grow the file between ticks without an observe call.
        std::fs::OpenOptions::new()
            .append(true)
            .open(&path)
            .unwrap()
            .write_all(b"077;20;more\n")
            .unwrap();

        // The tick sees the new size and restarts the clock.
        assert!(tracker.tick(t0 + Duration::from_secs(61)).is_empty());
        assert!(tracker.tick(t0 + Duration::from_secs(100)).is_empty());
        assert_eq!(
            tracker.tick(t0 + Duration::from_secs(122)),
            vec![path.clone()]
        );
    }

    #[test]
    fn vanished_files_are_abandoned() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "FEED1.txt", "077;20;x\n");
        let tracker = StabilizationTracker::new(Duration::from_secs(60));

        tracker.observe(&path, Instant::now());
        std::fs::remove_file(&path).unwrap();

        assert!(tracker.tick(Instant::now()).is_empty());
        assert_eq!(tracker.tracked_count(), 0);
    }

    #[test]
    fn new_episode_after_consumption() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "FEED1.txt", "077;20;x\n");
        let tracker = StabilizationTracker::new(Duration::from_secs(10));

        let t0 = Instant::now();
        tracker.observe(&path, t0);
        assert_eq!(tracker.tick(t0 + Duration::from_secs(11)), vec![path.clone()]);

        // A fresh create event starts a new episode for the same path.
        tracker.observe(&path, t0 + Duration::from_secs(20));
        assert!(tracker.is_tracking(&path));
        assert_eq!(
            tracker.tick(t0 + Duration::from_secs(31)),
            vec![path.clone()]
        );
    }
}
