use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Instant;

/// Thread-safe set of stabilized paths awaiting processing.
///
/// Claim operations read-and-clear atomically, so overlapping scheduler
/// ticks cannot hand the same path to the pipeline twice.
#[derive(Debug, Default)]
pub struct ReadyRegistry {
    inner: Mutex<HashMap<PathBuf, Instant>>,
}

impl ReadyRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a path as ready. Returns false if it was already
    /// registered (idempotent within an episode).
    pub fn register(&self, path: &Path, ready_at: Instant) -> bool {
        let mut inner = self.inner.lock().expect("registry lock poisoned");
        let inserted = inner.insert(path.to_path_buf(), ready_at).is_none();
        if inserted {
            log::info!("Registered ready file {}", path.display());
        }
        inserted
    }

    /// Atomically drain every ready path, oldest first.
    pub fn claim_all(&self) -> Vec<PathBuf> {
        let drained: Vec<(PathBuf, Instant)> = {
            let mut inner = self.inner.lock().expect("registry lock poisoned");
            inner.drain().collect()
        };
        let mut entries = drained;
        entries.sort_by_key(|(_, ready_at)| *ready_at);
        entries.into_iter().map(|(path, _)| path).collect()
    }

    /// Atomically claim a single path. Returns false if another caller
    /// already took it.
    pub fn claim(&self, path: &Path) -> bool {
        self.inner
            .lock()
            .expect("registry lock poisoned")
            .remove(path)
            .is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().expect("registry lock poisoned").len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_is_idempotent() {
        let registry = ReadyRegistry::new();
        let path = Path::new("/in/FEED1.txt");
        assert!(registry.register(path, Instant::now()));
        assert!(!registry.register(path, Instant::now()));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn claim_all_drains_oldest_first() {
        let registry = ReadyRegistry::new();
        let t0 = Instant::now();
        registry.register(Path::new("/in/b.txt"), t0 + std::time::Duration::from_secs(1));
        registry.register(Path::new("/in/a.txt"), t0);

        let claimed = registry.claim_all();
        assert_eq!(
            claimed,
            vec![PathBuf::from("/in/a.txt"), PathBuf::from("/in/b.txt")]
        );
        assert!(registry.is_empty());
        assert!(registry.claim_all().is_empty());
    }

    #[test]
    fn single_claim_happens_at_most_once() {
        let registry = ReadyRegistry::new();
        let path = Path::new("/in/FEED1.txt");
        registry.register(path, Instant::now());
        assert!(registry.claim(path));
        assert!(!registry.claim(path));
    }
}
