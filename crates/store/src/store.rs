use crate::error::{Result, StoreError};
use crate::types::{current_unix_ms, FeedMapping, FeedMappingHistory, MappingStatus};
use feedlens_inference::FieldMapping;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// Result of a dedup-aware insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOutcome {
    Inserted { id: u64 },
    /// An active mapping for the message type already exists; the new
    /// inference was discarded (first-writer-wins).
    Skipped,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreDocument {
    active: HashMap<String, FeedMapping>,
    history: Vec<FeedMappingHistory>,
    next_id: u64,
}

/// Deduplicated, versioned persistence for inferred mappings.
///
/// Backed by a single JSON document on disk. All operations run under one
/// async mutex, so check-then-insert is atomic within the process; that
/// mutex plus the msg_type-keyed map stand in for the backing store's
/// unique index on active message types.
pub struct MappingStore {
    state: Mutex<StoreDocument>,
    path: PathBuf,
}

impl MappingStore {
    /// Open the store, loading the existing document if present.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let state = if tokio::fs::try_exists(&path).await? {
            let data = tokio::fs::read_to_string(&path).await?;
            let doc: StoreDocument = serde_json::from_str(&data)?;
            log::info!(
                "Loaded mapping store from {:?}: {} active, {} archived",
                path,
                doc.active.len(),
                doc.history.len()
            );
            doc
        } else {
            log::info!("Starting empty mapping store at {:?}", path);
            StoreDocument::default()
        };
        Ok(Self {
            state: Mutex::new(state),
            path,
        })
    }

    /// Insert a freshly inferred mapping unless the message type already
    /// has an active one.
    pub async fn store_if_absent(&self, inferred: &FieldMapping) -> Result<StoreOutcome> {
        if !inferred.is_valid() {
            return Err(StoreError::InvalidMapping(format!(
                "msg_type '{}' with {} fields",
                inferred.msg_type,
                inferred.mapping.len()
            )));
        }

        let mut state = self.state.lock().await;
        if state.active.contains_key(&inferred.msg_type) {
            log::debug!(
                "Mapping for msg_type {} already exists; skipping",
                inferred.msg_type
            );
            return Ok(StoreOutcome::Skipped);
        }

        let now = current_unix_ms();
        let id = state.next_id;
        state.next_id += 1;
        let record = FeedMapping {
            id,
            msg_type: inferred.msg_type.clone(),
            version: 1,
            status: MappingStatus::Incomplete,
            mapping: inferred.mapping.clone(),
            created_at: now,
            updated_at: now,
            is_active: true,
        };
        state.active.insert(inferred.msg_type.clone(), record);
        if let Err(err) = self.save(&state).await {
            // Keep memory and disk consistent: a failed save must leave the
            // msg_type absent so a retry can insert rather than skip.
            state.active.remove(&inferred.msg_type);
            state.next_id = id;
            return Err(err);
        }
        log::info!("Stored new mapping for msg_type {} (id {id})", inferred.msg_type);
        Ok(StoreOutcome::Inserted { id })
    }

    /// Replace the active mapping with a completed revision, archiving the
    /// prior version first.
    pub async fn persist_completed(&self, updated: FeedMapping) -> Result<FeedMapping> {
        let mut state = self.state.lock().await;
        let existing = state
            .active
            .get(&updated.msg_type)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(updated.msg_type.clone()))?;

        let now = current_unix_ms();
        state
            .history
            .push(FeedMappingHistory::archive(&existing, now));

        let revised = FeedMapping {
            version: existing.version + 1,
            updated_at: now,
            created_at: existing.created_at,
            id: existing.id,
            is_active: true,
            ..updated
        };
        state
            .active
            .insert(revised.msg_type.clone(), revised.clone());
        if let Err(err) = self.save(&state).await {
            state.history.pop();
            state.active.insert(existing.msg_type.clone(), existing);
            return Err(err);
        }
        log::info!(
            "Completed mapping for msg_type {} -> version {}",
            revised.msg_type,
            revised.version
        );
        Ok(revised)
    }

    pub async fn find_by_msg_type(&self, msg_type: &str) -> Option<FeedMapping> {
        self.state.lock().await.active.get(msg_type).cloned()
    }

    pub async fn exists(&self, msg_type: &str) -> bool {
        self.state.lock().await.active.contains_key(msg_type)
    }

    /// Snapshot of message types with an active schema, the pipeline's
    /// knowledge-base view.
    pub async fn active_msg_types(&self) -> HashSet<String> {
        self.state.lock().await.active.keys().cloned().collect()
    }

    pub async fn delete_by_msg_type(&self, msg_type: &str) -> Result<bool> {
        let mut state = self.state.lock().await;
        let Some(record) = state.active.remove(msg_type) else {
            return Ok(false);
        };
        if let Err(err) = self.save(&state).await {
            state.active.insert(record.msg_type.clone(), record);
            return Err(err);
        }
        Ok(true)
    }

    pub async fn count(&self) -> usize {
        self.state.lock().await.active.len()
    }

    pub async fn history_for(&self, msg_type: &str) -> Vec<FeedMappingHistory> {
        self.state
            .lock()
            .await
            .history
            .iter()
            .filter(|h| h.msg_type == msg_type)
            .cloned()
            .collect()
    }

    /// Every archived version, including those of message types with no
    /// active record anymore.
    pub async fn all_history(&self) -> Vec<FeedMappingHistory> {
        self.state.lock().await.history.clone()
    }

    pub async fn all_active(&self) -> Vec<FeedMapping> {
        let state = self.state.lock().await;
        let mut all: Vec<FeedMapping> = state.active.values().cloned().collect();
        all.sort_by(|a, b| a.msg_type.cmp(&b.msg_type));
        all
    }

    async fn save(&self, state: &StoreDocument) -> Result<()> {
        let data = serde_json::to_string_pretty(state)?;
        tokio::fs::write(&self.path, data).await?;
        Ok(())
    }
}
