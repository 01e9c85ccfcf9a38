use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::SystemTime;

/// Review state of a persisted mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingStatus {
    /// Every field has a curated or inferred real meaning.
    Validated,
    /// Completed, but some fields still carry the unknown-meaning marker.
    ToVerify,
    /// Fresh inference output; not yet completed.
    Incomplete,
}

/// Persisted field→meaning document for one message type.
///
/// Invariant: at most one active record per `msg_type`; the store enforces
/// it by keying active records on the message type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedMapping {
    pub id: u64,
    pub msg_type: String,
    /// Starts at 1, incremented by the completion workflow.
    pub version: u32,
    pub status: MappingStatus,
    pub mapping: HashMap<String, String>,
    pub created_at: u64,
    pub updated_at: u64,
    pub is_active: bool,
}

/// Immutable snapshot archived before an active mapping is overwritten.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedMappingHistory {
    pub msg_type: String,
    pub version: u32,
    pub status: MappingStatus,
    pub mapping: HashMap<String, String>,
    pub created_at: u64,
    pub updated_at: u64,
    pub archived_at: u64,
}

impl FeedMappingHistory {
    #[must_use]
    pub fn archive(mapping: &FeedMapping, archived_at: u64) -> Self {
        Self {
            msg_type: mapping.msg_type.clone(),
            version: mapping.version,
            status: mapping.status,
            mapping: mapping.mapping.clone(),
            created_at: mapping.created_at,
            updated_at: mapping.updated_at,
            archived_at,
        }
    }
}

pub(crate) fn current_unix_ms() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .ok()
        .and_then(|dur| u64::try_from(dur.as_millis()).ok())
        .unwrap_or(0)
}
