use crate::error::Result;
use crate::types::{FeedMapping, MappingStatus};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Marker written when no curated meaning exists for a placeholder field.
/// The feed format's field keys are French (`Champ N`); the marker follows.
pub const UNKNOWN_MEANING: &str = "Signification inconnue";

/// Read-only table of curated real meanings, keyed by message type then
/// field key. Loaded from a JSON file at startup and injected; the content
/// is deployment data, nothing here assumes specific message types.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CuratedMeanings {
    #[serde(flatten)]
    by_msg_type: HashMap<String, HashMap<String, String>>,
}

impl CuratedMeanings {
    /// Load from a JSON file shaped `{"<msgType>": {"Champ N": "…"}}`.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let table = serde_json::from_str(&data)?;
        Ok(table)
    }

    #[must_use]
    pub fn lookup(&self, msg_type: &str, field_key: &str) -> Option<&str> {
        self.by_msg_type
            .get(msg_type)
            .and_then(|fields| fields.get(field_key))
            .map(String::as_str)
    }

    pub fn insert(
        &mut self,
        msg_type: impl Into<String>,
        field_key: impl Into<String>,
        meaning: impl Into<String>,
    ) {
        self.by_msg_type
            .entry(msg_type.into())
            .or_default()
            .insert(field_key.into(), meaning.into());
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_msg_type.is_empty()
    }
}

/// Does a stored meaning still look like an anonymization placeholder
/// rather than a real description?
#[must_use]
pub fn is_placeholder_meaning(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.starts_with("ID_")
        || trimmed.starts_with("NUM_")
        || trimmed.starts_with("CODE_")
        || trimmed == "xxxxx"
}

/// Replace placeholder meanings with curated ground truth.
///
/// Pure: returns an updated copy, never mutates the input. Fields without
/// a curated entry get [`UNKNOWN_MEANING`]. The status of the result is
/// `Validated` when no placeholder or unknown marker remains, `ToVerify`
/// otherwise. Persisting the result is the caller's decision.
#[must_use]
pub fn complete_mapping(existing: &FeedMapping, curated: &CuratedMeanings) -> FeedMapping {
    let mut updated = existing.clone();
    let mut unresolved = 0usize;

    for (field_key, meaning) in &existing.mapping {
        if !is_placeholder_meaning(meaning) {
            continue;
        }
        match curated.lookup(&existing.msg_type, field_key) {
            Some(real) => {
                updated
                    .mapping
                    .insert(field_key.clone(), real.to_string());
            }
            None => {
                unresolved += 1;
                updated
                    .mapping
                    .insert(field_key.clone(), UNKNOWN_MEANING.to_string());
            }
        }
    }

    updated.status = if unresolved == 0 {
        MappingStatus::Validated
    } else {
        MappingStatus::ToVerify
    };
    updated
}
