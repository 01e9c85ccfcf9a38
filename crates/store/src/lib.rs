//! # Feedlens Store
//!
//! Versioned, deduplicated persistence for inferred field mappings.
//!
//! The store keys active records by message type, so at most one active
//! mapping per type can exist; `store_if_absent` is first-writer-wins.
//! Overwriting only happens through the completion workflow, which
//! archives the prior version into an immutable history first.

mod curated;
mod error;
mod store;
mod types;

pub use curated::{complete_mapping, is_placeholder_meaning, CuratedMeanings, UNKNOWN_MEANING};
pub use error::{Result, StoreError};
pub use store::{MappingStore, StoreOutcome};
pub use types::{FeedMapping, FeedMappingHistory, MappingStatus};
