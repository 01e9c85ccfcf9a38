//! # Feedlens Ingest
//!
//! File discovery, stabilization and scheduling for the feed pipeline.
//!
//! ```text
//! DirectoryWatcher (notify)
//!     │ create/modify events
//!     ▼
//! StabilizationTracker ──(size quiet for delay)──> ReadyRegistry
//!     ▲                                                │ claim
//!     │ interval tick                                  ▼
//! FeedService control loop ────────────────> FeedPipeline
//!                          parse → anonymize → infer → store
//! ```
//!
//! A path claimed from the registry is not claimed again until a new
//! create event starts a fresh stabilization episode; that is the only
//! at-most-once guarantee the service makes.

mod config;
mod error;
mod pipeline;
mod registry;
mod scanner;
mod service;
mod stabilize;
mod watcher;

pub use config::IngestConfig;
pub use error::{IngestError, Result};
pub use pipeline::{FeedPipeline, FileReport};
pub use registry::ReadyRegistry;
pub use scanner::sweep_existing;
pub use service::{FeedService, ServiceHealth};
pub use stabilize::{StabilizationRecord, StabilizationTracker};
pub use watcher::{spawn_fs_watcher, WatchEvent};
