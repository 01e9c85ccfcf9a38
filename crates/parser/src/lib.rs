//! # Feedlens Parser
//!
//! Line-level reading and grouping for semicolon-delimited feed files.
//!
//! ```text
//! File
//!   │
//!   ├──> RawLineReader (trim, number, skip blanks)
//!   │      └─> RawLine
//!   │
//!   └──> FeedParser (split on ';', discriminator = field 2)
//!          └─> FeedBatch { msgType -> FeedGroup, issues, counts }
//! ```

mod error;
mod grouper;
mod reader;
mod types;

pub use error::{ParserError, Result};
pub use grouper::FeedParser;
pub use reader::{FeedFileMatcher, RawLineReader, DEFAULT_FEED_PATTERN};
pub use types::{FeedBatch, FeedGroup, ParseIssue, RawLine, FIELD_SEPARATOR};
