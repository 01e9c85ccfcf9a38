use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Default field separator of the feed format.
pub const FIELD_SEPARATOR: char = ';';

/// One non-blank line read from a feed file. Immutable once read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawLine {
    pub content: String,
    /// 1-based line number in the source file.
    pub line_number: usize,
    pub source_file: String,
}

impl RawLine {
    pub fn new(content: impl Into<String>, line_number: usize, source_file: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            line_number,
            source_file: source_file.into(),
        }
    }

    /// A line is usable only if something remains after trimming.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.content.trim().is_empty()
    }
}

/// All lines of one message type, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedGroup {
    pub msg_type: String,
    pub lines: Vec<RawLine>,
    pub source_file: String,
}

impl FeedGroup {
    pub fn new(msg_type: impl Into<String>, source_file: impl Into<String>) -> Self {
        Self {
            msg_type: msg_type.into(),
            lines: Vec::new(),
            source_file: source_file.into(),
        }
    }

    pub fn push(&mut self, line: RawLine) {
        self.lines.push(line);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Non-fatal problem with a single line; recorded, never thrown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseIssue {
    pub line_number: usize,
    pub source_file: String,
    pub reason: String,
}

/// Result of grouping one file's lines by message type.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeedBatch {
    pub groups: HashMap<String, FeedGroup>,
    pub issues: Vec<ParseIssue>,
    pub total_lines: usize,
    pub valid_lines: usize,
}

impl FeedBatch {
    #[must_use]
    pub fn msg_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.groups.keys().cloned().collect();
        types.sort();
        types
    }
}
