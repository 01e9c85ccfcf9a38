use crate::error::{ParserError, Result};
use crate::types::RawLine;
use globset::{Glob, GlobMatcher};
use std::path::Path;

pub const DEFAULT_FEED_PATTERN: &str = "FEED*.txt";

/// Matches file names against the configured feed glob.
#[derive(Debug, Clone)]
pub struct FeedFileMatcher {
    matcher: GlobMatcher,
}

impl FeedFileMatcher {
    pub fn new(pattern: &str) -> Result<Self> {
        let glob = Glob::new(pattern).map_err(|source| ParserError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self {
            matcher: glob.compile_matcher(),
        })
    }

    /// Check the file name only; the directory part is the watcher's concern.
    #[must_use]
    pub fn is_feed_file(&self, path: &Path) -> bool {
        path.file_name()
            .map(|name| self.matcher.is_match(name))
            .unwrap_or(false)
    }
}

impl Default for FeedFileMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_FEED_PATTERN).expect("default feed pattern is valid")
    }
}

/// Reads a feed file into trimmed, numbered lines, skipping blanks.
pub struct RawLineReader {
    max_file_size: u64,
}

impl RawLineReader {
    #[must_use]
    pub fn new(max_file_size: u64) -> Self {
        Self { max_file_size }
    }

    /// Read the whole file. Oversized files are rejected before reading.
    pub fn read_lines(&self, path: &Path) -> Result<Vec<RawLine>> {
        let meta = std::fs::metadata(path)?;
        if meta.len() > self.max_file_size {
            return Err(ParserError::FileTooLarge {
                path: path.display().to_string(),
                size: meta.len(),
                limit: self.max_file_size,
            });
        }

        let source = path.display().to_string();
        let contents = std::fs::read_to_string(path)?;
        let mut lines = Vec::new();
        for (idx, raw) in contents.lines().enumerate() {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                continue;
            }
            lines.push(RawLine::new(trimmed, idx + 1, source.clone()));
        }

        log::debug!("Read {} non-blank lines from {}", lines.len(), source);
        Ok(lines)
    }
}

impl Default for RawLineReader {
    fn default() -> Self {
        // 10 MiB, matching the default ingest config.
        Self::new(10 * 1024 * 1024)
    }
}
