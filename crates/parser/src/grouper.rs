use crate::types::{FeedBatch, FeedGroup, ParseIssue, RawLine, FIELD_SEPARATOR};

/// Splits lines on the field separator and groups them by message type.
///
/// The discriminator is the second field (index 1). Lines with fewer than
/// two fields are recorded as issues and skipped; everything else is
/// appended to its group in arrival order.
#[derive(Debug, Clone)]
pub struct FeedParser {
    separator: char,
}

impl FeedParser {
    #[must_use]
    pub fn new(separator: char) -> Self {
        Self { separator }
    }

    #[must_use]
    pub const fn separator(&self) -> char {
        self.separator
    }

    pub fn group(&self, lines: Vec<RawLine>) -> FeedBatch {
        let mut batch = FeedBatch {
            total_lines: lines.len(),
            ..FeedBatch::default()
        };

        for line in lines {
            let fields: Vec<&str> = line.content.split(self.separator).collect();
            if fields.len() < 2 {
                log::debug!(
                    "Skipping malformed line {} of {}: fewer than 2 fields",
                    line.line_number,
                    line.source_file
                );
                batch.issues.push(ParseIssue {
                    line_number: line.line_number,
                    source_file: line.source_file.clone(),
                    reason: format!("expected at least 2 fields, found {}", fields.len()),
                });
                continue;
            }

            let msg_type = fields[1].trim().to_string();
            let source_file = line.source_file.clone();
            batch
                .groups
                .entry(msg_type.clone())
                .or_insert_with(|| FeedGroup::new(msg_type, source_file))
                .push(line);
            batch.valid_lines += 1;
        }

        log::info!(
            "Grouped {} lines into {} message types ({} issues)",
            batch.valid_lines,
            batch.groups.len(),
            batch.issues.len()
        );
        batch
    }
}

impl Default for FeedParser {
    fn default() -> Self {
        Self::new(FIELD_SEPARATOR)
    }
}
