use feedlens_anonymizer::Anonymizer;
use feedlens_parser::{FeedBatch, ParseIssue, FIELD_SEPARATOR};
use serde::Serialize;
use std::path::Path;

/// JSON report printed by `feedlens inspect`.
#[derive(Debug, Serialize)]
pub struct InspectReport {
    pub file: String,
    pub total_lines: usize,
    pub valid_lines: usize,
    pub issues: Vec<ParseIssue>,
    pub groups: Vec<GroupReport>,
}

#[derive(Debug, Serialize)]
pub struct GroupReport {
    pub msg_type: String,
    pub line_count: usize,
    pub field_count: usize,
    pub sample_anonymized: String,
    pub any_field_anonymized: bool,
}

impl InspectReport {
    pub fn build(file: &Path, batch: &FeedBatch, anonymizer: &Anonymizer) -> Self {
        let mut groups = Vec::new();
        for msg_type in batch.msg_types() {
            let group = &batch.groups[&msg_type];
            let anonymized = anonymizer.anonymize_group(group);
            let sample = anonymized.first();
            groups.push(GroupReport {
                msg_type,
                line_count: group.len(),
                field_count: sample
                    .map(|line| line.field_count(FIELD_SEPARATOR))
                    .unwrap_or(0),
                sample_anonymized: sample
                    .map(|line| line.anonymized_line.clone())
                    .unwrap_or_default(),
                any_field_anonymized: anonymized.iter().any(|line| line.was_anonymized),
            });
        }

        Self {
            file: file.display().to_string(),
            total_lines: batch.total_lines,
            valid_lines: batch.valid_lines,
            issues: batch.issues.clone(),
            groups,
        }
    }
}
