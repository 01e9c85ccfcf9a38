use serde::{Deserialize, Serialize};

/// A feed line after the anonymization pass. Derived, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnonymizedLine {
    pub original_line: String,
    pub anonymized_line: String,
    pub msg_type: String,
    pub line_number: usize,
    /// True if any field differs from the original.
    pub was_anonymized: bool,
}

impl AnonymizedLine {
    /// Number of separator-delimited fields in the anonymized text.
    #[must_use]
    pub fn field_count(&self, separator: char) -> usize {
        self.anonymized_line.split(separator).count()
    }
}
