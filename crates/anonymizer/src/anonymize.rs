use crate::classify::{classify_field, FieldClass};
use crate::types::AnonymizedLine;
use feedlens_parser::{FeedGroup, RawLine, FIELD_SEPARATOR};
use serde::{Deserialize, Serialize};

/// Replacement token used by the coarse mode for every field from
/// position 3 onward.
pub const COARSE_SENTINEL: &str = "xxxxx";

/// How many leading fields are preserved verbatim in each mode. These are
/// positional/record-type fields, never sensitive.
const CLASSIFIED_PRESERVED_FIELDS: usize = 3;
const COARSE_PRESERVED_FIELDS: usize = 2;

const SHORT_CODE_MAX_LEN: usize = 3;
const IDENTIFIER_VISIBLE_PREFIX: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnonymizationMode {
    /// Per-field classification with structure-preserving placeholders.
    Classified,
    /// Fields 1-2 kept, everything after replaced by a fixed sentinel.
    Coarse,
}

/// Structure-preserving anonymizer for feed lines of unknown message types.
///
/// Both modes keep the exact field count and separator placement so the
/// anonymized row has the same shape as the original.
#[derive(Debug, Clone)]
pub struct Anonymizer {
    mode: AnonymizationMode,
    separator: char,
}

impl Anonymizer {
    #[must_use]
    pub fn new(mode: AnonymizationMode) -> Self {
        Self {
            mode,
            separator: FIELD_SEPARATOR,
        }
    }

    #[must_use]
    pub fn with_separator(mode: AnonymizationMode, separator: char) -> Self {
        Self { mode, separator }
    }

    #[must_use]
    pub const fn mode(&self) -> AnonymizationMode {
        self.mode
    }

    /// Anonymize one raw line of the given message type.
    #[must_use]
    pub fn anonymize_line(&self, line: &RawLine, msg_type: &str) -> AnonymizedLine {
        let fields: Vec<&str> = line.content.split(self.separator).collect();
        let anonymized: Vec<String> = fields
            .iter()
            .enumerate()
            .map(|(idx, field)| self.anonymize_field(idx, field))
            .collect();
        let anonymized_line = anonymized.join(&self.separator.to_string());
        let was_anonymized = anonymized_line != line.content;

        AnonymizedLine {
            original_line: line.content.clone(),
            anonymized_line,
            msg_type: msg_type.to_string(),
            line_number: line.line_number,
            was_anonymized,
        }
    }

    /// Anonymize every line of a group, preserving order.
    #[must_use]
    pub fn anonymize_group(&self, group: &FeedGroup) -> Vec<AnonymizedLine> {
        let out: Vec<AnonymizedLine> = group
            .lines
            .iter()
            .map(|line| self.anonymize_line(line, &group.msg_type))
            .collect();
        log::debug!(
            "Anonymized {} lines of msg_type {} ({:?} mode)",
            out.len(),
            group.msg_type,
            self.mode
        );
        out
    }

    fn anonymize_field(&self, index: usize, field: &str) -> String {
        match self.mode {
            AnonymizationMode::Coarse => {
                if index < COARSE_PRESERVED_FIELDS {
                    field.to_string()
                } else {
                    COARSE_SENTINEL.to_string()
                }
            }
            AnonymizationMode::Classified => {
                if index < CLASSIFIED_PRESERVED_FIELDS {
                    return field.to_string();
                }
                classified_replacement(field)
            }
        }
    }
}

impl Default for Anonymizer {
    fn default() -> Self {
        Self::new(AnonymizationMode::Classified)
    }
}

fn classified_replacement(field: &str) -> String {
    let trimmed = field.trim();
    if trimmed.is_empty() {
        return field.to_string();
    }

    match classify_field(trimmed) {
        // Dates and times carry no identity at this granularity.
        FieldClass::Date | FieldClass::Time => field.to_string(),
        FieldClass::Identifier => {
            let prefix: String = trimmed.chars().take(IDENTIFIER_VISIBLE_PREFIX).collect();
            let hidden = trimmed.chars().count().saturating_sub(IDENTIFIER_VISIBLE_PREFIX);
            format!("ID_{prefix}{}", "X".repeat(hidden))
        }
        FieldClass::Number => format!("NUM_{}", "X".repeat(trimmed.chars().count())),
        FieldClass::Code => {
            let is_short_code = trimmed.chars().count() <= SHORT_CODE_MAX_LEN
                && trimmed.chars().all(char::is_alphanumeric);
            if is_short_code {
                format!("CODE_{trimmed}")
            } else {
                format!("CODE_{}", "X".repeat(trimmed.chars().count()))
            }
        }
    }
}
