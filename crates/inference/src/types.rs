use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Transient output of schema inference: one field→meaning map applied to
/// one original line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldMapping {
    pub msg_type: String,
    /// `"Champ N"` → short description of the field's likely meaning.
    pub mapping: HashMap<String, String>,
    pub sample_original_line: String,
    pub sample_anonymized_line: String,
    pub field_count: usize,
}

impl FieldMapping {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.msg_type.is_empty() && !self.mapping.is_empty()
    }

    /// Mapping entries sorted by 1-based field position, for rendering.
    #[must_use]
    pub fn ordered_entries(&self) -> Vec<(&str, &str)> {
        let mut entries: Vec<(&str, &str)> = self
            .mapping
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        entries.sort_by_key(|(key, _)| field_position(key));
        entries
    }
}

fn field_position(key: &str) -> usize {
    key.rsplit(' ')
        .next()
        .and_then(|n| n.parse().ok())
        .unwrap_or(usize::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordered_entries_sort_numerically() {
        let mut mapping = HashMap::new();
        mapping.insert("Champ 10".to_string(), "tenth".to_string());
        mapping.insert("Champ 2".to_string(), "second".to_string());
        mapping.insert("Champ 1".to_string(), "first".to_string());

        let fm = FieldMapping {
            msg_type: "99".to_string(),
            mapping,
            sample_original_line: String::new(),
            sample_anonymized_line: String::new(),
            field_count: 10,
        };
        let keys: Vec<&str> = fm.ordered_entries().iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec!["Champ 1", "Champ 2", "Champ 10"]);
    }

    #[test]
    fn validity_requires_type_and_map() {
        let empty = FieldMapping {
            msg_type: String::new(),
            mapping: HashMap::new(),
            sample_original_line: String::new(),
            sample_anonymized_line: String::new(),
            field_count: 0,
        };
        assert!(!empty.is_valid());
    }
}
