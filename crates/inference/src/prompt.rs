use feedlens_anonymizer::AnonymizedLine;
use feedlens_parser::FIELD_SEPARATOR;

/// Key prefix for field positions in prompts and persisted mappings.
pub const FIELD_KEY_PREFIX: &str = "Champ";

/// Render the mapping key for a 1-based field position.
#[must_use]
pub fn field_key(position: usize) -> String {
    format!("{FIELD_KEY_PREFIX} {position}")
}

/// Build the schema-inference prompt for one representative line.
///
/// The instructions pin the reply down to a bare JSON object with exactly
/// one `Champ N` key per field; anything else is handled by the
/// extraction/repair step.
#[must_use]
pub fn build_prompt(sample: &AnonymizedLine) -> String {
    let field_count = sample.field_count(FIELD_SEPARATOR);
    format!(
        "You are analyzing one line of a semicolon-delimited feed file.\n\
         The line below belongs to message type \"{msg_type}\" and contains \
         {field_count} fields. Sensitive values have been replaced by \
         placeholders that preserve their shape.\n\
         \n\
         Line: {line}\n\
         \n\
         Reply with a JSON object only. No explanatory text, no code fences.\n\
         The object must contain exactly {field_count} keys, named \
         \"{prefix} 1\" through \"{prefix} {field_count}\" (1-based field \
         positions, left to right).\n\
         Each value must be a short human-readable description of that \
         field's likely meaning.",
        msg_type = sample.msg_type,
        field_count = field_count,
        line = sample.anonymized_line,
        prefix = FIELD_KEY_PREFIX,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AnonymizedLine {
        AnonymizedLine {
            original_line: "077;99;SECRET01;42".to_string(),
            anonymized_line: "077;99;ID_SECRXXXX;NUM_XX".to_string(),
            msg_type: "99".to_string(),
            line_number: 1,
            was_anonymized: true,
        }
    }

    #[test]
    fn field_key_is_one_based() {
        assert_eq!(field_key(1), "Champ 1");
        assert_eq!(field_key(12), "Champ 12");
    }

    #[test]
    fn prompt_carries_line_and_field_count() {
        let prompt = build_prompt(&sample());
        assert!(prompt.contains("077;99;ID_SECRXXXX;NUM_XX"));
        assert!(prompt.contains("4 fields"));
        assert!(prompt.contains("\"Champ 1\" through \"Champ 4\""));
        assert!(prompt.contains("message type \"99\""));
        // The original, un-anonymized text must never reach the prompt.
        assert!(!prompt.contains("SECRET01"));
    }
}
