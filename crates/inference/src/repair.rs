use crate::error::{InferenceError, Result};
use std::collections::HashMap;

/// Extract the JSON object from a raw model reply.
///
/// First tries the span between the first `{` and the last `}`. If that
/// span does not parse and the tail after the first `{` mentions a
/// `"Champ` key, a best-effort repair is attempted: a truncated string
/// literal is closed, then the deficit of closing braces (counted outside
/// string literals, ignoring escaped quotes) is appended. The repair is
/// lossy and bounded; if it still does not parse the caller gives up on
/// this message type.
pub fn extract_json_object(raw: &str) -> Result<String> {
    let start = raw.find('{').ok_or(InferenceError::NoJsonObject)?;

    if let Some(end) = raw.rfind('}') {
        if end > start {
            let candidate = &raw[start..=end];
            if serde_json::from_str::<serde_json::Value>(candidate).is_ok() {
                return Ok(candidate.to_string());
            }
        }
    }

    let partial = &raw[start..];
    if !partial.contains("\"Champ") {
        return Err(InferenceError::NoJsonObject);
    }

    log::debug!("Model reply is unbalanced; attempting brace repair");
    repair_braces(partial)
}

fn repair_braces(partial: &str) -> Result<String> {
    let mut depth: i32 = 0;
    let mut in_string = false;
    let mut escaped = false;

    for c in partial.chars() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => depth -= 1,
            _ => {}
        }
    }

    if depth < 0 {
        return Err(InferenceError::NoJsonObject);
    }

    let mut repaired = partial.trim_end().to_string();
    // A reply cut mid-string leaves the literal open; close it so the
    // appended braces land outside.
    if in_string {
        repaired.push('"');
    }
    // A dangling separator before the appended brace would still be
    // invalid JSON.
    while repaired.ends_with(',') || repaired.ends_with(':') {
        repaired.pop();
        if repaired.ends_with('"') {
            break;
        }
    }
    for _ in 0..depth {
        repaired.push('}');
    }
    Ok(repaired)
}

/// Parse a (possibly repaired) JSON object into a field→meaning map.
///
/// Values that are not strings are stringified rather than rejected; the
/// structural requirement is only a non-empty object.
pub fn parse_mapping(json: &str) -> Result<HashMap<String, String>> {
    let value: serde_json::Value = serde_json::from_str(json)
        .map_err(|e| InferenceError::MalformedMapping(e.to_string()))?;

    let object = value
        .as_object()
        .ok_or_else(|| InferenceError::MalformedMapping("reply is not a JSON object".into()))?;
    if object.is_empty() {
        return Err(InferenceError::MalformedMapping("reply object is empty".into()));
    }

    let mut mapping = HashMap::with_capacity(object.len());
    for (key, val) in object {
        let meaning = match val {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        mapping.insert(key.clone(), meaning);
    }
    Ok(mapping)
}
