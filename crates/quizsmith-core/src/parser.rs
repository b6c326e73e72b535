//! Candidate batch parsing for generation service output.
//!
//! Responses arrive as free text that usually contains a JSON array, often
//! wrapped in fenced delimiter markup. This module strips the markup and
//! attempts a structural parse; any failure becomes
//! `GenerationError::MalformedOutput`, never a panic.

use serde_json::Value;

use crate::error::GenerationError;
use crate::traits::RawCandidate;

/// Extract the JSON payload from a possibly fence-wrapped response.
///
/// Handles:
/// - ```json fenced blocks (preferred when present)
/// - generic ``` fenced blocks
/// - truncated (unclosed) fenced blocks
/// - raw text with no fences (returned as-is)
pub fn extract_json_payload(response: &str) -> String {
    let mut tagged_blocks = Vec::new();
    let mut generic_blocks = Vec::new();
    let mut in_block = false;
    let mut is_tagged = false;
    let mut is_generic = false;
    let mut current = String::new();

    for line in response.lines() {
        let trimmed = line.trim();

        if !in_block && trimmed.starts_with("```") {
            in_block = true;
            let lang = trimmed.trim_start_matches('`').trim().to_lowercase();
            is_tagged = lang == "json";
            is_generic = lang.is_empty();
            current.clear();
            continue;
        }

        if in_block && trimmed == "```" {
            in_block = false;
            if is_tagged {
                tagged_blocks.push(current.clone());
            } else if is_generic {
                generic_blocks.push(current.clone());
            }
            current.clear();
            continue;
        }

        if in_block {
            if !current.is_empty() {
                current.push('\n');
            }
            current.push_str(line);
        }
    }

    // Truncated (unclosed) blocks still count
    if in_block && !current.is_empty() {
        if is_tagged {
            tagged_blocks.push(current);
        } else if is_generic {
            generic_blocks.push(current);
        }
    }

    if let Some(block) = tagged_blocks.into_iter().next() {
        return block;
    }
    if let Some(block) = generic_blocks.into_iter().next() {
        return block;
    }
    response.trim().to_string()
}

/// Parse a response body into raw candidates.
///
/// Accepts either a top-level JSON array or an object carrying a
/// `questions` array. Array entries that fail to deserialize become
/// default (empty) candidates and fall through to the validator.
pub fn parse_candidates(response: &str) -> Result<Vec<RawCandidate>, GenerationError> {
    let payload = extract_json_payload(response);

    let value: Value = serde_json::from_str(&payload)
        .map_err(|e| GenerationError::MalformedOutput(format!("not valid JSON: {e}")))?;

    let entries = match value {
        Value::Array(entries) => entries,
        Value::Object(mut map) => match map.remove("questions") {
            Some(Value::Array(entries)) => entries,
            _ => {
                return Err(GenerationError::MalformedOutput(
                    "expected a JSON array of questions".into(),
                ))
            }
        },
        _ => {
            return Err(GenerationError::MalformedOutput(
                "expected a JSON array of questions".into(),
            ))
        }
    };

    Ok(entries
        .into_iter()
        .map(|entry| serde_json::from_value(entry).unwrap_or_default())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const BATCH: &str = r#"[
        {"question": "What is 2 + 2?", "choices": ["3", "4", "5", "6"], "answer": "4",
         "concepts": ["arithmetic"], "explanation": "Two plus two equals four."},
        {"question": "What is 3 x 3?", "choices": ["6", "7", "8", "9"], "answer": "9"}
    ]"#;

    #[test]
    fn parse_plain_array() {
        let candidates = parse_candidates(BATCH).unwrap();
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].question, "What is 2 + 2?");
        assert_eq!(candidates[0].concepts, vec!["arithmetic"]);
        assert_eq!(candidates[1].answer, "9");
        assert!(candidates[1].explanation.is_empty());
    }

    #[test]
    fn parse_json_fenced_array() {
        let fenced = format!("Here is your quiz:\n\n```json\n{BATCH}\n```\n\nEnjoy!");
        let candidates = parse_candidates(&fenced).unwrap();
        assert_eq!(candidates.len(), 2);
    }

    #[test]
    fn parse_generic_fenced_array() {
        let fenced = format!("```\n{BATCH}\n```");
        let candidates = parse_candidates(&fenced).unwrap();
        assert_eq!(candidates.len(), 2);
    }

    #[test]
    fn parse_truncated_unclosed_fence() {
        let fenced = format!("```json\n{BATCH}");
        let candidates = parse_candidates(&fenced).unwrap();
        assert_eq!(candidates.len(), 2);
    }

    #[test]
    fn parse_prefers_json_tagged_block() {
        let mixed = format!("```\nnot the payload\n```\n\n```json\n{BATCH}\n```");
        let candidates = parse_candidates(&mixed).unwrap();
        assert_eq!(candidates.len(), 2);
    }

    #[test]
    fn parse_questions_wrapper_object() {
        let wrapped = format!(r#"{{"questions": {BATCH}}}"#);
        let candidates = parse_candidates(&wrapped).unwrap();
        assert_eq!(candidates.len(), 2);
    }

    #[test]
    fn prose_is_malformed_output() {
        let err = parse_candidates("Sorry, I cannot generate a quiz today.").unwrap_err();
        assert!(matches!(err, GenerationError::MalformedOutput(_)));
    }

    #[test]
    fn bare_scalar_is_malformed_output() {
        let err = parse_candidates("42").unwrap_err();
        assert!(matches!(err, GenerationError::MalformedOutput(_)));
    }

    #[test]
    fn object_without_questions_is_malformed_output() {
        let err = parse_candidates(r#"{"quiz": "nope"}"#).unwrap_err();
        assert!(matches!(err, GenerationError::MalformedOutput(_)));
    }

    #[test]
    fn non_object_entries_become_default_candidates() {
        let candidates = parse_candidates(r#"["just a string", 7]"#).unwrap();
        assert_eq!(candidates.len(), 2);
        assert!(candidates.iter().all(|c| c.question.is_empty()));
    }
}
