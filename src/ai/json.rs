//! JSON extraction for LLM text responses
//!
//! Models wrap JSON in markdown fences, prepend prose, or leave trailing
//! commas. [`extract_json`] undoes the common cases before giving up.

use serde_json::Value;
use tracing::debug;

use crate::types::{DocSyncError, ErrorCategory, LlmError, Result};

/// Parse the JSON value embedded in an LLM response
pub fn extract_json(content: &str) -> Result<Value> {
    let cleaned = preprocess(content);

    if let Ok(value) = serde_json::from_str::<Value>(&cleaned) {
        return Ok(value);
    }

    debug!("Direct JSON parse failed, attempting repair");
    let repaired = fix_trailing_commas(&cleaned);
    if let Ok(value) = serde_json::from_str::<Value>(&repaired) {
        return Ok(value);
    }

    if let Some(extracted) = outermost_object(&repaired)
        && let Ok(value) = serde_json::from_str::<Value>(extracted)
    {
        debug!("JSON extracted from mixed content");
        return Ok(value);
    }

    Err(DocSyncError::Llm(LlmError::new(
        ErrorCategory::ParseError,
        format!(
            "Response is not valid JSON. Content preview: {}...",
            cleaned.chars().take(200).collect::<String>()
        ),
    )))
}

fn preprocess(raw: &str) -> String {
    let s = raw.trim().trim_start_matches('\u{feff}').trim();
    strip_code_fences(s).trim().to_string()
}

/// Strip a surrounding ```json ... ``` fence
fn strip_code_fences(s: &str) -> &str {
    let mut result = s;

    if result.starts_with("```")
        && let Some(first_newline) = result.find('\n')
    {
        result = &result[first_newline + 1..];
    }

    if let Some(stripped) = result.trim_end().strip_suffix("```") {
        result = stripped;
    }

    result
}

/// Drop commas directly followed (modulo whitespace) by `]` or `}`, outside strings
fn fix_trailing_commas(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::with_capacity(s.len());
    let mut in_string = false;
    let mut escape = false;

    for (i, &ch) in chars.iter().enumerate() {
        if escape {
            escape = false;
            result.push(ch);
            continue;
        }
        match ch {
            '\\' if in_string => escape = true,
            '"' => in_string = !in_string,
            ',' if !in_string => {
                let next = chars[i + 1..].iter().find(|c| !c.is_whitespace());
                if matches!(next, Some(']') | Some('}')) {
                    continue;
                }
            }
            _ => {}
        }
        result.push(ch);
    }

    result
}

/// Slice from the first `{` to its matching `}`
fn outermost_object(s: &str) -> Option<&str> {
    let start = s.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape = false;

    for (offset, ch) in s[start..].char_indices() {
        if escape {
            escape = false;
            continue;
        }
        match ch {
            '\\' if in_string => escape = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(&s[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }

    None
}
