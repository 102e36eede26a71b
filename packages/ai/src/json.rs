//! JSON extraction from model output.
//!
//! Models asked for JSON still occasionally wrap it in markdown fences or
//! prefix a sentence. Parsing tries, in order: the whole trimmed text, the
//! body of the first fenced block, then the first complete JSON value found
//! anywhere in the text.

use serde::de::DeserializeOwned;

use crate::AiError;

/// Parses a JSON document out of a model response.
///
/// # Errors
///
/// Returns [`AiError::EmptyResponse`] for blank input and
/// [`AiError::InvalidResponse`] if no strategy yields a value of type `T`.
pub fn parse_json<T: DeserializeOwned>(content: &str) -> Result<T, AiError> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(AiError::EmptyResponse);
    }

    if let Ok(parsed) = serde_json::from_str::<T>(trimmed) {
        return Ok(parsed);
    }

    if let Some(block) = extract_fenced_block(trimmed)
        && let Ok(parsed) = serde_json::from_str::<T>(block)
    {
        return Ok(parsed);
    }

    if let Some(value) = extract_first_json_value(trimmed)
        && let Ok(parsed) = serde_json::from_str::<T>(value)
    {
        return Ok(parsed);
    }

    Err(AiError::InvalidResponse {
        message: "no valid JSON document in model response".to_string(),
    })
}

/// Returns the body of the first ```` ``` ```` fenced block, skipping an
/// optional language tag.
fn extract_fenced_block(content: &str) -> Option<&str> {
    let start = content.find("```")?;
    let after = &content[start + 3..];
    let body_start = after.find('\n')? + 1;
    let body = &after[body_start..];
    let end = body.find("```")?;
    Some(body[..end].trim())
}

/// Returns the first complete JSON object or array embedded in the text.
fn extract_first_json_value(content: &str) -> Option<&str> {
    for (idx, ch) in content.char_indices() {
        if ch != '{' && ch != '[' {
            continue;
        }
        let candidate = &content[idx..];
        let mut stream =
            serde_json::Deserializer::from_str(candidate).into_iter::<serde_json::Value>();
        if let Some(Ok(_)) = stream.next() {
            let end = stream.byte_offset();
            return Some(&candidate[..end]);
        }
    }
    None
}
