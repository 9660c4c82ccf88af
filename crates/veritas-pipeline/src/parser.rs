//! Parsing of semi-structured model output.
//!
//! Models asked for "JSON only" still tend to wrap the object in a markdown
//! code fence. The parser strips one fence and decodes the rest; failures are
//! returned as values carrying the raw text, never as panics.

use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::warn;

const FENCE: &str = "```";

/// The model output could not be decoded.
#[derive(Debug, Clone, Error)]
#[error("Could not decode JSON from response: {message}")]
pub struct ParseError {
    /// Text exactly as the model returned it
    pub raw: String,
    pub message: String,
}

/// Remove a surrounding triple-backtick fence, with or without a language tag.
///
/// Text without a leading fence is returned trimmed but otherwise untouched.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix(FENCE) else {
        return trimmed;
    };

    // Language tag runs up to the first line break; a single-line fence
    // (```{"a":1}```) has none.
    let body = match rest.find('\n') {
        Some(newline) if is_language_tag(&rest[..newline]) => &rest[newline + 1..],
        _ if rest.get(..4).is_some_and(|tag| tag.eq_ignore_ascii_case("json")) => &rest[4..],
        _ => rest,
    };

    body.trim_end()
        .strip_suffix(FENCE)
        .unwrap_or(body)
        .trim()
}

fn is_language_tag(candidate: &str) -> bool {
    candidate
        .trim()
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Decode model output into `T`, tolerating a markdown code fence.
pub fn parse_structured<T: DeserializeOwned>(text: &str) -> Result<T, ParseError> {
    let body = strip_code_fence(text);
    serde_json::from_str(body).map_err(|e| {
        warn!("Could not decode JSON from response: {}", e);
        warn!("Response was: {}", text);
        ParseError {
            raw: text.to_string(),
            message: e.to_string(),
        }
    })
}
