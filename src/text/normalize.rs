// Unicode normalization and whitespace tokenization.
//
// Every token that enters a corpus passes through NFKC first, so visually
// identical input (full-width latin, compatibility hangul jamo, ligatures)
// yields the same token stream on every run and the same vocabulary order.

use unicode_normalization::UnicodeNormalization;

use crate::error::{EngineError, Result};

/// NFKC-normalize `text`, trim it, and collapse every whitespace run into a
/// single ASCII space.
pub fn normalize_whitespace(text: &str) -> String {
    let normalized: String = text.nfkc().collect();
    normalized.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalize and split raw text into tokens.
///
/// Empty or whitespace-only input produces an empty sequence; rejecting empty
/// documents is the corpus builder's job.
pub fn tokenize(text: &str) -> Vec<String> {
    let normalized = normalize_whitespace(text);
    if normalized.is_empty() {
        return Vec::new();
    }
    normalized.split(' ').map(str::to_string).collect()
}

/// Tokenize raw bytes, failing if they are not UTF-8 text.
pub fn tokenize_bytes(bytes: &[u8]) -> Result<Vec<String>> {
    let text = std::str::from_utf8(bytes).map_err(|e| {
        EngineError::invalid(format!("input is not UTF-8 text: {e}"))
    })?;
    Ok(tokenize(text))
}

/// Normalize a single token. Returns `None` if nothing is left.
pub fn normalize_token(token: &str) -> Option<String> {
    let normalized: String = token.nfkc().collect();
    let trimmed = normalized.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
