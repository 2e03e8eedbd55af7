// Token cell parsing: the input boundary for stored token lists.
//
// Spreadsheets exported by the preprocessing step store a document's tokens
// either as a real list or as the *string form* of a list, e.g.
// "['사회', '주의']". Parsing is two-stage: try to read a serialized list
// (JSON or Python-style literal), and only if the string is not a list
// literal fall back to plain whitespace tokenization.

use std::sync::LazyLock;

use regex_lite::Regex;
use serde_json::Value;

use super::normalize::{normalize_token, tokenize};
use crate::error::{EngineError, Result};

/// Matches one quoted item of a Python list literal, single or double quoted.
static QUOTED_ITEM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"'((?:[^'\\]|\\.)*)'|"((?:[^"\\]|\\.)*)""#).expect("static regex")
});

/// Which branch of the two-stage parse produced the tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellFormat {
    /// The cell was already an array of strings.
    Array,
    /// The cell was a string holding a serialized list.
    ListLiteral,
    /// The cell was free text split on whitespace.
    Whitespace,
}

/// Parse a dataset cell into tokens.
///
/// Arrays must contain only strings. Null, numbers, booleans and objects are
/// rejected as not being text.
pub fn parse_token_cell(value: &Value) -> Result<Vec<String>> {
    parse_token_cell_with_format(value).map(|(tokens, _)| tokens)
}

/// Like [`parse_token_cell`], also reporting which parse branch was taken.
pub fn parse_token_cell_with_format(value: &Value) -> Result<(Vec<String>, CellFormat)> {
    match value {
        Value::Array(items) => Ok((tokens_from_array(items)?, CellFormat::Array)),
        Value::String(text) => Ok(parse_token_string(text)),
        Value::Null => Err(EngineError::invalid("token cell is null")),
        other => Err(EngineError::invalid(format!(
            "token cell must be a list or a string, got {}",
            json_kind(other)
        ))),
    }
}

/// Parse a string cell: serialized list first, whitespace split second.
pub fn parse_token_string(text: &str) -> (Vec<String>, CellFormat) {
    match parse_list_literal(text) {
        Some(items) => (
            items.iter().filter_map(|t| normalize_token(t)).collect(),
            CellFormat::ListLiteral,
        ),
        None => (tokenize(text), CellFormat::Whitespace),
    }
}

/// Try to read `text` as a JSON array of strings or a Python list literal of
/// quoted strings. Returns `None` if it is neither.
pub fn parse_list_literal(text: &str) -> Option<Vec<String>> {
    let trimmed = text.trim();
    if !(trimmed.starts_with('[') && trimmed.ends_with(']')) {
        return None;
    }

    if let Ok(items) = serde_json::from_str::<Vec<String>>(trimmed) {
        return Some(items);
    }

    let inner = &trimmed[1..trimmed.len() - 1];
    let mut items = Vec::new();
    let mut last_end = 0;
    for caps in QUOTED_ITEM.captures_iter(inner) {
        let whole = caps.get(0)?;
        // Only separators may sit between quoted items
        if !is_separator(&inner[last_end..whole.start()], items.is_empty()) {
            return None;
        }
        let raw = caps.get(1).or_else(|| caps.get(2))?.as_str();
        items.push(unescape(raw));
        last_end = whole.end();
    }

    let tail = inner[last_end..].trim();
    if !(tail.is_empty() || tail == ",") {
        return None;
    }
    if items.is_empty() && !inner.trim().is_empty() {
        return None;
    }
    Some(items)
}

fn tokens_from_array(items: &[Value]) -> Result<Vec<String>> {
    items
        .iter()
        .enumerate()
        .filter_map(|(i, item)| match item {
            Value::String(s) => normalize_token(s).map(Ok),
            other => Some(Err(EngineError::invalid(format!(
                "token list item {i} is {}, expected a string",
                json_kind(other)
            )))),
        })
        .collect()
}

fn is_separator(gap: &str, first: bool) -> bool {
    let gap = gap.trim();
    if first {
        gap.is_empty()
    } else {
        gap == ","
    }
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_array_cell() {
        let tokens = parse_token_cell(&json!(["사회", "주의", " "])).unwrap();
        assert_eq!(tokens, vec!["사회", "주의"]);
    }

    #[test]
    fn test_array_with_number_rejected() {
        let err = parse_token_cell(&json!(["a", 1])).unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput(_)));
    }

    #[test]
    fn test_python_literal() {
        let (tokens, format) = parse_token_string("['개벽', \"잡지\", 'it\\'s']");
        assert_eq!(tokens, vec!["개벽", "잡지", "it's"]);
        assert_eq!(format, CellFormat::ListLiteral);
    }

    #[test]
    fn test_json_literal() {
        let (tokens, format) = parse_token_string(r#"["a", "b"]"#);
        assert_eq!(tokens, vec!["a", "b"]);
        assert_eq!(format, CellFormat::ListLiteral);
    }

    #[test]
    fn test_empty_literal() {
        let (tokens, format) = parse_token_string("[]");
        assert!(tokens.is_empty());
        assert_eq!(format, CellFormat::ListLiteral);
    }

    #[test]
    fn test_falls_back_to_whitespace() {
        let (tokens, format) = parse_token_string("사회 주의  운동");
        assert_eq!(tokens, vec!["사회", "주의", "운동"]);
        assert_eq!(format, CellFormat::Whitespace);
    }

    #[test]
    fn test_malformed_literal_falls_back() {
        // Unquoted items are not a list literal
        let (tokens, format) = parse_token_string("[a b]");
        assert_eq!(tokens, vec!["[a", "b]"]);
        assert_eq!(format, CellFormat::Whitespace);
    }

    #[test]
    fn test_non_text_cells_rejected() {
        for cell in [json!(null), json!(3), json!(true), json!({"a": 1})] {
            assert!(parse_token_cell(&cell).is_err(), "{cell} should be rejected");
        }
    }
}
