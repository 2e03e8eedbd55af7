// Dataset loading: the boundary with the preprocessing collaborator.
//
// The preprocessing step hands over a table exported as JSON (an array of
// row objects) or JSON Lines. One column holds each row's tokens, another
// optionally holds the covariate. Rows whose tokens are empty after parsing
// are dropped here, before the corpus builder would reject them.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use tracing::{info, warn};

use super::{Corpus, CorpusBuilder, Metadata};
use crate::text::cell::{json_kind, parse_token_cell};

/// Column names for a dataset.
#[derive(Debug, Clone)]
pub struct ColumnSpec {
    /// Column holding the token list (or its string form)
    pub tokens: String,
    /// Optional covariate column
    pub metadata: Option<String>,
    /// Optional column naming each row; rows are numbered otherwise
    pub id: Option<String>,
}

impl Default for ColumnSpec {
    fn default() -> Self {
        Self {
            tokens: "doc_split_12gram".to_string(),
            metadata: None,
            id: None,
        }
    }
}

/// A corpus plus the source rows that were skipped while loading it.
#[derive(Debug)]
pub struct LoadedDataset {
    pub corpus: Corpus,
    /// Zero-based source row numbers dropped because they had no tokens
    pub skipped_rows: Vec<usize>,
}

/// Load a dataset file. `.jsonl`/`.ndjson` files are read line by line;
/// anything else must be a JSON array of objects.
pub fn load_dataset(path: &Path, columns: &ColumnSpec) -> Result<LoadedDataset> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read dataset {}", path.display()))?;

    let is_lines = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("jsonl") | Some("ndjson")
    );
    let rows = if is_lines {
        parse_json_lines(&text)?
    } else {
        let value: Value = serde_json::from_str(&text)
            .with_context(|| format!("{} is not valid JSON", path.display()))?;
        match value {
            Value::Array(rows) => rows,
            other => anyhow::bail!(
                "{} must contain a JSON array of rows, found {}",
                path.display(),
                json_kind(&other)
            ),
        }
    };

    let dataset = dataset_from_rows(&rows, columns)?;
    info!(
        path = %path.display(),
        documents = dataset.corpus.len(),
        skipped = dataset.skipped_rows.len(),
        "Loaded dataset"
    );
    Ok(dataset)
}

/// Build a corpus from already-parsed row objects.
pub fn dataset_from_rows(rows: &[Value], columns: &ColumnSpec) -> Result<LoadedDataset> {
    let mut builder = CorpusBuilder::new();
    let mut skipped_rows = Vec::new();

    for (row_index, row) in rows.iter().enumerate() {
        let object = row
            .as_object()
            .with_context(|| format!("Row {row_index} is {}, expected an object", json_kind(row)))?;

        let cell = object.get(&columns.tokens).with_context(|| {
            format!("Row {row_index} has no '{}' column", columns.tokens)
        })?;
        let tokens = parse_token_cell(cell)
            .with_context(|| format!("Row {row_index}, column '{}'", columns.tokens))?;

        if tokens.is_empty() {
            warn!(row = row_index, "Skipping row with no tokens");
            skipped_rows.push(row_index);
            continue;
        }

        let metadata = match &columns.metadata {
            Some(column) => metadata_cell(object, column, row_index)?,
            None => None,
        };

        match &columns.id {
            Some(column) => {
                let id = id_cell(object, column, row_index)?;
                builder.push_with_id(id, tokens, metadata);
            }
            None => {
                builder.push(tokens, metadata);
            }
        }
    }

    let corpus = builder.build().context("Dataset does not form a valid corpus")?;
    Ok(LoadedDataset {
        corpus,
        skipped_rows,
    })
}

fn parse_json_lines(text: &str) -> Result<Vec<Value>> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(n, line)| {
            serde_json::from_str(line).with_context(|| format!("Line {} is not valid JSON", n + 1))
        })
        .collect()
}

fn metadata_cell(
    object: &Map<String, Value>,
    column: &str,
    row_index: usize,
) -> Result<Option<Metadata>> {
    let value = object
        .get(column)
        .with_context(|| format!("Row {row_index} has no '{column}' column"))?;
    Ok(match value {
        Value::Null => None,
        Value::String(s) => Some(Metadata::Label(s.clone())),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Some(Metadata::Integer(i)),
            None => Some(Metadata::Number(n.as_f64().unwrap_or(f64::NAN))),
        },
        other => anyhow::bail!(
            "Row {row_index}, column '{column}': metadata must be a string or number, got {}",
            json_kind(other)
        ),
    })
}

fn id_cell(object: &Map<String, Value>, column: &str, row_index: usize) -> Result<String> {
    match object.get(column) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(other) => anyhow::bail!(
            "Row {row_index}, column '{column}': id must be a string or number, got {}",
            json_kind(other)
        ),
        None => anyhow::bail!("Row {row_index} has no '{column}' column"),
    }
}
