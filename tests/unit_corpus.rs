// Unit tests for the input boundary: dataset files on disk, token cells,
// and corpus validation as seen through the public API.

use std::fs;

use newsprint::corpus::loader::{load_dataset, ColumnSpec};
use newsprint::corpus::{Corpus, Metadata};
use newsprint::error::EngineError;
use newsprint::text::{parse_token_string, tokenize, CellFormat};

fn columns(metadata: Option<&str>) -> ColumnSpec {
    ColumnSpec {
        metadata: metadata.map(str::to_string),
        ..ColumnSpec::default()
    }
}

// ============================================================
// Dataset files
// ============================================================

#[test]
fn loads_json_array_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("articles.json");
    fs::write(
        &path,
        r#"[
            {"doc_split_12gram": ["조선", "독립"], "grid_1": "A"},
            {"doc_split_12gram": "['신간', '소개']", "grid_1": "B"},
            {"doc_split_12gram": [], "grid_1": "A"}
        ]"#,
    )
    .unwrap();

    let loaded = load_dataset(&path, &columns(Some("grid_1"))).unwrap();
    assert_eq!(loaded.corpus.len(), 2);
    assert_eq!(loaded.skipped_rows, vec![2]);
    assert!(loaded.corpus.has_metadata());
    assert_eq!(
        loaded.corpus.documents()[1].metadata(),
        Some(&Metadata::from("B"))
    );
}

#[test]
fn loads_json_lines_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("articles.jsonl");
    fs::write(
        &path,
        "{\"doc_split_12gram\": \"농촌 수확\"}\n\n{\"doc_split_12gram\": [\"풍년\"]}\n",
    )
    .unwrap();

    let loaded = load_dataset(&path, &columns(None)).unwrap();
    assert_eq!(loaded.corpus.len(), 2);
    assert_eq!(loaded.corpus.documents()[0].tokens(), &["농촌", "수확"]);
    assert!(!loaded.corpus.has_metadata());
}

#[test]
fn non_array_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.json");
    fs::write(&path, r#"{"doc_split_12gram": ["a"]}"#).unwrap();
    assert!(load_dataset(&path, &columns(None)).is_err());
}

#[test]
fn missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_dataset(&dir.path().join("nope.json"), &columns(None)).unwrap_err();
    assert!(err.to_string().contains("nope.json"));
}

// ============================================================
// Token cells and normalization
// ============================================================

#[test]
fn string_cells_try_list_literal_first() {
    let (tokens, format) = parse_token_string("['가', '나']");
    assert_eq!(tokens, vec!["가", "나"]);
    assert_eq!(format, CellFormat::ListLiteral);

    let (tokens, format) = parse_token_string("가  나\t다");
    assert_eq!(tokens, vec!["가", "나", "다"]);
    assert_eq!(format, CellFormat::Whitespace);
}

#[test]
fn tokenize_is_reproducible() {
    let text = "  경성　전차\n개통 ";
    assert_eq!(tokenize(text), tokenize(text));
    assert_eq!(tokenize(text), vec!["경성", "전차", "개통"]);
}

// ============================================================
// Corpus validation
// ============================================================

#[test]
fn numeric_metadata_is_accepted_when_consistent() {
    let corpus = Corpus::build(vec![
        (vec!["a"], Some(Metadata::from(1_i64))),
        (vec!["b"], Some(Metadata::from(2_i64))),
    ])
    .unwrap();
    assert_eq!(corpus.documents()[1].metadata().map(Metadata::key), Some("2".to_string()));
}

#[test]
fn empty_token_list_names_its_index() {
    let err = Corpus::from_tokens(vec![vec!["a"], vec!["b"], vec![]]).unwrap_err();
    assert_eq!(err, EngineError::EmptyDocument { index: 2 });
}
