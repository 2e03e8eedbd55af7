// Unit tests for frequency-ranked term features.
//
// Covers the shape contract (one row per document, min(rank_n, |V|)
// columns), lexicographic tie-breaking, stopword handling, TF-IDF
// normalization, and the error cases.

use std::collections::HashSet;

use newsprint::corpus::Corpus;
use newsprint::error::EngineError;
use newsprint::features::frequency::{
    extract, term_document_matrix, FrequencyConfig, FrequencyExtractor, Weighting,
};
use newsprint::features::traits::FeatureExtractor;

fn corpus(docs: &[&str]) -> Corpus {
    Corpus::from_tokens(docs.iter().map(|d| d.split_whitespace().collect::<Vec<_>>())).unwrap()
}

fn config(rank_n: usize, weighting: Weighting) -> FrequencyConfig {
    FrequencyConfig {
        stopwords: HashSet::new(),
        rank_n,
        weighting,
    }
}

// ============================================================
// Shape
// ============================================================

#[test]
fn rows_match_documents_and_columns_are_capped_by_vocabulary() {
    let c = corpus(&["정부 예산 정부", "예산 국회", "국회 의원 선거"]);

    let wide = extract(&c, &config(50, Weighting::TfIdf)).unwrap();
    assert_eq!(wide.n_rows(), 3);
    assert_eq!(wide.n_columns(), 5);

    let narrow = extract(&c, &config(2, Weighting::TfIdf)).unwrap();
    assert_eq!(narrow.n_rows(), 3);
    assert_eq!(narrow.n_columns(), 2);
    assert!(narrow.rows.iter().all(|row| row.len() == 2));
}

#[test]
fn row_labels_follow_corpus_order() {
    let c = corpus(&["a b", "c", "d e"]);
    let features = extract(&c, &config(10, Weighting::RawCount)).unwrap();
    assert_eq!(features.row_labels, vec!["doc1", "doc2", "doc3"]);
}

// ============================================================
// Ranking
// ============================================================

#[test]
fn fruit_articles_keep_three_highest_counts_with_tie_at_cutoff() {
    // apple 4, banana 3, then cherry / date / pie tied at 2 for the last column
    let c = corpus(&[
        "apple banana apple",
        "banana apple pie",
        "apple cherry",
        "banana cherry date",
        "pie date",
    ]);
    let features = extract(&c, &config(3, Weighting::RawCount)).unwrap();

    assert_eq!(features.column_labels, vec!["apple", "banana", "cherry"]);
    assert_eq!(
        features.rows,
        vec![
            vec![2.0, 1.0, 0.0],
            vec![1.0, 1.0, 0.0],
            vec![1.0, 0.0, 1.0],
            vec![0.0, 1.0, 1.0],
            vec![0.0, 0.0, 0.0],
        ]
    );
}

#[test]
fn equal_weights_are_ordered_lexicographically() {
    let c = corpus(&["b a", "c"]);
    let features = extract(&c, &config(2, Weighting::RawCount)).unwrap();
    assert_eq!(features.column_labels, vec!["a", "b"]);
}

#[test]
fn heavier_terms_rank_first() {
    let c = corpus(&["z z z y", "z y x"]);
    let features = extract(&c, &config(3, Weighting::RawCount)).unwrap();
    assert_eq!(features.column_labels, vec!["z", "y", "x"]);
    assert_eq!(features.column("z"), Some(vec![3.0, 1.0]));
}

#[test]
fn ranking_is_deterministic() {
    let c = corpus(&["가 나 다 라", "나 다 라 마", "다 라 마 바"]);
    let a = extract(&c, &config(4, Weighting::TfIdf)).unwrap();
    let b = extract(&c, &config(4, Weighting::TfIdf)).unwrap();
    assert_eq!(a, b);
}

// ============================================================
// Weighting
// ============================================================

#[test]
fn tfidf_rows_are_unit_length() {
    let c = corpus(&["a b b c", "a c", "d d"]);
    let matrix = term_document_matrix(&c, &HashSet::new(), Weighting::TfIdf).unwrap();
    let dense = matrix.to_dense();
    for row in &dense.rows {
        let norm = row.iter().map(|x| x * x).sum::<f64>().sqrt();
        assert!((norm - 1.0).abs() < 1e-9, "norm was {norm}");
    }
}

#[test]
fn tfidf_uses_smoothed_idf() {
    // "a" appears in both documents, "b" in one: idf(a) = 1, idf(b) = ln(3/2) + 1
    let c = corpus(&["a b", "a"]);
    let matrix = term_document_matrix(&c, &HashSet::new(), Weighting::TfIdf).unwrap();
    let idf_b = (1.5_f64).ln() + 1.0;
    let norm = (1.0 + idf_b * idf_b).sqrt();
    assert!((matrix.weight(0, "a") - 1.0 / norm).abs() < 1e-12);
    assert!((matrix.weight(0, "b") - idf_b / norm).abs() < 1e-12);
    assert!((matrix.weight(1, "a") - 1.0).abs() < 1e-12);
}

// ============================================================
// Stopwords and errors
// ============================================================

#[test]
fn stopwords_are_excluded() {
    let c = corpus(&["문제 정부 예산", "문제 금일 국회"]);
    let cfg = FrequencyConfig {
        stopwords: ["문제", "금일"].iter().map(|s| s.to_string()).collect(),
        rank_n: 10,
        weighting: Weighting::RawCount,
    };
    let features = extract(&c, &cfg).unwrap();
    assert!(!features.column_labels.contains(&"문제".to_string()));
    assert_eq!(features.n_columns(), 3);
}

#[test]
fn all_stopwords_is_empty_vocabulary() {
    let c = corpus(&["the a", "a"]);
    let cfg = FrequencyConfig {
        stopwords: ["the", "a"].iter().map(|s| s.to_string()).collect(),
        rank_n: 10,
        weighting: Weighting::RawCount,
    };
    assert_eq!(extract(&c, &cfg), Err(EngineError::EmptyVocabulary));
}

#[test]
fn empty_corpus_is_rejected() {
    let c = Corpus::from_tokens(Vec::<Vec<&str>>::new()).unwrap();
    assert_eq!(
        extract(&c, &config(10, Weighting::TfIdf)),
        Err(EngineError::EmptyCorpus)
    );
}

#[test]
fn zero_rank_n_is_invalid() {
    let c = corpus(&["a"]);
    assert!(matches!(
        extract(&c, &config(0, Weighting::TfIdf)),
        Err(EngineError::InvalidInput(_))
    ));
}

// ============================================================
// FeatureExtractor trait
// ============================================================

#[test]
fn extractor_trait_matches_free_function() {
    let c = corpus(&["a b", "b c"]);
    let extractor: Box<dyn FeatureExtractor> =
        Box::new(FrequencyExtractor::new(config(2, Weighting::RawCount)));
    assert_eq!(extractor.name(), "count");
    assert_eq!(
        extractor.extract(&c).unwrap(),
        extract(&c, &config(2, Weighting::RawCount)).unwrap()
    );
}
