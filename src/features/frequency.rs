// Frequency-ranked term features.
//
// Builds a term-document matrix (raw counts or smoothed TF-IDF), ranks terms
// by their aggregate weight over the whole corpus, and projects every
// document onto the top `rank_n` terms.
//
// Ties in aggregate weight are broken by term, ascending, so column order
// never depends on hashing.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::traits::FeatureExtractor;
use super::FeatureVectorSet;
use crate::corpus::Corpus;
use crate::error::{EngineError, Result};

/// How cells of the term-document matrix are weighted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Weighting {
    /// Number of occurrences of the term in the document
    RawCount,
    /// count × smoothed IDF, with each document row L2-normalized
    TfIdf,
}

/// Parameters for [`extract`].
#[derive(Debug, Clone)]
pub struct FrequencyConfig {
    /// Terms excluded from the vocabulary
    pub stopwords: HashSet<String>,
    /// How many top-ranked terms become feature columns
    pub rank_n: usize,
    pub weighting: Weighting,
}

impl Default for FrequencyConfig {
    fn default() -> Self {
        Self {
            stopwords: HashSet::new(),
            rank_n: 50,
            weighting: Weighting::TfIdf,
        }
    }
}

/// A term with its aggregate weight across the corpus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedTerm {
    pub term: String,
    pub column: usize,
    pub weight: f64,
}

/// Sparse document × term weights over a sorted vocabulary.
#[derive(Debug, Clone, PartialEq)]
pub struct TermDocumentMatrix {
    vocabulary: Vec<String>,
    index: HashMap<String, usize>,
    /// One entry list per document, sorted by column
    rows: Vec<Vec<(usize, f64)>>,
    row_labels: Vec<String>,
    weighting: Weighting,
}

impl TermDocumentMatrix {
    /// Build the matrix for `corpus`, dropping `stopwords` from the vocabulary.
    pub fn build(
        corpus: &Corpus,
        stopwords: &HashSet<String>,
        weighting: Weighting,
    ) -> Result<Self> {
        if corpus.is_empty() {
            return Err(EngineError::EmptyCorpus);
        }

        let vocabulary: Vec<String> = corpus
            .documents()
            .iter()
            .flat_map(|d| d.tokens().iter())
            .filter(|t| !stopwords.contains(t.as_str()))
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        if vocabulary.is_empty() {
            return Err(EngineError::EmptyVocabulary);
        }

        let index: HashMap<String, usize> = vocabulary
            .iter()
            .enumerate()
            .map(|(i, t)| (t.clone(), i))
            .collect();

        let counts: Vec<BTreeMap<usize, usize>> = corpus
            .documents()
            .iter()
            .map(|doc| {
                let mut row = BTreeMap::new();
                for token in doc.tokens() {
                    if let Some(&col) = index.get(token) {
                        *row.entry(col).or_insert(0) += 1;
                    }
                }
                row
            })
            .collect();

        let rows = match weighting {
            Weighting::RawCount => counts
                .iter()
                .map(|row| row.iter().map(|(&c, &n)| (c, n as f64)).collect())
                .collect(),
            Weighting::TfIdf => tfidf_rows(&counts, vocabulary.len()),
        };

        debug!(
            documents = corpus.len(),
            vocabulary = vocabulary.len(),
            ?weighting,
            "Built term-document matrix"
        );

        Ok(Self {
            vocabulary,
            index,
            rows,
            row_labels: corpus.ids(),
            weighting,
        })
    }

    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    pub fn weighting(&self) -> Weighting {
        self.weighting
    }

    pub fn n_documents(&self) -> usize {
        self.rows.len()
    }

    /// Weight of `term` in document `doc`; 0.0 if either is unknown.
    pub fn weight(&self, doc: usize, term: &str) -> f64 {
        let Some(&col) = self.index.get(term) else {
            return 0.0;
        };
        self.rows
            .get(doc)
            .and_then(|row| {
                row.binary_search_by_key(&col, |&(c, _)| c)
                    .ok()
                    .map(|i| row[i].1)
            })
            .unwrap_or(0.0)
    }

    /// Column sums, indexed like [`Self::vocabulary`].
    pub fn aggregate_weights(&self) -> Vec<f64> {
        let mut sums = vec![0.0; self.vocabulary.len()];
        for row in &self.rows {
            for &(col, w) in row {
                sums[col] += w;
            }
        }
        sums
    }

    /// The `n` terms with the largest aggregate weight, ties by term ascending.
    pub fn rank_terms(&self, n: usize) -> Vec<RankedTerm> {
        let mut ranked: Vec<RankedTerm> = self
            .aggregate_weights()
            .into_iter()
            .enumerate()
            .map(|(column, weight)| RankedTerm {
                term: self.vocabulary[column].clone(),
                column,
                weight,
            })
            .collect();

        ranked.sort_by(|a, b| {
            b.weight
                .total_cmp(&a.weight)
                .then_with(|| a.term.cmp(&b.term))
        });
        ranked.truncate(n);
        ranked
    }

    /// Project every document onto `ranked`, keeping rank order as column order.
    pub fn project(&self, ranked: &[RankedTerm]) -> FeatureVectorSet {
        let rows = self
            .rows
            .iter()
            .map(|row| {
                let dense: HashMap<usize, f64> = row.iter().copied().collect();
                ranked
                    .iter()
                    .map(|r| dense.get(&r.column).copied().unwrap_or(0.0))
                    .collect()
            })
            .collect();

        FeatureVectorSet {
            row_labels: self.row_labels.clone(),
            column_labels: ranked.iter().map(|r| r.term.clone()).collect(),
            rows,
        }
    }

    /// The full matrix as a dense feature set, columns in vocabulary order.
    pub fn to_dense(&self) -> FeatureVectorSet {
        let rows = self
            .rows
            .iter()
            .map(|row| {
                let mut dense = vec![0.0; self.vocabulary.len()];
                for &(col, w) in row {
                    dense[col] = w;
                }
                dense
            })
            .collect();

        FeatureVectorSet {
            row_labels: self.row_labels.clone(),
            column_labels: self.vocabulary.clone(),
            rows,
        }
    }
}

/// Smoothed TF-IDF: `count × (ln((1 + n) / (1 + df)) + 1)`, rows L2-normalized.
fn tfidf_rows(counts: &[BTreeMap<usize, usize>], vocab_size: usize) -> Vec<Vec<(usize, f64)>> {
    let n = counts.len() as f64;
    let mut df = vec![0usize; vocab_size];
    for row in counts {
        for &col in row.keys() {
            df[col] += 1;
        }
    }
    let idf: Vec<f64> = df
        .iter()
        .map(|&d| ((1.0 + n) / (1.0 + d as f64)).ln() + 1.0)
        .collect();

    counts
        .iter()
        .map(|row| {
            let mut weighted: Vec<(usize, f64)> =
                row.iter().map(|(&c, &k)| (c, k as f64 * idf[c])).collect();
            let norm = weighted.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
            if norm > 0.0 {
                for (_, w) in &mut weighted {
                    *w /= norm;
                }
            }
            weighted
        })
        .collect()
}

/// The full weighted matrix, for callers that want more than the top terms.
pub fn term_document_matrix(
    corpus: &Corpus,
    stopwords: &HashSet<String>,
    weighting: Weighting,
) -> Result<TermDocumentMatrix> {
    TermDocumentMatrix::build(corpus, stopwords, weighting)
}

/// Build the term-document matrix, rank terms and project onto the top `rank_n`.
///
/// The result has one row per document and `min(rank_n, |vocabulary|)` columns.
pub fn extract(corpus: &Corpus, config: &FrequencyConfig) -> Result<FeatureVectorSet> {
    if config.rank_n == 0 {
        return Err(EngineError::invalid("rank_n must be at least 1"));
    }

    let matrix = TermDocumentMatrix::build(corpus, &config.stopwords, config.weighting)?;
    let ranked = matrix.rank_terms(config.rank_n);

    if let Some(top) = ranked.first() {
        info!(
            columns = ranked.len(),
            vocabulary = matrix.vocabulary().len(),
            top_term = %top.term,
            top_weight = top.weight,
            "Extracted frequency features"
        );
    }

    Ok(matrix.project(&ranked))
}

/// [`FeatureExtractor`] wrapper around [`extract`].
#[derive(Debug, Clone, Default)]
pub struct FrequencyExtractor {
    pub config: FrequencyConfig,
}

impl FrequencyExtractor {
    pub fn new(config: FrequencyConfig) -> Self {
        Self { config }
    }
}

impl FeatureExtractor for FrequencyExtractor {
    fn name(&self) -> &str {
        match self.config.weighting {
            Weighting::RawCount => "count",
            Weighting::TfIdf => "tfidf",
        }
    }

    fn extract(&self, corpus: &Corpus) -> Result<FeatureVectorSet> {
        extract(corpus, &self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus(docs: &[&str]) -> Corpus {
        Corpus::from_tokens(docs.iter().map(|d| d.split(' ').collect::<Vec<_>>())).unwrap()
    }

    #[test]
    fn test_raw_counts() {
        let c = corpus(&["a b a", "b c"]);
        let m = TermDocumentMatrix::build(&c, &HashSet::new(), Weighting::RawCount).unwrap();
        assert_eq!(m.vocabulary(), &["a", "b", "c"]);
        assert_eq!(m.weight(0, "a"), 2.0);
        assert_eq!(m.weight(1, "a"), 0.0);
        assert_eq!(m.weight(1, "zzz"), 0.0);
        assert_eq!(m.aggregate_weights(), vec![2.0, 2.0, 1.0]);
    }

    #[test]
    fn test_tfidf_matches_smoothed_formula() {
        // n = 2; df(a) = 1, df(b) = 2
        let c = corpus(&["a b", "b"]);
        let m = TermDocumentMatrix::build(&c, &HashSet::new(), Weighting::TfIdf).unwrap();
        let idf_a = (3.0_f64 / 2.0).ln() + 1.0;
        let idf_b = 1.0;
        let norm = (idf_a * idf_a + idf_b * idf_b).sqrt();
        assert!((m.weight(0, "a") - idf_a / norm).abs() < 1e-12);
        assert!((m.weight(0, "b") - idf_b / norm).abs() < 1e-12);
        // Single-term row normalizes to exactly 1
        assert!((m.weight(1, "b") - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_ties_break_lexicographically() {
        let c = corpus(&["pear fig", "fig pear", "apple"]);
        let m = TermDocumentMatrix::build(&c, &HashSet::new(), Weighting::RawCount).unwrap();
        let ranked: Vec<String> = m.rank_terms(3).into_iter().map(|r| r.term).collect();
        assert_eq!(ranked, vec!["fig", "pear", "apple"]);
    }

    #[test]
    fn test_stopwords_removed() {
        let c = corpus(&["the cat", "the dog"]);
        let stop: HashSet<String> = ["the".to_string()].into();
        let m = TermDocumentMatrix::build(&c, &stop, Weighting::RawCount).unwrap();
        assert_eq!(m.vocabulary(), &["cat", "dog"]);
    }

    #[test]
    fn test_everything_stopped_is_empty_vocabulary() {
        let c = corpus(&["the a", "a"]);
        let stop: HashSet<String> = ["the".to_string(), "a".to_string()].into();
        let err = TermDocumentMatrix::build(&c, &stop, Weighting::TfIdf).unwrap_err();
        assert_eq!(err, EngineError::EmptyVocabulary);
    }

    #[test]
    fn test_zero_rank_rejected() {
        let c = corpus(&["a"]);
        let config = FrequencyConfig {
            rank_n: 0,
            ..FrequencyConfig::default()
        };
        assert!(matches!(extract(&c, &config), Err(EngineError::InvalidInput(_))));
    }

    #[test]
    fn test_dense_round_trip_of_weights() {
        let c = corpus(&["a b", "c"]);
        let m = TermDocumentMatrix::build(&c, &HashSet::new(), Weighting::RawCount).unwrap();
        let dense = m.to_dense();
        assert_eq!(dense.rows, vec![vec![1.0, 1.0, 0.0], vec![0.0, 0.0, 1.0]]);
    }
}
