// Topic coherence over document co-occurrence.
//
// Every measure treats a document as a bag of distinct terms: two terms
// co-occur when some document contains both. Three measures are offered:
//
// - c_v: each top word gets a context vector of NPMI values against the
//   other top words; the score is the mean cosine between each context
//   vector and their sum. This is the default used by the coherence sweep.
// - UMass: mean of ln((D(w_i, w_j) + 1) / D(w_j)) over ordered pairs, where
//   w_j is ranked above w_i.
// - NPMI: mean normalized PMI over unordered pairs.
//
// Higher is more coherent for all three.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::model::TopicModel;
use crate::corpus::Corpus;

const EPSILON: f64 = 1e-12;

/// Which coherence measure to compute.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoherenceMeasure {
    #[default]
    Cv,
    UMass,
    Npmi,
}

impl CoherenceMeasure {
    pub fn name(&self) -> &'static str {
        match self {
            CoherenceMeasure::Cv => "c_v",
            CoherenceMeasure::UMass => "u_mass",
            CoherenceMeasure::Npmi => "npmi",
        }
    }
}

/// Which documents contain which terms.
#[derive(Debug, Clone)]
pub struct CooccurrenceIndex {
    n_documents: usize,
    /// Sorted document indices per term
    postings: HashMap<String, Vec<usize>>,
}

impl CooccurrenceIndex {
    pub fn new(corpus: &Corpus) -> Self {
        let mut postings: HashMap<String, Vec<usize>> = HashMap::new();
        for (d, doc) in corpus.documents().iter().enumerate() {
            for token in doc.tokens() {
                let list = postings.entry(token.clone()).or_default();
                if list.last() != Some(&d) {
                    list.push(d);
                }
            }
        }
        Self {
            n_documents: corpus.len(),
            postings,
        }
    }

    pub fn document_frequency(&self, term: &str) -> usize {
        self.postings.get(term).map_or(0, Vec::len)
    }

    /// Number of documents containing both terms.
    pub fn co_document_frequency(&self, a: &str, b: &str) -> usize {
        let (Some(xs), Some(ys)) = (self.postings.get(a), self.postings.get(b)) else {
            return 0;
        };
        let (mut i, mut j, mut count) = (0, 0, 0);
        while i < xs.len() && j < ys.len() {
            match xs[i].cmp(&ys[j]) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    count += 1;
                    i += 1;
                    j += 1;
                }
            }
        }
        count
    }

    fn npmi(&self, a: &str, b: &str) -> f64 {
        let n = self.n_documents as f64;
        let p_a = self.document_frequency(a) as f64 / n;
        let p_b = self.document_frequency(b) as f64 / n;
        let p_ab = self.co_document_frequency(a, b) as f64 / n;

        let denominator = -(p_ab + EPSILON).ln();
        if denominator <= EPSILON {
            // Both terms appear in every document
            return 1.0;
        }
        ((p_ab + EPSILON) / (p_a * p_b)).ln() / denominator
    }

    /// Coherence of one ranked word list. Words absent from the corpus are
    /// ignored; fewer than two remaining words score 0.
    pub fn score(&self, words: &[&str], measure: CoherenceMeasure) -> f64 {
        let words: Vec<&str> = words
            .iter()
            .copied()
            .filter(|w| self.document_frequency(w) > 0)
            .collect();
        if words.len() < 2 || self.n_documents == 0 {
            return 0.0;
        }

        match measure {
            CoherenceMeasure::Cv => self.c_v(&words),
            CoherenceMeasure::UMass => self.u_mass(&words),
            CoherenceMeasure::Npmi => self.mean_npmi(&words),
        }
    }

    fn c_v(&self, words: &[&str]) -> f64 {
        let vectors: Vec<Vec<f64>> = words
            .iter()
            .map(|a| words.iter().map(|b| self.npmi(a, b)).collect())
            .collect();
        let mut total = vec![0.0; words.len()];
        for v in &vectors {
            for (t, x) in total.iter_mut().zip(v) {
                *t += x;
            }
        }
        vectors.iter().map(|v| signed_cosine(v, &total)).sum::<f64>() / vectors.len() as f64
    }

    fn u_mass(&self, words: &[&str]) -> f64 {
        let mut sum = 0.0;
        let mut pairs = 0;
        for (i, later) in words.iter().enumerate().skip(1) {
            for earlier in &words[..i] {
                let joint = self.co_document_frequency(later, earlier) as f64;
                sum += ((joint + 1.0) / self.document_frequency(earlier) as f64).ln();
                pairs += 1;
            }
        }
        sum / pairs as f64
    }

    fn mean_npmi(&self, words: &[&str]) -> f64 {
        let mut sum = 0.0;
        let mut pairs = 0;
        for (i, a) in words.iter().enumerate() {
            for b in &words[i + 1..] {
                sum += self.npmi(a, b);
                pairs += 1;
            }
        }
        sum / pairs as f64
    }

    /// Per-topic scores over each topic's `top_n` terms.
    pub fn topic_scores(
        &self,
        model: &TopicModel,
        measure: CoherenceMeasure,
        top_n: usize,
    ) -> Vec<f64> {
        model
            .topics
            .iter()
            .map(|topic| {
                let words: Vec<&str> = topic.words().into_iter().take(top_n).collect();
                self.score(&words, measure)
            })
            .collect()
    }

    /// Mean of [`topic_scores`](Self::topic_scores).
    pub fn model_score(&self, model: &TopicModel, measure: CoherenceMeasure, top_n: usize) -> f64 {
        let scores = self.topic_scores(model, measure, top_n);
        if scores.is_empty() {
            0.0
        } else {
            scores.iter().sum::<f64>() / scores.len() as f64
        }
    }
}

fn signed_cosine(a: &[f64], b: &[f64]) -> f64 {
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

/// Coherence of every topic in `model`, using its `top_n` highest-ranked terms.
pub fn topic_coherence(
    model: &TopicModel,
    corpus: &Corpus,
    measure: CoherenceMeasure,
    top_n: usize,
) -> Vec<f64> {
    CooccurrenceIndex::new(corpus).topic_scores(model, measure, top_n)
}

/// Mean coherence over all topics of `model`.
pub fn model_coherence(
    model: &TopicModel,
    corpus: &Corpus,
    measure: CoherenceMeasure,
    top_n: usize,
) -> f64 {
    CooccurrenceIndex::new(corpus).model_score(model, measure, top_n)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> CooccurrenceIndex {
        let corpus = Corpus::from_tokens(vec![
            vec!["rice", "harvest", "rice"],
            vec!["rice", "harvest"],
            vec!["tax", "levy"],
            vec!["tax", "levy"],
        ])
        .unwrap();
        CooccurrenceIndex::new(&corpus)
    }

    #[test]
    fn test_frequencies_count_documents_not_tokens() {
        let idx = index();
        assert_eq!(idx.document_frequency("rice"), 2);
        assert_eq!(idx.co_document_frequency("rice", "harvest"), 2);
        assert_eq!(idx.co_document_frequency("rice", "tax"), 0);
        assert_eq!(idx.document_frequency("missing"), 0);
    }

    #[test]
    fn test_coherent_pair_beats_mixed_pair() {
        let idx = index();
        for measure in [
            CoherenceMeasure::Cv,
            CoherenceMeasure::UMass,
            CoherenceMeasure::Npmi,
        ] {
            let coherent = idx.score(&["rice", "harvest"], measure);
            let mixed = idx.score(&["rice", "tax"], measure);
            assert!(coherent > mixed, "{}: {coherent} <= {mixed}", measure.name());
        }
    }

    #[test]
    fn test_perfect_pair_scores() {
        let idx = index();
        assert!((idx.score(&["rice", "harvest"], CoherenceMeasure::Npmi) - 1.0).abs() < 1e-9);
        assert!((idx.score(&["rice", "harvest"], CoherenceMeasure::Cv) - 1.0).abs() < 1e-9);
        assert!(
            (idx.score(&["rice", "harvest"], CoherenceMeasure::UMass) - (1.5_f64).ln()).abs()
                < 1e-12
        );
    }

    #[test]
    fn test_too_few_known_words() {
        let idx = index();
        assert_eq!(idx.score(&["rice"], CoherenceMeasure::Cv), 0.0);
        assert_eq!(idx.score(&["rice", "unknown"], CoherenceMeasure::Cv), 0.0);
    }
}
