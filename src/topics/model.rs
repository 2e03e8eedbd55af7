// TopicModel: the frozen result of a training run.
//
// Holds everything a caller needs after training: the ranked terms of each
// topic, each document's topic distribution, the final fit score, and the
// warnings collected along the way. Nothing here can be mutated once the
// sampler has been frozen.

use serde::{Deserialize, Serialize};

use super::{MetadataMode, TermWeighting};
use crate::features::FeatureVectorSet;

pub const DEFAULT_ALPHA: f64 = 0.1;
pub const DEFAULT_ETA: f64 = 0.01;

/// Dirichlet prior concentrations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Priors {
    /// Document-topic concentration (initial value in covariate mode)
    pub alpha: f64,
    /// Topic-term concentration
    pub eta: f64,
}

impl Default for Priors {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
            eta: DEFAULT_ETA,
        }
    }
}

/// A term and its probability within a topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermWeight {
    pub term: String,
    pub weight: f64,
}

/// The ranked terms of one topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicTerms {
    pub topic: usize,
    /// Highest-weight terms first
    pub terms: Vec<TermWeight>,
}

impl TopicTerms {
    pub fn words(&self) -> Vec<&str> {
        self.terms.iter().map(|t| t.term.as_str()).collect()
    }
}

/// The learned document-topic prior for one metadata value (covariate mode).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CovariatePrior {
    pub key: String,
    /// α vector shared by every document with this metadata value
    pub alpha: Vec<f64>,
}

/// Non-fatal anomalies observed during training.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelWarning {
    /// Log-likelihood per word dropped between two chunks.
    NonMonotonicLikelihood {
        iteration: usize,
        previous: f64,
        current: f64,
    },
    /// A topic ended with almost no tokens assigned.
    NearEmptyTopic { topic: usize, share: f64 },
}

/// A trained, read-only topic model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicModel {
    pub k: usize,
    pub seed: u64,
    pub priors: Priors,
    pub metadata_mode: MetadataMode,
    pub term_weighting: TermWeighting,
    /// Counted training iterations (burn-in excluded)
    pub iterations: usize,
    pub burn_in: usize,
    pub vocabulary_size: usize,
    pub token_count: usize,
    /// Log-likelihood per word after the last iteration
    pub ll_per_word: f64,
    pub topics: Vec<TopicTerms>,
    pub document_ids: Vec<String>,
    /// One row per document; each row sums to 1
    pub document_topics: Vec<Vec<f64>>,
    /// Final α vector in plain mode
    pub alpha: Vec<f64>,
    /// Learned priors per metadata value in covariate mode
    pub covariate_priors: Vec<CovariatePrior>,
    pub warnings: Vec<ModelWarning>,
}

impl TopicModel {
    /// Column labels used for topic features (`T0`, `T1`, ...).
    pub fn topic_labels(&self) -> Vec<String> {
        (0..self.k).map(|t| format!("T{t}")).collect()
    }

    pub fn topic_terms(&self, topic: usize) -> Option<&TopicTerms> {
        self.topics.get(topic)
    }

    pub fn document_topic(&self, doc: usize) -> Option<&[f64]> {
        self.document_topics.get(doc).map(Vec::as_slice)
    }

    /// The most probable topic of each document (lowest index on ties).
    pub fn dominant_topics(&self) -> Vec<usize> {
        self.document_topics
            .iter()
            .map(|row| {
                row.iter()
                    .enumerate()
                    .fold((0, f64::NEG_INFINITY), |best, (t, &p)| {
                        if p > best.1 {
                            (t, p)
                        } else {
                            best
                        }
                    })
                    .0
            })
            .collect()
    }

    /// Document-topic distribution as a feature set for similarity and export.
    pub fn document_features(&self) -> FeatureVectorSet {
        FeatureVectorSet {
            row_labels: self.document_ids.clone(),
            column_labels: self.topic_labels(),
            rows: self.document_topics.clone(),
        }
    }

    pub fn has_convergence_warning(&self) -> bool {
        self.warnings
            .iter()
            .any(|w| matches!(w, ModelWarning::NonMonotonicLikelihood { .. }))
    }
}
