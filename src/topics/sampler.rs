// Collapsed Gibbs sampler for plain LDA and its metadata-conditioned variant.
//
// Every token carries a topic assignment. One sweep resamples each token from
//
//     p(z = k) ∝ (n_dk + α_dk) × (n_kw + η) / (n_k + Vη)
//
// In plain mode α is a single vector shared by all documents, re-estimated
// with Minka's fixed-point update. In covariate mode each distinct metadata
// value f owns λ_f ∈ ℝ^K and documents with that value use
// α_dk = exp(λ_fk) + ε; λ is re-fit by gradient ascent on the
// Dirichlet-multinomial likelihood under a Gaussian prior.
//
// Counts are token masses rather than integers. Under PMI weighting a token
// of w in d contributes max(0, ln(p(w|d) / p(w))) instead of 1, so words a
// document shares with the whole corpus at the usual rate carry no weight.
//
// A single StdRng seeded from the config drives initialization and sampling,
// so two samplers built from the same inputs stay in lockstep.

use std::collections::{BTreeSet, HashMap};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, warn};

use super::model::{CovariatePrior, ModelWarning, TermWeight, TopicModel, TopicTerms};
use super::{MetadataMode, TermWeighting, TrainConfig};
use crate::corpus::Corpus;
use crate::error::{EngineError, Result};
use crate::math::{digamma, ln_gamma};

/// Topics holding less than this share of all tokens are reported.
pub const NEAR_EMPTY_SHARE: f64 = 0.001;

const ALPHA_FLOOR: f64 = 1e-5;
const ALPHA_FIXED_POINT_ITERATIONS: usize = 5;

const DMR_EPSILON: f64 = 1e-10;
const DMR_SIGMA: f64 = 1.0;
const GRADIENT_STEPS: usize = 5;
const MAX_BACKTRACKS: usize = 20;
const LAMBDA_LIMIT: f64 = 15.0;

/// Per-metadata-value priors for covariate mode.
#[derive(Debug, Clone)]
struct Covariates {
    /// Distinct metadata keys in first-seen order
    keys: Vec<String>,
    /// Index into `keys` for each document
    doc_feature: Vec<usize>,
    /// Documents belonging to each key
    members: Vec<Vec<usize>>,
    /// λ, one K-vector per key
    lambda: Vec<Vec<f64>>,
    /// exp(λ) + ε, kept in sync with `lambda`
    alpha: Vec<Vec<f64>>,
    /// Prior mean of every λ entry
    mu: f64,
}

impl Covariates {
    fn new(corpus: &Corpus, k: usize, alpha: f64) -> Result<Self> {
        let mut keys: Vec<String> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();
        let mut doc_feature = Vec::with_capacity(corpus.len());
        let mut members: Vec<Vec<usize>> = Vec::new();

        for (index, doc) in corpus.documents().iter().enumerate() {
            let Some(meta) = doc.metadata() else {
                return Err(EngineError::invalid(format!(
                    "covariate mode needs metadata on every document; document {index} has none"
                )));
            };
            let key = meta.key();
            let f = match positions.get(&key) {
                Some(&f) => f,
                None => {
                    let f = keys.len();
                    positions.insert(key.clone(), f);
                    keys.push(key);
                    members.push(Vec::new());
                    f
                }
            };
            doc_feature.push(f);
            members[f].push(index);
        }

        let mu = alpha.ln();
        let lambda = vec![vec![mu; k]; keys.len()];
        let alpha = lambda.iter().map(|l| lambda_to_alpha(l)).collect();
        Ok(Self {
            keys,
            doc_feature,
            members,
            lambda,
            alpha,
            mu,
        })
    }

    fn log_prior(&self) -> f64 {
        self.lambda
            .iter()
            .flatten()
            .map(|l| -(l - self.mu).powi(2) / (2.0 * DMR_SIGMA * DMR_SIGMA))
            .sum()
    }

    /// Dirichlet-multinomial log-likelihood of one key's documents plus the
    /// Gaussian prior on its λ.
    fn objective(
        &self,
        f: usize,
        lambda: &[f64],
        doc_topic: &[Vec<f64>],
        doc_len: &[f64],
    ) -> f64 {
        let alpha = lambda_to_alpha(lambda);
        let alpha_sum: f64 = alpha.iter().sum();
        let lg_alpha: Vec<f64> = alpha.iter().map(|&a| ln_gamma(a)).collect();
        let lg_sum = ln_gamma(alpha_sum);

        let mut value = 0.0;
        for &d in &self.members[f] {
            value += lg_sum - ln_gamma(alpha_sum + doc_len[d]);
            for (t, &n) in doc_topic[d].iter().enumerate() {
                if n > 0.0 {
                    value += ln_gamma(alpha[t] + n) - lg_alpha[t];
                }
            }
        }
        value
            - lambda
                .iter()
                .map(|l| (l - self.mu).powi(2) / (2.0 * DMR_SIGMA * DMR_SIGMA))
                .sum::<f64>()
    }

    fn gradient(
        &self,
        f: usize,
        lambda: &[f64],
        doc_topic: &[Vec<f64>],
        doc_len: &[f64],
    ) -> Vec<f64> {
        let alpha = lambda_to_alpha(lambda);
        let alpha_sum: f64 = alpha.iter().sum();
        let dg_sum = digamma(alpha_sum);
        let dg_alpha: Vec<f64> = alpha.iter().map(|&a| digamma(a)).collect();

        let mut common = 0.0;
        let mut per_topic = vec![0.0; lambda.len()];
        for &d in &self.members[f] {
            common += dg_sum - digamma(alpha_sum + doc_len[d]);
            for (t, &n) in doc_topic[d].iter().enumerate() {
                if n > 0.0 {
                    per_topic[t] += digamma(alpha[t] + n) - dg_alpha[t];
                }
            }
        }

        lambda
            .iter()
            .enumerate()
            .map(|(t, &l)| {
                l.exp() * (common + per_topic[t]) - (l - self.mu) / (DMR_SIGMA * DMR_SIGMA)
            })
            .collect()
    }

    /// Backtracking gradient ascent on each key's λ.
    fn optimize(&mut self, doc_topic: &[Vec<f64>], doc_len: &[f64]) {
        for f in 0..self.keys.len() {
            let mut lambda = self.lambda[f].clone();
            let mut value = self.objective(f, &lambda, doc_topic, doc_len);

            for _ in 0..GRADIENT_STEPS {
                let grad = self.gradient(f, &lambda, doc_topic, doc_len);
                let scale = grad.iter().fold(1.0_f64, |m, g| m.max(g.abs()));
                let mut step = 1.0;
                let mut improved = false;

                for _ in 0..MAX_BACKTRACKS {
                    let candidate: Vec<f64> = lambda
                        .iter()
                        .zip(&grad)
                        .map(|(l, g)| (l + step * g / scale).clamp(-LAMBDA_LIMIT, LAMBDA_LIMIT))
                        .collect();
                    let candidate_value = self.objective(f, &candidate, doc_topic, doc_len);
                    if candidate_value >= value {
                        lambda = candidate;
                        value = candidate_value;
                        improved = true;
                        break;
                    }
                    step *= 0.5;
                }

                if !improved {
                    break;
                }
            }

            self.alpha[f] = lambda_to_alpha(&lambda);
            self.lambda[f] = lambda;
        }
    }
}

fn lambda_to_alpha(lambda: &[f64]) -> Vec<f64> {
    lambda.iter().map(|l| l.exp() + DMR_EPSILON).collect()
}

/// Per-token weights: all ones, or each token's clipped PMI with its document.
fn token_weights(
    docs: &[Vec<usize>],
    vocabulary_size: usize,
    weighting: TermWeighting,
) -> Vec<Vec<f64>> {
    match weighting {
        TermWeighting::One => docs.iter().map(|words| vec![1.0; words.len()]).collect(),
        TermWeighting::Pmi => {
            let mut corpus_freq = vec![0usize; vocabulary_size];
            for &w in docs.iter().flatten() {
                corpus_freq[w] += 1;
            }
            let total: usize = corpus_freq.iter().sum();

            docs.iter()
                .map(|words| {
                    let mut doc_freq: HashMap<usize, usize> = HashMap::new();
                    for &w in words {
                        *doc_freq.entry(w).or_insert(0) += 1;
                    }
                    let len = words.len() as f64;
                    words
                        .iter()
                        .map(|&w| {
                            let p_in_doc = doc_freq[&w] as f64 / len;
                            let p_overall = corpus_freq[w] as f64 / total as f64;
                            (p_in_doc / p_overall).ln().max(0.0)
                        })
                        .collect()
                })
                .collect()
        }
    }
}

/// Incremental Gibbs sampler. `train` drives one of these in chunks; callers
/// that want their own schedule can drive it directly.
#[derive(Debug, Clone)]
pub struct Sampler {
    config: TrainConfig,
    vocabulary: Vec<String>,
    doc_ids: Vec<String>,
    /// Word ids per document
    docs: Vec<Vec<usize>>,
    /// Count contribution of every token
    weights: Vec<Vec<f64>>,
    /// Weighted length of each document
    doc_len: Vec<f64>,
    /// Topic of every token
    assignments: Vec<Vec<usize>>,
    /// n_dk
    doc_topic: Vec<Vec<f64>>,
    /// n_kw
    topic_word: Vec<Vec<f64>>,
    /// n_k
    topic_total: Vec<f64>,
    /// Shared α (plain mode)
    alpha: Vec<f64>,
    covariates: Option<Covariates>,
    rng: StdRng,
    iterations: usize,
    token_count: usize,
    /// Sum of all token weights
    mass: f64,
}

impl Sampler {
    /// Index the corpus and draw the initial topic assignments.
    pub fn new(corpus: &Corpus, config: &TrainConfig) -> Result<Self> {
        if corpus.is_empty() {
            return Err(EngineError::EmptyCorpus);
        }
        config.validate_model()?;

        let k = config.k;
        let vocabulary: Vec<String> = corpus
            .documents()
            .iter()
            .flat_map(|doc| doc.tokens().iter().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let index: HashMap<&str, usize> = vocabulary
            .iter()
            .enumerate()
            .map(|(i, term)| (term.as_str(), i))
            .collect();

        let docs: Vec<Vec<usize>> = corpus
            .documents()
            .iter()
            .map(|doc| doc.tokens().iter().map(|t| index[t.as_str()]).collect())
            .collect();
        let token_count: usize = docs.iter().map(Vec::len).sum();
        let weights = token_weights(&docs, vocabulary.len(), config.term_weighting);
        let doc_len: Vec<f64> = weights.iter().map(|w| w.iter().sum()).collect();
        let mass: f64 = doc_len.iter().sum();

        let covariates = match config.metadata_mode {
            MetadataMode::None => None,
            MetadataMode::Covariate => Some(Covariates::new(corpus, k, config.priors.alpha)?),
        };

        let mut rng = StdRng::seed_from_u64(config.seed);
        let mut doc_topic = vec![vec![0.0; k]; docs.len()];
        let mut topic_word = vec![vec![0.0; vocabulary.len()]; k];
        let mut topic_total = vec![0.0; k];
        let mut assignments = Vec::with_capacity(docs.len());
        for (d, words) in docs.iter().enumerate() {
            let mut topics = Vec::with_capacity(words.len());
            for (&w, &weight) in words.iter().zip(&weights[d]) {
                let t = rng.random_range(0..k);
                doc_topic[d][t] += weight;
                topic_word[t][w] += weight;
                topic_total[t] += weight;
                topics.push(t);
            }
            assignments.push(topics);
        }

        debug!(
            k,
            documents = docs.len(),
            vocabulary = vocabulary.len(),
            tokens = token_count,
            mass,
            weighting = ?config.term_weighting,
            "sampler initialized"
        );

        Ok(Self {
            config: *config,
            vocabulary,
            doc_ids: corpus.ids(),
            docs,
            weights,
            doc_len,
            assignments,
            doc_topic,
            topic_word,
            topic_total,
            alpha: vec![config.priors.alpha; k],
            covariates,
            rng,
            iterations: 0,
            token_count,
            mass,
        })
    }

    pub fn k(&self) -> usize {
        self.config.k
    }

    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    /// Sweeps run so far, burn-in included.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn token_count(&self) -> usize {
        self.token_count
    }

    /// Run `n` Gibbs sweeps, re-fitting the priors on schedule.
    pub fn step(&mut self, n: usize) {
        for _ in 0..n {
            self.sweep();
            self.iterations += 1;
            if self.should_optimize() {
                self.optimize_priors();
            }
        }
    }

    fn should_optimize(&self) -> bool {
        let interval = self.config.optimize_interval;
        interval > 0
            && self.iterations > self.config.burn_in
            && (self.iterations - self.config.burn_in) % interval == 0
    }

    fn doc_alpha(&self, d: usize) -> &[f64] {
        match &self.covariates {
            Some(cov) => &cov.alpha[cov.doc_feature[d]],
            None => &self.alpha,
        }
    }

    fn sweep(&mut self) {
        let k = self.config.k;
        let eta = self.config.priors.eta;
        let v_eta = self.vocabulary.len() as f64 * eta;
        let mut cumulative = vec![0.0; k];

        for d in 0..self.docs.len() {
            let alpha = self.doc_alpha(d).to_vec();
            for i in 0..self.docs[d].len() {
                let w = self.docs[d][i];
                let weight = self.weights[d][i];
                let old = self.assignments[d][i];
                // Clamped so PMI rounding never leaves a negative mass
                self.doc_topic[d][old] = (self.doc_topic[d][old] - weight).max(0.0);
                self.topic_word[old][w] = (self.topic_word[old][w] - weight).max(0.0);
                self.topic_total[old] = (self.topic_total[old] - weight).max(0.0);

                let mut total = 0.0;
                for t in 0..k {
                    total += (self.doc_topic[d][t] + alpha[t]) * (self.topic_word[t][w] + eta)
                        / (self.topic_total[t] + v_eta);
                    cumulative[t] = total;
                }
                let u = self.rng.random::<f64>() * total;
                let new = cumulative.iter().position(|&c| u < c).unwrap_or(k - 1);

                self.assignments[d][i] = new;
                self.doc_topic[d][new] += weight;
                self.topic_word[new][w] += weight;
                self.topic_total[new] += weight;
            }
        }
    }

    fn optimize_priors(&mut self) {
        match self.covariates.as_mut() {
            Some(cov) => {
                cov.optimize(&self.doc_topic, &self.doc_len);
                debug!(iteration = self.iterations, "covariate priors re-fit");
            }
            None => {
                self.optimize_alpha();
                debug!(
                    iteration = self.iterations,
                    alpha_sum = self.alpha.iter().sum::<f64>(),
                    "alpha re-estimated"
                );
            }
        }
    }

    /// Minka's fixed-point update for an asymmetric Dirichlet.
    fn optimize_alpha(&mut self) {
        for _ in 0..ALPHA_FIXED_POINT_ITERATIONS {
            let alpha_sum: f64 = self.alpha.iter().sum();
            let dg_sum = digamma(alpha_sum);
            let denominator: f64 = self
                .doc_len
                .iter()
                .map(|&n| digamma(n + alpha_sum) - dg_sum)
                .sum();
            if denominator <= 0.0 || !denominator.is_finite() {
                warn!(denominator, "skipping alpha update");
                return;
            }

            for t in 0..self.config.k {
                let a = self.alpha[t];
                let dg_a = digamma(a);
                let numerator: f64 = self
                    .doc_topic
                    .iter()
                    .filter(|row| row[t] > 0.0)
                    .map(|row| digamma(row[t] + a) - dg_a)
                    .sum();
                self.alpha[t] = (a * numerator / denominator).max(ALPHA_FLOOR);
            }
        }
    }

    /// Full collapsed joint log-likelihood (plus the λ prior in covariate mode).
    pub fn log_likelihood(&self) -> f64 {
        let eta = self.config.priors.eta;
        let v_eta = self.vocabulary.len() as f64 * eta;
        let lg_eta = ln_gamma(eta);
        let lg_v_eta = ln_gamma(v_eta);

        let mut ll = 0.0;
        for (t, row) in self.topic_word.iter().enumerate() {
            ll += lg_v_eta - ln_gamma(v_eta + self.topic_total[t]);
            for &n in row {
                if n > 0.0 {
                    ll += ln_gamma(eta + n) - lg_eta;
                }
            }
        }

        for (d, row) in self.doc_topic.iter().enumerate() {
            let alpha = self.doc_alpha(d);
            let alpha_sum: f64 = alpha.iter().sum();
            ll += ln_gamma(alpha_sum) - ln_gamma(alpha_sum + self.doc_len[d]);
            for (t, &n) in row.iter().enumerate() {
                if n > 0.0 {
                    ll += ln_gamma(alpha[t] + n) - ln_gamma(alpha[t]);
                }
            }
        }

        if let Some(cov) = &self.covariates {
            ll += cov.log_prior();
        }
        ll
    }

    /// Sum of all token weights; equals the token count without PMI weighting.
    pub fn mass(&self) -> f64 {
        self.mass
    }

    /// Log-likelihood divided by the token mass (the raw token count when every
    /// weight is zero).
    pub fn log_likelihood_per_word(&self) -> f64 {
        let denominator = if self.mass > 0.0 {
            self.mass
        } else {
            self.token_count as f64
        };
        self.log_likelihood() / denominator
    }

    fn topic_terms(&self, topic: usize) -> TopicTerms {
        let eta = self.config.priors.eta;
        let denominator = self.topic_total[topic] + self.vocabulary.len() as f64 * eta;
        let mut weights: Vec<(usize, f64)> = self.topic_word[topic]
            .iter()
            .enumerate()
            .map(|(w, &n)| (w, (n + eta) / denominator))
            .collect();
        // Vocabulary is sorted, so the word id breaks ties by term
        weights.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));

        TopicTerms {
            topic,
            terms: weights
                .into_iter()
                .take(self.config.top_n)
                .map(|(w, weight)| TermWeight {
                    term: self.vocabulary[w].clone(),
                    weight,
                })
                .collect(),
        }
    }

    /// Snapshot the current state as a read-only model.
    ///
    /// `warnings` are those collected by the caller during training; topics
    /// that ended up nearly empty are appended here.
    pub fn freeze(&self, mut warnings: Vec<ModelWarning>) -> TopicModel {
        let k = self.config.k;

        for (topic, &n) in self.topic_total.iter().enumerate() {
            let share = if self.mass > 0.0 { n / self.mass } else { 0.0 };
            if share < NEAR_EMPTY_SHARE {
                warn!(topic, share, "topic holds almost no tokens");
                warnings.push(ModelWarning::NearEmptyTopic { topic, share });
            }
        }

        let document_topics = self
            .doc_topic
            .iter()
            .enumerate()
            .map(|(d, row)| {
                let alpha = self.doc_alpha(d);
                let denominator = self.doc_len[d] + alpha.iter().sum::<f64>();
                row.iter()
                    .zip(alpha)
                    .map(|(&n, a)| (n + a) / denominator)
                    .collect()
            })
            .collect();

        let covariate_priors = self
            .covariates
            .as_ref()
            .map(|cov| {
                cov.keys
                    .iter()
                    .zip(&cov.alpha)
                    .map(|(key, alpha)| CovariatePrior {
                        key: key.clone(),
                        alpha: alpha.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        TopicModel {
            k,
            seed: self.config.seed,
            priors: self.config.priors,
            metadata_mode: self.config.metadata_mode,
            term_weighting: self.config.term_weighting,
            iterations: self.iterations.saturating_sub(self.config.burn_in),
            burn_in: self.config.burn_in.min(self.iterations),
            vocabulary_size: self.vocabulary.len(),
            token_count: self.token_count,
            ll_per_word: self.log_likelihood_per_word(),
            topics: (0..k).map(|t| self.topic_terms(t)).collect(),
            document_ids: self.doc_ids.clone(),
            document_topics,
            alpha: if self.covariates.is_some() {
                Vec::new()
            } else {
                self.alpha.clone()
            },
            covariate_priors,
            warnings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::Metadata;
    use crate::topics::Priors;

    fn corpus() -> Corpus {
        Corpus::from_tokens(vec![
            vec!["apple", "banana", "apple", "cherry"],
            vec!["banana", "apple", "cherry"],
            vec!["engine", "wheel", "engine", "road"],
            vec!["road", "wheel", "engine"],
        ])
        .unwrap()
    }

    fn config(k: usize) -> TrainConfig {
        TrainConfig {
            k,
            seed: 7,
            ..TrainConfig::default()
        }
    }

    #[test]
    fn test_counts_stay_consistent() {
        let mut sampler = Sampler::new(&corpus(), &config(3)).unwrap();
        sampler.step(15);

        // Unit weights keep every mass a whole number, so sums are exact
        assert_eq!(sampler.topic_total.iter().sum::<f64>(), sampler.token_count() as f64);
        assert_eq!(sampler.mass(), sampler.token_count() as f64);
        for (d, row) in sampler.doc_topic.iter().enumerate() {
            assert_eq!(row.iter().sum::<f64>(), sampler.doc_len[d]);
        }
        for t in 0..3 {
            assert_eq!(
                sampler.topic_word[t].iter().sum::<f64>(),
                sampler.topic_total[t]
            );
        }
    }

    #[test]
    fn test_same_seed_same_state() {
        let mut a = Sampler::new(&corpus(), &config(2)).unwrap();
        let mut b = Sampler::new(&corpus(), &config(2)).unwrap();
        a.step(12);
        b.step(12);
        assert_eq!(a.assignments, b.assignments);
        assert_eq!(a.log_likelihood(), b.log_likelihood());
    }

    #[test]
    fn test_alpha_stays_positive_after_optimization() {
        let mut sampler = Sampler::new(
            &corpus(),
            &TrainConfig {
                optimize_interval: 2,
                ..config(3)
            },
        )
        .unwrap();
        sampler.step(10);
        assert!(sampler.alpha.iter().all(|&a| a >= ALPHA_FLOOR && a.is_finite()));
    }

    #[test]
    fn test_covariate_mode_needs_metadata() {
        let err = Sampler::new(
            &corpus(),
            &TrainConfig {
                metadata_mode: MetadataMode::Covariate,
                ..config(2)
            },
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput(_)));
    }

    #[test]
    fn test_covariate_priors_per_key() {
        let corpus = Corpus::build(vec![
            (vec!["apple", "banana"], Some(Metadata::from("fruit"))),
            (vec!["cherry", "apple"], Some(Metadata::from("fruit"))),
            (vec!["engine", "wheel"], Some(Metadata::from("car"))),
        ])
        .unwrap();
        let mut sampler = Sampler::new(
            &corpus,
            &TrainConfig {
                metadata_mode: MetadataMode::Covariate,
                optimize_interval: 5,
                priors: Priors {
                    alpha: 0.5,
                    eta: 0.1,
                },
                ..config(2)
            },
        )
        .unwrap();
        sampler.step(10);

        let model = sampler.freeze(Vec::new());
        assert_eq!(model.covariate_priors.len(), 2);
        assert_eq!(model.covariate_priors[0].key, "fruit");
        assert!(model
            .covariate_priors
            .iter()
            .flat_map(|p| &p.alpha)
            .all(|&a| a > 0.0 && a.is_finite()));
        assert!(model.alpha.is_empty());
    }

    #[test]
    fn test_top_terms_tie_break_by_term() {
        let sampler = Sampler::new(
            &Corpus::from_tokens(vec![vec!["b", "a", "c"]]).unwrap(),
            &TrainConfig {
                top_n: 3,
                ..config(1)
            },
        )
        .unwrap();
        let model = sampler.freeze(Vec::new());
        assert_eq!(model.topics[0].words(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_pmi_weights() {
        // "a" is as common in each document as in the corpus: zero weight
        let docs = vec![vec![0, 1], vec![0, 2]];
        let weights = token_weights(&docs, 3, TermWeighting::Pmi);
        assert_eq!(weights[0][0], 0.0);
        assert_eq!(weights[1][0], 0.0);
        assert!((weights[0][1] - 2.0_f64.ln()).abs() < 1e-12);
        assert!((weights[1][1] - 2.0_f64.ln()).abs() < 1e-12);

        let ones = token_weights(&docs, 3, TermWeighting::One);
        assert_eq!(ones, vec![vec![1.0, 1.0], vec![1.0, 1.0]]);
    }

    #[test]
    fn test_pmi_masses_stay_consistent() {
        let mut sampler = Sampler::new(
            &corpus(),
            &TrainConfig {
                term_weighting: TermWeighting::Pmi,
                ..config(3)
            },
        )
        .unwrap();
        assert!(sampler.mass() > 0.0);
        assert!(sampler.mass() < sampler.token_count() as f64);
        sampler.step(15);

        let total: f64 = sampler.topic_total.iter().sum();
        assert!((total - sampler.mass()).abs() < 1e-9);
        assert!(sampler.topic_total.iter().all(|&n| n >= 0.0));
        assert!(sampler.log_likelihood_per_word().is_finite());

        let model = sampler.freeze(Vec::new());
        assert_eq!(model.term_weighting, TermWeighting::Pmi);
        for row in &model.document_topics {
            assert!((row.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_single_document_has_no_pmi_mass() {
        let corpus = Corpus::from_tokens(vec![vec!["a", "b", "a"]]).unwrap();
        let mut sampler = Sampler::new(
            &corpus,
            &TrainConfig {
                term_weighting: TermWeighting::Pmi,
                ..config(2)
            },
        )
        .unwrap();
        sampler.step(5);
        assert_eq!(sampler.mass(), 0.0);
        assert!(sampler.log_likelihood_per_word().is_finite());
    }
}
