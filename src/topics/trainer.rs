// Chunked topic model training with progress reporting.
//
// Burn-in runs first and is never reported. Counted iterations then run in
// chunks of CHUNK_SIZE; after each chunk the observer sees the current
// log-likelihood per word and may cancel. An observer error is logged and
// training continues.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::model::{ModelWarning, Priors, TopicModel};
use super::progress::{Flow, NoopObserver, Progress, ProgressObserver};
use super::sampler::Sampler;
use crate::corpus::Corpus;
use crate::error::{EngineError, Result};
use crate::features::traits::FeatureExtractor;
use crate::features::FeatureVectorSet;

/// Iterations between two progress notifications.
pub const CHUNK_SIZE: usize = 20;

/// Whether document metadata conditions the topic prior.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataMode {
    /// Plain LDA; metadata is ignored
    #[default]
    None,
    /// One learned prior per distinct metadata value
    Covariate,
}

/// How much each token contributes to the topic counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TermWeighting {
    /// Every token counts once
    #[default]
    One,
    /// A token of w in d counts max(0, ln(p(w|d) / p(w)))
    Pmi,
}

/// Parameters for a single training run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainConfig {
    /// Number of topics
    pub k: usize,
    pub seed: u64,
    /// Counted iterations after burn-in
    pub iterations: usize,
    /// Uncounted iterations before the first report; prior optimization
    /// starts after these
    pub burn_in: usize,
    pub priors: Priors,
    pub metadata_mode: MetadataMode,
    pub term_weighting: TermWeighting,
    /// Terms kept per topic in the frozen model
    pub top_n: usize,
    /// Iterations between prior re-estimations (0 disables them)
    pub optimize_interval: usize,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            k: 10,
            seed: 103,
            iterations: 1000,
            burn_in: 0,
            priors: Priors::default(),
            metadata_mode: MetadataMode::None,
            term_weighting: TermWeighting::One,
            top_n: 20,
            optimize_interval: 10,
        }
    }
}

impl TrainConfig {
    /// Checks the parameters the sampler depends on.
    pub(crate) fn validate_model(&self) -> Result<()> {
        if self.k == 0 {
            return Err(EngineError::invalid("k must be at least 1"));
        }
        let Priors { alpha, eta } = self.priors;
        if !(alpha.is_finite() && alpha > 0.0) {
            return Err(EngineError::invalid(format!(
                "alpha must be positive, got {alpha}"
            )));
        }
        if !(eta.is_finite() && eta > 0.0) {
            return Err(EngineError::invalid(format!(
                "eta must be positive, got {eta}"
            )));
        }
        Ok(())
    }
}

/// Outcome of a training run.
#[derive(Debug, Clone, PartialEq)]
pub enum Training {
    Completed(TopicModel),
    /// The observer asked to stop; the partial model was discarded.
    Cancelled { completed_iterations: usize },
}

impl Training {
    pub fn into_model(self) -> Option<TopicModel> {
        match self {
            Training::Completed(model) => Some(model),
            Training::Cancelled { .. } => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Training::Cancelled { .. })
    }
}

/// Train a topic model on `corpus`.
pub fn train(
    corpus: &Corpus,
    config: &TrainConfig,
    observer: &mut dyn ProgressObserver,
) -> Result<Training> {
    if corpus.is_empty() {
        return Err(EngineError::EmptyCorpus);
    }
    if config.iterations == 0 {
        return Err(EngineError::invalid("iterations must be at least 1"));
    }

    let mut sampler = Sampler::new(corpus, config)?;
    info!(
        k = config.k,
        documents = corpus.len(),
        vocabulary = sampler.vocabulary().len(),
        mode = ?config.metadata_mode,
        weighting = ?config.term_weighting,
        "training topic model"
    );

    if config.burn_in > 0 {
        sampler.step(config.burn_in);
    }

    let mut warnings = Vec::new();
    let mut previous: Option<f64> = None;
    let mut completed = 0;

    while completed < config.iterations {
        let chunk = CHUNK_SIZE.min(config.iterations - completed);
        sampler.step(chunk);
        completed += chunk;

        let ll = sampler.log_likelihood_per_word();
        if let Some(warning) = likelihood_drop(completed, previous, ll) {
            warn!(iteration = completed, ll_per_word = ll, "log-likelihood dropped");
            warnings.push(warning);
        }
        previous = Some(ll);

        let progress = Progress {
            completed,
            total: config.iterations,
            metric: Some(ll),
        };
        match observer.on_progress(&progress) {
            Ok(Flow::Continue) => {}
            Ok(Flow::Cancel) => {
                info!(k = config.k, completed, "training cancelled");
                return Ok(Training::Cancelled {
                    completed_iterations: completed,
                });
            }
            Err(e) => {
                warn!(iteration = completed, error = %e, "progress observer failed, continuing");
            }
        }
    }

    let model = sampler.freeze(warnings);
    info!(
        k = model.k,
        ll_per_word = model.ll_per_word,
        warnings = model.warnings.len(),
        "training finished"
    );
    Ok(Training::Completed(model))
}

/// A strict drop from the previous chunk's likelihood is a convergence warning.
fn likelihood_drop(iteration: usize, previous: Option<f64>, current: f64) -> Option<ModelWarning> {
    match previous {
        Some(previous) if current < previous => Some(ModelWarning::NonMonotonicLikelihood {
            iteration,
            previous,
            current,
        }),
        _ => None,
    }
}

/// Topic-distribution features: trains a model and returns its
/// document-topic rows.
#[derive(Debug, Clone)]
pub struct TopicFeatureExtractor {
    config: TrainConfig,
}

impl TopicFeatureExtractor {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }
}

impl FeatureExtractor for TopicFeatureExtractor {
    fn name(&self) -> &str {
        "topics"
    }

    fn extract(&self, corpus: &Corpus) -> Result<FeatureVectorSet> {
        match train(corpus, &self.config, &mut NoopObserver)? {
            Training::Completed(model) => Ok(model.document_features()),
            Training::Cancelled { .. } => Err(EngineError::invalid("training was cancelled")),
        }
    }
}
