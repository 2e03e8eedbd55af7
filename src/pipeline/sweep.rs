// Model selection sweep: one freshly seeded topic model per candidate K.
//
// Two independent sweeps exist, one scoring each model by log-likelihood per
// word and one by topic coherence. Each returns its whole curve plus a state
// telling whether it ran to the end; a recommendation is only offered for a
// completed sweep.
//
// The observer is asked before each K (completed = number of K values done)
// and once more at the very end. An observer error stops the sweep as Failed
// and keeps the points gathered so far.
//
// The coherence sweep trains with PMI term weighting by default, so common
// words shared by every article do not dominate the topics being scored.

use std::ops::RangeInclusive;

use serde::Serialize;
use tracing::{info, warn};

use super::selection::{ArgMax, ArgMin, SelectionPolicy};
use crate::corpus::Corpus;
use crate::error::{EngineError, Result};
use crate::topics::coherence::{CoherenceMeasure, CooccurrenceIndex};
use crate::topics::{
    train, Flow, MetadataMode, ModelWarning, NoopObserver, Priors, Progress, ProgressObserver,
    TermWeighting, TopicModel, TrainConfig, Training,
};

/// Parameters shared by both sweeps.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepConfig {
    /// Candidate topic counts, visited in ascending order
    pub k_range: RangeInclusive<usize>,
    /// Every K is trained from scratch with this same seed
    pub seed: u64,
    /// Counted iterations per K
    pub train_steps: usize,
    pub burn_in: usize,
    pub priors: Priors,
    pub coherence: CoherenceMeasure,
    /// Top terms per topic used for coherence
    pub coherence_top_n: usize,
    /// Term weighting of the models scored by log-likelihood
    pub likelihood_weighting: TermWeighting,
    /// Term weighting of the models scored by coherence
    pub coherence_weighting: TermWeighting,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            k_range: 2..=20,
            seed: 100,
            train_steps: 500,
            burn_in: 50,
            priors: Priors::default(),
            coherence: CoherenceMeasure::Cv,
            coherence_top_n: 10,
            likelihood_weighting: TermWeighting::One,
            coherence_weighting: TermWeighting::Pmi,
        }
    }
}

impl SweepConfig {
    fn validate(&self) -> Result<()> {
        if self.k_range.is_empty() {
            return Err(EngineError::invalid(format!(
                "empty k range {}..={}",
                self.k_range.start(),
                self.k_range.end()
            )));
        }
        if *self.k_range.start() == 0 {
            return Err(EngineError::invalid("k range must start at 1 or above"));
        }
        if self.train_steps == 0 {
            return Err(EngineError::invalid("train_steps must be at least 1"));
        }
        Ok(())
    }

    fn train_config(&self, k: usize, term_weighting: TermWeighting) -> TrainConfig {
        let defaults = TrainConfig::default();
        TrainConfig {
            k,
            seed: self.seed,
            iterations: self.train_steps,
            burn_in: self.burn_in,
            priors: self.priors,
            metadata_mode: MetadataMode::None,
            term_weighting,
            top_n: defaults.top_n.max(self.coherence_top_n),
            optimize_interval: defaults.optimize_interval,
        }
    }
}

/// What a sweep measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    LogLikelihood,
    Coherence(CoherenceMeasure),
}

impl Metric {
    pub fn name(&self) -> &'static str {
        match self {
            Metric::LogLikelihood => "ll_per_word",
            Metric::Coherence(measure) => measure.name(),
        }
    }

    /// Arg-min for log-likelihood, arg-max for coherence.
    pub fn default_policy(&self) -> &'static dyn SelectionPolicy {
        match self {
            Metric::LogLikelihood => &ArgMin,
            Metric::Coherence(_) => &ArgMax,
        }
    }
}

/// One point of a sweep curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EvaluationPoint {
    pub k: usize,
    pub metric: Metric,
    pub value: f64,
}

/// Lifecycle of a sweep.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SweepState {
    NotStarted,
    Running { k: usize },
    Completed,
    Failed { k: usize, reason: String },
    Cancelled { k: usize },
}

impl SweepState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SweepState::Completed | SweepState::Failed { .. } | SweepState::Cancelled { .. }
        )
    }
}

/// A training warning tagged with the K it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepWarning {
    pub k: usize,
    pub warning: ModelWarning,
}

/// The curve gathered by one sweep.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepReport {
    pub metric: Metric,
    /// K ascending
    pub points: Vec<EvaluationPoint>,
    pub state: SweepState,
    pub warnings: Vec<SweepWarning>,
}

impl SweepReport {
    fn new(metric: Metric) -> Self {
        Self {
            metric,
            points: Vec::new(),
            state: SweepState::NotStarted,
            warnings: Vec::new(),
        }
    }

    fn transition(&mut self, next: SweepState) {
        info!(metric = self.metric.name(), from = ?self.state, to = ?next, "sweep state");
        self.state = next;
    }

    pub fn is_completed(&self) -> bool {
        self.state == SweepState::Completed
    }

    /// The metric's default recommendation, for completed sweeps only.
    pub fn recommended_k(&self) -> Option<usize> {
        self.recommend_with(self.metric.default_policy())
    }

    /// Apply any policy to the curve, for completed sweeps only.
    pub fn recommend_with(&self, policy: &dyn SelectionPolicy) -> Option<usize> {
        if self.is_completed() {
            policy.select(&self.points)
        } else {
            None
        }
    }

    pub fn value_at(&self, k: usize) -> Option<f64> {
        self.points.iter().find(|p| p.k == k).map(|p| p.value)
    }
}

/// Score each K by the final log-likelihood per word.
pub fn sweep_log_likelihood(
    corpus: &Corpus,
    config: &SweepConfig,
    observer: &mut dyn ProgressObserver,
) -> Result<SweepReport> {
    let weighting = config.likelihood_weighting;
    run(corpus, config, Metric::LogLikelihood, weighting, observer, |model| {
        model.ll_per_word
    })
}

/// Score each K by mean topic coherence.
pub fn sweep_coherence(
    corpus: &Corpus,
    config: &SweepConfig,
    observer: &mut dyn ProgressObserver,
) -> Result<SweepReport> {
    let index = CooccurrenceIndex::new(corpus);
    let measure = config.coherence;
    let top_n = config.coherence_top_n;
    let weighting = config.coherence_weighting;
    run(corpus, config, Metric::Coherence(measure), weighting, observer, |model| {
        index.model_score(model, measure, top_n)
    })
}

fn run(
    corpus: &Corpus,
    config: &SweepConfig,
    metric: Metric,
    weighting: TermWeighting,
    observer: &mut dyn ProgressObserver,
    score: impl Fn(&TopicModel) -> f64,
) -> Result<SweepReport> {
    if corpus.is_empty() {
        return Err(EngineError::EmptyCorpus);
    }
    config.validate()?;

    let ks: Vec<usize> = config.k_range.clone().collect();
    let total = ks.len();
    let mut report = SweepReport::new(metric);
    info!(
        metric = metric.name(),
        k_min = ks[0],
        k_max = ks[total - 1],
        seed = config.seed,
        weighting = ?weighting,
        "starting sweep"
    );

    for (i, &k) in ks.iter().enumerate() {
        let progress = Progress {
            completed: i,
            total,
            metric: report.points.last().map(|p| p.value),
        };
        match observer.on_progress(&progress) {
            Ok(Flow::Continue) => {}
            Ok(Flow::Cancel) => {
                report.transition(SweepState::Cancelled { k });
                return Ok(report);
            }
            Err(e) => {
                warn!(k, error = %e, "progress observer failed, stopping sweep");
                report.transition(SweepState::Failed {
                    k,
                    reason: e.to_string(),
                });
                return Ok(report);
            }
        }

        report.transition(SweepState::Running { k });
        match train(corpus, &config.train_config(k, weighting), &mut NoopObserver) {
            Ok(Training::Completed(model)) => {
                let value = score(&model);
                info!(k, metric = metric.name(), value, "sweep point");
                report.points.push(EvaluationPoint { k, metric, value });
                report.warnings.extend(
                    model
                        .warnings
                        .into_iter()
                        .map(|warning| SweepWarning { k, warning }),
                );
            }
            Ok(Training::Cancelled { .. }) => {
                report.transition(SweepState::Cancelled { k });
                return Ok(report);
            }
            Err(e) => {
                let err = EngineError::Training {
                    k,
                    source: Box::new(e),
                };
                warn!(error = %err, "sweep training failed");
                report.transition(SweepState::Failed {
                    k,
                    reason: err.to_string(),
                });
                return Ok(report);
            }
        }
    }

    let done = Progress {
        completed: total,
        total,
        metric: report.points.last().map(|p| p.value),
    };
    if let Err(e) = observer.on_progress(&done) {
        warn!(error = %e, "progress observer failed after the last k");
    }

    report.transition(SweepState::Completed);
    Ok(report)
}
