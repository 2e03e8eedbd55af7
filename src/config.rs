use std::env;
use std::str::FromStr;

use anyhow::{Context, Result};

use crate::corpus::loader::ColumnSpec;
use crate::pipeline::SweepConfig;
use crate::topics::{Priors, TrainConfig};

/// Defaults loaded from environment variables.
///
/// The .env file is loaded automatically at startup via dotenvy. Every value
/// has a built-in default; command-line flags override whatever is set here.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Column holding each record's tokens (NEWSPRINT_TOKEN_COLUMN)
    pub token_column: String,
    /// Column holding the per-document covariate, if any (NEWSPRINT_METADATA_COLUMN)
    pub metadata_column: Option<String>,
    /// Column holding document ids, if any (NEWSPRINT_ID_COLUMN)
    pub id_column: Option<String>,
    /// Seed for topic training (NEWSPRINT_SEED)
    pub seed: u64,
    /// Seed for model selection sweeps (NEWSPRINT_SWEEP_SEED)
    pub sweep_seed: u64,
    /// Defaults to the library's `Priors::default()` (NEWSPRINT_ALPHA)
    pub alpha: f64,
    /// Defaults to the library's `Priors::default()` (NEWSPRINT_ETA)
    pub eta: f64,
    /// Counted training iterations (NEWSPRINT_ITERATIONS)
    pub iterations: usize,
    /// Iterations per K in a sweep (NEWSPRINT_TRAIN_STEPS)
    pub train_steps: usize,
    /// Uncounted iterations before counting starts, for training and for
    /// every K of a sweep (NEWSPRINT_BURN_IN)
    pub burn_in: usize,
    /// Topic count for a single training run (NEWSPRINT_K)
    pub k: usize,
    /// First K of the coherence sweep (NEWSPRINT_K_MIN)
    pub k_min: usize,
    /// First K of the log-likelihood sweep (NEWSPRINT_LIKELIHOOD_K_MIN)
    pub likelihood_k_min: usize,
    /// Last K of both sweeps (NEWSPRINT_K_MAX)
    pub k_max: usize,
    /// Terms kept per topic (NEWSPRINT_TOP_N)
    pub top_n: usize,
    /// Ranked terms kept as frequency features (NEWSPRINT_RANK_N)
    pub rank_n: usize,
}

impl Default for Config {
    fn default() -> Self {
        let priors = Priors::default();
        Self {
            token_column: "doc_split_12gram".to_string(),
            metadata_column: None,
            id_column: None,
            seed: 103,
            sweep_seed: 100,
            alpha: priors.alpha,
            eta: priors.eta,
            iterations: 1000,
            train_steps: 500,
            burn_in: 50,
            k: 10,
            k_min: 2,
            likelihood_k_min: 1,
            k_max: 20,
            top_n: 20,
            rank_n: 50,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        let defaults = Self::default();
        let config = Self {
            token_column: env::var("NEWSPRINT_TOKEN_COLUMN").unwrap_or(defaults.token_column),
            metadata_column: non_empty_var("NEWSPRINT_METADATA_COLUMN"),
            id_column: non_empty_var("NEWSPRINT_ID_COLUMN"),
            seed: parsed_var("NEWSPRINT_SEED", defaults.seed)?,
            sweep_seed: parsed_var("NEWSPRINT_SWEEP_SEED", defaults.sweep_seed)?,
            alpha: parsed_var("NEWSPRINT_ALPHA", defaults.alpha)?,
            eta: parsed_var("NEWSPRINT_ETA", defaults.eta)?,
            iterations: parsed_var("NEWSPRINT_ITERATIONS", defaults.iterations)?,
            train_steps: parsed_var("NEWSPRINT_TRAIN_STEPS", defaults.train_steps)?,
            burn_in: parsed_var("NEWSPRINT_BURN_IN", defaults.burn_in)?,
            k: parsed_var("NEWSPRINT_K", defaults.k)?,
            k_min: parsed_var("NEWSPRINT_K_MIN", defaults.k_min)?,
            likelihood_k_min: parsed_var(
                "NEWSPRINT_LIKELIHOOD_K_MIN",
                defaults.likelihood_k_min,
            )?,
            k_max: parsed_var("NEWSPRINT_K_MAX", defaults.k_max)?,
            top_n: parsed_var("NEWSPRINT_TOP_N", defaults.top_n)?,
            rank_n: parsed_var("NEWSPRINT_RANK_N", defaults.rank_n)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check values that would only fail much later, deep inside training.
    pub fn validate(&self) -> Result<()> {
        if !(self.alpha > 0.0 && self.eta > 0.0) {
            anyhow::bail!(
                "NEWSPRINT_ALPHA and NEWSPRINT_ETA must be positive (got {} and {})",
                self.alpha,
                self.eta
            );
        }
        if self.k_min == 0 || self.k_min > self.k_max {
            anyhow::bail!(
                "invalid K range {}..={}. Set NEWSPRINT_K_MIN >= 1 and NEWSPRINT_K_MAX >= NEWSPRINT_K_MIN.",
                self.k_min,
                self.k_max
            );
        }
        if self.likelihood_k_min == 0 || self.likelihood_k_min > self.k_max {
            anyhow::bail!(
                "invalid log-likelihood K range {}..={}. Set NEWSPRINT_LIKELIHOOD_K_MIN between 1 and NEWSPRINT_K_MAX.",
                self.likelihood_k_min,
                self.k_max
            );
        }
        Ok(())
    }

    pub fn priors(&self) -> Priors {
        Priors {
            alpha: self.alpha,
            eta: self.eta,
        }
    }

    /// Single-run training parameters. Covariate mode is the caller's choice.
    pub fn train_config(&self) -> TrainConfig {
        TrainConfig {
            k: self.k,
            seed: self.seed,
            iterations: self.iterations,
            burn_in: self.burn_in,
            priors: self.priors(),
            top_n: self.top_n,
            ..TrainConfig::default()
        }
    }

    /// Coherence sweep over `k_min..=k_max`.
    pub fn coherence_sweep_config(&self) -> SweepConfig {
        SweepConfig {
            k_range: self.k_min..=self.k_max,
            seed: self.sweep_seed,
            train_steps: self.train_steps,
            burn_in: self.burn_in,
            priors: self.priors(),
            ..SweepConfig::default()
        }
    }

    /// Log-likelihood sweep over `likelihood_k_min..=k_max` (K=1 by default).
    pub fn likelihood_sweep_config(&self) -> SweepConfig {
        SweepConfig {
            k_range: self.likelihood_k_min..=self.k_max,
            ..self.coherence_sweep_config()
        }
    }

    pub fn columns(&self) -> ColumnSpec {
        ColumnSpec {
            tokens: self.token_column.clone(),
            metadata: self.metadata_column.clone(),
            id: self.id_column.clone(),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parsed_var<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .with_context(|| format!("{name} has an invalid value: {raw:?}")),
        _ => Ok(default),
    }
}
