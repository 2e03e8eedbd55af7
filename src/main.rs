use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::info;

use newsprint::config::Config;
use newsprint::corpus::loader::{load_dataset, ColumnSpec, LoadedDataset};
use newsprint::features::frequency::{FrequencyConfig, Weighting};
use newsprint::features::FeatureVectorSet;
use newsprint::output::{export, terminal};
use newsprint::pipeline::{
    sweep_coherence, sweep_log_likelihood, SelectionSummary, SweepConfig,
};
use newsprint::similarity::{pairwise_cosine, SimilarityMatrix};
use newsprint::text::stopwords::{english_stopwords, parse_stopwords};
use newsprint::topics::{
    train, CoherenceMeasure, Flow, MetadataMode, ObserverError, Priors, Progress,
    ProgressObserver, TermWeighting, TopicModel, TrainConfig, Training,
};

/// Newsprint: topic discovery and feature extraction for newspaper corpora.
///
/// Reads a tokenized dataset (JSON array or JSON Lines), turns each article
/// into a feature vector, trains topic models, and suggests topic counts.
#[derive(Parser)]
#[command(name = "newsprint", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Frequency-ranked term features (raw counts or TF-IDF)
    Features {
        #[command(flatten)]
        dataset: DatasetArgs,

        /// Comma-separated terms to exclude (e.g. "문제,금일,관계")
        #[arg(long)]
        stopwords: Option<String>,

        /// Also exclude the built-in English stopword list
        #[arg(long)]
        english_stopwords: bool,

        /// Number of top-ranked terms kept as columns
        #[arg(long)]
        rank_n: Option<usize>,

        /// Cell weighting
        #[arg(long, value_enum, default_value = "tfidf")]
        weighting: WeightingArg,

        /// Also compute pairwise cosine similarity between documents
        #[arg(long)]
        similarity: bool,

        /// Write results to this JSON file
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Train a topic model (metadata-conditioned when --metadata-column is set)
    Topics {
        #[command(flatten)]
        dataset: DatasetArgs,

        /// Number of topics
        #[arg(long)]
        k: Option<usize>,

        #[arg(long)]
        seed: Option<u64>,

        /// Counted training iterations
        #[arg(long)]
        iterations: Option<usize>,

        /// Uncounted iterations before the first progress report
        #[arg(long)]
        burn_in: Option<usize>,

        #[arg(long)]
        alpha: Option<f64>,

        #[arg(long)]
        eta: Option<f64>,

        /// Terms listed per topic
        #[arg(long)]
        top_n: Option<usize>,

        /// Token weighting for the topic counts
        #[arg(long, value_enum, default_value = "one")]
        term_weighting: TermWeightingArg,

        /// Also compute pairwise cosine similarity of topic distributions
        #[arg(long)]
        similarity: bool,

        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Train one model per K and recommend topic counts
    Sweep {
        #[command(flatten)]
        dataset: DatasetArgs,

        /// Which curve(s) to compute
        #[arg(long, value_enum, default_value = "both")]
        metric: MetricArg,

        /// Coherence measure for the coherence curve
        #[arg(long, value_enum, default_value = "cv")]
        coherence: CoherenceArg,

        /// Token weighting of the models scored by coherence
        #[arg(long, value_enum, default_value = "pmi")]
        coherence_weighting: TermWeightingArg,

        /// First K of the coherence curve
        #[arg(long)]
        k_min: Option<usize>,

        /// First K of the log-likelihood curve
        #[arg(long)]
        likelihood_k_min: Option<usize>,

        /// Last K of both curves
        #[arg(long)]
        k_max: Option<usize>,

        #[arg(long)]
        seed: Option<u64>,

        /// Counted iterations per K
        #[arg(long)]
        train_steps: Option<usize>,

        #[arg(long)]
        burn_in: Option<usize>,

        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Print the normalized token stream of a piece of text
    Normalize {
        text: String,
    },
}

#[derive(clap::Args)]
struct DatasetArgs {
    /// Dataset file (.json array of objects, or .jsonl)
    #[arg(long)]
    input: PathBuf,

    /// Column holding each record's tokens
    #[arg(long)]
    token_column: Option<String>,

    /// Column holding the per-document covariate
    #[arg(long)]
    metadata_column: Option<String>,

    /// Column holding document ids
    #[arg(long)]
    id_column: Option<String>,
}

impl DatasetArgs {
    fn columns(&self, config: &Config) -> ColumnSpec {
        let defaults = config.columns();
        ColumnSpec {
            tokens: self.token_column.clone().unwrap_or(defaults.tokens),
            metadata: self.metadata_column.clone().or(defaults.metadata),
            id: self.id_column.clone().or(defaults.id),
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum WeightingArg {
    Count,
    Tfidf,
}

#[derive(Clone, Copy, PartialEq, ValueEnum)]
enum MetricArg {
    Likelihood,
    Coherence,
    Both,
}

#[derive(Clone, Copy, ValueEnum)]
enum CoherenceArg {
    Cv,
    Umass,
    Npmi,
}

#[derive(Clone, Copy, ValueEnum)]
enum TermWeightingArg {
    One,
    Pmi,
}

impl From<TermWeightingArg> for TermWeighting {
    fn from(arg: TermWeightingArg) -> Self {
        match arg {
            TermWeightingArg::One => TermWeighting::One,
            TermWeightingArg::Pmi => TermWeighting::Pmi,
        }
    }
}

impl From<CoherenceArg> for CoherenceMeasure {
    fn from(arg: CoherenceArg) -> Self {
        match arg {
            CoherenceArg::Cv => CoherenceMeasure::Cv,
            CoherenceArg::Umass => CoherenceMeasure::UMass,
            CoherenceArg::Npmi => CoherenceMeasure::Npmi,
        }
    }
}

/// Documents shown in terminal tables.
const DISPLAY_ROWS: usize = 15;

fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("newsprint=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Features {
            dataset,
            stopwords,
            english_stopwords: use_english,
            rank_n,
            weighting,
            similarity,
            output,
        } => {
            let config = Config::load()?;
            let loaded = load(&dataset.input, &dataset.columns(&config))?;

            let mut stop = stopwords.as_deref().map(parse_stopwords).unwrap_or_default();
            if use_english {
                stop.extend(english_stopwords());
            }
            let weighting = match weighting {
                WeightingArg::Count => Weighting::RawCount,
                WeightingArg::Tfidf => Weighting::TfIdf,
            };
            let frequency = FrequencyConfig {
                stopwords: stop,
                rank_n: rank_n.unwrap_or(config.rank_n),
                weighting,
            };

            let features = newsprint::features::frequency::extract(&loaded.corpus, &frequency)
                .context("Feature extraction failed")?;
            let label = match weighting {
                Weighting::RawCount => "Count",
                Weighting::TfIdf => "TF-IDF",
            };
            terminal::display_features(&features, label, DISPLAY_ROWS);

            let matrix = similarity.then(|| pairwise_cosine(&features));
            if let Some(matrix) = &matrix {
                terminal::display_similarity(matrix, 3, DISPLAY_ROWS);
            }

            if let Some(path) = output {
                #[derive(Serialize)]
                struct FeaturesExport<'a> {
                    features: &'a FeatureVectorSet,
                    similarity: Option<&'a SimilarityMatrix>,
                }
                export::write_json(
                    &path,
                    "features",
                    &FeaturesExport {
                        features: &features,
                        similarity: matrix.as_ref(),
                    },
                )?;
                println!("\nResults written to {}", path.display());
            }
        }

        Commands::Topics {
            dataset,
            k,
            seed,
            iterations,
            burn_in,
            alpha,
            eta,
            top_n,
            term_weighting,
            similarity,
            output,
        } => {
            let config = Config::load()?;
            let columns = dataset.columns(&config);
            let loaded = load(&dataset.input, &columns)?;

            let metadata_mode = if columns.metadata.is_some() {
                MetadataMode::Covariate
            } else {
                MetadataMode::None
            };
            let defaults = config.train_config();
            let train_config = TrainConfig {
                k: k.unwrap_or(defaults.k),
                seed: seed.unwrap_or(defaults.seed),
                iterations: iterations.unwrap_or(defaults.iterations),
                burn_in: burn_in.unwrap_or(defaults.burn_in),
                priors: Priors {
                    alpha: alpha.unwrap_or(defaults.priors.alpha),
                    eta: eta.unwrap_or(defaults.priors.eta),
                },
                metadata_mode,
                term_weighting: term_weighting.into(),
                top_n: top_n.unwrap_or(defaults.top_n),
                ..defaults
            };

            println!(
                "Training {} topics on {} documents ({} tokens)...",
                train_config.k,
                loaded.corpus.len(),
                loaded.corpus.token_count()
            );
            let mut observer = BarObserver::new("Training", train_config.iterations)?;
            let outcome = train(&loaded.corpus, &train_config, &mut observer);
            observer.finish();

            let model = match outcome.context("Topic training failed")? {
                Training::Completed(model) => model,
                Training::Cancelled {
                    completed_iterations,
                } => {
                    anyhow::bail!("Training cancelled after {completed_iterations} iterations")
                }
            };
            terminal::display_topics(&model, 10);

            let features = model.document_features();
            let matrix = similarity.then(|| pairwise_cosine(&features));
            if let Some(matrix) = &matrix {
                terminal::display_similarity(matrix, 3, DISPLAY_ROWS);
            }

            if let Some(path) = output {
                #[derive(Serialize)]
                struct TopicsExport<'a> {
                    model: &'a TopicModel,
                    features: &'a FeatureVectorSet,
                    similarity: Option<&'a SimilarityMatrix>,
                }
                export::write_json(
                    &path,
                    "topics",
                    &TopicsExport {
                        model: &model,
                        features: &features,
                        similarity: matrix.as_ref(),
                    },
                )?;
                println!("\nResults written to {}", path.display());
            }
        }

        Commands::Sweep {
            dataset,
            metric,
            coherence,
            coherence_weighting,
            k_min,
            likelihood_k_min,
            k_max,
            seed,
            train_steps,
            burn_in,
            output,
        } => {
            let config = Config::load()?;
            let loaded = load(&dataset.input, &dataset.columns(&config))?;

            let defaults = config.coherence_sweep_config();
            let k_max = k_max.unwrap_or(config.k_max);
            let coherence_config = SweepConfig {
                k_range: k_min.unwrap_or(config.k_min)..=k_max,
                seed: seed.unwrap_or(defaults.seed),
                train_steps: train_steps.unwrap_or(defaults.train_steps),
                burn_in: burn_in.unwrap_or(defaults.burn_in),
                coherence: coherence.into(),
                coherence_weighting: coherence_weighting.into(),
                ..defaults
            };
            let likelihood_config = SweepConfig {
                k_range: likelihood_k_min.unwrap_or(config.likelihood_k_min)..=k_max,
                ..coherence_config.clone()
            };

            let likelihood = if metric != MetricArg::Coherence {
                let n_k = likelihood_config.k_range.clone().count();
                let mut observer = BarObserver::new("Log-likelihood", n_k)?;
                let report =
                    sweep_log_likelihood(&loaded.corpus, &likelihood_config, &mut observer);
                observer.finish();
                let report = report.context("Log-likelihood sweep failed")?;
                terminal::display_sweep(&report);
                Some(report)
            } else {
                None
            };

            let coherence_report = if metric != MetricArg::Likelihood {
                let n_k = coherence_config.k_range.clone().count();
                let mut observer = BarObserver::new("Coherence", n_k)?;
                let report = sweep_coherence(&loaded.corpus, &coherence_config, &mut observer);
                observer.finish();
                let report = report.context("Coherence sweep failed")?;
                terminal::display_sweep(&report);
                Some(report)
            } else {
                None
            };

            let summary = SelectionSummary::new(likelihood, coherence_report);
            terminal::display_summary(&summary);

            if let Some(path) = output {
                export::write_json(&path, "sweep", &summary)?;
                println!("Results written to {}", path.display());
            }
        }

        Commands::Normalize { text } => {
            let tokens = newsprint::text::tokenize(&text);
            if tokens.is_empty() {
                println!("{}", "(no tokens)".dimmed());
            } else {
                println!("{}", tokens.join(" "));
            }
        }
    }

    Ok(())
}

/// Load a dataset and report how many rows made it into the corpus.
fn load(path: &Path, columns: &ColumnSpec) -> Result<LoadedDataset> {
    let loaded = load_dataset(path, columns)?;
    if loaded.corpus.is_empty() {
        anyhow::bail!(
            "No documents with tokens found in {} (column `{}`)",
            path.display(),
            columns.tokens
        );
    }
    info!(
        documents = loaded.corpus.len(),
        skipped = loaded.skipped_rows.len(),
        "Dataset loaded"
    );
    if !loaded.skipped_rows.is_empty() {
        println!(
            "  {} {} rows skipped (no tokens)",
            "~".yellow(),
            loaded.skipped_rows.len()
        );
    }
    Ok(loaded)
}

/// Drives an indicatif progress bar from training or sweep notifications.
struct BarObserver {
    bar: ProgressBar,
}

impl BarObserver {
    fn new(label: &str, total: usize) -> Result<Self> {
        let bar = ProgressBar::new(total as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template(&format!("  {label} [{{bar:30}}] {{pos}}/{{len}} ({{eta}}) {{msg}}"))?,
        );
        Ok(Self { bar })
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl ProgressObserver for BarObserver {
    fn on_progress(&mut self, progress: &Progress) -> std::result::Result<Flow, ObserverError> {
        self.bar.set_length(progress.total as u64);
        self.bar.set_position(progress.completed as u64);
        if let Some(metric) = progress.metric {
            self.bar.set_message(format!("{metric:.4}"));
        }
        Ok(Flow::Continue)
    }
}
