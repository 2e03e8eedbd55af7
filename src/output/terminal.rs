// Colored terminal output for features, topics and sweep curves.
//
// This module handles all terminal-specific formatting: colors, tables,
// recommendations. The main.rs command handlers delegate here.

use colored::Colorize;

use crate::features::FeatureVectorSet;
use crate::pipeline::{SelectionSummary, SweepReport, SweepState};
use crate::similarity::SimilarityMatrix;
use crate::topics::{ModelWarning, TopicModel};

/// Feature columns shown before the table is cut off.
const MAX_COLUMNS: usize = 8;

/// Display the first `max_rows` rows of a feature set.
pub fn display_features(features: &FeatureVectorSet, label: &str, max_rows: usize) {
    println!(
        "\n{}",
        format!(
            "=== {label} features ({} documents x {} columns) ===",
            features.n_rows(),
            features.n_columns()
        )
        .bold()
    );
    println!();

    let shown = features.n_columns().min(MAX_COLUMNS);
    let mut header = format!("  {:<16}", "Document");
    for column in features.column_labels.iter().take(shown) {
        header.push_str(&format!(" {:>10}", super::truncate_chars(column, 9)));
    }
    println!("{}", header.dimmed());
    println!("  {}", "-".repeat(16 + 11 * shown).dimmed());

    for (label, row) in features.row_labels.iter().zip(&features.rows).take(max_rows) {
        let mut line = format!("  {:<16}", super::truncate_chars(label, 15));
        for value in row.iter().take(shown) {
            line.push_str(&format!(" {value:>10.4}"));
        }
        println!("{line}");
    }

    if features.n_rows() > max_rows {
        println!(
            "  {}",
            format!("... {} more documents", features.n_rows() - max_rows).dimmed()
        );
    }
    if features.n_columns() > shown {
        println!(
            "  {}",
            format!("... {} more columns", features.n_columns() - shown).dimmed()
        );
    }
}

/// Display each document's nearest neighbours.
pub fn display_similarity(matrix: &SimilarityMatrix, neighbours: usize, max_rows: usize) {
    println!(
        "\n{}",
        format!("=== Cosine similarity ({} documents) ===", matrix.len()).bold()
    );
    println!();

    for i in 0..matrix.len().min(max_rows) {
        let nearest = matrix
            .most_similar(i, neighbours)
            .into_iter()
            .map(|(id, sim)| format!("{} {}", id, colorize_similarity(sim)))
            .collect::<Vec<_>>()
            .join(", ");
        println!("  {:<16} {}", super::truncate_chars(&matrix.labels[i], 15), nearest);
    }
    if matrix.len() > max_rows {
        println!(
            "  {}",
            format!("... {} more documents", matrix.len() - max_rows).dimmed()
        );
    }
}

/// Display the ranked terms of every topic.
pub fn display_topics(model: &TopicModel, terms_per_topic: usize) {
    println!(
        "\n{}",
        format!(
            "=== Topics (k={}, {} documents, {} terms) ===",
            model.k,
            model.document_ids.len(),
            model.vocabulary_size
        )
        .bold()
    );
    println!(
        "  Log-likelihood per word: {:.4}  |  Iterations: {} (+{} burn-in)  |  Seed: {}",
        model.ll_per_word, model.iterations, model.burn_in, model.seed
    );
    println!();

    let shares = topic_shares(model);
    for topic in &model.topics {
        let words = topic
            .terms
            .iter()
            .take(terms_per_topic)
            .map(|t| t.term.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        println!(
            "  {} {}  {}",
            format!("T{:<3}", topic.topic).cyan().bold(),
            format!("{:>5.1}%", shares[topic.topic] * 100.0).dimmed(),
            words
        );
    }

    if !model.covariate_priors.is_empty() {
        println!("\n  Topic priors by metadata value:");
        for prior in &model.covariate_priors {
            let best = prior
                .alpha
                .iter()
                .enumerate()
                .fold((0, f64::NEG_INFINITY), |b, (t, &a)| if a > b.1 { (t, a) } else { b });
            println!(
                "    {:<20} strongest topic {}  (alpha {:.3})",
                super::truncate_chars(&prior.key, 20),
                format!("T{}", best.0).cyan(),
                best.1
            );
        }
    }

    display_warnings(&model.warnings);
}

/// Mean topic weight across documents.
fn topic_shares(model: &TopicModel) -> Vec<f64> {
    let mut shares = vec![0.0; model.k];
    for row in &model.document_topics {
        for (s, p) in shares.iter_mut().zip(row) {
            *s += p;
        }
    }
    let n = model.document_topics.len().max(1) as f64;
    shares.iter().map(|s| s / n).collect()
}

/// Display training warnings, if any.
pub fn display_warnings(warnings: &[ModelWarning]) {
    if warnings.is_empty() {
        return;
    }
    let drops = warnings
        .iter()
        .filter(|w| matches!(w, ModelWarning::NonMonotonicLikelihood { .. }))
        .count();
    if drops > 0 {
        println!(
            "\n  {} log-likelihood dropped between chunks {} time(s)",
            "~".yellow(),
            drops
        );
    }
    for warning in warnings {
        if let ModelWarning::NearEmptyTopic { topic, share } = warning {
            println!(
                "  {} topic T{} holds only {:.3}% of tokens",
                "!".bright_red(),
                topic,
                share * 100.0
            );
        }
    }
}

/// Display a sweep curve with its recommendation marked.
pub fn display_sweep(report: &SweepReport) {
    println!(
        "\n{}",
        format!("=== Sweep: {} ===", report.metric.name()).bold()
    );
    println!();
    println!("  {:>4}  {:>12}", "K".dimmed(), "Value".dimmed());
    println!("  {}", "-".repeat(20).dimmed());

    let recommended = report.recommended_k();
    for point in &report.points {
        let marker = if Some(point.k) == recommended {
            " <- recommended".green().bold().to_string()
        } else {
            String::new()
        };
        println!("  {:>4}  {:>12.5}{}", point.k, point.value, marker);
    }

    match &report.state {
        SweepState::Completed => {}
        SweepState::Failed { k, reason } => {
            println!("  {} sweep failed at k={}: {}", "!!".red().bold(), k, reason);
        }
        SweepState::Cancelled { k } => {
            println!("  {} sweep cancelled before k={}", "~".yellow(), k);
        }
        state => println!("  {} sweep ended in state {:?}", "?".dimmed(), state),
    }
}

/// Display both recommendations side by side.
pub fn display_summary(summary: &SelectionSummary) {
    println!("\n{}", "=== Recommended topic counts ===".bold());
    let show = |label: &str, k: Option<usize>| match k {
        Some(k) => println!("  {:<28} {}", label, k.to_string().green().bold()),
        None => println!("  {:<28} {}", label, "n/a".dimmed()),
    };
    if summary.likelihood.is_some() {
        show("Log-likelihood (arg min):", summary.likelihood_k());
        show("Log-likelihood (elbow):", summary.elbow_k());
    }
    if summary.coherence.is_some() {
        show("Coherence (arg max):", summary.coherence_k());
    }
    println!();
}

/// Colorize a similarity value by strength.
fn colorize_similarity(sim: f64) -> colored::ColoredString {
    let text = format!("{sim:.3}");
    if sim >= 0.8 {
        text.green().bold()
    } else if sim >= 0.5 {
        text.yellow()
    } else {
        text.dimmed()
    }
}
