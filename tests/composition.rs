// Composition tests: verifying that the stages chain together correctly.
//
// These tests exercise the data flow between modules:
//   dataset rows -> Corpus -> {frequency | topic} features -> similarity
//   Corpus -> sweep -> recommended K -> topic model -> export
// without touching the network. File output goes to a temp directory.

use std::collections::HashSet;

use serde_json::json;

use newsprint::corpus::loader::{dataset_from_rows, ColumnSpec};
use newsprint::corpus::Corpus;
use newsprint::features::frequency::{FrequencyConfig, FrequencyExtractor, Weighting};
use newsprint::features::traits::FeatureExtractor;
use newsprint::output::export::write_json;
use newsprint::pipeline::{sweep_log_likelihood, SweepConfig};
use newsprint::similarity::pairwise_cosine;
use newsprint::topics::{
    train, MetadataMode, NoopObserver, Priors, TopicFeatureExtractor, TrainConfig,
};

fn rows() -> Vec<serde_json::Value> {
    vec![
        json!({"id": "1920-04-01-a", "doc_split_12gram": "['예산', '국회', '정부', '예산']", "grid_1": "사설"}),
        json!({"id": "1920-04-01-b", "doc_split_12gram": ["국회", "의원", "정부", "세금"], "grid_1": "사설"}),
        json!({"id": "1920-04-02-a", "doc_split_12gram": "풍년 수확 농촌 벼", "grid_1": "기사"}),
        json!({"id": "1920-04-02-b", "doc_split_12gram": ["농촌", "벼", "수확", "비"], "grid_1": "기사"}),
        json!({"id": "1920-04-03-a", "doc_split_12gram": [], "grid_1": "기사"}),
        json!({"id": "1920-04-03-b", "doc_split_12gram": "['예산', '국회', '정부', '예산']", "grid_1": "사설"}),
    ]
}

fn load(metadata: bool) -> Corpus {
    let columns = ColumnSpec {
        metadata: metadata.then(|| "grid_1".to_string()),
        id: Some("id".to_string()),
        ..ColumnSpec::default()
    };
    let dataset = dataset_from_rows(&rows(), &columns).unwrap();
    assert_eq!(dataset.skipped_rows, vec![4]);
    dataset.corpus
}

// ============================================================
// Chain: rows -> corpus -> frequency features -> similarity
// ============================================================

#[test]
fn duplicate_articles_are_maximally_similar_under_frequency_features() {
    let corpus = load(false);
    let extractor = FrequencyExtractor::new(FrequencyConfig {
        stopwords: HashSet::new(),
        rank_n: 20,
        weighting: Weighting::TfIdf,
    });
    let features = extractor.extract(&corpus).unwrap();
    let sim = pairwise_cosine(&features);

    assert_eq!(sim.between("1920-04-01-a", "1920-04-03-b"), Some(1.0));
    assert_eq!(sim.between("1920-04-01-a", "1920-04-02-a"), Some(0.0));
    let nearest = sim.most_similar(0, 1);
    assert_eq!(nearest[0].0, "1920-04-03-b");
}

// ============================================================
// Chain: corpus -> topic features -> similarity
// ============================================================

#[test]
fn topic_features_feed_similarity() {
    let corpus = load(false);
    let extractors: Vec<Box<dyn FeatureExtractor>> = vec![
        Box::new(FrequencyExtractor::default()),
        Box::new(TopicFeatureExtractor::new(TrainConfig {
            k: 2,
            seed: 103,
            iterations: 60,
            ..TrainConfig::default()
        })),
    ];

    for extractor in &extractors {
        let features = extractor.extract(&corpus).unwrap();
        assert_eq!(features.n_rows(), corpus.len(), "{}", extractor.name());
        let sim = pairwise_cosine(&features);
        for i in 0..sim.len() {
            for j in 0..sim.len() {
                let v = sim.get(i, j).unwrap();
                assert!((0.0..=1.0).contains(&v));
                assert_eq!(v, sim.get(j, i).unwrap());
            }
        }
    }
}

#[test]
fn covariate_model_from_dataset_metadata() {
    let corpus = load(true);
    let outcome = train(
        &corpus,
        &TrainConfig {
            k: 2,
            seed: 103,
            iterations: 60,
            priors: Priors {
                alpha: 0.05,
                eta: 0.1,
            },
            metadata_mode: MetadataMode::Covariate,
            ..TrainConfig::default()
        },
        &mut NoopObserver,
    )
    .unwrap();
    let model = outcome.into_model().unwrap();

    assert_eq!(model.covariate_priors.len(), 2);
    assert_eq!(model.document_ids, corpus.ids());
    assert_eq!(model.dominant_topics().len(), corpus.len());
}

// ============================================================
// Chain: sweep -> recommended K -> model -> export
// ============================================================

#[test]
fn recommended_k_trains_and_exports() {
    let corpus = load(false);
    let report = sweep_log_likelihood(
        &corpus,
        &SweepConfig {
            k_range: 1..=3,
            train_steps: 40,
            burn_in: 10,
            ..SweepConfig::default()
        },
        &mut NoopObserver,
    )
    .unwrap();
    let k = report.recommended_k().unwrap();
    assert!((1..=3).contains(&k));

    let model = train(
        &corpus,
        &TrainConfig {
            k,
            iterations: 40,
            ..TrainConfig::default()
        },
        &mut NoopObserver,
    )
    .unwrap()
    .into_model()
    .unwrap();
    assert_eq!(model.k, k);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("topics.json");
    write_json(&path, "topics", &model).unwrap();

    let exported: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(exported["result"]["k"], json!(k));
    assert_eq!(
        exported["result"]["document_topics"]
            .as_array()
            .unwrap()
            .len(),
        corpus.len()
    );
}
