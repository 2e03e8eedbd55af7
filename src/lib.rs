// Newsprint: topic discovery and feature extraction for newspaper corpora
//
// This is the library root. Each module corresponds to one stage of the
// pipeline: raw text -> corpus -> feature vectors or topic models ->
// similarity and topic-count recommendations.

pub mod config;
pub mod corpus;
pub mod error;
pub mod features;
pub mod math;
pub mod output;
pub mod pipeline;
pub mod similarity;
pub mod text;
pub mod topics;

pub use error::{EngineError, Result};
