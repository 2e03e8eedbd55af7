// Engine error taxonomy.
//
// Structural problems with the caller's input (empty corpus, a document with
// no tokens, mixed metadata kinds) are fatal and surface as `EngineError`.
// Numerical anomalies during training are not errors; they are collected as
// `ModelWarning`s on the result (see topics::model).

use thiserror::Error;

/// Errors returned by the engine's public operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// Malformed raw text, token cells, or out-of-range parameters.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A document had no tokens left after preprocessing.
    #[error("document {index} has no tokens")]
    EmptyDocument { index: usize },

    /// The corpus has zero documents.
    #[error("corpus is empty")]
    EmptyCorpus,

    /// No terms remain after stopword removal.
    #[error("vocabulary is empty after stopword removal")]
    EmptyVocabulary,

    /// Metadata values do not share a single kind across the corpus.
    #[error("document {index} has {found} metadata, expected {expected}")]
    InconsistentMetadata {
        index: usize,
        expected: String,
        found: String,
    },

    /// Training failed for a specific topic count inside a sweep.
    #[error("training failed for k={k}: {source}")]
    Training {
        k: usize,
        #[source]
        source: Box<EngineError>,
    },
}

impl EngineError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}

/// Result alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_offender() {
        let err = EngineError::EmptyDocument { index: 3 };
        assert_eq!(err.to_string(), "document 3 has no tokens");

        let err = EngineError::Training {
            k: 4,
            source: Box::new(EngineError::EmptyCorpus),
        };
        assert_eq!(err.to_string(), "training failed for k=4: corpus is empty");
    }
}
