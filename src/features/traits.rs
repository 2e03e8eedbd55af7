// Feature extractor trait.
//
// Lets the caller choose between frequency-ranked term vectors and topic
// distribution vectors at runtime. Anything downstream (similarity, export)
// consumes the resulting FeatureVectorSet without caring which ran.

use super::FeatureVectorSet;
use crate::corpus::Corpus;
use crate::error::Result;

/// Trait for turning a corpus into one fixed-width vector per document.
pub trait FeatureExtractor {
    /// Short name used in logs and exports (e.g. "tfidf", "topics").
    fn name(&self) -> &str;

    /// Produce one row per corpus document, in corpus order.
    fn extract(&self, corpus: &Corpus) -> Result<FeatureVectorSet>;
}
