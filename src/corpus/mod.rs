// Corpus construction: the immutable input to every downstream stage.
//
// Insertion order is the canonical document index: it is the row order of
// every matrix the engine produces.

pub mod loader;

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// A per-document covariate (e.g. the writer group of an article).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Metadata {
    Integer(i64),
    Number(f64),
    Label(String),
}

impl Metadata {
    /// Name of the value's kind, used in consistency errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Metadata::Label(_) => "label",
            Metadata::Integer(_) => "integer",
            Metadata::Number(_) => "number",
        }
    }

    /// Categorical key used by the covariate trainer.
    pub fn key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Metadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metadata::Label(s) => f.write_str(s),
            Metadata::Integer(i) => write!(f, "{i}"),
            Metadata::Number(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for Metadata {
    fn from(value: &str) -> Self {
        Metadata::Label(value.to_string())
    }
}

impl From<String> for Metadata {
    fn from(value: String) -> Self {
        Metadata::Label(value)
    }
}

impl From<i64> for Metadata {
    fn from(value: i64) -> Self {
        Metadata::Integer(value)
    }
}

impl From<f64> for Metadata {
    fn from(value: f64) -> Self {
        Metadata::Number(value)
    }
}

/// One tokenized document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    id: String,
    tokens: Vec<String>,
    metadata: Option<Metadata>,
}

impl Document {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn metadata(&self) -> Option<&Metadata> {
        self.metadata.as_ref()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// An ordered, validated collection of documents.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Corpus {
    documents: Vec<Document>,
}

impl Corpus {
    /// Build a corpus from `(tokens, metadata)` pairs with generated ids.
    pub fn build<I, T>(documents: I) -> Result<Self>
    where
        I: IntoIterator<Item = (T, Option<Metadata>)>,
        T: IntoIterator,
        T::Item: Into<String>,
    {
        let mut builder = CorpusBuilder::new();
        for (tokens, metadata) in documents {
            builder.push(tokens, metadata);
        }
        builder.build()
    }

    /// Build a corpus of plain token lists with no metadata.
    pub fn from_tokens<I, T>(documents: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: IntoIterator,
        T::Item: Into<String>,
    {
        Self::build(documents.into_iter().map(|tokens| (tokens, None)))
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn get(&self, index: usize) -> Option<&Document> {
        self.documents.get(index)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Document ids in row order.
    pub fn ids(&self) -> Vec<String> {
        self.documents.iter().map(|d| d.id.clone()).collect()
    }

    /// Total number of tokens across all documents.
    pub fn token_count(&self) -> usize {
        self.documents.iter().map(Document::len).sum()
    }

    /// Whether every document carries a metadata value.
    pub fn has_metadata(&self) -> bool {
        !self.documents.is_empty() && self.documents.iter().all(|d| d.metadata.is_some())
    }
}

impl<'a> IntoIterator for &'a Corpus {
    type Item = &'a Document;
    type IntoIter = std::slice::Iter<'a, Document>;

    fn into_iter(self) -> Self::IntoIter {
        self.documents.iter()
    }
}

/// Accumulates documents and validates them into a [`Corpus`].
#[derive(Debug, Default)]
pub struct CorpusBuilder {
    pending: Vec<(Option<String>, Vec<String>, Option<Metadata>)>,
}

impl CorpusBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document whose id is derived from its position (`doc1`, `doc2`, ...).
    pub fn push<T>(&mut self, tokens: T, metadata: Option<Metadata>) -> &mut Self
    where
        T: IntoIterator,
        T::Item: Into<String>,
    {
        self.pending
            .push((None, tokens.into_iter().map(Into::into).collect(), metadata));
        self
    }

    /// Add a document with an explicit id.
    pub fn push_with_id<T>(
        &mut self,
        id: impl Into<String>,
        tokens: T,
        metadata: Option<Metadata>,
    ) -> &mut Self
    where
        T: IntoIterator,
        T::Item: Into<String>,
    {
        self.pending.push((
            Some(id.into()),
            tokens.into_iter().map(Into::into).collect(),
            metadata,
        ));
        self
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Validate and freeze the collected documents.
    ///
    /// Fails on the first document with no tokens, on metadata whose kind
    /// differs from the first document's, and on duplicate ids.
    pub fn build(self) -> Result<Corpus> {
        let mut documents = Vec::with_capacity(self.pending.len());
        let mut seen_ids = HashSet::new();
        let mut expected_kind: Option<&'static str> = None;

        for (index, (id, tokens, metadata)) in self.pending.into_iter().enumerate() {
            if tokens.is_empty() {
                return Err(EngineError::EmptyDocument { index });
            }

            let found = metadata.as_ref().map(Metadata::kind).unwrap_or("no");
            match expected_kind {
                None => expected_kind = Some(found),
                Some(expected) if expected != found => {
                    return Err(EngineError::InconsistentMetadata {
                        index,
                        expected: expected.to_string(),
                        found: found.to_string(),
                    });
                }
                Some(_) => {}
            }

            let id = id.unwrap_or_else(|| format!("doc{}", index + 1));
            if !seen_ids.insert(id.clone()) {
                return Err(EngineError::invalid(format!(
                    "duplicate document id '{id}' at index {index}"
                )));
            }

            documents.push(Document {
                id,
                tokens,
                metadata,
            });
        }

        Ok(Corpus { documents })
    }
}
