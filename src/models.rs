//! Core data models used throughout shardsmith.
//!
//! These types represent the structured documents, chunks, voice shards and
//! selection requests that flow through the two pipelines.

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Metadata from a document's five-field header block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentMeta {
    pub title: String,
    pub year: String,
    #[serde(rename = "type")]
    pub doc_type: String,
    pub tags: Vec<String>,
    pub source_id: String,
    pub path: PathBuf,
}

/// A parsed structured document: header metadata plus trimmed body.
#[derive(Debug, Clone, Serialize)]
pub struct Document {
    #[serde(flatten)]
    pub meta: DocumentMeta,
    pub body: String,
}

/// A chunk of a document's body text.
#[derive(Debug, Clone, Serialize)]
pub struct Chunk {
    pub id: String,
    pub source_id: String,
    pub chunk_index: i64,
    pub text: String,
    pub hash: String,
}

/// A voice exemplar loaded from the shard directory.
#[derive(Debug, Clone, Serialize)]
pub struct Shard {
    pub id: String,
    pub path: PathBuf,
    pub headers: BTreeMap<String, String>,
    pub body: String,
    pub priority: i64,
    pub keywords: Vec<String>,
    pub mtime: f64,
}

/// Parameters for one shard selection.
#[derive(Debug, Clone, Default)]
pub struct SelectionRequest {
    /// Query words matched against shard keywords. Empty means "no query".
    pub words: Vec<String>,
    /// Maximum number of shards to return.
    pub k: usize,
    /// Seed material for the sampled fallback path.
    pub hint: Option<String>,
}

impl SelectionRequest {
    pub fn new(k: usize) -> Self {
        Self {
            k,
            ..Self::default()
        }
    }

    pub fn with_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.words = words.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
