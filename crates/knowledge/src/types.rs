//! Knowledge system type definitions.

use serde::{Deserialize, Serialize};

/// A source document supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Stable identifier, used as the prefix of every chunk id
    pub document_id: String,

    /// Human-readable title
    #[serde(default)]
    pub title: String,

    /// Where the document came from (path, URL, ...)
    #[serde(default)]
    pub source: String,

    /// Raw text content
    pub text: String,
}

impl Document {
    pub fn new(
        document_id: impl Into<String>,
        title: impl Into<String>,
        source: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            document_id: document_id.into(),
            title: title.into(),
            source: source.into(),
            text: text.into(),
        }
    }
}

/// A window of a document's normalized text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chunk {
    /// `{document_id}_chunk_{chunk_index}`
    pub chunk_id: String,

    pub document_id: String,
    pub document_title: String,
    pub source: String,

    /// Zero-based position within the document, without gaps
    pub chunk_index: usize,

    /// Trimmed, never empty
    pub text: String,
}

impl Chunk {
    /// Build the id of chunk `index` of `document_id`.
    pub fn make_id(document_id: &str, index: usize) -> String {
        format!("{}_chunk_{}", document_id, index)
    }
}

/// A vector stored in an index, keyed by its chunk id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorRecord {
    pub id: String,
    pub vector: Vec<f32>,
    pub payload: Chunk,
}

impl VectorRecord {
    /// Record for `chunk`, keyed by its chunk id.
    pub fn from_chunk(chunk: Chunk, vector: Vec<f32>) -> Self {
        Self {
            id: chunk.chunk_id.clone(),
            vector,
            payload: chunk,
        }
    }
}

/// A search hit. Higher scores are more similar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredRecord {
    pub record: VectorRecord,
    pub score: f32,
}

/// Statistics from an ingestion call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IngestStats {
    /// Documents whose chunks were all stored
    pub documents_ingested: usize,

    /// Chunks stored across all documents
    pub chunks_stored: usize,

    /// Wall-clock duration in seconds
    pub duration_secs: f64,
}
