//! Knowledge retrieval for toolrag.
//!
//! Documents are normalized and cut into overlapping chunks, embedded, and
//! stored in a [`VectorIndex`]. The [`RetrievalService`] ties these steps
//! together and can answer a question from the best-matching chunk.

pub mod chunker;
pub mod embeddings;
pub mod memory_index;
pub mod service;
pub mod sqlite_index;
pub mod types;
pub mod vector_index;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use chunker::{normalize_text, Chunker};
pub use embeddings::{create_provider, EmbeddingProvider};
pub use memory_index::InMemoryVectorIndex;
pub use service::RetrievalService;
pub use sqlite_index::SqliteVectorIndex;
pub use types::{Chunk, Document, IngestStats, ScoredRecord, VectorRecord};
pub use vector_index::{cosine_similarity, VectorIndex};

use std::sync::Arc;
use toolrag_core::config::{AppConfig, IndexBackend};
use toolrag_core::AppResult;

/// Open the vector index selected by the configuration.
///
/// `dimensions`, when known, fixes the dimensionality of a fresh index and
/// must match the one stored in an existing SQLite file.
pub fn open_index(
    config: &AppConfig,
    dimensions: Option<usize>,
) -> AppResult<Arc<dyn VectorIndex>> {
    match config.index.backend {
        IndexBackend::Memory => {
            tracing::debug!("Using in-memory vector index");
            Ok(match dimensions {
                Some(dimensions) => Arc::new(InMemoryVectorIndex::with_dimensions(dimensions)),
                None => Arc::new(InMemoryVectorIndex::new()),
            })
        }
        IndexBackend::Sqlite => {
            let path = config.index_path();
            tracing::debug!("Using SQLite vector index at {:?}", path);
            Ok(Arc::new(SqliteVectorIndex::open(&path, dimensions)?))
        }
    }
}

/// Build a retrieval service from configuration, without a chat client.
pub fn build_service(config: &AppConfig) -> AppResult<RetrievalService> {
    let chunker = Chunker::from_config(&config.chunking)?;
    let embedder = create_provider(&config.embedding, &config.gateway, config.resolve_api_key())?;
    let index = open_index(config, embedder.dimensions())?;

    Ok(RetrievalService::new(chunker, embedder, index)
        .with_ingest_concurrency(config.retrieval.ingest_concurrency))
}

