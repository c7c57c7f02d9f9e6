//! Retrieval service: ingestion, similarity search and context-grounded
//! question answering.

use crate::chunker::Chunker;
use crate::embeddings::EmbeddingProvider;
use crate::types::{Document, IngestStats, ScoredRecord, VectorRecord};
use crate::vector_index::VectorIndex;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Instant;
use toolrag_core::config::GenerationConfig;
use toolrag_core::{AppError, AppResult};
use toolrag_llm::{ChatClient, ChatMessage, ChatRequest, CorrelationHeaders};

/// System prompt for [`RetrievalService::ask`].
pub const ASK_SYSTEM_PROMPT: &str = "Answer the question using only the provided context. \
If the context is insufficient to answer, say that you cannot answer from the available information.";

/// Number of chunks used as context by [`RetrievalService::ask`].
const ASK_CONTEXT_CHUNKS: usize = 1;

/// Default in-flight embedding requests during ingestion.
pub const DEFAULT_INGEST_CONCURRENCY: usize = 4;

/// Composes chunking, embedding and a vector index.
///
/// Holds only shared handles, so one service can serve concurrent callers.
pub struct RetrievalService {
    chunker: Chunker,
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
    generation: Option<(Arc<dyn ChatClient>, GenerationConfig)>,
    ingest_concurrency: usize,
}

impl RetrievalService {
    pub fn new(
        chunker: Chunker,
        embedder: Arc<dyn EmbeddingProvider>,
        index: Arc<dyn VectorIndex>,
    ) -> Self {
        Self {
            chunker,
            embedder,
            index,
            generation: None,
            ingest_concurrency: DEFAULT_INGEST_CONCURRENCY,
        }
    }

    /// Attach the chat client used by [`ask`](Self::ask).
    pub fn with_generation(
        mut self,
        client: Arc<dyn ChatClient>,
        settings: GenerationConfig,
    ) -> Self {
        self.generation = Some((client, settings));
        self
    }

    /// Maximum embedding requests in flight per document (at least 1).
    pub fn with_ingest_concurrency(mut self, concurrency: usize) -> Self {
        self.ingest_concurrency = concurrency.max(1);
        self
    }

    /// Chunk, embed and store documents.
    ///
    /// Not transactional: if embedding chunk `n` of a document fails, chunks
    /// stored before it stay in the index and the error is returned.
    pub async fn ingest(&self, documents: &[Document]) -> AppResult<IngestStats> {
        let start = Instant::now();
        let mut stats = IngestStats::default();

        tracing::info!("Starting ingestion of {} documents", documents.len());

        for document in documents {
            let chunks = self.chunker.chunk(document);
            let total = chunks.len();

            // Embeddings may complete out of order; `buffered` yields them in chunk order
            let mut embedded = stream::iter(chunks.into_iter().map(|chunk| {
                let embedder = Arc::clone(&self.embedder);
                async move {
                    let vector = embedder.embed(&chunk.text).await;
                    (chunk, vector)
                }
            }))
            .buffered(self.ingest_concurrency);

            let mut stored = 0usize;
            while let Some((chunk, vector)) = embedded.next().await {
                let vector = match vector {
                    Ok(vector) => vector,
                    Err(e) => {
                        tracing::warn!(
                            "Embedding failed for '{}' after {} of {} chunks: {}",
                            chunk.chunk_id,
                            stored,
                            total,
                            e
                        );
                        return Err(e);
                    }
                };

                self.index
                    .upsert(VectorRecord::from_chunk(chunk, vector))
                    .await?;
                stored += 1;
                stats.chunks_stored += 1;
            }

            stats.documents_ingested += 1;
            tracing::debug!(
                "Ingested document '{}': {} chunks",
                document.document_id,
                stored
            );
        }

        stats.duration_secs = start.elapsed().as_secs_f64();

        tracing::info!(
            "Ingestion completed: {} documents, {} chunks in {:.2}s",
            stats.documents_ingested,
            stats.chunks_stored,
            stats.duration_secs
        );

        Ok(stats)
    }

    /// Embed `query` and return the `top_k` most similar chunks.
    pub async fn retrieve(&self, query: &str, top_k: usize) -> AppResult<Vec<ScoredRecord>> {
        tracing::debug!("Retrieving top-{} for query: {}", top_k, query);

        let query_vector = self.embedder.embed(query).await?;
        let results = self.index.search(&query_vector, top_k).await?;

        if let Some(best) = results.first() {
            tracing::info!(
                "Retrieved {} chunks (top score: {:.3})",
                results.len(),
                best.score
            );
        } else {
            tracing::info!("No chunks found for query");
        }

        Ok(results)
    }

    /// Answer `query` from the single most similar chunk.
    ///
    /// The model is called even when the index is empty; the system prompt
    /// tells it to admit it cannot answer.
    pub async fn ask(&self, query: &str) -> AppResult<String> {
        let (client, settings) = self.generation.as_ref().ok_or_else(|| {
            AppError::InvalidConfiguration("No chat client configured for ask".to_string())
        })?;

        let hits = self.retrieve(query, ASK_CONTEXT_CHUNKS).await?;
        let context = build_context(&hits);

        let request = ChatRequest::new(
            settings.model.clone(),
            vec![
                ChatMessage::system(ASK_SYSTEM_PROMPT),
                ChatMessage::user(format!("Context:\n{}\n\nQuestion: {}", context, query)),
            ],
        )
        .with_temperature(settings.temperature)
        .with_max_tokens(settings.max_tokens);

        let headers = CorrelationHeaders::new(None).with_chunk_ids(
            &hits
                .iter()
                .map(|hit| hit.record.id.clone())
                .collect::<Vec<_>>(),
        );

        let response = client.chat_completion(&request, &headers).await?;
        Ok(response
            .message()
            .map(|message| message.content_text().to_string())
            .unwrap_or_default())
    }
}

/// Render hits as `- text` lines.
pub fn build_context(hits: &[ScoredRecord]) -> String {
    hits.iter()
        .map(|hit| format!("- {}", hit.record.payload.text))
        .collect::<Vec<_>>()
        .join("\n")
}
