//! Tests for ingestion and retrieval through the service.

use crate::chunker::Chunker;
use crate::embeddings::{EmbeddingProvider, MockProvider};
use crate::memory_index::InMemoryVectorIndex;
use crate::service::{build_context, RetrievalService, ASK_SYSTEM_PROMPT};
use crate::sqlite_index::SqliteVectorIndex;
use crate::types::{Chunk, Document, ScoredRecord, VectorRecord};
use crate::vector_index::VectorIndex;
use crate::{build_service, open_index};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use toolrag_core::config::{AppConfig, GenerationConfig, IndexBackend};
use toolrag_core::{AppError, AppResult};
use toolrag_llm::{
    ChatClient, ChatMessage, ChatRequest, ChatResponse, Choice, CorrelationHeaders, Role,
};

/// Embedder that fails on a given call number.
#[derive(Debug)]
struct FlakyEmbedder {
    inner: MockProvider,
    fail_on: usize,
    calls: AtomicUsize,
}

#[async_trait::async_trait]
impl EmbeddingProvider for FlakyEmbedder {
    fn provider_name(&self) -> &str {
        "flaky"
    }

    fn model_name(&self) -> &str {
        "flaky"
    }

    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call == self.fail_on {
            return Err(AppError::Provider("embedding backend unavailable".to_string()));
        }
        self.inner.embed(text).await
    }
}

/// Chat client that records requests and answers with a fixed text.
#[derive(Default)]
struct RecordingChat {
    requests: Mutex<Vec<(ChatRequest, CorrelationHeaders)>>,
}

#[async_trait::async_trait]
impl ChatClient for RecordingChat {
    fn provider_name(&self) -> &str {
        "recording"
    }

    async fn chat_completion(
        &self,
        request: &ChatRequest,
        headers: &CorrelationHeaders,
    ) -> AppResult<ChatResponse> {
        self.requests
            .lock()
            .unwrap()
            .push((request.clone(), headers.clone()));
        Ok(ChatResponse {
            model: Some("stub-model".to_string()),
            choices: vec![Choice {
                index: 0,
                message: ChatMessage::assistant("Billing is healthy."),
                finish_reason: Some("stop".to_string()),
            }],
            usage: None,
        })
    }
}

fn documents() -> Vec<Document> {
    vec![
        Document::new(
            "billing",
            "Billing runbook",
            "kb/billing.md",
            "The billing service processes invoices. Billing latency alerts fire above 500ms.",
        ),
        Document::new(
            "pasta",
            "Recipes",
            "kb/pasta.md",
            "Boil pasta in salted water. Tomato sauce needs garlic and basil.",
        ),
    ]
}

fn service(index: Arc<dyn VectorIndex>) -> RetrievalService {
    RetrievalService::new(
        Chunker::new(40, 10).unwrap(),
        Arc::new(MockProvider::new(256)),
        index,
    )
}

#[tokio::test]
async fn test_ingest_and_retrieve_relevant_chunk() {
    let index: Arc<dyn VectorIndex> = Arc::new(InMemoryVectorIndex::new());
    let service = service(Arc::clone(&index));

    let stats = service.ingest(&documents()).await.unwrap();
    assert_eq!(stats.documents_ingested, 2);
    assert_eq!(stats.chunks_stored, index.len().await.unwrap());
    assert!(stats.chunks_stored > 2);

    let results = service.retrieve("billing latency alerts", 3).await.unwrap();
    assert_eq!(results.len(), 3);
    assert_eq!(results[0].record.payload.document_id, "billing");
    for pair in results.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
}

#[tokio::test]
async fn test_reingest_replaces_chunks() {
    let index: Arc<dyn VectorIndex> = Arc::new(InMemoryVectorIndex::new());
    let service = service(Arc::clone(&index));

    service.ingest(&documents()).await.unwrap();
    let first = index.len().await.unwrap();
    service.ingest(&documents()).await.unwrap();
    assert_eq!(index.len().await.unwrap(), first);
}

#[tokio::test]
async fn test_partial_ingestion_keeps_earlier_chunks() {
    let index: Arc<dyn VectorIndex> = Arc::new(InMemoryVectorIndex::new());
    let embedder = Arc::new(FlakyEmbedder {
        inner: MockProvider::new(64),
        fail_on: 2,
        calls: AtomicUsize::new(0),
    });
    let service =
        RetrievalService::new(Chunker::new(40, 10).unwrap(), embedder, Arc::clone(&index))
            .with_ingest_concurrency(1);

    let err = service.ingest(&documents()).await.unwrap_err();
    assert!(matches!(err, AppError::Provider(_)));
    assert_eq!(index.len().await.unwrap(), 2);
}

#[tokio::test]
async fn test_concurrent_embedding_preserves_chunk_order() {
    let index: Arc<dyn VectorIndex> = Arc::new(InMemoryVectorIndex::new());
    let embedder = Arc::new(FlakyEmbedder {
        inner: MockProvider::new(64),
        fail_on: 3,
        calls: AtomicUsize::new(0),
    });
    let service =
        RetrievalService::new(Chunker::new(40, 10).unwrap(), embedder, Arc::clone(&index))
            .with_ingest_concurrency(8);

    assert!(service.ingest(&documents()).await.is_err());

    // Only a gap-free prefix of chunk ids is ever stored
    let stored = index.len().await.unwrap();
    assert!(stored <= 3);
    let query = MockProvider::new(64).embed("billing").await.unwrap();
    let mut indices: Vec<usize> = index
        .search(&query, 10)
        .await
        .unwrap()
        .into_iter()
        .map(|hit| hit.record.payload.chunk_index)
        .collect();
    indices.sort_unstable();
    assert_eq!(indices, (0..stored).collect::<Vec<_>>());
}

#[tokio::test]
async fn test_retrieve_on_empty_index() {
    let service = service(Arc::new(InMemoryVectorIndex::new()));
    assert!(service.retrieve("anything", 5).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_sqlite_backend_behaves_like_memory() {
    let temp_dir = TempDir::new().unwrap();
    let index: Arc<dyn VectorIndex> =
        Arc::new(SqliteVectorIndex::open(&temp_dir.path().join("index.sqlite"), None).unwrap());
    let service = service(Arc::clone(&index));

    service.ingest(&documents()).await.unwrap();
    let results = service.retrieve("tomato sauce garlic", 1).await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].record.payload.document_title, "Recipes");
}

#[tokio::test]
async fn test_ask_sends_top_chunk_as_context() {
    let chat = Arc::new(RecordingChat::default());
    let settings = GenerationConfig {
        model: "gpt-4o-mini".to_string(),
        temperature: 0.1,
        max_tokens: 128,
    };
    let service = service(Arc::new(InMemoryVectorIndex::new()))
        .with_generation(chat.clone(), settings);

    service.ingest(&documents()).await.unwrap();
    let answer = service.ask("Is billing latency alerting?").await.unwrap();
    assert_eq!(answer, "Billing is healthy.");

    let requests = chat.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    let (request, headers) = &requests[0];
    assert_eq!(request.model, "gpt-4o-mini");
    assert_eq!(request.max_tokens, Some(128));
    assert!(request.tools.is_empty());
    assert_eq!(request.messages[0].role, Role::System);
    assert_eq!(request.messages[0].content_text(), ASK_SYSTEM_PROMPT);
    assert!(request.messages[1].content_text().contains("- "));
    assert_eq!(headers.chunk_ids.len(), 1);
    assert!(headers.chunk_ids[0].starts_with("billing_chunk_"));
}

#[tokio::test]
async fn test_ask_without_context_still_calls_model() {
    let chat = Arc::new(RecordingChat::default());
    let service = service(Arc::new(InMemoryVectorIndex::new()))
        .with_generation(chat.clone(), GenerationConfig::default());

    service.ask("anything?").await.unwrap();
    assert_eq!(chat.requests.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_ask_requires_chat_client() {
    let service = service(Arc::new(InMemoryVectorIndex::new()));
    assert!(matches!(
        service.ask("q").await,
        Err(AppError::InvalidConfiguration(_))
    ));
}

#[test]
fn test_build_context_lines() {
    assert_eq!(build_context(&[]), "");

    let hit = |index: usize, text: &str| ScoredRecord {
        record: VectorRecord::from_chunk(
            Chunk {
                chunk_id: Chunk::make_id("doc", index),
                document_id: "doc".to_string(),
                document_title: "Doc".to_string(),
                source: "kb/doc.md".to_string(),
                chunk_index: index,
                text: text.to_string(),
            },
            vec![1.0],
        ),
        score: 1.0,
    };
    assert_eq!(build_context(&[hit(0, "a"), hit(1, "b")]), "- a\n- b");
}

#[tokio::test]
async fn test_open_sqlite_index_under_state_dir() {
    let temp_dir = TempDir::new().unwrap();
    let mut config = AppConfig {
        workspace: temp_dir.path().to_path_buf(),
        ..AppConfig::default()
    };
    config.index.backend = IndexBackend::Sqlite;
    config.embedding.dimensions = Some(8);

    let index = open_index(&config, config.embedding.dimensions).unwrap();
    assert_eq!(index.dimensions().await.unwrap(), Some(8));
    assert!(temp_dir.path().join(".toolrag").join("index.sqlite").exists());
}

#[tokio::test]
async fn test_build_service_with_mock_embedder() {
    let mut config = AppConfig::default();
    config.embedding.provider = "mock".to_string();
    config.embedding.dimensions = Some(32);

    let service = build_service(&config).unwrap();
    let stats = service
        .ingest(&[Document::new("d", "D", "s", "mock embeddings are deterministic")])
        .await
        .unwrap();
    assert_eq!(stats.chunks_stored, 1);
    assert_eq!(service.retrieve("deterministic", 1).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_build_service_checks_embedder_dimensions_against_stored_index() {
    let temp_dir = TempDir::new().unwrap();
    let mut config = AppConfig {
        workspace: temp_dir.path().to_path_buf(),
        ..AppConfig::default()
    };
    config.index.backend = IndexBackend::Sqlite;
    config.embedding.provider = "mock".to_string();
    config.embedding.dimensions = Some(8);
    build_service(&config).unwrap();

    // Unset in config, so the mock embedder's default length applies
    config.embedding.dimensions = None;
    assert!(matches!(
        build_service(&config),
        Err(AppError::DimensionMismatch { expected: 8, .. })
    ));
}
