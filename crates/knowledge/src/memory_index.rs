//! Process-local vector index.

use crate::types::{ScoredRecord, VectorRecord};
use crate::vector_index::{check_dimensions, select_top_k, VectorIndex};
use std::collections::HashMap;
use tokio::sync::RwLock;
use toolrag_core::AppResult;

#[derive(Debug, Default)]
struct State {
    /// Records in insertion order; a replaced record keeps its slot
    records: Vec<VectorRecord>,
    positions: HashMap<String, usize>,
    dimension: Option<usize>,
}

/// In-memory vector index guarded by a single read/write lock.
///
/// Upserts take the write lock, searches share the read lock, so a search
/// never observes a partially applied record.
#[derive(Debug, Default)]
pub struct InMemoryVectorIndex {
    state: RwLock<State>,
}

impl InMemoryVectorIndex {
    /// Create an index whose dimensionality is fixed by the first record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an index with a fixed dimensionality.
    pub fn with_dimensions(dimensions: usize) -> Self {
        Self {
            state: RwLock::new(State {
                dimension: Some(dimensions),
                ..State::default()
            }),
        }
    }
}

#[async_trait::async_trait]
impl VectorIndex for InMemoryVectorIndex {
    async fn upsert(&self, record: VectorRecord) -> AppResult<()> {
        let mut state = self.state.write().await;
        check_dimensions(state.dimension, record.vector.len())?;
        if state.dimension.is_none() {
            state.dimension = Some(record.vector.len());
        }

        match state.positions.get(&record.id).copied() {
            Some(pos) => state.records[pos] = record,
            None => {
                let pos = state.records.len();
                state.positions.insert(record.id.clone(), pos);
                state.records.push(record);
            }
        }

        Ok(())
    }

    async fn search(&self, query: &[f32], top_k: usize) -> AppResult<Vec<ScoredRecord>> {
        let state = self.state.read().await;
        let Some(dimension) = state.dimension else {
            return Ok(Vec::new());
        };
        check_dimensions(Some(dimension), query.len())?;

        let candidates = state
            .records
            .iter()
            .enumerate()
            .map(|(seq, record)| (seq as u64, record));
        let results = select_top_k(query, candidates, top_k);

        tracing::debug!(
            "Retrieved {} records (requested top-{}, {} stored)",
            results.len(),
            top_k,
            state.records.len()
        );

        Ok(results)
    }

    async fn len(&self) -> AppResult<usize> {
        Ok(self.state.read().await.records.len())
    }

    async fn dimensions(&self) -> AppResult<Option<usize>> {
        Ok(self.state.read().await.dimension)
    }
}
