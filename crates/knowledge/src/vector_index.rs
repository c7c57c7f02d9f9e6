//! Vector index abstraction for knowledge chunks.
//!
//! Defines a trait for provider-agnostic vector storage and retrieval, plus
//! the exact top-k scan shared by every backend.

use crate::types::{ScoredRecord, VectorRecord};
use std::borrow::Borrow;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use toolrag_core::{AppError, AppResult};

/// Trait for vector index backends.
///
/// Implementations must support:
/// - Upserting records keyed by id
/// - Searching for similar vectors (top-k)
/// - Reporting size and dimensionality
#[async_trait::async_trait]
pub trait VectorIndex: Send + Sync {
    /// Insert a record, replacing any record with the same id.
    ///
    /// The first record fixes the dimensionality unless the index was
    /// created with one.
    async fn upsert(&self, record: VectorRecord) -> AppResult<()>;

    /// Search for the `top_k` records most similar to `query`.
    ///
    /// Returns records ordered by descending similarity score.
    async fn search(&self, query: &[f32], top_k: usize) -> AppResult<Vec<ScoredRecord>>;

    /// Number of stored records.
    async fn len(&self) -> AppResult<usize>;

    async fn is_empty(&self) -> AppResult<bool> {
        Ok(self.len().await? == 0)
    }

    /// Established dimensionality, if any.
    async fn dimensions(&self) -> AppResult<Option<usize>>;
}

/// Calculate cosine similarity between two vectors.
///
/// Returns 0.0 when the lengths differ or either vector has zero norm.
/// Sums are accumulated in `f64` so large or tiny components neither
/// overflow nor vanish.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let mut dot_product = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (&x, &y) in a.iter().zip(b.iter()) {
        let (x, y) = (f64::from(x), f64::from(y));
        dot_product += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    (dot_product / (norm_a.sqrt() * norm_b.sqrt())) as f32
}

/// Fail with `DimensionMismatch` unless `actual` matches `expected`.
pub fn check_dimensions(expected: Option<usize>, actual: usize) -> AppResult<()> {
    match expected {
        Some(expected) if expected != actual => {
            Err(AppError::DimensionMismatch { expected, actual })
        }
        _ => Ok(()),
    }
}

/// Heap entry ranking by score, then by earlier insertion.
struct Candidate<R> {
    score: f32,
    seq: u64,
    record: R,
}

impl<R> Candidate<R> {
    fn rank(&self, other: &Self) -> Ordering {
        self.score
            .total_cmp(&other.score)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl<R> PartialEq for Candidate<R> {
    fn eq(&self, other: &Self) -> bool {
        self.rank(other) == Ordering::Equal
    }
}

impl<R> Eq for Candidate<R> {}

impl<R> PartialOrd for Candidate<R> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<R> Ord for Candidate<R> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank(other)
    }
}

/// Select the `top_k` most similar records.
///
/// `records` yields `(insertion_seq, record)` pairs, owned or borrowed. A
/// bounded min-heap keeps the best `top_k` seen so far; a new record enters a
/// full heap only when it outranks the current minimum. Equal scores favour
/// the lower sequence. Only the surviving records are cloned.
pub fn select_top_k<I, R>(query: &[f32], records: I, top_k: usize) -> Vec<ScoredRecord>
where
    I: IntoIterator<Item = (u64, R)>,
    R: Borrow<VectorRecord>,
{
    if top_k == 0 {
        return Vec::new();
    }

    let mut heap: BinaryHeap<Reverse<Candidate<R>>> = BinaryHeap::with_capacity(top_k + 1);

    for (seq, record) in records {
        let stored: &VectorRecord = record.borrow();
        let score = cosine_similarity(query, &stored.vector);
        let candidate = Candidate {
            score,
            seq,
            record,
        };

        if heap.len() < top_k {
            heap.push(Reverse(candidate));
        } else if let Some(Reverse(min)) = heap.peek() {
            if candidate.rank(min) == Ordering::Greater {
                heap.pop();
                heap.push(Reverse(candidate));
            }
        }
    }

    let mut ranked: Vec<Candidate<R>> = heap.into_iter().map(|Reverse(c)| c).collect();
    ranked.sort_by(|a, b| b.rank(a));

    ranked
        .into_iter()
        .map(|c| {
            let stored: &VectorRecord = c.record.borrow();
            ScoredRecord {
                record: stored.clone(),
                score: c.score,
            }
        })
        .collect()
}
