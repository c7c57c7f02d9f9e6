//! SQLite-backed vector index.
//!
//! Vectors are stored as little-endian `f32` blobs next to the JSON-encoded
//! chunk payload. Insertion order is kept by an autoincrement sequence that
//! an upsert of an existing id leaves untouched. Each upsert runs in a single
//! transaction. Searches load every row and run the same exact top-k scan as
//! the in-memory index.

use crate::types::{Chunk, ScoredRecord, VectorRecord};
use crate::vector_index::{check_dimensions, select_top_k, VectorIndex};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use tokio::sync::Mutex;
use toolrag_core::{AppError, AppResult};

const DIMENSION_KEY: &str = "dimension";

/// Durable vector index in a single SQLite file.
pub struct SqliteVectorIndex {
    conn: Mutex<Connection>,
}

impl std::fmt::Debug for SqliteVectorIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteVectorIndex").finish_non_exhaustive()
    }
}

impl SqliteVectorIndex {
    /// Open (or create) the index at `db_path`.
    ///
    /// When `dimensions` is given it must agree with the dimensionality
    /// already stored in the file, if any.
    pub fn open(db_path: &Path, dimensions: Option<usize>) -> AppResult<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    AppError::Knowledge(format!("Failed to create index directory: {}", e))
                })?;
            }
        }

        let conn = Connection::open(db_path)
            .map_err(|e| AppError::Knowledge(format!("Failed to open SQLite index: {}", e)))?;

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS meta (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS records (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT NOT NULL UNIQUE,
                vector BLOB NOT NULL,
                payload TEXT NOT NULL
            );
            "#,
        )
        .map_err(|e| AppError::Knowledge(format!("Failed to create tables: {}", e)))?;

        let stored = read_dimension(&conn)?;
        match (stored, dimensions) {
            (Some(stored), Some(requested)) => check_dimensions(Some(stored), requested)?,
            (None, Some(requested)) => write_dimension(&conn, requested)?,
            _ => {}
        }

        tracing::debug!("Opened SQLite index at {:?}", db_path);

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

#[async_trait::async_trait]
impl VectorIndex for SqliteVectorIndex {
    async fn upsert(&self, record: VectorRecord) -> AppResult<()> {
        let mut conn = self.conn.lock().await;
        let payload = serde_json::to_string(&record.payload)?;

        // The dimension and the first record land together or not at all
        let tx = conn
            .transaction()
            .map_err(|e| AppError::Knowledge(format!("Failed to begin transaction: {}", e)))?;

        let dimension = read_dimension(&tx)?;
        check_dimensions(dimension, record.vector.len())?;
        if dimension.is_none() {
            write_dimension(&tx, record.vector.len())?;
        }

        tx.execute(
            "INSERT INTO records (id, vector, payload) VALUES (?1, ?2, ?3)
             ON CONFLICT(id) DO UPDATE SET vector = excluded.vector, payload = excluded.payload",
            params![record.id, embedding_to_bytes(&record.vector), payload],
        )
        .map_err(|e| AppError::Knowledge(format!("Failed to upsert record: {}", e)))?;

        tx.commit()
            .map_err(|e| AppError::Knowledge(format!("Failed to commit upsert: {}", e)))?;

        Ok(())
    }

    async fn search(&self, query: &[f32], top_k: usize) -> AppResult<Vec<ScoredRecord>> {
        let conn = self.conn.lock().await;

        let Some(dimension) = read_dimension(&conn)? else {
            return Ok(Vec::new());
        };
        check_dimensions(Some(dimension), query.len())?;

        let mut stmt = conn
            .prepare("SELECT seq, id, vector, payload FROM records ORDER BY seq")
            .map_err(|e| AppError::Knowledge(format!("Failed to prepare query: {}", e)))?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, Vec<u8>>(2)?,
                    row.get::<_, String>(3)?,
                ))
            })
            .map_err(|e| AppError::Knowledge(format!("Failed to query records: {}", e)))?;

        let mut records = Vec::new();
        for row in rows {
            let (seq, id, bytes, payload) =
                row.map_err(|e| AppError::Knowledge(format!("Failed to read record: {}", e)))?;
            let payload: Chunk = serde_json::from_str(&payload)?;
            records.push((
                seq as u64,
                VectorRecord {
                    id,
                    vector: bytes_to_embedding(&bytes)?,
                    payload,
                },
            ));
        }

        let results = select_top_k(query, records, top_k);

        tracing::debug!(
            "Retrieved {} records (requested top-{})",
            results.len(),
            top_k
        );

        Ok(results)
    }

    async fn len(&self) -> AppResult<usize> {
        let conn = self.conn.lock().await;
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM records", [], |row| row.get(0))
            .map_err(|e| AppError::Knowledge(format!("Failed to count records: {}", e)))?;
        Ok(count as usize)
    }

    async fn dimensions(&self) -> AppResult<Option<usize>> {
        let conn = self.conn.lock().await;
        read_dimension(&conn)
    }
}

fn read_dimension(conn: &Connection) -> AppResult<Option<usize>> {
    let value: Option<String> = conn
        .query_row(
            "SELECT value FROM meta WHERE key = ?1",
            params![DIMENSION_KEY],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| AppError::Knowledge(format!("Failed to read index metadata: {}", e)))?;

    value
        .map(|v| {
            v.parse::<usize>()
                .map_err(|_| AppError::Knowledge(format!("Invalid stored dimension: {}", v)))
        })
        .transpose()
}

fn write_dimension(conn: &Connection, dimension: usize) -> AppResult<()> {
    conn.execute(
        "INSERT OR REPLACE INTO meta (key, value) VALUES (?1, ?2)",
        params![DIMENSION_KEY, dimension.to_string()],
    )
    .map_err(|e| AppError::Knowledge(format!("Failed to write index metadata: {}", e)))?;
    Ok(())
}

/// Convert embedding vector to bytes for storage.
fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(embedding.len() * 4);
    for &value in embedding {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes
}

/// Convert bytes back to embedding vector.
fn bytes_to_embedding(bytes: &[u8]) -> AppResult<Vec<f32>> {
    if bytes.len() % 4 != 0 {
        return Err(AppError::Knowledge(
            "Invalid embedding bytes length".to_string(),
        ));
    }

    Ok(bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(id: &str, vector: Vec<f32>) -> VectorRecord {
        let chunk = Chunk {
            chunk_id: id.to_string(),
            document_id: "doc".to_string(),
            document_title: "Doc".to_string(),
            source: "test".to_string(),
            chunk_index: 0,
            text: format!("text of {}", id),
        };
        VectorRecord::from_chunk(chunk, vector)
    }

    #[test]
    fn test_init_index() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("index.sqlite");
        let index = SqliteVectorIndex::open(&path, None).unwrap();
        assert!(path.exists());

        let conn = index.conn.try_lock().unwrap();
        let table_count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name IN ('meta', 'records')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(table_count, 2);
    }

    #[tokio::test]
    async fn test_insert_and_query() {
        let temp_dir = TempDir::new().unwrap();
        let index = SqliteVectorIndex::open(&temp_dir.path().join("i.sqlite"), None).unwrap();

        assert!(index.search(&[1.0, 0.0, 0.0], 5).await.unwrap().is_empty());

        index.upsert(record("chunk1", vec![1.0, 0.0, 0.0])).await.unwrap();
        index.upsert(record("chunk2", vec![0.0, 1.0, 0.0])).await.unwrap();

        let results = index.search(&[1.0, 0.0, 0.0], 5).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].record.id, "chunk1");
        assert_eq!(results[0].record.payload.text, "text of chunk1");
        assert!((results[0].score - 1.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_upsert_keeps_insertion_slot() {
        let temp_dir = TempDir::new().unwrap();
        let index = SqliteVectorIndex::open(&temp_dir.path().join("i.sqlite"), None).unwrap();

        index.upsert(record("a", vec![1.0, 0.0])).await.unwrap();
        index.upsert(record("b", vec![0.0, 1.0])).await.unwrap();
        index.upsert(record("a", vec![0.0, 2.0])).await.unwrap();

        assert_eq!(index.len().await.unwrap(), 2);
        let results = index.search(&[0.0, 1.0], 2).await.unwrap();
        assert_eq!(results[0].record.id, "a");
        assert_eq!(results[0].record.vector, vec![0.0, 2.0]);
    }

    #[tokio::test]
    async fn test_persists_across_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("i.sqlite");

        {
            let index = SqliteVectorIndex::open(&path, None).unwrap();
            index.upsert(record("a", vec![0.25, -1.5, 3.0])).await.unwrap();
        }

        let index = SqliteVectorIndex::open(&path, None).unwrap();
        assert_eq!(index.dimensions().await.unwrap(), Some(3));
        let results = index.search(&[0.25, -1.5, 3.0], 1).await.unwrap();
        assert_eq!(results[0].record.vector, vec![0.25, -1.5, 3.0]);

        assert!(matches!(
            SqliteVectorIndex::open(&path, Some(4)),
            Err(AppError::DimensionMismatch {
                expected: 3,
                actual: 4
            })
        ));
    }

    #[tokio::test]
    async fn test_dimension_mismatch() {
        let temp_dir = TempDir::new().unwrap();
        let index = SqliteVectorIndex::open(&temp_dir.path().join("i.sqlite"), Some(2)).unwrap();

        assert!(matches!(
            index.upsert(record("a", vec![1.0, 2.0, 3.0])).await,
            Err(AppError::DimensionMismatch { .. })
        ));

        index.upsert(record("a", vec![1.0, 2.0])).await.unwrap();
        assert!(index.search(&[1.0], 1).await.is_err());
        assert_eq!(index.len().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_failed_first_insert_leaves_dimension_unset() {
        let temp_dir = TempDir::new().unwrap();
        let index = SqliteVectorIndex::open(&temp_dir.path().join("i.sqlite"), None).unwrap();

        index
            .conn
            .try_lock()
            .unwrap()
            .execute_batch(
                "CREATE TRIGGER reject_insert BEFORE INSERT ON records
                 BEGIN SELECT RAISE(ABORT, 'rejected'); END;",
            )
            .unwrap();

        let err = index.upsert(record("a", vec![1.0, 2.0])).await.unwrap_err();
        assert!(matches!(err, AppError::Knowledge(_)));
        assert_eq!(index.dimensions().await.unwrap(), None);
        assert!(index.is_empty().await.unwrap());

        index
            .conn
            .try_lock()
            .unwrap()
            .execute_batch("DROP TRIGGER reject_insert;")
            .unwrap();

        index.upsert(record("a", vec![1.0, 2.0, 3.0])).await.unwrap();
        assert_eq!(index.dimensions().await.unwrap(), Some(3));
    }

    #[test]
    fn test_embedding_bytes() {
        let bytes = embedding_to_bytes(&[1.0, -0.5]);
        assert_eq!(bytes.len(), 8);
        assert_eq!(bytes_to_embedding(&bytes).unwrap(), vec![1.0, -0.5]);
        assert!(bytes_to_embedding(&[0, 1, 2]).is_err());
    }
}
