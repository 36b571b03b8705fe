//! SQLite-based lecture store implementation.
//!
//! Uses SQLite with cosine similarity computed in Rust for simplicity.
//! For large libraries consider the sqlite-vec extension or a dedicated
//! vector database.

use super::{
    cosine_similarity, ChunkRecord, ChunkSearchResult, Lecture, LectureStatus, LectureStore,
    TopicRecord,
};
use crate::error::{LecternError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, instrument};

/// SQLite-based lecture store.
pub struct SqliteLectureStore {
    conn: Mutex<Connection>,
}

impl SqliteLectureStore {
    /// Create a new SQLite lecture store backed by a file.
    #[instrument(skip_all)]
    pub fn new(path: &Path) -> Result<Self> {
        // Create parent directories if needed
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        // Enable WAL mode for better concurrent performance
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;

        let store = Self::initialize(conn)?;
        info!("Initialized SQLite lecture store at {:?}", path);
        Ok(store)
    }

    /// Create an in-memory SQLite lecture store (useful for testing).
    pub fn in_memory() -> Result<Self> {
        Self::initialize(Connection::open_in_memory()?)
    }

    fn initialize(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS lectures (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                title TEXT NOT NULL,
                transcript TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'pending',
                processing_error TEXT,
                processed_at TEXT,
                topic_count INTEGER,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS lecture_chunks (
                id TEXT PRIMARY KEY,
                lecture_id TEXT NOT NULL,
                chunk_index INTEGER NOT NULL,
                content TEXT NOT NULL,
                token_count INTEGER NOT NULL,
                embedding BLOB,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_chunks_lecture_id ON lecture_chunks(lecture_id);

            CREATE TABLE IF NOT EXISTS topics (
                id TEXT PRIMARY KEY,
                lecture_id TEXT NOT NULL,
                user_id TEXT NOT NULL,
                title TEXT NOT NULL,
                summary TEXT NOT NULL,
                order_index INTEGER NOT NULL,
                parent_topic_id TEXT,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_topics_lecture_id ON topics(lecture_id);
            "#,
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| LecternError::Store(format!("Failed to acquire lock: {}", e)))
    }

    /// Serialize embedding to bytes.
    fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
        embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    /// Deserialize embedding from bytes.
    fn bytes_to_embedding(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|chunk| {
                let arr: [u8; 4] = chunk.try_into().unwrap_or_default();
                f32::from_le_bytes(arr)
            })
            .collect()
    }

    fn parse_timestamp(value: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(value)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now())
    }

    fn lecture_from_row(row: &Row<'_>) -> rusqlite::Result<Lecture> {
        let status_str: String = row.get(4)?;
        let processed_at_str: Option<String> = row.get(6)?;
        let created_at_str: String = row.get(8)?;

        Ok(Lecture {
            id: row.get(0)?,
            user_id: row.get(1)?,
            title: row.get(2)?,
            transcript: row.get(3)?,
            status: status_str.parse().unwrap_or(LectureStatus::Pending),
            processing_error: row.get(5)?,
            processed_at: processed_at_str.as_deref().map(Self::parse_timestamp),
            topic_count: row.get(7)?,
            created_at: Self::parse_timestamp(&created_at_str),
        })
    }

    fn chunk_from_row(row: &Row<'_>) -> rusqlite::Result<ChunkRecord> {
        let id_str: String = row.get(0)?;
        let embedding_bytes: Option<Vec<u8>> = row.get(5)?;
        let created_at_str: String = row.get(6)?;

        Ok(ChunkRecord {
            id: uuid::Uuid::parse_str(&id_str).unwrap_or_default(),
            lecture_id: row.get(1)?,
            chunk_index: row.get(2)?,
            content: row.get(3)?,
            token_count: row.get(4)?,
            embedding: embedding_bytes.as_deref().map(Self::bytes_to_embedding),
            created_at: Self::parse_timestamp(&created_at_str),
        })
    }

    fn topic_from_row(row: &Row<'_>) -> rusqlite::Result<TopicRecord> {
        let id_str: String = row.get(0)?;
        let created_at_str: String = row.get(7)?;

        Ok(TopicRecord {
            id: uuid::Uuid::parse_str(&id_str).unwrap_or_default(),
            lecture_id: row.get(1)?,
            user_id: row.get(2)?,
            title: row.get(3)?,
            summary: row.get(4)?,
            order_index: row.get(5)?,
            parent_topic_id: row.get(6)?,
            created_at: Self::parse_timestamp(&created_at_str),
        })
    }
}

#[async_trait]
impl LectureStore for SqliteLectureStore {
    #[instrument(skip(self, lecture), fields(lecture_id = %lecture.id))]
    async fn create_lecture(&self, lecture: &Lecture) -> Result<()> {
        let conn = self.conn()?;

        conn.execute(
            r#"
            INSERT INTO lectures
            (id, user_id, title, transcript, status, processing_error, processed_at, topic_count, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                lecture.id,
                lecture.user_id,
                lecture.title,
                lecture.transcript,
                lecture.status.to_string(),
                lecture.processing_error,
                lecture.processed_at.map(|dt| dt.to_rfc3339()),
                lecture.topic_count,
                lecture.created_at.to_rfc3339(),
            ],
        )?;

        debug!("Created lecture {}", lecture.id);
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_lecture(&self, id: &str) -> Result<Option<Lecture>> {
        let conn = self.conn()?;

        let lecture = conn.query_row(
            r#"
            SELECT id, user_id, title, transcript, status, processing_error,
                   processed_at, topic_count, created_at
            FROM lectures
            WHERE id = ?1
            "#,
            params![id],
            Self::lecture_from_row,
        );

        match lecture {
            Ok(l) => Ok(Some(l)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self))]
    async fn list_lectures(&self) -> Result<Vec<Lecture>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT id, user_id, title, transcript, status, processing_error,
                   processed_at, topic_count, created_at
            FROM lectures
            ORDER BY created_at DESC
            "#,
        )?;

        let lectures = stmt.query_map([], Self::lecture_from_row)?;
        Ok(lectures.filter_map(|l| l.ok()).collect())
    }

    #[instrument(skip(self))]
    async fn set_status(&self, id: &str, status: LectureStatus) -> Result<()> {
        let conn = self.conn()?;

        conn.execute(
            "UPDATE lectures SET status = ?2 WHERE id = ?1",
            params![id, status.to_string()],
        )?;

        debug!("Lecture {} status -> {}", id, status);
        Ok(())
    }

    #[instrument(skip(self))]
    async fn mark_completed(&self, id: &str, topic_count: usize) -> Result<()> {
        let conn = self.conn()?;

        conn.execute(
            r#"
            UPDATE lectures
            SET status = ?2, processed_at = ?3, topic_count = ?4
            WHERE id = ?1
            "#,
            params![
                id,
                LectureStatus::Completed.to_string(),
                Utc::now().to_rfc3339(),
                topic_count as u32,
            ],
        )?;

        info!("Lecture {} completed with {} topics", id, topic_count);
        Ok(())
    }

    #[instrument(skip(self, message))]
    async fn mark_failed(&self, id: &str, message: &str) -> Result<()> {
        let conn = self.conn()?;

        conn.execute(
            "UPDATE lectures SET status = ?2, processing_error = ?3 WHERE id = ?1",
            params![id, LectureStatus::Failed.to_string(), message],
        )?;

        info!("Lecture {} marked failed: {}", id, message);
        Ok(())
    }

    #[instrument(skip(self, chunk), fields(lecture_id = %chunk.lecture_id, chunk_index = chunk.chunk_index))]
    async fn insert_chunk(&self, chunk: &ChunkRecord) -> Result<()> {
        let conn = self.conn()?;

        conn.execute(
            r#"
            INSERT INTO lecture_chunks
            (id, lecture_id, chunk_index, content, token_count, embedding, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                chunk.id.to_string(),
                chunk.lecture_id,
                chunk.chunk_index,
                chunk.content,
                chunk.token_count,
                chunk.embedding.as_deref().map(Self::embedding_to_bytes),
                chunk.created_at.to_rfc3339(),
            ],
        )?;

        debug!("Inserted chunk {} of lecture {}", chunk.chunk_index, chunk.lecture_id);
        Ok(())
    }

    #[instrument(skip(self))]
    async fn chunks_for_lecture(&self, lecture_id: &str) -> Result<Vec<ChunkRecord>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT id, lecture_id, chunk_index, content, token_count, embedding, created_at
            FROM lecture_chunks
            WHERE lecture_id = ?1
            ORDER BY chunk_index, rowid
            "#,
        )?;

        let chunks = stmt.query_map(params![lecture_id], Self::chunk_from_row)?;
        let result: Vec<ChunkRecord> = chunks.filter_map(|c| c.ok()).collect();
        debug!("Found {} chunks for lecture {}", result.len(), lecture_id);
        Ok(result)
    }

    #[instrument(skip(self, topic), fields(lecture_id = %topic.lecture_id, order_index = topic.order_index))]
    async fn insert_topic(&self, topic: &TopicRecord) -> Result<()> {
        let conn = self.conn()?;

        conn.execute(
            r#"
            INSERT INTO topics
            (id, lecture_id, user_id, title, summary, order_index, parent_topic_id, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                topic.id.to_string(),
                topic.lecture_id,
                topic.user_id,
                topic.title,
                topic.summary,
                topic.order_index,
                topic.parent_topic_id,
                topic.created_at.to_rfc3339(),
            ],
        )?;

        debug!("Inserted topic {} of lecture {}", topic.order_index, topic.lecture_id);
        Ok(())
    }

    #[instrument(skip(self))]
    async fn topics_for_lecture(&self, lecture_id: &str) -> Result<Vec<TopicRecord>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT id, lecture_id, user_id, title, summary, order_index, parent_topic_id, created_at
            FROM topics
            WHERE lecture_id = ?1
            ORDER BY order_index, rowid
            "#,
        )?;

        let topics = stmt.query_map(params![lecture_id], Self::topic_from_row)?;
        Ok(topics.filter_map(|t| t.ok()).collect())
    }

    #[instrument(skip(self, query_embedding))]
    async fn search_chunks(
        &self,
        query_embedding: &[f32],
        limit: usize,
        min_score: f32,
    ) -> Result<Vec<ChunkSearchResult>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT c.id, c.lecture_id, c.chunk_index, c.content, c.token_count,
                   c.embedding, c.created_at, l.title
            FROM lecture_chunks c
            JOIN lectures l ON l.id = c.lecture_id
            WHERE c.embedding IS NOT NULL
            "#,
        )?;

        let rows = stmt.query_map([], |row| {
            let chunk = Self::chunk_from_row(row)?;
            let lecture_title: String = row.get(7)?;
            Ok((chunk, lecture_title))
        })?;

        let mut results: Vec<ChunkSearchResult> = rows
            .filter_map(|r| r.ok())
            .map(|(chunk, lecture_title)| {
                let score = chunk
                    .embedding
                    .as_deref()
                    .map(|emb| cosine_similarity(query_embedding, emb))
                    .unwrap_or(0.0);
                ChunkSearchResult {
                    chunk,
                    lecture_title,
                    score,
                }
            })
            .filter(|r| r.score >= min_score)
            .collect();

        // Sort by score descending
        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(limit);

        debug!("Found {} matching chunks", results.len());
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_lecture() -> Lecture {
        Lecture::new(
            "user-1".to_string(),
            "Test Lecture".to_string(),
            "First paragraph.\n\nSecond paragraph.".to_string(),
        )
    }

    #[tokio::test]
    async fn test_lecture_round_trip() {
        let store = SqliteLectureStore::in_memory().unwrap();
        let lecture = sample_lecture();

        store.create_lecture(&lecture).await.unwrap();

        let fetched = store.get_lecture(&lecture.id).await.unwrap().unwrap();
        assert_eq!(fetched.id, lecture.id);
        assert_eq!(fetched.title, "Test Lecture");
        assert_eq!(fetched.status, LectureStatus::Pending);
        assert!(fetched.processed_at.is_none());

        assert!(store.get_lecture("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_status_transitions() {
        let store = SqliteLectureStore::in_memory().unwrap();
        let lecture = sample_lecture();
        store.create_lecture(&lecture).await.unwrap();

        store
            .set_status(&lecture.id, LectureStatus::Processing)
            .await
            .unwrap();
        let fetched = store.get_lecture(&lecture.id).await.unwrap().unwrap();
        assert_eq!(fetched.status, LectureStatus::Processing);

        store.mark_completed(&lecture.id, 6).await.unwrap();
        let fetched = store.get_lecture(&lecture.id).await.unwrap().unwrap();
        assert_eq!(fetched.status, LectureStatus::Completed);
        assert_eq!(fetched.topic_count, Some(6));
        assert!(fetched.processed_at.is_some());
    }

    #[tokio::test]
    async fn test_mark_failed_records_message() {
        let store = SqliteLectureStore::in_memory().unwrap();
        let lecture = sample_lecture();
        store.create_lecture(&lecture).await.unwrap();

        store
            .mark_failed(&lecture.id, "Embedding API error: 500")
            .await
            .unwrap();

        let fetched = store.get_lecture(&lecture.id).await.unwrap().unwrap();
        assert_eq!(fetched.status, LectureStatus::Failed);
        assert_eq!(
            fetched.processing_error.as_deref(),
            Some("Embedding API error: 500")
        );
    }

    #[tokio::test]
    async fn test_chunk_embedding_round_trip() {
        let store = SqliteLectureStore::in_memory().unwrap();
        let lecture = sample_lecture();
        store.create_lecture(&lecture).await.unwrap();

        let chunk = ChunkRecord::new(
            lecture.id.clone(),
            0,
            "First paragraph.".to_string(),
            4,
            Some(vec![0.25, -1.5, 3.0]),
        );
        store.insert_chunk(&chunk).await.unwrap();

        let chunks = store.chunks_for_lecture(&lecture.id).await.unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].chunk_index, 0);
        assert_eq!(chunks[0].embedding, Some(vec![0.25, -1.5, 3.0]));
    }

    #[tokio::test]
    async fn test_chunks_ordered_by_index() {
        let store = SqliteLectureStore::in_memory().unwrap();
        let lecture = sample_lecture();
        store.create_lecture(&lecture).await.unwrap();

        for index in (0..3).rev() {
            let chunk = ChunkRecord::new(
                lecture.id.clone(),
                index,
                format!("chunk {}", index),
                1,
                None,
            );
            store.insert_chunk(&chunk).await.unwrap();
        }

        let chunks = store.chunks_for_lecture(&lecture.id).await.unwrap();
        let indices: Vec<u32> = chunks.iter().map(|c| c.chunk_index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn test_duplicate_chunk_rows_accumulate() {
        // Re-runs append rather than replace; the store must not dedupe
        let store = SqliteLectureStore::in_memory().unwrap();
        let lecture = sample_lecture();
        store.create_lecture(&lecture).await.unwrap();

        for _run in 0..2 {
            for index in 0..2 {
                let chunk = ChunkRecord::new(
                    lecture.id.clone(),
                    index,
                    format!("chunk {}", index),
                    1,
                    None,
                );
                store.insert_chunk(&chunk).await.unwrap();
            }
        }

        let chunks = store.chunks_for_lecture(&lecture.id).await.unwrap();
        assert_eq!(chunks.len(), 4);
    }

    #[tokio::test]
    async fn test_topics_ordered_by_order_index() {
        let store = SqliteLectureStore::in_memory().unwrap();
        let lecture = sample_lecture();
        store.create_lecture(&lecture).await.unwrap();

        for index in (0..3).rev() {
            let topic = TopicRecord::new(
                lecture.id.clone(),
                lecture.user_id.clone(),
                format!("Topic {}", index),
                "Summary.".to_string(),
                index,
            );
            store.insert_topic(&topic).await.unwrap();
        }

        let topics = store.topics_for_lecture(&lecture.id).await.unwrap();
        let indices: Vec<u32> = topics.iter().map(|t| t.order_index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert!(topics.iter().all(|t| t.parent_topic_id.is_none()));
    }

    #[tokio::test]
    async fn test_search_chunks_ranks_by_similarity() {
        let store = SqliteLectureStore::in_memory().unwrap();
        let lecture = sample_lecture();
        store.create_lecture(&lecture).await.unwrap();

        let close = ChunkRecord::new(
            lecture.id.clone(),
            0,
            "close".to_string(),
            1,
            Some(vec![1.0, 0.0, 0.0]),
        );
        let far = ChunkRecord::new(
            lecture.id.clone(),
            1,
            "far".to_string(),
            1,
            Some(vec![0.0, 1.0, 0.0]),
        );
        let unembedded = ChunkRecord::new(lecture.id.clone(), 2, "none".to_string(), 1, None);
        store.insert_chunk(&close).await.unwrap();
        store.insert_chunk(&far).await.unwrap();
        store.insert_chunk(&unembedded).await.unwrap();

        let results = store
            .search_chunks(&[1.0, 0.0, 0.0], 10, 0.5)
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].chunk.content, "close");
        assert_eq!(results[0].lecture_title, "Test Lecture");
        assert!((results[0].score - 1.0).abs() < 0.001);
    }

    #[tokio::test]
    async fn test_on_disk_store_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lectern.db");

        let lecture = sample_lecture();
        {
            let store = SqliteLectureStore::new(&path).unwrap();
            store.create_lecture(&lecture).await.unwrap();
        }

        let store = SqliteLectureStore::new(&path).unwrap();
        let fetched = store.get_lecture(&lecture.id).await.unwrap();
        assert!(fetched.is_some());
    }
}
