//! SQLite-backed [`VectorStore`] implementation.
//!
//! Collections are rows in `collections`; records live in `records` with
//! the embedding stored as a little-endian f32 BLOB. Queries load the
//! collection's vectors and rank them by cosine distance in process.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use std::path::Path;

use crate::db;
use crate::embedding::{blob_to_vec, cosine_similarity, vec_to_blob};
use crate::migrate;
use crate::models::{ChunkMetadata, ChunkRecord, QueryHit};

use super::{check_dimensions, rank_hits, StoreError, VectorStore};

/// SQLite implementation of the [`VectorStore`] trait.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to the database at `path` and apply the schema.
    pub async fn open(path: &Path) -> Result<Self> {
        let pool = db::connect(path).await?;
        migrate::run_migrations(&pool).await?;
        Ok(Self::new(pool))
    }

    /// `None` if the collection is missing, `Some(None)` if it has no
    /// vectors yet.
    async fn collection_dims(&self, name: &str) -> Result<Option<Option<usize>>> {
        let row = sqlx::query("SELECT dims FROM collections WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| r.get::<Option<i64>, _>("dims").map(|d| d as usize)))
    }
}

#[async_trait]
impl VectorStore for SqliteStore {
    async fn create_collection(&self, name: &str) -> Result<()> {
        let result = sqlx::query(
            "INSERT INTO collections (name, dims, created_at) VALUES (?, NULL, ?) ON CONFLICT(name) DO NOTHING",
        )
        .bind(name)
        .bind(chrono::Utc::now().timestamp())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::CollectionExists(name.to_string()).into());
        }
        Ok(())
    }

    async fn delete_collection(&self, name: &str) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM records WHERE collection = ?")
            .bind(name)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM collections WHERE name = ?")
            .bind(name)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::CollectionNotFound(name.to_string()).into());
        }

        tx.commit().await?;
        Ok(())
    }

    async fn get_or_create_collection(&self, name: &str) -> Result<()> {
        sqlx::query(
            "INSERT INTO collections (name, dims, created_at) VALUES (?, NULL, ?) ON CONFLICT(name) DO NOTHING",
        )
        .bind(name)
        .bind(chrono::Utc::now().timestamp())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn insert(&self, collection: &str, records: &[ChunkRecord]) -> Result<()> {
        let current = self
            .collection_dims(collection)
            .await?
            .ok_or_else(|| StoreError::CollectionNotFound(collection.to_string()))?;
        let dims = check_dimensions(current, records)?;

        let mut tx = self.pool.begin().await?;

        for record in records {
            let metadata_json = serde_json::to_string(&record.metadata)?;
            let result = sqlx::query(
                r#"
                INSERT INTO records (collection, id, chunk_index, source_file, text, metadata_json, embedding)
                VALUES (?, ?, ?, ?, ?, ?, ?)
                ON CONFLICT(collection, id) DO NOTHING
                "#,
            )
            .bind(collection)
            .bind(&record.id)
            .bind(record.metadata.chunk_index as i64)
            .bind(&record.metadata.source_file)
            .bind(&record.text)
            .bind(metadata_json)
            .bind(vec_to_blob(&record.embedding))
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                // Dropping the transaction rolls back earlier inserts.
                return Err(StoreError::DuplicateId {
                    collection: collection.to_string(),
                    id: record.id.clone(),
                }
                .into());
            }
        }

        if current.is_none() {
            if let Some(d) = dims {
                sqlx::query("UPDATE collections SET dims = ? WHERE name = ?")
                    .bind(d as i64)
                    .bind(collection)
                    .execute(&mut *tx)
                    .await?;
            }
        }

        tx.commit().await?;
        Ok(())
    }

    async fn query(
        &self,
        collection: &str,
        embedding: &[f32],
        n_results: usize,
    ) -> Result<Vec<QueryHit>> {
        let dims = self
            .collection_dims(collection)
            .await?
            .ok_or_else(|| StoreError::CollectionNotFound(collection.to_string()))?;

        if let Some(expected) = dims {
            if expected != embedding.len() {
                return Err(StoreError::DimensionMismatch {
                    expected,
                    got: embedding.len(),
                }
                .into());
            }
        }

        let rows = sqlx::query(
            "SELECT id, text, metadata_json, embedding FROM records WHERE collection = ? ORDER BY chunk_index",
        )
        .bind(collection)
        .fetch_all(&self.pool)
        .await?;

        let records = rows
            .iter()
            .map(|row| {
                let metadata_json: String = row.get("metadata_json");
                let metadata: ChunkMetadata = serde_json::from_str(&metadata_json)?;
                let blob: Vec<u8> = row.get("embedding");
                Ok(ChunkRecord {
                    id: row.get("id"),
                    text: row.get("text"),
                    metadata,
                    embedding: blob_to_vec(&blob),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let scored = records
            .iter()
            .map(|r| (r, cosine_similarity(embedding, &r.embedding)));
        Ok(rank_hits(scored, n_results))
    }

    async fn count(&self, collection: &str) -> Result<usize> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM records WHERE collection = ?")
            .bind(collection)
            .fetch_one(&self.pool)
            .await?;
        Ok(count as usize)
    }
}
