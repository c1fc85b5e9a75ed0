//! In-memory [`VectorStore`] implementation for tests and throwaway runs.
//!
//! Collections live in a `HashMap` behind `std::sync::RwLock`. Queries are
//! brute-force cosine similarity over every record in the collection.

use std::collections::HashMap;
use std::sync::RwLock;

use anyhow::Result;
use async_trait::async_trait;

use crate::embedding::cosine_similarity;
use crate::models::{ChunkRecord, QueryHit};

use super::{check_dimensions, rank_hits, StoreError, VectorStore};

#[derive(Default)]
struct Collection {
    dims: Option<usize>,
    records: Vec<ChunkRecord>,
}

/// In-memory vector store.
#[derive(Default)]
pub struct InMemoryStore {
    collections: RwLock<HashMap<String, Collection>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of all collections, sorted.
    pub fn collection_names(&self) -> Result<Vec<String>> {
        let collections = self.collections.read().map_err(|_| poisoned())?;
        let mut names: Vec<String> = collections.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}

fn poisoned() -> anyhow::Error {
    anyhow::anyhow!("in-memory store lock poisoned")
}

#[async_trait]
impl VectorStore for InMemoryStore {
    async fn create_collection(&self, name: &str) -> Result<()> {
        let mut collections = self.collections.write().map_err(|_| poisoned())?;
        if collections.contains_key(name) {
            return Err(StoreError::CollectionExists(name.to_string()).into());
        }
        collections.insert(name.to_string(), Collection::default());
        Ok(())
    }

    async fn delete_collection(&self, name: &str) -> Result<()> {
        let mut collections = self.collections.write().map_err(|_| poisoned())?;
        collections
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| StoreError::CollectionNotFound(name.to_string()).into())
    }

    async fn get_or_create_collection(&self, name: &str) -> Result<()> {
        let mut collections = self.collections.write().map_err(|_| poisoned())?;
        collections.entry(name.to_string()).or_default();
        Ok(())
    }

    async fn insert(&self, collection: &str, records: &[ChunkRecord]) -> Result<()> {
        let mut collections = self.collections.write().map_err(|_| poisoned())?;
        let target = collections
            .get_mut(collection)
            .ok_or_else(|| StoreError::CollectionNotFound(collection.to_string()))?;

        let dims = check_dimensions(target.dims, records)?;

        for (i, record) in records.iter().enumerate() {
            let clash = target.records.iter().any(|r| r.id == record.id)
                || records[..i].iter().any(|r| r.id == record.id);
            if clash {
                return Err(StoreError::DuplicateId {
                    collection: collection.to_string(),
                    id: record.id.clone(),
                }
                .into());
            }
        }

        target.dims = dims;
        target.records.extend_from_slice(records);
        Ok(())
    }

    async fn query(
        &self,
        collection: &str,
        embedding: &[f32],
        n_results: usize,
    ) -> Result<Vec<QueryHit>> {
        let collections = self.collections.read().map_err(|_| poisoned())?;
        let target = collections
            .get(collection)
            .ok_or_else(|| StoreError::CollectionNotFound(collection.to_string()))?;

        if let Some(expected) = target.dims {
            if expected != embedding.len() {
                return Err(StoreError::DimensionMismatch {
                    expected,
                    got: embedding.len(),
                }
                .into());
            }
        }

        let scored = target
            .records
            .iter()
            .map(|r| (r, cosine_similarity(embedding, &r.embedding)));
        Ok(rank_hits(scored, n_results))
    }

    async fn count(&self, collection: &str) -> Result<usize> {
        let collections = self.collections.read().map_err(|_| poisoned())?;
        Ok(collections.get(collection).map_or(0, |c| c.records.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Chunk;

    fn record(index: usize, embedding: Vec<f32>) -> ChunkRecord {
        let chunk = Chunk {
            source_file: "doc.txt".to_string(),
            chunk_index: index,
            text: format!("ክፍል {}።", index),
        };
        ChunkRecord::new(&chunk, embedding)
    }

    #[tokio::test]
    async fn poisoned_lock_is_reported_as_an_error() {
        let store = std::sync::Arc::new(InMemoryStore::new());
        let clone = store.clone();
        let _ = std::thread::spawn(move || {
            let _guard = clone.collections.write().unwrap();
            panic!("poison the lock");
        })
        .join();

        let err = store.collection_names().unwrap_err();
        assert_eq!(err.to_string(), "in-memory store lock poisoned");
        assert!(store.count("c").await.is_err());
    }

    #[tokio::test]
    async fn create_twice_fails_and_delete_missing_fails() {
        let store = InMemoryStore::new();
        store.create_collection("c").await.unwrap();
        assert!(store.create_collection("c").await.is_err());
        store.delete_collection("c").await.unwrap();
        assert!(store.delete_collection("c").await.is_err());
    }

    #[tokio::test]
    async fn query_ranks_by_distance() {
        let store = InMemoryStore::new();
        store.create_collection("c").await.unwrap();
        store
            .insert(
                "c",
                &[
                    record(0, vec![1.0, 0.0]),
                    record(1, vec![0.0, 1.0]),
                    record(2, vec![0.7, 0.7]),
                ],
            )
            .await
            .unwrap();

        let hits = store.query("c", &[0.0, 1.0], 2).await.unwrap();
        let ids: Vec<&str> = hits.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, vec!["doc.txt_1", "doc.txt_2"]);
        assert!(hits[0].distance.abs() < 1e-6);
        assert_eq!(store.count("c").await.unwrap(), 3);
    }

    #[tokio::test]
    async fn dimension_mismatch_reports_expected_dimension() {
        let store = InMemoryStore::new();
        store.create_collection("c").await.unwrap();
        store.insert("c", &[record(0, vec![1.0, 0.0, 0.0])]).await.unwrap();

        let err = store.query("c", &[1.0, 0.0], 1).await.unwrap_err();
        assert!(err
            .to_string()
            .contains("expecting embedding with dimension of 3"));

        assert!(store.insert("c", &[record(1, vec![1.0])]).await.is_err());
        assert_eq!(store.count("c").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn duplicate_ids_rejected_atomically() {
        let store = InMemoryStore::new();
        store.create_collection("c").await.unwrap();
        let err = store
            .insert("c", &[record(0, vec![1.0]), record(0, vec![2.0])])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("already exists"));
        assert_eq!(store.count("c").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn count_of_missing_collection_is_zero() {
        let store = InMemoryStore::new();
        assert_eq!(store.count("nope").await.unwrap(), 0);
        assert!(store.query("nope", &[1.0], 1).await.is_err());
    }
}
