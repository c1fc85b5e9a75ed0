//! Vector store abstraction.
//!
//! The [`VectorStore`] trait is the external store collaborator: named
//! collections of (id, text, metadata, embedding) records with
//! nearest-neighbour queries. Two backends are provided:
//!
//! | Backend | Use |
//! |---------|-----|
//! | [`sqlite::SqliteStore`] | Persistent store used by the CLI and server |
//! | [`memory::InMemoryStore`] | Tests and throwaway runs |
//!
//! A collection's dimension is fixed by the first vector inserted into it.
//! Queries or inserts with a different dimension fail with
//! [`StoreError::DimensionMismatch`].

pub mod memory;
pub mod sqlite;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{ChunkRecord, QueryHit};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Collection {0} does not exist.")]
    CollectionNotFound(String),
    #[error("Collection {0} already exists.")]
    CollectionExists(String),
    #[error("Record id {id} already exists in collection {collection}.")]
    DuplicateId { collection: String, id: String },
    #[error("Collection expecting embedding with dimension of {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
}

/// Abstract vector store.
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`create_collection`](VectorStore::create_collection) | Create an empty collection; fails if it exists |
/// | [`delete_collection`](VectorStore::delete_collection) | Drop a collection and its records; fails if missing |
/// | [`get_or_create_collection`](VectorStore::get_or_create_collection) | Ensure a collection exists |
/// | [`insert`](VectorStore::insert) | Bulk insert records |
/// | [`query`](VectorStore::query) | Nearest records to an embedding, closest first |
/// | [`count`](VectorStore::count) | Records in a collection (0 if missing) |
#[async_trait]
pub trait VectorStore: Send + Sync {
    async fn create_collection(&self, name: &str) -> Result<()>;

    async fn delete_collection(&self, name: &str) -> Result<()>;

    async fn get_or_create_collection(&self, name: &str) -> Result<()>;

    /// Insert all records or none.
    async fn insert(&self, collection: &str, records: &[ChunkRecord]) -> Result<()>;

    /// Return up to `n_results` records ranked by ascending cosine distance.
    async fn query(
        &self,
        collection: &str,
        embedding: &[f32],
        n_results: usize,
    ) -> Result<Vec<QueryHit>>;

    async fn count(&self, collection: &str) -> Result<usize>;
}

/// Check that every record matches the collection dimension (or, for an
/// empty collection, the first record). Returns the resulting dimension.
pub(crate) fn check_dimensions(
    current: Option<usize>,
    records: &[ChunkRecord],
) -> Result<Option<usize>, StoreError> {
    let mut expected = current;
    for record in records {
        let got = record.embedding.len();
        match expected {
            Some(dims) if dims != got => {
                return Err(StoreError::DimensionMismatch {
                    expected: dims,
                    got,
                })
            }
            Some(_) => {}
            None => expected = Some(got),
        }
    }
    Ok(expected)
}

/// Rank `(record, similarity)` pairs into hits, closest first.
pub(crate) fn rank_hits<'a, I>(scored: I, n_results: usize) -> Vec<QueryHit>
where
    I: IntoIterator<Item = (&'a ChunkRecord, f32)>,
{
    let mut hits: Vec<QueryHit> = scored
        .into_iter()
        .map(|(record, similarity)| QueryHit {
            id: record.id.clone(),
            text: record.text.clone(),
            metadata: record.metadata.clone(),
            distance: 1.0 - similarity,
        })
        .collect();

    hits.sort_by(|a, b| {
        a.distance
            .partial_cmp(&b.distance)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    hits.truncate(n_results);
    hits
}
