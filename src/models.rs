//! Core data models used throughout the pipeline.
//!
//! A [`Document`] is read once per ingestion, split into [`Chunk`]s, and
//! each chunk becomes a [`ChunkRecord`] once it has an embedding. Queries
//! come back from the store as [`QueryHit`]s.

use serde::{Deserialize, Serialize};

/// Raw text extracted from an input file.
#[derive(Debug, Clone)]
pub struct Document {
    /// File name (no directory), used as the record id prefix.
    pub source_file: String,
    pub text: String,
    /// Informational only; chunks do not carry page numbers.
    pub page_count: usize,
}

/// A group of consecutive sentences from one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub source_file: String,
    pub chunk_index: usize,
    pub text: String,
}

impl Chunk {
    /// Store id of this chunk: `{source_file}_{chunk_index}`.
    pub fn record_id(&self) -> String {
        format!("{}_{}", self.source_file, self.chunk_index)
    }
}

/// Metadata stored alongside every record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub source_file: String,
    pub chunk_index: usize,
    /// Always empty: page numbers are not tracked per chunk.
    #[serde(default)]
    pub pages: String,
}

/// A chunk ready for insertion into a vector store.
#[derive(Debug, Clone)]
pub struct ChunkRecord {
    pub id: String,
    pub text: String,
    pub metadata: ChunkMetadata,
    pub embedding: Vec<f32>,
}

impl ChunkRecord {
    pub fn new(chunk: &Chunk, embedding: Vec<f32>) -> Self {
        Self {
            id: chunk.record_id(),
            text: chunk.text.clone(),
            metadata: ChunkMetadata {
                source_file: chunk.source_file.clone(),
                chunk_index: chunk.chunk_index,
                pages: String::new(),
            },
            embedding,
        }
    }
}

/// One ranked result of a nearest-neighbour query.
#[derive(Debug, Clone, Serialize)]
pub struct QueryHit {
    pub id: String,
    pub text: String,
    pub metadata: ChunkMetadata,
    /// Cosine distance (`1 - similarity`); lower is closer.
    pub distance: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IngestStatus {
    Success,
    Error,
}

/// Result of an ingestion run, serialized as
/// `{"status": "success"|"error", "message": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestOutcome {
    pub status: IngestStatus,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunks: Option<usize>,
}

impl IngestOutcome {
    pub fn success(chunks: usize, source_file: &str) -> Self {
        Self {
            status: IngestStatus::Success,
            message: format!(
                "Successfully ingested {} chunks from {}.",
                chunks, source_file
            ),
            chunks: Some(chunks),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: IngestStatus::Error,
            message: message.into(),
            chunks: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == IngestStatus::Success
    }
}
