//! Ingestion orchestration.
//!
//! Coordinates the full flow for one file: extraction → header stripping →
//! normalization → script extraction → segmentation → chunking → embedding →
//! storage.
//!
//! Input problems (unsupported file, empty text, nothing left after
//! cleaning, zero chunks) are detected before the store is touched. Once
//! they pass, the target collection is dropped and recreated so vectors of
//! different dimensions never share a collection, then every chunk is
//! embedded and the records are inserted in one call.
//!
//! [`ingest_document`] never returns an error: every failure becomes an
//! [`IngestOutcome`] with `status = error`.

use std::path::{Path, PathBuf};

use crate::chunk::chunk_sentences;
use crate::clean::{extract_script, normalize, strip_headers};
use crate::context::AppContext;
use crate::embedding::Embedder;
use crate::extract::{load_document, ExtractError};
use crate::models::{Chunk, ChunkRecord, Document, IngestOutcome};
use crate::segment::split_sentences;
use crate::store::VectorStore;

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error(transparent)]
    Extract(#[from] ExtractError),
    #[error("Extracted text is empty. File might be empty or unreadable.")]
    EmptyText,
    #[error("No meaningful text found after Amharic extraction/cleaning.")]
    NoScriptText,
    #[error("No chunks generated from the document after processing.")]
    NoChunks,
    #[error("An error occurred during data ingestion: {0}")]
    Collaborator(String),
}

impl IngestError {
    fn collaborator(err: impl std::fmt::Display) -> Self {
        IngestError::Collaborator(err.to_string())
    }
}

/// Run the text pipeline over an extracted document.
///
/// Pure: touches neither the embedder nor the store. Used by ingestion and
/// by the `chunks` dry run.
pub fn prepare_chunks(document: &Document, max_sentences: usize) -> Result<Vec<Chunk>, IngestError> {
    if document.text.trim().is_empty() {
        return Err(IngestError::EmptyText);
    }

    let stripped = strip_headers(&document.text);
    let normalized = normalize(&stripped);
    let script = extract_script(&normalized);
    if script.is_empty() {
        return Err(IngestError::NoScriptText);
    }

    let sentences = split_sentences(&script);
    tracing::debug!(
        source = %document.source_file,
        sentences = sentences.len(),
        "segmented document"
    );

    let chunks = chunk_sentences(&document.source_file, &sentences, max_sentences);
    if chunks.is_empty() {
        return Err(IngestError::NoChunks);
    }
    Ok(chunks)
}

/// Load a file on the blocking pool. PDF parsing is CPU-bound.
pub async fn load(path: &Path) -> Result<Document, IngestError> {
    let owned: PathBuf = path.to_path_buf();
    let document = tokio::task::spawn_blocking(move || load_document(&owned))
        .await
        .map_err(IngestError::collaborator)??;
    tracing::info!(
        source = %document.source_file,
        pages = document.page_count,
        chars = document.text.chars().count(),
        "loaded document"
    );
    Ok(document)
}

/// Ingest `path` into `collection`, replacing whatever the collection held.
pub async fn ingest_document(
    ctx: &AppContext,
    path: &Path,
    collection: &str,
    max_sentences: usize,
) -> IngestOutcome {
    tracing::info!(path = %path.display(), collection, "starting ingestion");

    match run(ctx, path, collection, max_sentences).await {
        Ok((source_file, count)) => {
            tracing::info!(source = %source_file, chunks = count, collection, "ingestion complete");
            IngestOutcome::success(count, &source_file)
        }
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "ingestion failed");
            IngestOutcome::error(e.to_string())
        }
    }
}

async fn run(
    ctx: &AppContext,
    path: &Path,
    collection: &str,
    max_sentences: usize,
) -> Result<(String, usize), IngestError> {
    let document = load(path).await?;
    let chunks = prepare_chunks(&document, max_sentences)?;
    tracing::info!(source = %document.source_file, chunks = chunks.len(), "chunked document");

    let store = ctx.store().map_err(IngestError::collaborator)?;

    // Full replace. A missing collection is expected on first ingestion.
    match store.delete_collection(collection).await {
        Ok(()) => tracing::info!(collection, "deleted existing collection"),
        Err(e) => tracing::warn!(collection, error = %e, "could not delete collection"),
    }
    store
        .create_collection(collection)
        .await
        .map_err(IngestError::collaborator)?;
    tracing::info!(collection, "created collection");

    let records = embed_chunks(ctx, &chunks).await?;

    store
        .insert(collection, &records)
        .await
        .map_err(IngestError::collaborator)?;
    tracing::info!(collection, records = records.len(), "inserted records");

    Ok((document.source_file, records.len()))
}

async fn embed_chunks(ctx: &AppContext, chunks: &[Chunk]) -> Result<Vec<ChunkRecord>, IngestError> {
    let embedder = ctx.embedder();
    let batch_size = ctx.config().embedding.batch_size.max(1);
    let mut records = Vec::with_capacity(chunks.len());

    for batch in chunks.chunks(batch_size) {
        let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
        let vectors = embedder
            .embed(&texts)
            .await
            .map_err(IngestError::collaborator)?;
        if vectors.len() != batch.len() {
            return Err(IngestError::Collaborator(format!(
                "embedder returned {} vectors for {} chunks",
                vectors.len(),
                batch.len()
            )));
        }
        let expected = embedder.dims();
        if let Some(bad) = vectors.iter().find(|v| expected > 0 && v.len() != expected) {
            return Err(IngestError::Collaborator(format!(
                "embedder '{}' returned a {}-dimensional vector, expected {}",
                embedder.model_name(),
                bad.len(),
                expected
            )));
        }
        records.extend(
            batch
                .iter()
                .zip(vectors)
                .map(|(chunk, vector)| ChunkRecord::new(chunk, vector)),
        );
        tracing::debug!(embedded = records.len(), total = chunks.len(), "embedded batch");
    }

    Ok(records)
}
