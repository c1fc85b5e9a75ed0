//! Sentence-count text chunker.
//!
//! Groups consecutive sentences into [`Chunk`]s of at most
//! `max_sentences` sentences each. A group is closed when it is full or
//! when the last sentence has been added, so the final chunk may be short.
//!
//! The chunks partition the input: every sentence lands in exactly one
//! chunk, in source order, and chunk indices are contiguous from 0.

use crate::models::Chunk;

/// Group `sentences` into chunks for `source_file`.
///
/// Sentences in a chunk are joined with a single space. A `max_sentences`
/// of 0 is treated as 1. An empty input yields no chunks; callers treat
/// that as an ingestion failure.
pub fn chunk_sentences<S: AsRef<str>>(
    source_file: &str,
    sentences: &[S],
    max_sentences: usize,
) -> Vec<Chunk> {
    let group_size = max_sentences.max(1);

    sentences
        .chunks(group_size)
        .map(|group| {
            group
                .iter()
                .map(AsRef::as_ref)
                .collect::<Vec<_>>()
                .join(" ")
                .trim()
                .to_string()
        })
        .filter(|text| !text.is_empty())
        .enumerate()
        .map(|(index, text)| make_chunk(source_file, index, text))
        .collect()
}

fn make_chunk(source_file: &str, index: usize, text: String) -> Chunk {
    Chunk {
        source_file: source_file.to_string(),
        chunk_index: index,
        text,
    }
}
