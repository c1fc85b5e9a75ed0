//! Retrieval and answer orchestration.
//!
//! Embeds the question, fetches the nearest chunks from the configured
//! collection, and asks the generator to answer using only that context.
//! Every failure is turned into a user-facing Amharic message, so
//! [`answer_question`] always returns text.

use anyhow::Result;

use crate::context::AppContext;
use crate::embedding::Embedder;
use crate::generation::Generator;
use crate::models::QueryHit;
use crate::store::VectorStore;

/// Shown when the collection holds no records.
pub const EMPTY_DATABASE: &str = "የመረጃ ቋቱ ባዶ ነው። እባክዎ ከመጠየቅዎ በፊት ሰነዶችን ይስቀሉ።";
/// Shown when the store returns no hits.
pub const NO_MATCHES: &str = "No matching context found in the database.";
/// Shown when the hits carry no usable text.
pub const NO_RELEVANT_CONTEXT: &str =
    "ከመረጃ ቋቱ ጋር የሚዛመድ መረጃ አልተገኘም። እባክዎ ጥያቄዎን በሌላ መንገድ ይሞክሩ።";
/// Shown when the generator answers without text.
pub const NO_ANSWER: &str = "መልስ ማመንጨት አልተቻለም።";
/// Shown when the question and the stored vectors have different dimensions.
pub const DIMENSION_MISMATCH: &str =
    "የመረጃ ቋቱ እና የማመንጫ ሞዴሉ እኩል ያልሆኑ ልኬቶች አላቸው። እባክዎ ፋይል ከሰቀሉ በኋላ መተግበሪያውን እንደገና ያስጀምሩት።";

const GENERIC_ERROR_PREFIX: &str = "ጥያቄዎን ሲያስተናግድ ስህተት ተፈጥሯል። እባክዎ እንደገና ይሞክሩ። ስህተት:";

/// Fill the fixed prompt template.
pub fn build_prompt(context: &str, question: &str) -> String {
    format!(
        "እርስዎ አጋዥ የ AI ረዳት ነዎት። ጥያቄውን ለመመለስ የቀረበውን ጽሑፍ ብቻ ይጠቀሙ።\n\n\
         ጽሑፍ:\n{context}\n\n\
         ጥያቄ:\n{question}\n\n\
         መልሱን ግልጽ እና አጭር በሆነ መንገድ በጽሑፉ ላይ ብቻ በመመስረት ይመልሱ።"
    )
}

/// Join hit texts, closest first, separated by a blank line.
pub fn build_context(hits: &[QueryHit]) -> String {
    hits.iter()
        .map(|h| h.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Map a collaborator error to the message shown to the user.
pub fn error_message(err: &anyhow::Error) -> String {
    let text = format!("{:#}", err);
    let lowered = text.to_lowercase();
    if lowered.contains("dimension") && lowered.contains("expecting embedding with dimension") {
        DIMENSION_MISMATCH.to_string()
    } else {
        format!("{} {}", GENERIC_ERROR_PREFIX, text)
    }
}

/// Answer `question` from the configured collection.
pub async fn answer_question(ctx: &AppContext, question: &str, n_results: usize) -> String {
    match run(ctx, question, n_results).await {
        Ok(answer) => answer,
        Err(e) => {
            tracing::error!(error = %format!("{:#}", e), "answering failed");
            error_message(&e)
        }
    }
}

async fn run(ctx: &AppContext, question: &str, n_results: usize) -> Result<String> {
    let store = ctx.store()?;
    let collection = ctx.collection();

    if store.count(collection).await? == 0 {
        tracing::info!(collection, "question asked against an empty collection");
        return Ok(EMPTY_DATABASE.to_string());
    }

    let query = ctx.embedder().embed_one(question).await?;
    let hits = store.query(collection, &query, n_results).await?;
    if hits.is_empty() {
        return Ok(NO_MATCHES.to_string());
    }
    for hit in &hits {
        tracing::debug!(id = %hit.id, distance = hit.distance, "retrieved chunk");
    }

    let context = build_context(&hits);
    if context.trim().is_empty() {
        return Ok(NO_RELEVANT_CONTEXT.to_string());
    }

    let prompt = build_prompt(&context, question);
    match ctx.generator().generate(&prompt).await? {
        Some(answer) => Ok(answer),
        None => {
            tracing::warn!("generator returned no text");
            Ok(NO_ANSWER.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Chunk, ChunkRecord};
    use crate::store::StoreError;
    use crate::test_support::{context_with, HashEmbedder, StubGenerator};
    use std::sync::Arc;

    async fn seed(store: &dyn VectorStore, embedder: &HashEmbedder, texts: &[&str]) {
        store.get_or_create_collection("collection4").await.unwrap();
        let records: Vec<ChunkRecord> = texts
            .iter()
            .enumerate()
            .map(|(i, t)| {
                let chunk = Chunk {
                    source_file: "doc.txt".to_string(),
                    chunk_index: i,
                    text: t.to_string(),
                };
                ChunkRecord::new(&chunk, embedder.vector(t))
            })
            .collect();
        store.insert("collection4", &records).await.unwrap();
    }

    #[test]
    fn prompt_embeds_context_and_question() {
        let prompt = build_prompt("ጽሑፍ አንድ", "ምንድን ነው?");
        assert!(prompt.starts_with("እርስዎ አጋዥ የ AI ረዳት ነዎት።"));
        assert!(prompt.contains("ጽሑፍ:\nጽሑፍ አንድ\n\nጥያቄ:\nምንድን ነው?\n\n"));
        assert!(prompt.ends_with("ይመልሱ።"));
    }

    #[test]
    fn dimension_errors_are_classified() {
        let err: anyhow::Error = StoreError::DimensionMismatch { expected: 768, got: 384 }.into();
        assert_eq!(error_message(&err), DIMENSION_MISMATCH);

        let other = anyhow::anyhow!("connection refused");
        let msg = error_message(&other);
        assert!(msg.starts_with(GENERIC_ERROR_PREFIX));
        assert!(msg.ends_with("connection refused"));
    }

    #[tokio::test]
    async fn empty_collection_short_circuits() {
        let generator = Arc::new(StubGenerator::default());
        let (ctx, _store) = context_with(Arc::new(HashEmbedder::new(4)), generator.clone());
        let answer = answer_question(&ctx, "ዋና ከተማ?", 2).await;
        assert_eq!(answer, EMPTY_DATABASE);
        assert!(generator.last_prompt().is_none());
    }

    #[tokio::test]
    async fn context_is_joined_in_rank_order() {
        let embedder = HashEmbedder::new(4);
        let generator = Arc::new(StubGenerator::default());
        let (ctx, store) = context_with(Arc::new(HashEmbedder::new(4)), generator.clone());
        seed(store.as_ref(), &embedder, &["አንደኛ ክፍል።", "ሁለተኛ ክፍል።", "ሶስተኛ ክፍል።"]).await;

        let answer = answer_question(&ctx, "አንደኛ ክፍል።", 2).await;
        assert_eq!(answer, "አዲስ አበባ");

        let prompt = generator.last_prompt().unwrap();
        // The exact match ranks first; only two chunks are used.
        assert!(prompt.contains("ጽሑፍ:\nአንደኛ ክፍል።\n\n"));
        let used = ["አንደኛ ክፍል።", "ሁለተኛ ክፍል።", "ሶስተኛ ክፍል።"]
            .iter()
            .filter(|t| prompt.contains(*t))
            .count();
        assert_eq!(used, 2);
    }

    #[tokio::test]
    async fn generator_without_text_gets_fixed_notice() {
        let embedder = HashEmbedder::new(4);
        let (ctx, store) = context_with(
            Arc::new(HashEmbedder::new(4)),
            Arc::new(StubGenerator::replying(None)),
        );
        seed(store.as_ref(), &embedder, &["ሰላም ነው።"]).await;
        assert_eq!(answer_question(&ctx, "ሰላም?", 2).await, NO_ANSWER);
    }

    #[tokio::test]
    async fn blank_hits_report_no_relevant_context() {
        let embedder = HashEmbedder::new(4);
        let (ctx, store) = context_with(Arc::new(HashEmbedder::new(4)), Arc::new(StubGenerator::default()));
        seed(store.as_ref(), &embedder, &[" "]).await;
        assert_eq!(answer_question(&ctx, "ሰላም?", 1).await, NO_RELEVANT_CONTEXT);
    }

    #[tokio::test]
    async fn dimension_mismatch_maps_to_notice() {
        let stored = HashEmbedder::new(8);
        let (ctx, store) = context_with(Arc::new(HashEmbedder::new(3)), Arc::new(StubGenerator::default()));
        seed(store.as_ref(), &stored, &["ሰላም ነው።"]).await;
        assert_eq!(answer_question(&ctx, "ሰላም?", 2).await, DIMENSION_MISMATCH);
    }

    #[tokio::test]
    async fn generator_failure_is_reported_in_amharic() {
        let embedder = HashEmbedder::new(4);
        let (ctx, store) = context_with(Arc::new(HashEmbedder::new(4)), Arc::new(StubGenerator::failing()));
        seed(store.as_ref(), &embedder, &["ሰላም ነው።"]).await;
        let answer = answer_question(&ctx, "ሰላም?", 2).await;
        assert!(answer.starts_with(GENERIC_ERROR_PREFIX));
        assert!(answer.contains("quota exceeded"));
    }
}
