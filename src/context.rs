//! Application context shared by the CLI and the HTTP server.
//!
//! Built once at startup from [`Config`]; construction fails fast when a
//! collaborator cannot be created (missing API key, unloadable model,
//! unreachable database). Orchestrators receive `&AppContext` instead of
//! reaching for globals.
//!
//! The store handle sits behind a lock so [`AppContext::clear`] can swap in
//! a freshly opened store while callers keep using their own snapshot.

use anyhow::Result;
use std::sync::{Arc, RwLock};

use crate::config::Config;
use crate::embedding::{self, Embedder};
use crate::generation::{self, Generator};
use crate::store::memory::InMemoryStore;
use crate::store::sqlite::SqliteStore;
use crate::store::{StoreError, VectorStore};

pub struct AppContext {
    config: Config,
    embedder: Arc<dyn Embedder>,
    generator: Arc<dyn Generator>,
    store: RwLock<Arc<dyn VectorStore>>,
}

impl AppContext {
    /// Assemble a context from already-built collaborators.
    pub fn new(
        config: Config,
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn VectorStore>,
        generator: Arc<dyn Generator>,
    ) -> Self {
        Self {
            config,
            embedder,
            generator,
            store: RwLock::new(store),
        }
    }

    /// Build every collaborator named in `config` and make sure the
    /// configured collection exists.
    pub async fn from_config(config: Config) -> Result<Self> {
        let generator = generation::create_generator(&config.generation)?;
        let embedder = embedding::create_embedder(&config.embedding)?;
        let store = open_store(&config).await?;
        store
            .get_or_create_collection(&config.store.collection)
            .await?;

        tracing::info!(
            collection = %config.store.collection,
            records = store.count(&config.store.collection).await?,
            embedder = embedder.model_name(),
            generator = generator.model_name(),
            "context ready"
        );

        Ok(Self::new(config, embedder, store, generator))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn collection(&self) -> &str {
        &self.config.store.collection
    }

    pub fn embedder(&self) -> Arc<dyn Embedder> {
        Arc::clone(&self.embedder)
    }

    pub fn generator(&self) -> Arc<dyn Generator> {
        Arc::clone(&self.generator)
    }

    /// Snapshot of the current store handle.
    pub fn store(&self) -> Result<Arc<dyn VectorStore>> {
        let guard = self
            .store
            .read()
            .map_err(|_| anyhow::anyhow!("store handle lock poisoned"))?;
        Ok(Arc::clone(&guard))
    }

    /// Empty the configured collection and swap in a fresh store handle.
    ///
    /// The replacement is prepared completely before the swap, so a failure
    /// leaves the current handle in place.
    pub async fn clear(&self) -> Result<()> {
        let fresh: Arc<dyn VectorStore> = match self.config.store.backend.as_str() {
            "memory" => Arc::new(InMemoryStore::new()),
            _ => open_store(&self.config).await?,
        };
        reset_collection(fresh.as_ref(), self.collection()).await?;

        let mut guard = self
            .store
            .write()
            .map_err(|_| anyhow::anyhow!("store handle lock poisoned"))?;
        *guard = fresh;

        tracing::info!(collection = %self.collection(), "store cleared and re-initialized");
        Ok(())
    }
}

/// Open the store backend named in the configuration.
pub async fn open_store(config: &Config) -> Result<Arc<dyn VectorStore>> {
    match config.store.backend.as_str() {
        "memory" => Ok(Arc::new(InMemoryStore::new())),
        _ => {
            tracing::info!(path = %config.store.path.display(), "opening SQLite store");
            Ok(Arc::new(SqliteStore::open(&config.store.path).await?))
        }
    }
}

/// Drop `name` if it exists and recreate it empty.
pub async fn reset_collection(store: &dyn VectorStore, name: &str) -> Result<()> {
    match store.delete_collection(name).await {
        Ok(()) => {}
        Err(e)
            if matches!(
                e.downcast_ref::<StoreError>(),
                Some(StoreError::CollectionNotFound(_))
            ) => {}
        Err(e) => return Err(e),
    }
    store.create_collection(name).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::DisabledProvider;
    use crate::generation::DisabledGenerator;
    use crate::models::{Chunk, ChunkRecord};

    fn memory_config() -> Config {
        let mut config: Config = toml::from_str("").unwrap();
        config.store.backend = "memory".to_string();
        config
    }

    #[tokio::test]
    async fn clear_swaps_in_empty_store() {
        let store = Arc::new(InMemoryStore::new());
        store.create_collection("collection4").await.unwrap();
        let chunk = Chunk {
            source_file: "a.txt".to_string(),
            chunk_index: 0,
            text: "ሰላም ነው።".to_string(),
        };
        store
            .insert("collection4", &[ChunkRecord::new(&chunk, vec![1.0])])
            .await
            .unwrap();

        let ctx = AppContext::new(
            memory_config(),
            Arc::new(DisabledProvider),
            store,
            Arc::new(DisabledGenerator),
        );
        let before = ctx.store().unwrap();
        assert_eq!(before.count("collection4").await.unwrap(), 1);

        ctx.clear().await.unwrap();

        let after = ctx.store().unwrap();
        assert_eq!(after.count("collection4").await.unwrap(), 0);
        // The old snapshot is untouched.
        assert_eq!(before.count("collection4").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn clear_sqlite_keeps_other_collections() {
        let tmp = tempfile::TempDir::new().unwrap();
        let mut config: Config = toml::from_str("").unwrap();
        config.store.path = tmp.path().join("store.sqlite");

        let ctx = AppContext::from_config(config).await.unwrap();
        let store = ctx.store().unwrap();
        store.create_collection("other").await.unwrap();
        let chunk = Chunk {
            source_file: "a.txt".to_string(),
            chunk_index: 0,
            text: "ሰላም ነው።".to_string(),
        };
        store
            .insert("collection4", &[ChunkRecord::new(&chunk, vec![1.0])])
            .await
            .unwrap();
        store
            .insert("other", &[ChunkRecord::new(&chunk, vec![1.0])])
            .await
            .unwrap();

        ctx.clear().await.unwrap();

        let fresh = ctx.store().unwrap();
        assert_eq!(fresh.count("collection4").await.unwrap(), 0);
        assert_eq!(fresh.count("other").await.unwrap(), 1);
    }
}
