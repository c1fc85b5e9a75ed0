//! Deterministic collaborators for orchestrator tests.

use anyhow::{bail, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::config::Config;
use crate::context::AppContext;
use crate::embedding::Embedder;
use crate::generation::Generator;
use crate::store::memory::InMemoryStore;

/// Folds the bytes of a text into a fixed number of buckets.
pub struct HashEmbedder {
    dims: usize,
}

impl HashEmbedder {
    pub fn new(dims: usize) -> Self {
        Self { dims }
    }

    pub fn vector(&self, text: &str) -> Vec<f32> {
        let mut v = vec![1.0; self.dims];
        for (i, b) in text.bytes().enumerate() {
            v[i % self.dims] += b as f32 / 255.0;
        }
        v
    }
}

#[async_trait]
impl Embedder for HashEmbedder {
    fn model_name(&self) -> &str {
        "hash"
    }
    fn dims(&self) -> usize {
        self.dims
    }
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.vector(t)).collect())
    }
}

pub struct FailingEmbedder;

#[async_trait]
impl Embedder for FailingEmbedder {
    fn model_name(&self) -> &str {
        "failing"
    }
    fn dims(&self) -> usize {
        0
    }
    async fn embed(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
        bail!("embedding service unavailable")
    }
}

/// Records every prompt and answers with a fixed reply.
pub struct StubGenerator {
    reply: Option<String>,
    fail: bool,
    pub prompts: Mutex<Vec<String>>,
}

impl Default for StubGenerator {
    fn default() -> Self {
        Self::replying(Some("አዲስ አበባ"))
    }
}

impl StubGenerator {
    pub fn replying(reply: Option<&str>) -> Self {
        Self {
            reply: reply.map(str::to_string),
            fail: false,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: None,
            fail: true,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl Generator for StubGenerator {
    fn model_name(&self) -> &str {
        "stub"
    }
    async fn generate(&self, prompt: &str) -> Result<Option<String>> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if self.fail {
            bail!("quota exceeded");
        }
        Ok(self.reply.clone())
    }
}

/// A context over a fresh in-memory store with default configuration.
pub fn context_with(
    embedder: Arc<dyn Embedder>,
    generator: Arc<dyn Generator>,
) -> (AppContext, Arc<InMemoryStore>) {
    let mut config: Config = toml::from_str("").unwrap();
    config.store.backend = "memory".to_string();
    let store = Arc::new(InMemoryStore::new());
    let ctx = AppContext::new(config, embedder, store.clone(), generator);
    (ctx, store)
}
