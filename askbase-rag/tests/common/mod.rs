//! Shared fixtures for integration tests: deterministic embeddings and
//! misbehaving providers.

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use futures::stream;

use askbase_core::{AskError, Generator, TextStream};
use askbase_model::MockGenerator;
use askbase_rag::{
    EmbeddingProvider, InMemoryVectorStore, RagConfig, RagError, RagPipeline, RecursiveChunker,
};

/// Deterministic hash-based embeddings: same text, same vector.
pub struct HashEmbedder {
    dimensions: usize,
}

impl HashEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }
}

#[async_trait]
impl EmbeddingProvider for HashEmbedder {
    async fn embed(&self, text: &str) -> askbase_rag::Result<Vec<f32>> {
        let hash = text.bytes().fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64));
        let mut emb = vec![0.0f32; self.dimensions];
        for (i, v) in emb.iter_mut().enumerate() {
            *v = ((hash.wrapping_add(i as u64)) as f32).sin();
        }
        let norm: f32 = emb.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            emb.iter_mut().for_each(|x| *x /= norm);
        }
        Ok(emb)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

/// An embedder whose every call fails, as if the backend were unreachable.
pub struct FailingEmbedder;

#[async_trait]
impl EmbeddingProvider for FailingEmbedder {
    async fn embed(&self, _text: &str) -> askbase_rag::Result<Vec<f32>> {
        Err(RagError::EmbeddingError {
            provider: "failing".to_string(),
            message: "connection refused".to_string(),
        })
    }

    fn dimensions(&self) -> usize {
        8
    }
}

/// A generator that fails before producing anything.
pub struct FailingGenerator;

#[async_trait]
impl Generator for FailingGenerator {
    fn name(&self) -> &str {
        "failing"
    }

    async fn generate(&self, _prompt: &str) -> askbase_core::Result<String> {
        Err(AskError::Model("model unavailable".to_string()))
    }

    async fn generate_stream(&self, _prompt: &str) -> askbase_core::Result<TextStream> {
        Err(AskError::Model("model unavailable".to_string()))
    }
}

/// A generator whose stream dies after two increments.
pub struct MidStreamFailGenerator;

#[async_trait]
impl Generator for MidStreamFailGenerator {
    fn name(&self) -> &str {
        "flaky"
    }

    async fn generate_stream(&self, _prompt: &str) -> askbase_core::Result<TextStream> {
        let items: Vec<askbase_core::Result<String>> = vec![
            Ok("partial ".to_string()),
            Ok("answer".to_string()),
            Err(AskError::Stream("connection reset".to_string())),
        ];
        Ok(Box::pin(stream::iter(items)))
    }
}

/// A pipeline over an in-memory store with hash embeddings and a mock
/// generator, with its collection already created.
pub async fn build_pipeline(reply: &str, config: RagConfig) -> RagPipeline {
    let mut config = config;
    // Hash embeddings give arbitrary cosine signs; keep every result.
    config.similarity_threshold = -1.0;
    let chunk_size = config.chunk_size;
    let chunk_overlap = config.chunk_overlap;
    let pipeline = RagPipeline::builder()
        .config(config)
        .embedding_provider(Arc::new(HashEmbedder::new(32)))
        .vector_store(Arc::new(InMemoryVectorStore::new()))
        .chunker(Arc::new(RecursiveChunker::new(chunk_size, chunk_overlap)))
        .generator(Arc::new(MockGenerator::new(reply)))
        .build()
        .expect("pipeline builds");
    pipeline.create_collection().await.expect("collection created");
    pipeline
}
