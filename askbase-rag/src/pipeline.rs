//! RAG pipeline orchestrator.
//!
//! The [`RagPipeline`] coordinates the full ingest-and-answer workflow by
//! composing an [`EmbeddingProvider`], a [`VectorStore`], a [`Chunker`], a
//! [`Generator`], and an optional [`Reranker`].
//!
//! # Example
//!
//! ```rust,ignore
//! use askbase_rag::{DocumentSource, QueryOptions, RagConfig, RagPipeline};
//!
//! let pipeline = RagPipeline::builder()
//!     .config(RagConfig::default())
//!     .embedding_provider(Arc::new(my_embedder))
//!     .vector_store(Arc::new(InMemoryVectorStore::new()))
//!     .chunker(Arc::new(RecursiveChunker::new(1000, 200)))
//!     .generator(Arc::new(my_generator))
//!     .build()?;
//!
//! pipeline.create_collection().await?;
//! pipeline.ingest(DocumentSource::text("policy.md", "...")).await?;
//! let answer = pipeline.answer("How much notice for PTO?", &QueryOptions::default()).await?;
//! ```

use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;

use async_stream::try_stream;
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use askbase_core::Generator;

use crate::chunking::Chunker;
use crate::config::RagConfig;
use crate::document::{Answer, Citation, Document, SearchResult};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::ingestion::{DocumentSource, IngestionReport, Ingestor};
use crate::prompt::PromptAssembler;
use crate::reranker::Reranker;
use crate::retriever::Retriever;
use crate::vectorstore::VectorStore;

/// Per-query options for [`RagPipeline::answer`] and
/// [`RagPipeline::answer_stream`].
#[derive(Debug, Clone)]
pub struct QueryOptions {
    /// Number of chunks to retrieve; the configured default when `None`.
    pub top_k: Option<usize>,
    /// Whether to build the citation list. Skipping it changes nothing about
    /// retrieval or generation, only the returned citations.
    pub include_sources: bool,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self { top_k: None, include_sources: true }
    }
}

/// One element of a streaming answer.
#[derive(Debug, Clone)]
pub enum AnswerEvent {
    /// A generated text increment.
    Delta(String),
    /// The terminal citation list, emitted exactly once after the last
    /// delta of a successful stream.
    Sources(Vec<Citation>),
}

/// A streaming answer: [`AnswerEvent::Delta`]s followed by one terminal
/// [`AnswerEvent::Sources`].
///
/// A generator failure mid-stream ends the stream with an `Err` item;
/// deltas already emitted are not retracted. Dropping the stream cancels
/// generation, which is a normal early-termination path, not an error.
pub type AnswerStream = Pin<Box<dyn Stream<Item = Result<AnswerEvent>> + Send>>;

/// Statistics about the indexed corpus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexStats {
    /// The collection the pipeline is bound to.
    pub collection: String,
    /// Number of chunks currently stored.
    pub chunk_count: usize,
    /// Dimensionality of the configured embedding provider.
    pub dimensions: usize,
}

/// The RAG pipeline orchestrator.
///
/// Ingestion runs documents through chunk → embed → store; queries run
/// retrieve → assemble → generate. Construct one via
/// [`RagPipeline::builder()`]; the pipeline is bound to the collection named
/// in its [`RagConfig`].
pub struct RagPipeline {
    config: RagConfig,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    vector_store: Arc<dyn VectorStore>,
    generator: Arc<dyn Generator>,
    retriever: Retriever,
    assembler: PromptAssembler,
    ingestor: Ingestor,
}

impl RagPipeline {
    /// Create a new [`RagPipelineBuilder`].
    pub fn builder() -> RagPipelineBuilder {
        RagPipelineBuilder::default()
    }

    /// Return a reference to the pipeline configuration.
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Return a reference to the embedding provider.
    pub fn embedding_provider(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.embedding_provider
    }

    /// Return a reference to the vector store.
    pub fn vector_store(&self) -> &Arc<dyn VectorStore> {
        &self.vector_store
    }

    /// Create the pipeline's collection in the vector store.
    ///
    /// The collection is created with the dimensionality reported by the
    /// configured [`EmbeddingProvider`]. No-op if it already exists.
    pub async fn create_collection(&self) -> Result<()> {
        let dimensions = self.embedding_provider.dimensions();
        self.vector_store.create_collection(&self.config.collection, dimensions).await.map_err(
            |e| {
                error!(collection = %self.config.collection, error = %e, "failed to create collection");
                e
            },
        )
    }

    /// Delete the pipeline's collection and everything in it.
    pub async fn delete_collection(&self) -> Result<()> {
        self.vector_store.delete_collection(&self.config.collection).await.map_err(|e| {
            error!(collection = %self.config.collection, error = %e, "failed to delete collection");
            e
        })
    }

    /// Drop every stored chunk, leaving an empty collection behind.
    pub async fn clear(&self) -> Result<()> {
        self.delete_collection().await?;
        self.create_collection().await?;
        info!(collection = %self.config.collection, "collection cleared");
        Ok(())
    }

    /// Statistics about the indexed corpus.
    pub async fn stats(&self) -> Result<IndexStats> {
        let chunk_count = self.vector_store.count(&self.config.collection).await?;
        Ok(IndexStats {
            collection: self.config.collection.clone(),
            chunk_count,
            dimensions: self.embedding_provider.dimensions(),
        })
    }

    /// Ingest everything a source descriptor expands to.
    ///
    /// See [`Ingestor::ingest`]; per-document failures are reported in the
    /// returned [`IngestionReport`] rather than aborting the call.
    pub async fn ingest(&self, source: DocumentSource) -> Result<IngestionReport> {
        self.ingestor.ingest(source).await
    }

    /// Ingest already-constructed documents.
    pub async fn ingest_documents(&self, documents: &[Document]) -> Result<IngestionReport> {
        self.ingestor.ingest_documents(documents).await
    }

    /// Retrieve the most relevant chunks for a question without generating
    /// an answer.
    pub async fn retrieve(
        &self,
        question: &str,
        top_k: Option<usize>,
    ) -> Result<Vec<SearchResult>> {
        self.retriever.retrieve(question, top_k.unwrap_or(self.config.top_k)).await
    }

    /// Answer a question in blocking mode.
    ///
    /// Sequence: retrieve → assemble prompt → generate. When retrieval finds
    /// nothing, the generator is still invoked with an explicit
    /// no-relevant-information prompt, and the citation list is empty.
    ///
    /// # Errors
    ///
    /// [`RagError::InvalidInputError`] before any external call,
    /// [`RagError::RetrievalError`] without the generator ever being
    /// invoked, or [`RagError::GenerationError`] after retrieval succeeded.
    pub async fn answer(&self, question: &str, options: &QueryOptions) -> Result<Answer> {
        let started = Instant::now();

        let results = self.retrieve(question, options.top_k).await?;
        let prompt = self.assembler.assemble(question, &results);

        let text = self.generator.generate(&prompt).await.map_err(|e| {
            error!(model = self.generator.name(), error = %e, "generation failed");
            RagError::GenerationError {
                model: self.generator.name().to_string(),
                message: e.to_string(),
            }
        })?;

        let citations =
            if options.include_sources { Citation::from_results(&results) } else { Vec::new() };

        let elapsed_ms = started.elapsed().as_millis() as u64;
        info!(result_count = results.len(), elapsed_ms, "query completed");

        Ok(Answer { text, citations, elapsed_ms })
    }

    /// Answer a question in streaming mode.
    ///
    /// Retrieval happens before this method returns, so a retrieval failure
    /// fails the call itself and the generator is never invoked. The
    /// returned stream yields text deltas as the generator produces them
    /// (no additional buffering) and a single [`AnswerEvent::Sources`] after
    /// generation completes, so citations always reflect the chunks used for
    /// the full answer. Concatenating the deltas of a successful stream
    /// yields the same text as [`answer`](RagPipeline::answer) for the same
    /// question and index state.
    pub async fn answer_stream(
        &self,
        question: &str,
        options: &QueryOptions,
    ) -> Result<AnswerStream> {
        let results = self.retrieve(question, options.top_k).await?;
        let prompt = self.assembler.assemble(question, &results);
        let citations =
            if options.include_sources { Citation::from_results(&results) } else { Vec::new() };

        let generator = Arc::clone(&self.generator);
        let model = generator.name().to_string();

        let stream = try_stream! {
            let mut deltas = generator.generate_stream(&prompt).await.map_err(|e| {
                RagError::GenerationError { model: model.clone(), message: e.to_string() }
            })?;

            while let Some(delta) = deltas.next().await {
                let delta = delta.map_err(|e| RagError::GenerationError {
                    model: model.clone(),
                    message: e.to_string(),
                })?;
                yield AnswerEvent::Delta(delta);
            }

            yield AnswerEvent::Sources(citations);
        };

        Ok(Box::pin(stream))
    }
}

/// Builder for constructing a [`RagPipeline`].
///
/// All fields except `reranker` are required. Call
/// [`build()`](RagPipelineBuilder::build) to validate and produce the
/// pipeline.
///
/// # Example
///
/// ```rust,ignore
/// let pipeline = RagPipeline::builder()
///     .config(RagConfig::default())
///     .embedding_provider(Arc::new(embedder))
///     .vector_store(Arc::new(store))
///     .chunker(Arc::new(chunker))
///     .generator(Arc::new(generator))
///     .reranker(Arc::new(reranker))  // optional
///     .build()?;
/// ```
#[derive(Default)]
pub struct RagPipelineBuilder {
    config: Option<RagConfig>,
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
    vector_store: Option<Arc<dyn VectorStore>>,
    chunker: Option<Arc<dyn Chunker>>,
    generator: Option<Arc<dyn Generator>>,
    reranker: Option<Arc<dyn Reranker>>,
}

impl RagPipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedding provider.
    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedding_provider = Some(provider);
        self
    }

    /// Set the vector store backend.
    pub fn vector_store(mut self, store: Arc<dyn VectorStore>) -> Self {
        self.vector_store = Some(store);
        self
    }

    /// Set the document chunker.
    pub fn chunker(mut self, chunker: Arc<dyn Chunker>) -> Self {
        self.chunker = Some(chunker);
        self
    }

    /// Set the language-model backend.
    pub fn generator(mut self, generator: Arc<dyn Generator>) -> Self {
        self.generator = Some(generator);
        self
    }

    /// Set an optional reranker for post-search result reordering.
    pub fn reranker(mut self, reranker: Arc<dyn Reranker>) -> Self {
        self.reranker = Some(reranker);
        self
    }

    /// Build the [`RagPipeline`], validating that all required fields are
    /// set.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if any required field is missing.
    pub fn build(self) -> Result<RagPipeline> {
        let config =
            self.config.ok_or_else(|| RagError::ConfigError("config is required".to_string()))?;
        let embedding_provider = self
            .embedding_provider
            .ok_or_else(|| RagError::ConfigError("embedding_provider is required".to_string()))?;
        let vector_store = self
            .vector_store
            .ok_or_else(|| RagError::ConfigError("vector_store is required".to_string()))?;
        let chunker =
            self.chunker.ok_or_else(|| RagError::ConfigError("chunker is required".to_string()))?;
        let generator = self
            .generator
            .ok_or_else(|| RagError::ConfigError("generator is required".to_string()))?;

        let retriever = Retriever::new(
            Arc::clone(&embedding_provider),
            Arc::clone(&vector_store),
            self.reranker,
            config.collection.clone(),
            config.similarity_threshold,
        );
        let assembler = PromptAssembler::new(config.max_context_chars);
        let ingestor =
            Ingestor::new(chunker, Arc::clone(&embedding_provider), Arc::clone(&vector_store), &config);

        Ok(RagPipeline {
            config,
            embedding_provider,
            vector_store,
            generator,
            retriever,
            assembler,
            ingestor,
        })
    }
}
