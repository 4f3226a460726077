//! # askbase-rag
//!
//! Retrieval-Augmented Generation for Askbase: turn a document corpus into
//! searchable chunks, and turn a question into a context-grounded,
//! citation-backed answer.
//!
//! ## Overview
//!
//! Ingestion runs documents through chunk → embed → store; queries run
//! retrieve → assemble → generate:
//!
//! - [`Chunker`] with [`RecursiveChunker`] (structural boundaries, the
//!   default), [`FixedSizeChunker`], and [`MarkdownChunker`]
//! - [`EmbeddingProvider`] — the embedding seam, with an OpenAI
//!   implementation behind the `openai` feature
//! - [`VectorStore`] — the index seam, with [`InMemoryVectorStore`] in-tree
//! - [`Ingestor`] — text/file/directory/URL sources, idempotent
//!   re-ingestion, per-document failure reporting
//! - [`Retriever`] and [`PromptAssembler`] — question to grounded prompt
//! - [`RagPipeline`] — the coordinator, with blocking
//!   [`answer`](RagPipeline::answer) and streaming
//!   [`answer_stream`](RagPipeline::answer_stream) modes
//!
//! Language-model backends implement [`askbase_core::Generator`]; concrete
//! clients live in `askbase-model`.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use askbase_rag::{
//!     DocumentSource, InMemoryVectorStore, QueryOptions, RagConfig, RagPipeline,
//!     RecursiveChunker,
//! };
//!
//! let config = RagConfig::builder().chunk_size(1000).chunk_overlap(200).build()?;
//! let pipeline = RagPipeline::builder()
//!     .config(config)
//!     .embedding_provider(embedder)
//!     .vector_store(Arc::new(InMemoryVectorStore::new()))
//!     .chunker(Arc::new(RecursiveChunker::new(1000, 200)))
//!     .generator(generator)
//!     .build()?;
//!
//! pipeline.create_collection().await?;
//! pipeline.ingest(DocumentSource::text("policy.md", "PTO needs 2 weeks notice.")).await?;
//!
//! let answer = pipeline.answer("How much notice for PTO?", &QueryOptions::default()).await?;
//! println!("{}", answer.text);
//! for citation in &answer.citations {
//!     println!("  [{}] {}", citation.source_id, citation.snippet);
//! }
//! ```

pub mod chunking;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod ingestion;
pub mod inmemory;
#[cfg(feature = "openai")]
pub mod openai;
pub mod pipeline;
pub mod prompt;
pub mod reranker;
pub mod retriever;
pub mod vectorstore;

pub use chunking::{Chunker, FixedSizeChunker, MarkdownChunker, RecursiveChunker};
pub use config::{RagConfig, RagConfigBuilder};
pub use document::{Answer, Chunk, Citation, Document, SearchResult};
pub use embedding::EmbeddingProvider;
pub use error::{RagError, Result};
pub use ingestion::{DocumentSource, IngestionFailure, IngestionReport, Ingestor};
pub use inmemory::InMemoryVectorStore;
pub use pipeline::{
    AnswerEvent, AnswerStream, IndexStats, QueryOptions, RagPipeline, RagPipelineBuilder,
};
pub use prompt::PromptAssembler;
pub use reranker::{NoOpReranker, Reranker};
pub use retriever::Retriever;
pub use vectorstore::VectorStore;
